//! Keyed-PRF derivations for the garbling engine.
//!
//! Every pseudorandom value the engine consumes is BLAKE3 in keyed mode,
//! truncated to label width. Three domain-separated call shapes exist: the
//! session offset, per-wire bit-0 labels, and per-row gate keystreams. The
//! same derivations run on the garbling and evaluation sides, so the input
//! byte layout (little-endian indices, trailing separator byte) is fixed.

use crate::label::{LABEL_BYTES, Label};

/// Engine PRF key, baked in at build time. Sessions created with
/// [`crate::garbler::GarbleSession::new`] derive all label material from it.
pub(crate) const GC_PRF_KEY: [u8; 32] = [
    0x47, 0x43, 0x2d, 0x50, 0x52, 0x46, 0x2d, 0x4b, 0x65, 0x79, 0x2d, 0x31, 0x32, 0x33, 0x34,
    0x56, 0xa1, 0xb2, 0xc3, 0xd4, 0xe5, 0xf6, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88,
    0x99, 0xaa,
];

/// Domain separator for the offset derivation (ASCII "DELT").
const DELTA_INPUT: [u8; 4] = [0x44, 0x45, 0x4c, 0x54];

/// Trailing separator byte for per-wire label derivation.
const WIRE_DOMAIN: u8 = 0xA5;

/// Trailing separator byte for gate-row keystreams.
const GATE_DOMAIN: u8 = 0x3C;

/// First 16 bytes of the keyed BLAKE3 hash of `input`.
fn prf16(key: &[u8; 32], input: &[u8]) -> [u8; LABEL_BYTES] {
    let mut hasher = blake3::Hasher::new_keyed(key);
    hasher.update(input);
    let mut out = [0u8; LABEL_BYTES];
    hasher.finalize_xof().fill(&mut out);
    out
}

/// Derive the session offset delta. The low bit is forced to 1 so the two
/// labels of any wire disagree on their permute bit.
pub(crate) fn derive_delta(key: &[u8; 32]) -> Label {
    let mut out = prf16(key, &DELTA_INPUT);
    out[0] |= 0x01;
    Label::new(out)
}

/// Derive the bit-0 label for `wire`. The low bit is cleared, giving every
/// L0 permute color 0. The wire index is embedded little-endian.
pub(crate) fn derive_label0(key: &[u8; 32], wire: u16) -> Label {
    let [lo, hi] = wire.to_le_bytes();
    let input = [lo, hi, 0x00, WIRE_DOMAIN];
    let mut out = prf16(key, &input);
    out[0] &= 0xFE;
    Label::new(out)
}

/// Keystream for one garbled-table row: PRF over both active input labels,
/// the gate index (little-endian) and the row color.
pub(crate) fn gate_keystream(
    key: &[u8; 32],
    ka: &Label,
    kb: &Label,
    gate_index: u16,
    row: u8,
) -> Label {
    let mut input = [0u8; LABEL_BYTES * 2 + 4];
    input[..LABEL_BYTES].copy_from_slice(ka.as_bytes());
    input[LABEL_BYTES..LABEL_BYTES * 2].copy_from_slice(kb.as_bytes());
    let [lo, hi] = gate_index.to_le_bytes();
    input[LABEL_BYTES * 2] = lo;
    input[LABEL_BYTES * 2 + 1] = hi;
    input[LABEL_BYTES * 2 + 2] = row;
    input[LABEL_BYTES * 2 + 3] = GATE_DOMAIN;
    Label::new(prf16(key, &input))
}
