use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;
use zeroize::Zeroize;

use crate::circuit::{Circuit, GateType, WireId};
use crate::error::GcError;
use crate::label::Label;
use crate::prf;

/// A garbling session: the secret global offset delta and the PRF key all
/// label material is derived from.
///
/// One session may garble many circuits; distinct sessions carry
/// independent deltas, so garbled circuits from different sessions can
/// coexist. The offset's low bit is always 1, which makes the permute bits
/// of any wire's two labels disagree.
#[derive(Debug, Clone)]
pub struct GarbleSession {
    prf_key: [u8; 32],
    delta: Label,
}

impl GarbleSession {
    /// Session under the built-in engine key. Deterministic: two default
    /// sessions derive identical labels and tables.
    pub fn new() -> Self {
        Self::with_key(prf::GC_PRF_KEY)
    }

    /// Session under an explicit 32-byte PRF key.
    pub fn with_key(prf_key: [u8; 32]) -> Self {
        let delta = prf::derive_delta(&prf_key);
        Self { prf_key, delta }
    }

    /// Session under a key drawn from a seeded CSPRNG.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut rng = ChaCha12Rng::from_seed(*seed);
        let mut prf_key = [0u8; 32];
        rng.fill_bytes(&mut prf_key);
        Self::with_key(prf_key)
    }

    /// The session offset. `L1 = L0 XOR delta` on every garbled wire.
    pub fn delta(&self) -> &Label {
        &self.delta
    }
}

impl Default for GarbleSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GarbleSession {
    fn drop(&mut self) {
        self.prf_key.zeroize();
        self.delta.zeroize();
    }
}

/// A garbled gate: the clear gate's topology plus the 4-row encrypted
/// table. XOR gates keep an all-zero table that is never read (free XOR).
#[derive(Debug, Clone)]
pub struct GarbledGate {
    /// First input wire.
    pub in0: WireId,
    /// Second input wire (carried but unconsulted for NOT).
    pub in1: WireId,
    /// Output wire.
    pub out: WireId,
    /// Gate kind.
    pub gate_type: GateType,
    /// Encrypted output labels, indexed by the permute-bit pair
    /// `(color(Ka) << 1) | color(Kb)`.
    pub table: [Label; 4],
}

/// A garbled circuit together with both per-wire label arrays.
///
/// `wire_labels1[w] = wire_labels0[w] XOR delta` for every wire. Label
/// material and the session PRF key are wiped when the value is dropped.
#[derive(Debug)]
pub struct GarbledCircuit {
    /// Size of the wire array.
    pub n_wires: u16,
    /// Wires carrying primary inputs, in input order.
    pub input_wires: Vec<WireId>,
    /// Wires carrying primary outputs, in output order.
    pub output_wires: Vec<WireId>,
    /// Garbled gates in the clear circuit's order.
    pub gates: Vec<GarbledGate>,
    /// Label encoding bit 0 on each wire.
    pub wire_labels0: Vec<Label>,
    /// Label encoding bit 1 on each wire.
    pub wire_labels1: Vec<Label>,
    pub(crate) prf_key: [u8; 32],
}

impl GarbledCircuit {
    /// Select the label encoding each input bit, in listed input-wire
    /// order. Any nonzero byte counts as 1.
    pub fn encode_inputs(&self, bits: &[u8]) -> Result<Vec<Label>, GcError> {
        if bits.len() != self.input_wires.len() {
            return Err(GcError::LengthMismatch {
                expected: self.input_wires.len(),
                got: bits.len(),
            });
        }

        let mut labels = Vec::with_capacity(bits.len());
        for (i, &w) in self.input_wires.iter().enumerate() {
            let idx = self.check_wire(w)?;
            labels.push(if bits[i] == 0 {
                self.wire_labels0[idx]
            } else {
                self.wire_labels1[idx]
            });
        }
        Ok(labels)
    }

    pub(crate) fn check_wire(&self, wire: WireId) -> Result<usize, GcError> {
        if wire >= self.n_wires {
            return Err(GcError::WireOutOfRange {
                wire,
                n_wires: self.n_wires,
            });
        }
        Ok(wire as usize)
    }
}

impl Drop for GarbledCircuit {
    fn drop(&mut self) {
        self.wire_labels0.zeroize();
        self.wire_labels1.zeroize();
        for gate in &mut self.gates {
            gate.table.zeroize();
        }
        self.prf_key.zeroize();
    }
}

fn plain_output(gate_type: GateType, a: u8, b: u8) -> u8 {
    match gate_type {
        GateType::And => a & b,
        GateType::Xor => a ^ b,
        GateType::Not => a ^ 1,
    }
}

/// Garble a clear circuit under the given session.
///
/// Labels are assigned in three passes. First every wire gets a
/// PRF-derived L0 with `L1 = L0 XOR delta`. Then XOR outputs are resolved
/// in gate order through the free-XOR identity, overriding the per-wire
/// derivation. Finally each AND/NOT gate gets a 4-row table: row
/// `(color(Ka) << 1) | color(Kb)` holds the correct output label XORed
/// with the gate-row keystream. The four input-label pairs of a gate land
/// on four distinct rows because paired labels differ in delta, whose low
/// bit is 1.
pub fn garble_circuit(
    circuit: &Circuit,
    session: &GarbleSession,
) -> Result<GarbledCircuit, GcError> {
    if circuit.n_wires == 0 || circuit.input_wires.is_empty() || circuit.output_wires.is_empty() {
        return Err(GcError::EmptyCircuit);
    }

    // Validate every wire reference before deriving any label material.
    for gate in &circuit.gates {
        circuit.check_wire(gate.in0)?;
        circuit.check_wire(gate.in1)?;
        circuit.check_wire(gate.out)?;
    }
    for &w in circuit.input_wires.iter().chain(&circuit.output_wires) {
        circuit.check_wire(w)?;
    }

    let key = &session.prf_key;
    let delta = session.delta;
    let n_wires = circuit.n_wires as usize;

    let mut wire_labels0 = Vec::with_capacity(n_wires);
    let mut wire_labels1 = Vec::with_capacity(n_wires);
    for w in 0..circuit.n_wires {
        let l0 = prf::derive_label0(key, w);
        wire_labels1.push(l0.xor(&delta));
        wire_labels0.push(l0);
    }

    // Free-XOR resolution pass: an XOR output's encoding is the XOR of its
    // input encodings. Gate order is topological, so earlier overrides are
    // visible to later XOR gates.
    for gate in &circuit.gates {
        if gate.gate_type != GateType::Xor {
            continue;
        }
        let l0 = wire_labels0[gate.in0 as usize].xor(&wire_labels0[gate.in1 as usize]);
        wire_labels1[gate.out as usize] = l0.xor(&delta);
        wire_labels0[gate.out as usize] = l0;
    }

    // Table pass.
    let mut gates = Vec::with_capacity(circuit.gates.len());
    for (gi, gate) in circuit.gates.iter().enumerate() {
        let mut table = [Label::default(); 4];

        if gate.gate_type != GateType::Xor {
            for a in 0..2u8 {
                for b in 0..2u8 {
                    let ka = if a == 0 {
                        wire_labels0[gate.in0 as usize]
                    } else {
                        wire_labels1[gate.in0 as usize]
                    };
                    let kb = if b == 0 {
                        wire_labels0[gate.in1 as usize]
                    } else {
                        wire_labels1[gate.in1 as usize]
                    };

                    let bit_out = plain_output(gate.gate_type, a, b);
                    let kout = if bit_out == 0 {
                        wire_labels0[gate.out as usize]
                    } else {
                        wire_labels1[gate.out as usize]
                    };

                    let row = (ka.permute_bit() << 1) | kb.permute_bit();
                    let keystream = prf::gate_keystream(key, &ka, &kb, gi as u16, row);
                    table[row as usize] = kout.xor(&keystream);
                }
            }
        }

        gates.push(GarbledGate {
            in0: gate.in0,
            in1: gate.in1,
            out: gate.out,
            gate_type: gate.gate_type,
            table,
        });
    }

    Ok(GarbledCircuit {
        n_wires: circuit.n_wires,
        input_wires: circuit.input_wires.clone(),
        output_wires: circuit.output_wires.clone(),
        gates,
        wire_labels0,
        wire_labels1,
        prf_key: *key,
    })
}
