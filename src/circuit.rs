use serde::{Deserialize, Serialize};

use crate::error::GcError;

/// Index of a wire inside a circuit's wire array.
pub type WireId = u16;

/// Widest equality circuit the synthesizer will produce.
pub const MAX_EQ_BITS: usize = 512;

/// Boolean gate kinds supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateType {
    /// Output = in0 AND in1
    And,
    /// Output = in0 XOR in1 (evaluated table-free, see free XOR)
    Xor,
    /// Output = NOT in0; `in1` is carried but never consulted
    Not,
}

/// One gate of a clear circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// First input wire.
    pub in0: WireId,
    /// Second input wire. Present for NOT gates too, by convention 0.
    pub in1: WireId,
    /// Output wire.
    pub out: WireId,
    /// Gate kind.
    pub gate_type: GateType,
}

/// A clear Boolean circuit.
///
/// Gates are listed in topological order: each gate's inputs are primary
/// inputs or outputs of an earlier gate. The engine trusts this order and
/// does not re-sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    /// Size of the wire array; every wire reference must be below this.
    pub n_wires: u16,
    /// Wires carrying primary inputs, in input order.
    pub input_wires: Vec<WireId>,
    /// Wires carrying primary outputs, in output order.
    pub output_wires: Vec<WireId>,
    /// Gates in topological order.
    pub gates: Vec<Gate>,
}

impl Circuit {
    /// Two-input AND on wires 0 and 1, output on wire 2.
    pub fn and2() -> Circuit {
        Circuit {
            n_wires: 3,
            input_wires: vec![0, 1],
            output_wires: vec![2],
            gates: vec![Gate {
                in0: 0,
                in1: 1,
                out: 2,
                gate_type: GateType::And,
            }],
        }
    }

    /// Two-input XOR on wires 0 and 1, output on wire 2.
    pub fn xor2() -> Circuit {
        Circuit {
            n_wires: 3,
            input_wires: vec![0, 1],
            output_wires: vec![2],
            gates: vec![Gate {
                in0: 0,
                in1: 1,
                out: 2,
                gate_type: GateType::Xor,
            }],
        }
    }

    /// Two-bit equality: inputs A on wires 0..2, B on wires 2..4, output 1
    /// iff A == B on wire 8.
    pub fn eq_2bit() -> Circuit {
        Circuit {
            n_wires: 9,
            input_wires: vec![0, 1, 2, 3],
            output_wires: vec![8],
            gates: vec![
                Gate {
                    in0: 0,
                    in1: 2,
                    out: 4,
                    gate_type: GateType::Xor,
                },
                Gate {
                    in0: 1,
                    in1: 3,
                    out: 5,
                    gate_type: GateType::Xor,
                },
                Gate {
                    in0: 4,
                    in1: 0,
                    out: 6,
                    gate_type: GateType::Not,
                },
                Gate {
                    in0: 5,
                    in1: 0,
                    out: 7,
                    gate_type: GateType::Not,
                },
                Gate {
                    in0: 6,
                    in1: 7,
                    out: 8,
                    gate_type: GateType::And,
                },
            ],
        }
    }

    /// Synthesize a k-bit equality circuit: output 1 iff the two k-bit
    /// inputs are equal.
    ///
    /// Wire layout for k >= 2: `[0, k)` bits of A (LSB first), `[k, 2k)`
    /// bits of B, `[2k, 3k)` per-bit XOR, `[3k, 4k)` per-bit equality
    /// (NOT of the XOR), `[4k, 4k + k - 2)` AND-accumulator wires, output
    /// on `4k + k - 2`. Gate order: k XOR, k NOT, then the left-fold AND
    /// chain. For k = 1 the chain degenerates to a self-AND of the single
    /// per-bit equality wire.
    pub fn eq_bits(k: usize) -> Result<Circuit, GcError> {
        if k == 0 || k > MAX_EQ_BITS {
            return Err(GcError::WidthOutOfRange(k));
        }

        let k16 = k as u16;
        let base_xor = 2 * k16;
        let base_eq = 3 * k16;
        let base_acc = 4 * k16;
        let out_wire = base_acc + if k16 > 1 { k16 - 2 } else { 0 };
        let n_wires = if k16 > 1 { 4 * k16 + (k16 - 1) } else { 4 * k16 + 1 };
        let n_gates = 2 * k + if k > 1 { k - 1 } else { 1 };

        let mut gates = Vec::with_capacity(n_gates);

        for i in 0..k16 {
            gates.push(Gate {
                in0: i,
                in1: k16 + i,
                out: base_xor + i,
                gate_type: GateType::Xor,
            });
        }

        for i in 0..k16 {
            gates.push(Gate {
                in0: base_xor + i,
                in1: 0,
                out: base_eq + i,
                gate_type: GateType::Not,
            });
        }

        if k16 == 1 {
            gates.push(Gate {
                in0: base_eq,
                in1: base_eq,
                out: out_wire,
                gate_type: GateType::And,
            });
        } else {
            let mut acc = base_eq;
            for i in 1..k16 {
                let next_acc = if i == k16 - 1 {
                    out_wire
                } else {
                    base_acc + (i - 1)
                };
                gates.push(Gate {
                    in0: acc,
                    in1: base_eq + i,
                    out: next_acc,
                    gate_type: GateType::And,
                });
                acc = next_acc;
            }
        }

        Ok(Circuit {
            n_wires,
            input_wires: (0..2 * k16).collect(),
            output_wires: vec![out_wire],
            gates,
        })
    }

    /// Evaluate the circuit in the clear on one bit per listed input wire.
    ///
    /// Returns one bit per listed output wire. Any nonzero input byte
    /// counts as 1. Every wire reference is validated; the first
    /// out-of-range wire aborts the evaluation.
    pub fn eval_clear(&self, inputs: &[u8]) -> Result<Vec<u8>, GcError> {
        if self.n_wires == 0 || self.input_wires.is_empty() || self.output_wires.is_empty() {
            return Err(GcError::EmptyCircuit);
        }
        if inputs.len() != self.input_wires.len() {
            return Err(GcError::LengthMismatch {
                expected: self.input_wires.len(),
                got: inputs.len(),
            });
        }

        let mut wire_vals = vec![0u8; self.n_wires as usize];

        for (i, &w) in self.input_wires.iter().enumerate() {
            wire_vals[self.check_wire(w)?] = (inputs[i] != 0) as u8;
        }

        for gate in &self.gates {
            let out = self.check_wire(gate.out)?;
            let val = match gate.gate_type {
                GateType::And => {
                    wire_vals[self.check_wire(gate.in0)?] & wire_vals[self.check_wire(gate.in1)?]
                }
                GateType::Xor => {
                    wire_vals[self.check_wire(gate.in0)?] ^ wire_vals[self.check_wire(gate.in1)?]
                }
                GateType::Not => wire_vals[self.check_wire(gate.in0)?] ^ 1,
            };
            wire_vals[out] = val;
        }

        let mut outputs = Vec::with_capacity(self.output_wires.len());
        for &w in &self.output_wires {
            outputs.push(wire_vals[self.check_wire(w)?]);
        }
        Ok(outputs)
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
