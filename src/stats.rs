use serde::{Deserialize, Serialize};

use crate::circuit::GateType;
use crate::garbler::GarbledCircuit;
use crate::label::LABEL_BYTES;

/// Size and composition summary of a garbled circuit.
///
/// AND and NOT gates are both counted at four ciphertexts: the NOT table
/// stores a redundant row pair, but the uniform 4x16-byte layout keeps row
/// indexing O(1) and the counts deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcStats {
    /// Total gate count.
    pub num_gates: usize,
    /// AND gates (4 ciphertexts each).
    pub num_and_gates: usize,
    /// XOR gates (table-free).
    pub num_xor_gates: usize,
    /// NOT gates (4 ciphertexts each).
    pub num_not_gates: usize,
    /// Stored table rows across all gates.
    pub num_ciphertexts: usize,
    /// `num_ciphertexts` at label width.
    pub ciphertext_bytes: usize,
}

/// Count gates and garbled-table material in `gc`.
pub fn compute_stats(gc: &GarbledCircuit) -> GcStats {
    let mut stats = GcStats {
        num_gates: gc.gates.len(),
        ..GcStats::default()
    };

    for gate in &gc.gates {
        match gate.gate_type {
            GateType::And => {
                stats.num_and_gates += 1;
                stats.num_ciphertexts += 4;
            }
            GateType::Xor => stats.num_xor_gates += 1,
            GateType::Not => {
                stats.num_not_gates += 1;
                stats.num_ciphertexts += 4;
            }
        }
    }

    stats.ciphertext_bytes = stats.num_ciphertexts * LABEL_BYTES;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;
    use crate::garbler::{GarbleSession, garble_circuit};

    #[test]
    fn test_eq_2bit_stats_literal() {
        let gc = garble_circuit(&Circuit::eq_2bit(), &GarbleSession::new()).unwrap();
        assert_eq!(
            compute_stats(&gc),
            GcStats {
                num_gates: 5,
                num_and_gates: 1,
                num_xor_gates: 2,
                num_not_gates: 2,
                num_ciphertexts: 12,
                ciphertext_bytes: 192,
            }
        );
    }

    #[test]
    fn test_and2_and_xor2_stats() {
        let and_gc = garble_circuit(&Circuit::and2(), &GarbleSession::new()).unwrap();
        let and_stats = compute_stats(&and_gc);
        assert_eq!(and_stats.num_and_gates, 1);
        assert_eq!(and_stats.num_ciphertexts, 4);
        assert_eq!(and_stats.ciphertext_bytes, 64);

        let xor_gc = garble_circuit(&Circuit::xor2(), &GarbleSession::new()).unwrap();
        let xor_stats = compute_stats(&xor_gc);
        assert_eq!(xor_stats.num_xor_gates, 1);
        assert_eq!(xor_stats.num_ciphertexts, 0);
        assert_eq!(xor_stats.ciphertext_bytes, 0);
    }
}
