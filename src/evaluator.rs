use zeroize::Zeroizing;

use crate::circuit::GateType;
use crate::error::GcError;
use crate::garbler::GarbledCircuit;
use crate::label::Label;
use crate::prf;

/// Evaluate a garbled circuit on encoded input labels.
///
/// XOR gates are evaluated as plain label XORs with no table lookup or PRF
/// call. AND/NOT gates select their single table row by the permute-bit
/// pair of the two active input labels, re-derive that row's keystream and
/// XOR it away. The evaluator never branches on anything but the permute
/// colors, and it does not mutate `input_labels`. The working label array
/// is wiped when evaluation ends.
pub fn evaluate_garbled(
    gc: &GarbledCircuit,
    input_labels: &[Label],
) -> Result<Vec<Label>, GcError> {
    if gc.n_wires == 0 || gc.input_wires.is_empty() || gc.output_wires.is_empty() {
        return Err(GcError::EmptyCircuit);
    }
    if input_labels.len() != gc.input_wires.len() {
        return Err(GcError::LengthMismatch {
            expected: gc.input_wires.len(),
            got: input_labels.len(),
        });
    }

    let mut wire_vals = Zeroizing::new(vec![Label::default(); gc.n_wires as usize]);

    for (i, &w) in gc.input_wires.iter().enumerate() {
        wire_vals[gc.check_wire(w)?] = input_labels[i];
    }

    for (gi, gate) in gc.gates.iter().enumerate() {
        let in0 = gc.check_wire(gate.in0)?;
        let in1 = gc.check_wire(gate.in1)?;
        let out = gc.check_wire(gate.out)?;

        if gate.gate_type == GateType::Xor {
            wire_vals[out] = wire_vals[in0].xor(&wire_vals[in1]);
            continue;
        }

        let ka = wire_vals[in0];
        let kb = wire_vals[in1];
        let row = (ka.permute_bit() << 1) | kb.permute_bit();
        let keystream = prf::gate_keystream(&gc.prf_key, &ka, &kb, gi as u16, row);
        wire_vals[out] = gate.table[row as usize].xor(&keystream);
    }

    let mut outputs = Vec::with_capacity(gc.output_wires.len());
    for &w in &gc.output_wires {
        outputs.push(wire_vals[gc.check_wire(w)?]);
    }
    Ok(outputs)
}

/// Decode output labels back to clear bits.
///
/// Each label is compared in constant time against both recorded labels of
/// its wire; both comparisons are computed before the match is inspected,
/// so decode time does not depend on the output bit. A label matching
/// neither candidate is a [`GcError::DecodeMismatch`].
pub fn decode_outputs(gc: &GarbledCircuit, output_labels: &[Label]) -> Result<Vec<u8>, GcError> {
    if output_labels.len() != gc.output_wires.len() {
        return Err(GcError::LengthMismatch {
            expected: gc.output_wires.len(),
            got: output_labels.len(),
        });
    }

    let mut bits = Vec::with_capacity(output_labels.len());
    for (i, &w) in gc.output_wires.iter().enumerate() {
        let idx = gc.check_wire(w)?;
        let is0 = output_labels[i].ct_eq(&gc.wire_labels0[idx]);
        let is1 = output_labels[i].ct_eq(&gc.wire_labels1[idx]);

        if bool::from(is0) {
            bits.push(0);
        } else if bool::from(is1) {
            bits.push(1);
        } else {
            return Err(GcError::DecodeMismatch { wire: w });
        }
    }
    Ok(bits)
}
