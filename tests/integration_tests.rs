//! End-to-end tests comparing clear evaluation, garbled evaluation and the
//! PSI driver against each other and against literal expected results.

use anyhow::Result;

use gc_psi::circuit::Circuit;
use gc_psi::error::GcError;
use gc_psi::evaluator::{decode_outputs, evaluate_garbled};
use gc_psi::garbler::{GarbleSession, garble_circuit};
use gc_psi::hashing::{self, DIGEST_LEN};
use gc_psi::psi::{PsiContext, proto_simulate};
use gc_psi::stats::{GcStats, compute_stats};

/// Garble `circuit` under a default session and run one assignment through
/// encode, evaluate and decode.
fn garble_eval_decode(circuit: &Circuit, bits: &[u8]) -> Result<Vec<u8>> {
    let gc = garble_circuit(circuit, &GarbleSession::new())?;
    let input_labels = gc.encode_inputs(bits)?;
    let output_labels = evaluate_garbled(&gc, &input_labels)?;
    Ok(decode_outputs(&gc, &output_labels)?)
}

/// Check that the garbled path agrees with clear evaluation on every
/// assignment to `n_inputs` bits.
fn assert_garbled_matches_clear_exhaustive(circuit: &Circuit) -> Result<()> {
    let n_inputs = circuit.input_wires.len();
    assert!(n_inputs <= 16, "exhaustive sweep only for small circuits");

    for assignment in 0u32..(1 << n_inputs) {
        let bits: Vec<u8> = (0..n_inputs)
            .map(|i| ((assignment >> i) & 1) as u8)
            .collect();

        let clear = circuit.eval_clear(&bits)?;
        let garbled = garble_eval_decode(circuit, &bits)?;
        assert_eq!(garbled, clear, "assignment {assignment:#b}");
    }
    Ok(())
}

#[test]
fn test_and2_garbled_exhaustive() -> Result<()> {
    assert_garbled_matches_clear_exhaustive(&Circuit::and2())
}

#[test]
fn test_xor2_garbled_exhaustive() -> Result<()> {
    assert_garbled_matches_clear_exhaustive(&Circuit::xor2())
}

// Scenario S5: all 16 two-bit pairs decode to a == b through the garbled
// path.
#[test]
fn test_eq_2bit_garbled_exhaustive() -> Result<()> {
    let circuit = Circuit::eq_2bit();
    for a in 0u8..4 {
        for b in 0u8..4 {
            let bits = [a & 1, (a >> 1) & 1, b & 1, (b >> 1) & 1];
            let out = garble_eval_decode(&circuit, &bits)?;
            assert_eq!(out, vec![(a == b) as u8], "a={a} b={b}");
        }
    }
    assert_garbled_matches_clear_exhaustive(&circuit)
}

// Scenario S6: literal stats of the garbled two-bit equality circuit.
#[test]
fn test_eq_2bit_stats_literal() -> Result<()> {
    let gc = garble_circuit(&Circuit::eq_2bit(), &GarbleSession::new())?;
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
    Ok(())
}

/// Spot-check an equality width through the full garbled path: equal
/// inputs, first-bit difference, last-bit difference.
fn check_eq_width_garbled(k: usize) -> Result<()> {
    let circuit = Circuit::eq_bits(k)?;

    let mut bits = vec![0u8; 2 * k];
    for i in 0..k {
        let bit = ((i * 7 + 3) % 2) as u8;
        bits[i] = bit;
        bits[k + i] = bit;
    }
    assert_eq!(garble_eval_decode(&circuit, &bits)?, vec![1], "k={k} equal");

    bits[k] ^= 1;
    assert_eq!(
        garble_eval_decode(&circuit, &bits)?,
        vec![0],
        "k={k} first bit differs"
    );
    bits[k] ^= 1;

    bits[2 * k - 1] ^= 1;
    assert_eq!(
        garble_eval_decode(&circuit, &bits)?,
        vec![0],
        "k={k} last bit differs"
    );
    Ok(())
}

#[test]
fn test_eq_bits_boundary_widths() -> Result<()> {
    for k in [1usize, 2, 8, 128, 512] {
        check_eq_width_garbled(k)?;
    }

    assert_eq!(Circuit::eq_bits(0), Err(GcError::WidthOutOfRange(0)));
    assert_eq!(Circuit::eq_bits(513), Err(GcError::WidthOutOfRange(513)));
    Ok(())
}

#[test]
fn test_free_xor_invariant_large_circuit() -> Result<()> {
    let session = GarbleSession::new();
    let gc = garble_circuit(&Circuit::eq_bits(64)?, &session)?;

    for w in 0..gc.n_wires as usize {
        assert_eq!(
            &gc.wire_labels0[w].xor(&gc.wire_labels1[w]),
            session.delta(),
            "wire {w}"
        );
        assert_ne!(
            gc.wire_labels0[w].permute_bit(),
            gc.wire_labels1[w].permute_bit(),
            "wire {w}"
        );
    }
    Ok(())
}

/// Hash both string sets with the default key and run the garbled PSI path.
fn psi_mask_of_strings(set_a: &[&str], set_b: &[&str]) -> Result<Vec<u8>> {
    assert_eq!(set_a.len(), set_b.len());
    let count = set_a.len();

    let flat_a = hashing::hash_strings_to_flat(set_a, None);
    let flat_b = hashing::hash_strings_to_flat(set_b, None);

    let ctx = PsiContext::new(count, DIGEST_LEN * 8)?;
    let mask = ctx.compute(&flat_a, &flat_b, count)?;

    // the garbled path must agree with the plaintext reference on every index
    let reference = ctx.hash_only_compute(&flat_a, &flat_b, count)?;
    assert_eq!(mask, reference);

    Ok(mask)
}

// Scenario S1: one shared element plus one shared at a different index.
#[test]
fn test_psi_scenario_overlap() -> Result<()> {
    let mask = psi_mask_of_strings(&["alice", "bob", "carol"], &["bob", "dave", "carol"])?;
    assert_eq!(mask, vec![0, 1, 1]);
    Ok(())
}

// Scenario S2: single shared element.
#[test]
fn test_psi_scenario_single_match() -> Result<()> {
    let mask = psi_mask_of_strings(&["alice", "bob", "carol"], &["bob", "dave", "eve"])?;
    assert_eq!(mask, vec![0, 1, 0]);
    Ok(())
}

// Scenario S3: disjoint sets.
#[test]
fn test_psi_scenario_disjoint() -> Result<()> {
    let mask = psi_mask_of_strings(&["x", "y"], &["u", "v"])?;
    assert_eq!(mask, vec![0, 0]);
    Ok(())
}

// Scenario S4: identical sets.
#[test]
fn test_psi_scenario_identical() -> Result<()> {
    let mask = psi_mask_of_strings(&["same1", "same2"], &["same1", "same2"])?;
    assert_eq!(mask, vec![1, 1]);
    Ok(())
}

#[test]
fn test_psi_eight_elements_against_reference() -> Result<()> {
    let set_a = [
        "item0", "item1", "item2", "item3", "item4", "item5", "item6", "item7",
    ];
    let set_b = [
        "item3", "item1", "item9", "foo", "item7", "bar", "baz", "item0",
    ];

    let mask = psi_mask_of_strings(&set_a, &set_b)?;
    assert_eq!(mask, vec![1, 1, 0, 1, 0, 0, 0, 1]);
    Ok(())
}

#[test]
fn test_psi_rejects_count_over_capacity() -> Result<()> {
    let flat = hashing::hash_strings_to_flat(&["a", "b", "c"], None);
    let ctx = PsiContext::new(2, DIGEST_LEN * 8)?;
    assert_eq!(
        ctx.compute(&flat, &flat, 3).unwrap_err(),
        GcError::CapacityExceeded {
            count: 3,
            max_elems: 2
        }
    );
    Ok(())
}

// Scenario S1 through the protocol parity check: both passes must agree
// and reproduce the literal mask.
#[test]
fn test_proto_simulate_parity() -> Result<()> {
    let flat_a = hashing::hash_strings_to_flat(&["alice", "bob", "carol"], None);
    let flat_b = hashing::hash_strings_to_flat(&["bob", "dave", "carol"], None);

    let parity = proto_simulate(&flat_a, &flat_b, 3, DIGEST_LEN * 8)?;
    assert!(parity.masks_agree());
    assert_eq!(parity.mask_direct, vec![0, 1, 1]);
    assert_eq!(parity.mask_proto, vec![0, 1, 1]);
    Ok(())
}

#[test]
fn test_seeded_session_garbles_soundly() -> Result<()> {
    // a fresh, non-default session must still decode correctly end to end
    let session = GarbleSession::from_seed(&[42u8; 32]);
    let circuit = Circuit::eq_2bit();
    let gc = garble_circuit(&circuit, &session)?;

    for a in 0u8..4 {
        for b in 0u8..4 {
            let bits = [a & 1, (a >> 1) & 1, b & 1, (b >> 1) & 1];
            let input_labels = gc.encode_inputs(&bits)?;
            let output_labels = evaluate_garbled(&gc, &input_labels)?;
            let out = decode_outputs(&gc, &output_labels)?;
            assert_eq!(out, vec![(a == b) as u8], "a={a} b={b}");
        }
    }
    Ok(())
}

#[test]
fn test_default_and_seeded_sessions_differ() -> Result<()> {
    let default_gc = garble_circuit(&Circuit::and2(), &GarbleSession::new())?;
    let seeded_gc = garble_circuit(&Circuit::and2(), &GarbleSession::from_seed(&[7u8; 32]))?;

    assert_ne!(default_gc.wire_labels0[0], seeded_gc.wire_labels0[0]);
    assert_ne!(default_gc.gates[0].table, seeded_gc.gates[0].table);
    Ok(())
}
