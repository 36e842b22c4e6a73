use thiserror::Error;

/// Errors raised by circuit construction, garbling, evaluation and the PSI
/// driver.
///
/// Every validation failure is a hard stop for its call: no retries, no
/// partial output. The PSI driver is the single exception — it downgrades
/// to the plaintext reference path when the garbling pipeline itself fails,
/// but still surfaces its own argument errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// A circuit with zero wires, inputs or outputs was supplied.
    #[error("circuit must have at least one wire, one input and one output")]
    EmptyCircuit,

    /// A gate or wire listing referenced a wire past the wire array.
    #[error("wire {wire} out of range for circuit with {n_wires} wires")]
    WireOutOfRange {
        /// The offending wire index.
        wire: u16,
        /// Number of wires in the circuit.
        n_wires: u16,
    },

    /// A caller-supplied slice disagreed with the circuit's listed sizes.
    #[error("expected {expected} elements, got {got}")]
    LengthMismatch {
        /// Length required by the circuit or context.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },

    /// An output label matched neither decode candidate for its wire.
    /// Indicates a corrupted garbled table or wrong input labels.
    #[error("output label on wire {wire} matches neither candidate label")]
    DecodeMismatch {
        /// The output wire whose label failed to decode.
        wire: u16,
    },

    /// Equality-circuit width outside the supported range.
    #[error("equality width {0} out of range (supported: 1..=512)")]
    WidthOutOfRange(usize),

    /// PSI context parameters must both be nonzero.
    #[error("psi context requires nonzero max_elems and elem_bits")]
    InvalidContext,

    /// PSI element count above the context capacity.
    #[error("element count {count} exceeds context capacity {max_elems}")]
    CapacityExceeded {
        /// Requested element count.
        count: usize,
        /// Capacity the context was created with.
        max_elems: usize,
    },
}
