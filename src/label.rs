use serde::{Deserialize, Serialize};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Byte width of a wire label.
pub const LABEL_BYTES: usize = 16;

/// 128-bit wire label for garbled circuits
///
/// Labels are opaque byte buffers with no total order. The only operations
/// are XOR, constant-time equality and permute-bit extraction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Zeroize)]
pub struct Label([u8; LABEL_BYTES]);

impl Label {
    /// Wrap raw bytes as a label.
    pub fn new(bytes: [u8; LABEL_BYTES]) -> Self {
        Label(bytes)
    }

    /// Byte-wise XOR of two labels.
    pub fn xor(&self, other: &Label) -> Label {
        let mut result = [0u8; LABEL_BYTES];
        for i in 0..LABEL_BYTES {
            result[i] = self.0[i] ^ other.0[i];
        }
        Label(result)
    }

    /// Constant-time equality. Accumulates over all 16 bytes; never
    /// short-circuits.
    pub fn ct_eq(&self, other: &Label) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }

    /// The point-and-permute color: the low bit of byte 0.
    pub fn permute_bit(&self) -> u8 {
        self.0[0] & 1
    }

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; LABEL_BYTES] {
        &self.0
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}

impl Eq for Label {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_xor() {
        let label1 = Label::new([0x01; 16]);
        let label2 = Label::new([0x02; 16]);
        let result = label1.xor(&label2);
        assert_eq!(result.as_bytes(), &[0x03; 16]);
    }

    #[test]
    fn test_label_xor_self_is_zero() {
        let label = Label::new([0xA7; 16]);
        assert_eq!(label.xor(&label), Label::default());
    }

    #[test]
    fn test_ct_eq() {
        let a = Label::new([0x55; 16]);
        let b = Label::new([0x55; 16]);
        let mut c_bytes = [0x55; 16];
        c_bytes[15] ^= 1;
        let c = Label::new(c_bytes);

        assert!(bool::from(a.ct_eq(&b)));
        assert!(!bool::from(a.ct_eq(&c)));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_permute_bit() {
        let mut bytes = [0u8; 16];
        assert_eq!(Label::new(bytes).permute_bit(), 0);
        bytes[0] = 0x01;
        assert_eq!(Label::new(bytes).permute_bit(), 1);
        // only byte 0 contributes
        bytes[0] = 0xFE;
        bytes[1] = 0xFF;
        assert_eq!(Label::new(bytes).permute_bit(), 0);
    }

    #[test]
    fn test_zeroize() {
        let mut label = Label::new([0x42; 16]);
        label.zeroize();
        assert_eq!(label.as_bytes(), &[0u8; 16]);
    }
}
