//! # Base64 Encoding
//!
//! Standard (padded) base64, the alphabet model APIs expect for inline binary parts.

use base64::{Engine as _, engine::general_purpose};

/// Encode bytes to a standard base64 string.
pub fn b64_encode(content: impl AsRef<[u8]>) -> String {
    general_purpose::STANDARD.encode(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uses_padded_standard_alphabet() {
        assert_eq!(b64_encode([0xfb, 0xff]), "+/8=");
    }

    #[test]
    fn test_encode_empty_input() {
        assert_eq!(b64_encode(b""), "");
    }
}
