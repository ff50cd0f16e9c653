//! Integrity checks for serialized model files using SHA-256 checksums.
//!
//! A model file is only trusted when its digest matches the one configured
//! through `MODEL_SHA256`. Without a configured digest the file is accepted
//! as-is and its checksum is logged so operators can pin it.

use sha2::{Digest, Sha256};

/// Computes the hex-encoded SHA-256 checksum of the given bytes.
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Returns true if the data matches the expected checksum.
///
/// Comparison ignores case and surrounding whitespace in `expected`.
pub fn is_valid(data: &[u8], expected: &str) -> bool {
    let computed = compute_checksum(data);
    let valid = computed.eq_ignore_ascii_case(expected.trim());

    if !valid {
        tracing::warn!(
            "Model checksum mismatch. Expected: {}, computed: {}, data length: {}",
            expected.trim(),
            computed,
            data.len()
        );
    }

    valid
}

/// Returns true if `value` looks like a hex-encoded SHA-256 digest.
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            compute_checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_valid_checksum_accepted() {
        let data = br#"{"version": "1.0.0"}"#;
        let checksum = compute_checksum(data);

        assert!(is_valid(data, &checksum));
        assert!(is_valid(data, &checksum.to_uppercase()));
    }

    #[test]
    fn test_tampered_data_rejected() {
        let checksum = compute_checksum(br#"{"original": "model"}"#);
        assert!(!is_valid(br#"{"tampered": "model"}"#, &checksum));
    }

    #[test]
    fn test_checksum_consistency() {
        assert_eq!(compute_checksum(b"model"), compute_checksum(b"model"));
    }

    #[test]
    fn test_sha256_hex_format() {
        assert!(is_sha256_hex(&compute_checksum(b"x")));
        assert!(!is_sha256_hex("abc"));
        assert!(!is_sha256_hex(&"z".repeat(64)));
    }
}
