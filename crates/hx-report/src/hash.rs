//! Content-based hashing for report ids.

use sha2::{Digest, Sha256};

/// SHA-256 of the raw input document, hex encoded.
pub fn compute_report_id(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_stability() {
        let input = br#"{"data":{}}"#;
        assert_eq!(compute_report_id(input), compute_report_id(input));
        assert_eq!(compute_report_id(input).len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        assert_ne!(
            compute_report_id(br#"{"kpi_value":500.0}"#),
            compute_report_id(br#"{"kpi_value":600.0}"#)
        );
    }
}
