//! Webhook signature verification.
//!
//! The gateway signs every notification with `SHA-512(order_id + status_code + gross_amount + server_key)`,
//! sent as a lowercase hex digest in the `signature_key` field. This is a plain keyed digest, not an HMAC.

use sha2::{Digest, Sha512};

pub fn calculate_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Case-insensitive comparison against the expected digest. Gateways disagree on hex casing.
pub fn verify_signature(
    signature_key: &str,
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> bool {
    let expected = calculate_signature(order_id, status_code, gross_amount, server_key);
    signature_key.eq_ignore_ascii_case(&expected)
}
