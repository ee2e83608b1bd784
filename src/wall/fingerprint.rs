use sha2::{Digest, Sha256};

/// Substituted whenever a request carries no usable client address, so
/// "no address" and "empty address" always collapse into one bucket.
const UNKNOWN_ADDR: &str = "unknown";

/// Derives the pseudonymous identity token for a client address.
///
/// The token is a hex-encoded SHA-256 digest over `"{salt}:{addr}"`. It is
/// the only form in which a client address ever reaches the datastore; the
/// raw address is dropped as soon as this function returns.
pub fn fingerprint(addr: Option<&str>, salt: &str) -> String {
    let addr = match addr.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => UNKNOWN_ADDR,
    };

    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(addr.as_bytes());
    hex::encode(hasher.finalize())
}
