// Password hashing for room access

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a room password, or `None` when no password was given.
pub fn hash_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return None;
    }

    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    let bytes = hasher.finalize();
    Some(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}
