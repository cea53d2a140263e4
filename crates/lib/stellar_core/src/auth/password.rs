//! Account password hashing.

use tracing::warn;

use super::AuthError;

const COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, COST).map_err(|e| AuthError::Internal(format!("password hash: {e}")))
}

/// Check a login attempt against a stored hash. A stored value that is not a
/// bcrypt hash is an error, never a match.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| {
        warn!("stored password hash is unreadable: {e}");
        AuthError::Internal(format!("password verify: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("iamgamora").unwrap();
        assert_ne!(hash, "iamgamora");
        assert!(verify_password("iamgamora", &hash).unwrap());
        assert!(!verify_password("iamironman", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("x", "not-a-bcrypt-hash").is_err());
    }
}
