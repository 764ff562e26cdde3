use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("failed to hash password: {0}")]
pub struct PasswordError(String);

/// Hash a plain password with argon2id and a fresh salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError(e.to_string()))
}

/// Verify a password against a stored PHC hash. Unparseable hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// [`hash_password`] on the blocking pool, keeping argon2 off the async workers
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError(e.to_string()))?
}

/// [`verify_password`] on the blocking pool. A panicked task counts as a mismatch.
pub async fn verify_password_blocking(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("password").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("password", &hash));
        assert!(!verify_password("Password", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let first = hash_password("password").unwrap();
        let second = hash_password("password").unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_blocking_pool_variants_agree() {
        let hash = hash_password_blocking("password".to_string()).await.unwrap();

        assert!(verify_password("password", &hash));
        assert!(verify_password_blocking("password".to_string(), hash.clone()).await);
        assert!(!verify_password_blocking("wrong".to_string(), hash).await);
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("password", "plaintext-password"));
        assert!(!verify_password("", ""));
    }
}
