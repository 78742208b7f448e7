//! Password hashing via bcrypt.

use std::sync::LazyLock;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash compared against when a login names no known account, so that path
/// costs one bcrypt verify like a wrong password does.
static DUMMY_HASH: LazyLock<Result<String, String>> = LazyLock::new(|| {
    bcrypt::hash("therapia-no-such-account", BCRYPT_COST).map_err(|e| e.to_string())
});

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// [`hash_password`] on the blocking pool, keeping bcrypt off the executor.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("hash task: {e}")))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("verify task: {e}")))?
}

/// Run a full verify against a fixed hash and discard the result.
pub async fn verify_dummy_blocking(password: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || {
        let hash = DUMMY_HASH
            .as_ref()
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))?;
        verify_password(&password, hash).map(|_| ())
    })
    .await
    .map_err(|e| AuthError::Internal(format!("verify task: {e}")))?
}
