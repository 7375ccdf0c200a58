use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id v19 with the crate's default cost parameters.
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

fn hash_error(op: &'static str) -> impl Fn(password_hash::Error) -> anyhow::Error {
    move |e| {
        error!(error = %e, op, "argon2 failure");
        anyhow::anyhow!("argon2 {op}: {e}")
    }
}

/// PHC string for `plain` under a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(hash_error("hash"))?;
    Ok(phc.to_string())
}

/// Errors only when `stored` is not a PHC string; a mismatch is `Ok(false)`.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(hash_error("parse"))?;
    match hasher().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(hash_error("verify")(e)),
    }
}
