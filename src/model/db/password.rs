use argon2::{Config, Error as Argon2Error};
use rand::Rng;

/// Hash a plaintext password into an encoded Argon2 string.
pub fn hash_password(password: &str) -> Result<String, Argon2Error> {
    // 16 bytes is recommended for password hashing:
    //  https://en.wikipedia.org/wiki/Argon2
    // Also useful:
    //  https://www.twelve21.io/how-to-choose-the-right-parameters-for-argon2/
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill(&mut salt);
    argon2::hash_encoded(password.as_bytes(), &salt, &Config::default())
}

/// Check a plaintext password against an encoded hash.
/// A malformed hash never verifies.
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    argon2::verify_encoded(password_hash, password.as_bytes()).unwrap_or(false)
}
