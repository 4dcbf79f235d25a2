use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Salted one-way password hashing.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> anyhow::Result<String>;

    /// Returns `false` for a wrong password and for an unparseable digest.
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id with the crate's default parameters, stored in PHC string form.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| anyhow!("failed to hash password: {error}"))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            tracing::warn!("stored password digest is not a valid PHC string");
            return false;
        };
        Argon2::default().verify_password(plaintext.as_bytes(), &parsed).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{Argon2Hasher, CredentialHasher};

    #[test]
    fn hashes_are_salted_argon2id() {
        let hasher = Argon2Hasher;
        let first = hasher.hash("password123").expect("hash should succeed");
        let second = hasher.hash("password123").expect("hash should succeed");

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(!first.contains("password123"));
    }

    #[test]
    fn verify_accepts_only_the_original_password() {
        let hasher = Argon2Hasher;
        let digest = hasher.hash("password123").expect("hash should succeed");

        assert!(hasher.verify("password123", &digest));
        assert!(!hasher.verify("password124", &digest));
        assert!(!hasher.verify("password123", "not-a-phc-string"));
    }
}
