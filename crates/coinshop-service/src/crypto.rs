//! Credential hashing.
//!
//! Passwords are stored as Argon2id PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=1$salt$hash`). The cost parameters are
//! embedded in each string, so raising them later only affects new accounts
//! and existing digests keep verifying.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use uuid::Uuid;

/// Hashes and verifies account credentials.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Create a hasher using `memory_kib` KiB of memory and `iterations`
    /// passes per hash.
    ///
    /// # Errors
    ///
    /// Returns an error if Argon2 rejects the cost parameters (for example
    /// less than 8 KiB of memory or zero iterations).
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, argon2::Error> {
        Ok(Self {
            params: Params::new(memory_kib, iterations, 1, None)?,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Produce a fresh salted digest of `password`.
    ///
    /// CPU- and memory-bound; call it off the async executor.
    ///
    /// # Errors
    ///
    /// Returns an error if Argon2 fails to produce the digest.
    pub fn hash(&self, password: &str) -> Result<String, password_hash::Error> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())?;
        let digest = self.argon2().hash_password(password.as_bytes(), &salt)?;

        Ok(digest.to_string())
    }

    /// Check `password` against a digest produced by [`hash`](Self::hash).
    ///
    /// Malformed digests never verify.
    #[must_use]
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        PasswordHash::new(stored)
            .and_then(|digest| self.argon2().verify_password(password.as_bytes(), &digest))
            .is_ok()
    }
}
