//! Password policy and credential hash value object.
//!
//! Validation is a pure function over the candidate text. Hashing uses
//! argon2id with a per-hash random salt and a fixed work factor.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::constants::{
    HASH_ITERATIONS, HASH_MEMORY_KIB, HASH_PARALLELISM, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
use crate::error::{DomainError, DomainResult, ValidationError};

/// Strength rules for new passwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordPolicy;

impl PasswordPolicy {
    /// Check a candidate password against the strength rules.
    ///
    /// Rules are applied in order: blank, too short, too long, too weak.
    /// Length is counted in characters, not bytes.
    pub fn validate(candidate: &str) -> Result<(), ValidationError> {
        if candidate.trim().is_empty() {
            return Err(ValidationError::EmptyPassword);
        }

        let length = candidate.chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooLong {
                max: MAX_PASSWORD_LENGTH,
            });
        }

        let has_upper = candidate.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = candidate.chars().any(|c| c.is_ascii_lowercase());
        let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
        if !(has_upper && has_lower && has_digit) {
            return Err(ValidationError::PasswordTooWeak);
        }

        Ok(())
    }
}

/// Argon2id work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Lanes
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self::new(HASH_MEMORY_KIB, HASH_ITERATIONS, HASH_PARALLELISM)
    }
}

impl HashCost {
    pub const fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    fn argon2(&self) -> DomainResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| DomainError::fatal(format!("Invalid hash parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// One-way credential hash. Never holds plaintext.
///
/// DDD: Value object - immutable, compared by value.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash plaintext with the default work factor.
    ///
    /// No strength rules are applied here; see [`PasswordPolicy::validate`].
    ///
    /// # Errors
    /// Returns [`DomainError::FatalEnvironment`] if the hashing primitive fails.
    pub fn hash(plain_text: &str) -> DomainResult<Self> {
        Self::hash_with(plain_text, HashCost::default())
    }

    /// Hash plaintext with an explicit work factor.
    pub fn hash_with(plain_text: &str, cost: HashCost) -> DomainResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = cost
            .argon2()?
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::fatal(format!("Password hash failed: {}", e)))?;
        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Create a Password from an existing hash (from storage).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// A stored value that is not a valid PHC string never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };
        // Cost parameters are read back from the PHC string.
        Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}
