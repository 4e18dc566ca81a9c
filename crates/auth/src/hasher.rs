//! One-way password hashing with a fixed work factor.
//!
//! Hashes are self-describing bcrypt strings (`$2b$<cost>$<salt><digest>`)
//! stored as raw bytes, so verification needs nothing besides the stored
//! value itself.

use thiserror::Error;

/// Cost used when none is configured (bcrypt's reference default).
pub const DEFAULT_COST: u32 = 10;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// bcrypt only reads this many password bytes; anything longer would be
/// silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt cost {0} outside allowed range {min}..={max}", min = MIN_COST, max = MAX_COST)]
    CostOutOfRange(u32),

    #[error("password is {0} bytes, longer than the {max}-byte limit", max = MAX_PASSWORD_BYTES)]
    PasswordTooLong(usize),

    #[error("stored password hash is malformed: {0}")]
    Malformed(String),

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// Credential hashing policy.
///
/// `verify` reports a mismatch as `Ok(false)`; `Err` is reserved for inputs
/// that cannot be checked at all.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<Vec<u8>, HashError>;

    fn verify(&self, password: &str, hash: &[u8]) -> Result<bool, HashError>;
}

/// bcrypt with a cost fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Result<Self, HashError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(HashError::CostOutOfRange(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<Vec<u8>, HashError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::PasswordTooLong(password.len()));
        }
        Ok(bcrypt::hash(password, self.cost)?.into_bytes())
    }

    fn verify(&self, password: &str, hash: &[u8]) -> Result<bool, HashError> {
        let hash = std::str::from_utf8(hash)
            .map_err(|e| HashError::Malformed(format!("not utf-8: {e}")))?;

        // Nothing longer than the limit was ever hashed, so it cannot match;
        // checking it anyway would compare only its first 72 bytes.
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        // bcrypt compares digests in constant time.
        bcrypt::verify(password, hash).map_err(|e| HashError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> BcryptHasher {
        BcryptHasher::new(MIN_COST).unwrap()
    }

    #[test]
    fn same_password_hashes_differently_but_both_verify() {
        let hasher = fast();
        let a = hasher.hash("Passw0rd!").unwrap();
        let b = hasher.hash("Passw0rd!").unwrap();

        assert_ne!(a, b, "hashes must be salted");
        assert!(hasher.verify("Passw0rd!", &a).unwrap());
        assert!(hasher.verify("Passw0rd!", &b).unwrap());
    }

    #[test]
    fn wrong_password_is_a_plain_mismatch() {
        let hasher = fast();
        let hash = hasher.hash("Passw0rd!").unwrap();
        assert!(!hasher.verify("Passw0rd!1", &hash).unwrap());
        assert!(!hasher.verify("", &hash).unwrap());
    }

    #[test]
    fn hash_embeds_configured_cost() {
        let hasher = BcryptHasher::new(5).unwrap();
        let hash = String::from_utf8(hasher.hash("x").unwrap()).unwrap();
        assert!(hash.starts_with("$2b$05$"), "unexpected hash prefix: {hash}");
    }

    #[test]
    fn default_cost_matches_reference() {
        assert_eq!(BcryptHasher::default().cost(), DEFAULT_COST);
    }

    #[test]
    fn cost_outside_bcrypt_range_is_rejected() {
        assert!(matches!(BcryptHasher::new(3), Err(HashError::CostOutOfRange(3))));
        assert!(matches!(BcryptHasher::new(32), Err(HashError::CostOutOfRange(32))));
    }

    #[test]
    fn password_longer_than_bcrypt_limit_is_refused() {
        let hasher = fast();
        let long = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(hasher.hash(&long), Err(HashError::PasswordTooLong(73))));

        let at_limit = "a".repeat(MAX_PASSWORD_BYTES);
        assert!(hasher.hash(&at_limit).is_ok());
    }

    #[test]
    fn shared_72_byte_prefix_does_not_verify() {
        let hasher = fast();
        let stored = "a".repeat(MAX_PASSWORD_BYTES);
        let hash = hasher.hash(&stored).unwrap();

        assert!(hasher.verify(&stored, &hash).unwrap());
        assert!(!hasher.verify(&format!("{stored}WRONG!!"), &hash).unwrap());
        assert!(!hasher.verify(&stored[..MAX_PASSWORD_BYTES - 1], &hash).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error_not_a_mismatch() {
        let hasher = fast();
        assert!(matches!(hasher.verify("pw", b"plaintext"), Err(HashError::Malformed(_))));
        assert!(matches!(hasher.verify("pw", &[0xff, 0xfe]), Err(HashError::Malformed(_))));
    }
}
