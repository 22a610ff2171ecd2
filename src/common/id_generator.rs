// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXXXX (e.g., T_K7NP3XQ2 for transactions)

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Random characters after the prefix.
const ID_LENGTH: usize = 8;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Provider account (A_)
    Account,
    /// Category (C_)
    Category,
    /// Transaction (T_)
    Transaction,
    /// Budget (B_)
    Budget,
    /// Refresh token row (K_) - K for Key
    RefreshToken,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Account => "A",
            EntityPrefix::Category => "C",
            EntityPrefix::Transaction => "T",
            EntityPrefix::Budget => "B",
            EntityPrefix::RefreshToken => "K",
        }
    }
}

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// # Example
/// ```
/// use finance_api::common::{generate_id, EntityPrefix};
///
/// let id = generate_id(EntityPrefix::Budget);
/// assert!(id.starts_with("B_"));
/// ```
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(ID_LENGTH))
}

/// Generate a raw Crockford Base32 string without prefix.
/// Used as the `jti` of issued JWTs.
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_account_id() -> String {
    generate_id(EntityPrefix::Account)
}

pub fn generate_category_id() -> String {
    generate_id(EntityPrefix::Category)
}

pub fn generate_transaction_id() -> String {
    generate_id(EntityPrefix::Transaction)
}

pub fn generate_budget_id() -> String {
    generate_id(EntityPrefix::Budget)
}

pub fn generate_refresh_token_id() -> String {
    generate_id(EntityPrefix::RefreshToken)
}
