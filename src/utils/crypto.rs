// src/utils/crypto.rs
//! Hashing and encoding helpers shared by the serializer and the identifier model.
//!
//! The ledger identifies keys by their base58 text and signs attribute
//! payloads by their SHA-256 digest, so both live here.

use ring::digest::{digest, SHA256};

/// Computes the SHA-256 digest of `data`.
///
/// # Example
/// ```
/// use did_ledger_client::utils::crypto::hash_data;
/// let hash = hash_data(b"hello");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest(&SHA256, data).as_ref());
    out
}

/// Lowercase hex SHA-256 digest, the form attribute payloads are signed in.
pub fn hash_hex(data: &[u8]) -> String {
    hex::encode(hash_data(data))
}

/// Base58 (bitcoin alphabet) encoding.
pub fn to_base58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

pub fn from_base58(text: &str) -> Result<Vec<u8>, bs58::decode::Error> {
    bs58::decode(text).into_vec()
}
