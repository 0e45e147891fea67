// src/wallet/key_management.rs
//! Ed25519 key management for ledger identities.
//!
//! Provides:
//! - Seed decoding from raw, base64 or hex text
//! - Deterministic or random keypair derivation
//! - The [`Signer`] capability used to sign write requests
//!
//! Private key material is never logged and never passes through the
//! signing serializer.

use std::fmt;

use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{self, Ed25519KeyPair, KeyPair as _, UnparsedPublicKey};

use crate::error::{LedgerError, SeedError, SigningError};
use crate::models::did::{create_did, Did};
use crate::models::request::Request;
use crate::utils::crypto::to_base58;

/// Length of an Ed25519 seed.
pub const SEED_LEN: usize = 32;

/// Length of an Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// An Ed25519 keypair.
///
/// Holds the seed the key was expanded from so the private half can be
/// handed to other Ed25519 implementations. Dropped with its holder; nothing
/// is persisted.
pub struct KeyPair {
    seed: [u8; SEED_LEN],
    public_key: [u8; PUBLIC_KEY_LEN],
    signing_key: Ed25519KeyPair,
}

impl KeyPair {
    /// Deterministically expands a 32-byte seed.
    pub fn from_seed(seed: [u8; SEED_LEN]) -> Result<Self, SeedError> {
        let signing_key = Ed25519KeyPair::from_seed_unchecked(&seed)
            .map_err(|e| SeedError::Rejected(e.to_string()))?;
        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(signing_key.public_key().as_ref());

        Ok(KeyPair {
            seed,
            public_key,
            signing_key,
        })
    }

    /// Generates a keypair from the system's secure random source.
    pub fn generate() -> Result<Self, SeedError> {
        let mut seed = [0u8; SEED_LEN];
        SystemRandom::new()
            .fill(&mut seed)
            .map_err(|_| SeedError::Randomness)?;
        Self::from_seed(seed)
    }

    pub fn raw_public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// Base58 public key, i.e. the verkey.
    pub fn public_key(&self) -> String {
        to_base58(&self.public_key)
    }

    /// The 64-byte Ed25519 private key: seed followed by public key.
    pub fn raw_private_key(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..SEED_LEN].copy_from_slice(&self.seed);
        out[SEED_LEN..].copy_from_slice(&self.public_key);
        out
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).as_ref().to_vec()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Derives a keypair from seed bytes, or from fresh randomness when `seed` is `None`.
pub fn derive_key_pair(seed: Option<&[u8]>) -> Result<KeyPair, SeedError> {
    match seed {
        Some(bytes) => {
            let seed: [u8; SEED_LEN] = bytes.try_into().map_err(|_| SeedError::Length {
                expected: SEED_LEN,
                actual: bytes.len(),
            })?;
            KeyPair::from_seed(seed)
        }
        None => KeyPair::generate(),
    }
}

/// Decodes seed text.
///
/// Accepted forms, checked in this order:
/// - exactly 32 characters, taken as raw bytes
/// - base64, recognised by trailing `=` padding
/// - hex, recognised by a length of 64 characters
///
/// Empty text means "no seed" and yields `None`. Every form must produce
/// exactly 32 bytes.
pub fn decode_seed(text: &str) -> Result<Option<[u8; SEED_LEN]>, SeedError> {
    if text.is_empty() {
        return Ok(None);
    }

    let bytes = if text.len() == SEED_LEN {
        text.as_bytes().to_vec()
    } else if text.ends_with('=') {
        base64::decode(text).map_err(SeedError::Base64)?
    } else if text.len() == 2 * SEED_LEN {
        hex::decode(text).map_err(SeedError::Hex)?
    } else {
        return Err(SeedError::Length {
            expected: SEED_LEN,
            actual: text.len(),
        });
    };

    let seed: [u8; SEED_LEN] = bytes.as_slice().try_into().map_err(|_| SeedError::Length {
        expected: SEED_LEN,
        actual: bytes.len(),
    })?;
    Ok(Some(seed))
}

/// Inputs for creating a ledger identity in one step.
#[derive(Debug, Clone, Default)]
pub struct DidInfo {
    /// Explicit method-specific id; derived from the key when `None`.
    pub did: Option<String>,
    /// Seed text in any form [`decode_seed`] accepts. Empty for a random key.
    pub seed: String,
    /// Use the first 16 key bytes as the DID.
    pub use_content_id: bool,
    pub method: String,
}

/// Decodes the seed, derives the keypair and builds the DID for it.
pub fn create_did_with_keys(info: &DidInfo) -> Result<(Did, KeyPair), SeedError> {
    let seed = decode_seed(&info.seed)?;
    let key_pair = derive_key_pair(seed.as_ref().map(|s| s.as_slice()))?;
    let did = create_did(
        key_pair.raw_public_key(),
        info.did.as_deref(),
        info.use_content_id,
        &info.method,
    );
    log::debug!("created DID {did} with verkey {}", did.verkey);
    Ok((did, key_pair))
}

/// Something that can sign the canonical form of a write request.
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError>;
}

/// [`Signer`] backed by an in-memory Ed25519 keypair.
#[derive(Debug)]
pub struct Ed25519Signer {
    key_pair: KeyPair,
}

impl Ed25519Signer {
    pub fn new(key_pair: KeyPair) -> Self {
        Ed25519Signer { key_pair }
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        Ok(self.key_pair.sign(message))
    }
}

/// Checks an Ed25519 signature against a raw public key.
pub fn verify(public_key: &[u8], message: &[u8], sig: &[u8]) -> bool {
    UnparsedPublicKey::new(&signature::ED25519, public_key)
        .verify(message, sig)
        .is_ok()
}

/// Signs `request` in place: the canonical serialization of its JSON
/// projection is signed and the base58 signature stored in `signature`.
pub fn sign_request(request: &mut Request, signer: &dyn Signer) -> Result<(), LedgerError> {
    let input = request.signature_input()?;
    let sig = signer.sign(input.as_bytes())?;
    request.signature = Some(to_base58(&sig));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::from_base58;
    use serde_json::json;

    const SEED: &str = "b2352b32947e188eb72871093ac6217e";
    const SEED_VERKEY: &str = "HJsMyfABm7gmPse8QzgUePRwTbQRyALgeZudJuYbYmro";

    #[test]
    fn test_decode_seed_equivalent_forms() {
        let raw = decode_seed(SEED).unwrap().unwrap();
        let b64 = decode_seed("YjIzNTJiMzI5NDdlMTg4ZWI3Mjg3MTA5M2FjNjIxN2U=").unwrap().unwrap();
        let hex = decode_seed("6232333532623332393437653138386562373238373130393361633632313765")
            .unwrap()
            .unwrap();

        assert_eq!(&raw, SEED.as_bytes());
        assert_eq!(raw, b64);
        assert_eq!(raw, hex);
    }

    #[test]
    fn test_decode_seed_empty_means_random() {
        assert!(decode_seed("").unwrap().is_none());
    }

    #[test]
    fn test_decode_seed_errors() {
        assert!(decode_seed("12=").is_err());
        assert!(matches!(
            decode_seed("62323335326233323934376531383865623732383731303933616336323137GG"),
            Err(SeedError::Hex(_))
        ));
        // Valid base64, wrong length
        assert!(matches!(
            decode_seed("aGVsbG8="),
            Err(SeedError::Length { expected: 32, actual: 5 })
        ));
        assert!(matches!(
            decode_seed("too short"),
            Err(SeedError::Length { expected: 32, actual: 9 })
        ));
    }

    #[test]
    fn test_derive_key_pair_from_seed() {
        let key_pair = derive_key_pair(Some(SEED.as_bytes())).unwrap();
        assert_eq!(key_pair.public_key(), SEED_VERKEY);
        assert_eq!(&key_pair.raw_private_key()[..32], SEED.as_bytes());
        assert_eq!(&key_pair.raw_private_key()[32..], key_pair.raw_public_key());
    }

    #[test]
    fn test_derive_key_pair_rejects_wrong_length() {
        assert!(matches!(
            derive_key_pair(Some(&[1u8; 31][..])),
            Err(SeedError::Length { expected: 32, actual: 31 })
        ));
    }

    #[test]
    fn test_random_key_pairs_differ() {
        let a = derive_key_pair(None).unwrap();
        let b = derive_key_pair(None).unwrap();
        assert_ne!(a.raw_public_key(), b.raw_public_key());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let key_pair = derive_key_pair(Some(SEED.as_bytes())).unwrap();
        let debug = format!("{key_pair:?}");
        assert!(debug.contains(SEED_VERKEY));
        assert!(!debug.contains(SEED));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_create_did_with_keys() {
        let (did, key_pair) = create_did_with_keys(&DidInfo {
            seed: SEED.into(),
            use_content_id: true,
            method: "sov".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(did.to_string(), "did:sov:WvRwKqxFLtJ3YbhmHZBpmy");
        assert_eq!(did.verkey, SEED_VERKEY);
        assert_eq!(did.abbreviated_verkey(), "~TkfxnTVB6SBQNAdtNHJHef");
        assert_eq!(key_pair.public_key(), SEED_VERKEY);
    }

    #[test]
    fn test_signer_round_trip() {
        let signer = Ed25519Signer::new(derive_key_pair(Some(SEED.as_bytes())).unwrap());
        let sig = signer.sign(b"message").unwrap();

        assert_eq!(sig.len(), 64);
        assert!(verify(signer.key_pair().raw_public_key(), b"message", &sig));
        assert!(!verify(signer.key_pair().raw_public_key(), b"other", &sig));
    }

    #[test]
    fn test_sign_request_signs_canonical_form() {
        let signer = Ed25519Signer::new(derive_key_pair(Some(SEED.as_bytes())).unwrap());
        let mut request = Request::new(
            json!({"type": "1", "dest": "WvRwKqxFLtJ3YbhmHZBpmy"}),
            Some("WvRwKqxFLtJ3YbhmHZBpmy"),
        );
        sign_request(&mut request, &signer).unwrap();

        let sig = from_base58(request.signature.as_deref().unwrap()).unwrap();
        let input = request.signature_input().unwrap();
        assert!(verify(signer.key_pair().raw_public_key(), input.as_bytes(), &sig));
    }

    struct UnavailableSigner;

    impl Signer for UnavailableSigner {
        fn sign(&self, _message: &[u8]) -> Result<Vec<u8>, SigningError> {
            Err(SigningError::KeyUnavailable)
        }
    }

    #[test]
    fn test_sign_request_propagates_signing_error() {
        let mut request = Request::new(json!({"type": "1"}), None);
        let err = sign_request(&mut request, &UnavailableSigner).unwrap_err();
        assert!(matches!(err, LedgerError::Signing(SigningError::KeyUnavailable)));
        assert!(request.signature.is_none());
    }

    #[test]
    fn test_sign_request_requires_operation_type() {
        let signer = Ed25519Signer::new(derive_key_pair(None).unwrap());
        let mut request = Request::new(json!({"dest": "D"}), None);
        assert!(matches!(
            sign_request(&mut request, &signer),
            Err(LedgerError::Serialize(_))
        ));
    }
}
