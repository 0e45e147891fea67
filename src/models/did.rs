// src/models/did.rs
//! Decentralized Identifier (DID) model for the ledger.
//!
//! A DID here is `did:<method>:<method-specific-id>`, where the id is base58
//! text derived from an Ed25519 public key. Ledger DIDs built with the
//! content-identifier convention use only the first 16 key bytes as the id,
//! which lets the verkey be written in an abbreviated `~` form.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DidError;
use crate::utils::crypto::{from_base58, to_base58};

static DID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[a-z0-9]+:([a-z0-9]+):(.*)$").expect("DID pattern is a valid regex")
});

/// Number of leading key bytes a content-identifier DID is made of.
pub const CONTENT_ID_LEN: usize = 16;

/// Marks a verkey whose first [`CONTENT_ID_LEN`] bytes are implied by its DID.
pub const ABBREVIATION_MARKER: char = '~';

/// The method and method-specific id of a DID.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DidValue {
    /// Example: "WvRwKqxFLtJ3YbhmHZBpmy"
    pub method_specific_id: String,
    /// Lowercase alphanumeric, or empty for a bare identifier.
    pub method: String,
}

impl DidValue {
    pub fn new(method_specific_id: &str, method: &str) -> Self {
        DidValue {
            method_specific_id: method_specific_id.to_owned(),
            method: method.to_owned(),
        }
    }

    /// Only unqualified and `sov` DIDs may abbreviate their verkeys.
    pub fn is_abbreviatable(&self) -> bool {
        self.method.is_empty() || self.method == "sov"
    }
}

impl FromStr for DidValue {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_did(s))
    }
}

impl fmt::Display for DidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.method.is_empty() {
            write!(f, "did:{}", self.method_specific_id)
        } else {
            write!(f, "did:{}:{}", self.method, self.method_specific_id)
        }
    }
}

/// A DID together with the full base58 verkey it was derived from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Did {
    pub value: DidValue,
    /// Never abbreviated.
    pub verkey: String,
}

impl Did {
    /// The verkey in `~` form when this DID allows it, otherwise the full verkey.
    pub fn abbreviated_verkey(&self) -> String {
        abbreviate_for(&self.value, &self.verkey)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

/// Builds a DID for `public_key`.
///
/// An explicit DID is used verbatim. Otherwise the id is the base58 of the
/// first 16 key bytes when `use_content_id` is set, or of the whole key.
/// The verkey is always the full key.
pub fn create_did(
    public_key: &[u8],
    explicit_did: Option<&str>,
    use_content_id: bool,
    method: &str,
) -> Did {
    let method_specific_id = match explicit_did {
        Some(did) => did.to_owned(),
        None if use_content_id => {
            to_base58(&public_key[..CONTENT_ID_LEN.min(public_key.len())])
        }
        None => to_base58(public_key),
    };

    Did {
        value: DidValue {
            method_specific_id,
            method: method.to_owned(),
        },
        verkey: to_base58(public_key),
    }
}

/// Splits `did:<method>:<id>`. Anything else is taken as a bare id.
pub fn parse_did(text: &str) -> DidValue {
    match DID_PATTERN.captures(text) {
        Some(caps) => DidValue {
            method: caps[1].to_owned(),
            method_specific_id: caps[2].to_owned(),
        },
        None => DidValue {
            method_specific_id: text.to_owned(),
            method: String::new(),
        },
    }
}

/// Shortens `verkey` to `~<base58 of bytes 16..>` when its first 16 bytes
/// are exactly the DID's decoded id. Returns the verkey unchanged otherwise.
pub fn abbreviate_verkey(did: &str, verkey: &str) -> String {
    abbreviate_for(&parse_did(did), verkey)
}

fn abbreviate_for(did: &DidValue, verkey: &str) -> String {
    if !did.is_abbreviatable() {
        return verkey.to_owned();
    }

    let (Ok(did_bytes), Ok(key_bytes)) = (from_base58(&did.method_specific_id), from_base58(verkey))
    else {
        return verkey.to_owned();
    };

    if key_bytes.len() < CONTENT_ID_LEN || did_bytes != key_bytes[..CONTENT_ID_LEN] {
        return verkey.to_owned();
    }

    format!(
        "{ABBREVIATION_MARKER}{}",
        to_base58(&key_bytes[CONTENT_ID_LEN..])
    )
}

/// Rebuilds a full verkey from its `~` form using the DID's id bytes.
/// Verkeys that are not abbreviated are returned unchanged.
pub fn expand_verkey(did: &str, verkey: &str) -> Result<String, DidError> {
    let Some(suffix) = verkey.strip_prefix(ABBREVIATION_MARKER) else {
        return Ok(verkey.to_owned());
    };

    let did = parse_did(did);
    let mut key_bytes = decode(&did.method_specific_id)?;
    key_bytes.extend(decode(suffix)?);
    Ok(to_base58(&key_bytes))
}

fn decode(value: &str) -> Result<Vec<u8>, DidError> {
    from_base58(value).map_err(|source| DidError::InvalidBase58 {
        value: value.to_owned(),
        source,
    })
}
