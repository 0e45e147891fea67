// src/error.rs
//! Error types for the ledger client.
//!
//! Each component returns its own error enum so callers can tell a bad seed
//! from a malformed reply from a ledger rejection. [`LedgerError`] collects
//! them for the submission flow in [`crate::blockchain::ledger_client`].

use std::time::Duration;
use thiserror::Error;

use crate::models::reply::ErrorReply;

/// Seed text or seed bytes that cannot become an Ed25519 keypair.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("invalid base64 seed value")]
    Base64(#[source] base64::DecodeError),

    #[error("invalid hex seed value")]
    Hex(#[source] hex::FromHexError),

    #[error("seed must be {expected} bytes but got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("key material rejected: {0}")]
    Rejected(String),

    #[error("system randomness unavailable")]
    Randomness,
}

/// Failures while producing the canonical signing string.
#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("request is missing operation.type")]
    MissingOperation,

    #[error("attribute field `{0}` must be text to be hashed")]
    NonTextAttribute(String),

    #[error("request could not be projected to JSON")]
    Json(#[from] serde_json::Error),
}

/// Problems with a verkey or DID that is being decoded.
#[derive(Error, Debug)]
pub enum DidError {
    #[error("`{value}` is not valid base58")]
    InvalidBase58 {
        value: String,
        #[source]
        source: bs58::decode::Error,
    },
}

/// Failures while classifying or decoding a raw ledger response.
#[derive(Error, Debug)]
pub enum ReplyError {
    #[error("ledger response is not valid JSON")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("ledger response has no string `op` field")]
    MissingDiscriminator,

    #[error("unknown message reply: {0}")]
    UnknownDiscriminator(String),

    #[error("unable to decode `{field}`: {reason}")]
    Decode { field: String, reason: String },

    /// The ledger answered with REQNACK or REJECT.
    #[error("ledger rejected request: {0}")]
    Rejected(ErrorReply),
}

impl ReplyError {
    pub(crate) fn decode(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ReplyError::Decode {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The ledger's own rejection reason, if this is a rejection.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            ReplyError::Rejected(reply) => Some(&reply.reason),
            _ => None,
        }
    }
}

/// The signing capability could not produce a signature.
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("signing key is unavailable")]
    KeyUnavailable,

    #[error("signing backend failed: {0}")]
    Backend(String),
}

/// Failures in building a request from caller input.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("request JSON is invalid")]
    Json(#[from] serde_json::Error),

    #[error("request is missing operation.type")]
    MissingOperation,

    #[error("transaction number must be > 0, got {0}")]
    InvalidSeqNo(i64),

    #[error("malformed ledger object id `{0}`")]
    MalformedId(String),
}

/// Network failures talking to the ledger proxy.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("URL parsing failed")]
    Url(#[from] url::ParseError),

    #[error("non-success status code {0}: {1}")]
    Status(u16, String),
}

/// Everything that can go wrong while submitting a request to the ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("unable to generate signature input")]
    Serialize(#[from] SerializeError),

    #[error("unable to sign write request")]
    Signing(#[from] SigningError),

    #[error("invalid request")]
    Request(#[from] RequestError),

    #[error("transport failure")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Reply(#[from] ReplyError),

    #[error("ledger did not answer within {0:?}")]
    Timeout(Duration),

    #[error("unable to encode request")]
    Json(#[from] serde_json::Error),
}

impl LedgerError {
    /// The ledger's rejection reason when the request was refused by the ledger
    /// itself rather than failing in transit.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            LedgerError::Reply(err) => err.rejection_reason(),
            _ => None,
        }
    }
}
