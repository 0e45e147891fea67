// src/services/reply_parser.rs
//! Classification and decoding of raw ledger responses.
//!
//! Every ledger response is a JSON object with an `op` discriminator:
//! - `REQACK` / `REPLY` carry a `result` that decodes into the expected reply type
//! - `REQNACK` / `REJECT` carry a `reason` and become [`ReplyError::Rejected`]
//!
//! Anything else is reported as [`ReplyError::UnknownDiscriminator`].

use log::debug;

use crate::error::ReplyError;
use crate::models::reply::{ErrorReply, Fields, ReadReply, WriteReply};
use crate::models::value::Value;

/// A reply record that can be decoded from a response's `result` value.
pub trait ReplyShape: Sized {
    fn from_result(result: &Value) -> Result<Self, ReplyError>;
}

impl ReplyShape for ReadReply {
    fn from_result(result: &Value) -> Result<Self, ReplyError> {
        ReadReply::decode(&Fields::of(result, "result")?)
    }
}

impl ReplyShape for WriteReply {
    fn from_result(result: &Value) -> Result<Self, ReplyError> {
        WriteReply::decode(&Fields::of(result, "result")?)
    }
}

/// Response kinds keyed by the `op` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminator {
    ReqAck,
    Reply,
    ReqNack,
    Reject,
}

impl Discriminator {
    pub fn from_op(op: &str) -> Option<Self> {
        match op {
            "REQACK" => Some(Discriminator::ReqAck),
            "REPLY" => Some(Discriminator::Reply),
            "REQNACK" => Some(Discriminator::ReqNack),
            "REJECT" => Some(Discriminator::Reject),
            _ => None,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Discriminator::ReqAck | Discriminator::Reply)
    }
}

/// Parses a raw ledger response into `R`.
///
/// # Arguments
/// * `response` - Raw JSON text received from the ledger
///
/// # Errors
/// - [`ReplyError::MalformedResponse`] if the text is not JSON
/// - [`ReplyError::MissingDiscriminator`] if there is no text `op` field
/// - [`ReplyError::UnknownDiscriminator`] for an unrecognized `op`
/// - [`ReplyError::Rejected`] when the ledger refused the request
/// - [`ReplyError::Decode`] naming the first missing or mistyped field
pub fn parse_reply<R: ReplyShape>(response: &str) -> Result<R, ReplyError> {
    let value = serde_json::from_str::<serde_json::Value>(response)
        .map(Value::from)
        .map_err(ReplyError::MalformedResponse)?;

    let op = value
        .get("op")
        .and_then(Value::as_str)
        .ok_or(ReplyError::MissingDiscriminator)?;

    let discriminator = Discriminator::from_op(op)
        .ok_or_else(|| ReplyError::UnknownDiscriminator(op.to_owned()))?;
    debug!("Ledger response discriminator: {:?}", discriminator);

    let reply = Fields::of(&value, "reply")?;
    if discriminator.is_success() {
        R::from_result(reply.required("result")?)
    } else {
        Err(ReplyError::Rejected(ErrorReply::decode(&reply)?))
    }
}

pub fn parse_read_reply(response: &str) -> Result<ReadReply, ReplyError> {
    parse_reply(response)
}

pub fn parse_write_reply(response: &str) -> Result<WriteReply, ReplyError> {
    parse_reply(response)
}
