// src/models/reply.rs
//! Typed ledger replies.
//!
//! Each record is decoded field by field from the reply's value tree.
//! Unknown fields are ignored; a missing or mistyped required field fails
//! with [`ReplyError::Decode`] naming the field.

use std::collections::HashMap;

use thiserror::Error;

use crate::error::ReplyError;
use crate::models::value::Value;

/// Result of a read request (GET_NYM, GET_ATTR, GET_SCHEMA, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct ReadReply {
    pub txn_type: String,
    pub identifier: Option<String>,
    pub req_id: u64,
    /// `None` when the ledger has no matching transaction.
    pub seq_no: Option<u64>,
    pub txn_time: Option<u64>,
    pub state_proof: Option<StateProof>,
    pub data: Value,
    pub signature_type: Option<String>,
    pub origin: Option<String>,
    pub dest: Option<String>,
    pub reference: Option<u64>,
    pub tag: Option<String>,
}

impl ReadReply {
    /// Ledgers return most `data` payloads as JSON encoded in a string.
    /// This decodes such a string, or returns the value as is.
    pub fn parsed_data(&self) -> Value {
        match &self.data {
            Value::Text(text) => Value::parse(text).unwrap_or_else(|_| self.data.clone()),
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateProof {
    pub root_hash: String,
    pub proof_nodes: String,
    pub multi_signature: Option<MultiSignature>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiSignature {
    pub value: MultiSignatureValue,
    pub signature: String,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiSignatureValue {
    pub timestamp: u64,
    pub ledger_id: u64,
    pub txn_root_hash: String,
    pub pool_state_root_hash: String,
    pub state_root_hash: String,
}

/// Result of a write request.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReply {
    pub ver: String,
    pub txn: WriteTxn,
    pub txn_metadata: TxnMetadata,
    pub req_signature: Option<ReqSignature>,
    pub root_hash: String,
    pub audit_path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteTxn {
    pub txn_type: String,
    pub protocol_version: u64,
    pub data: HashMap<String, Value>,
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxnMetadata {
    pub txn_time: u64,
    pub seq_no: u64,
    pub txn_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReqSignature {
    pub sig_type: Option<String>,
    pub values: Vec<ReqSignatureValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReqSignatureValue {
    pub from: String,
    pub value: String,
}

/// A REQNACK or REJECT from the ledger. Displays as the ledger's reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ErrorReply {
    pub op: String,
    pub reason: String,
}

/// Field accessor over one mapping of a reply. `path` prefixes field names
/// in errors, e.g. `result.txnMetadata.seqNo`.
pub(crate) struct Fields<'a> {
    map: &'a HashMap<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(value: &'a Value, path: &str) -> Result<Self, ReplyError> {
        let map = value
            .as_mapping()
            .ok_or_else(|| ReplyError::decode(path, format!("expected mapping, got {}", value.kind())))?;
        Ok(Fields {
            map,
            path: path.to_owned(),
        })
    }

    fn field(&self, name: &str) -> String {
        format!("{}.{}", self.path, name)
    }

    fn mismatch(&self, name: &str, expected: &str, got: &Value) -> ReplyError {
        ReplyError::decode(self.field(name), format!("expected {expected}, got {}", got.kind()))
    }

    /// Present, possibly null.
    pub(crate) fn required(&self, name: &str) -> Result<&'a Value, ReplyError> {
        self.map
            .get(name)
            .ok_or_else(|| ReplyError::decode(self.field(name), "missing required field"))
    }

    /// Absent and null are both `None`.
    fn optional(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name).filter(|v| !v.is_null())
    }

    pub(crate) fn nested(&self, name: &str) -> Result<Fields<'a>, ReplyError> {
        Fields::of(self.required(name)?, &self.field(name))
    }

    fn optional_nested(&self, name: &str) -> Result<Option<Fields<'a>>, ReplyError> {
        self.optional(name)
            .map(|v| Fields::of(v, &self.field(name)))
            .transpose()
    }

    pub(crate) fn str(&self, name: &str) -> Result<String, ReplyError> {
        let value = self.required(name)?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.mismatch(name, "text", value))
    }

    fn opt_str(&self, name: &str) -> Result<Option<String>, ReplyError> {
        self.optional(name)
            .map(|v| v.as_str().map(str::to_owned).ok_or_else(|| self.mismatch(name, "text", v)))
            .transpose()
    }

    fn u64(&self, name: &str) -> Result<u64, ReplyError> {
        let value = self.required(name)?;
        value.as_u64().ok_or_else(|| self.mismatch(name, "unsigned integer", value))
    }

    pub(crate) fn opt_u64(&self, name: &str) -> Result<Option<u64>, ReplyError> {
        self.optional(name)
            .map(|v| v.as_u64().ok_or_else(|| self.mismatch(name, "unsigned integer", v)))
            .transpose()
    }

    /// Must be present; null maps to `None`.
    fn nullable_u64(&self, name: &str) -> Result<Option<u64>, ReplyError> {
        self.required(name)?;
        self.opt_u64(name)
    }

    pub(crate) fn mapping(&self, name: &str) -> Result<HashMap<String, Value>, ReplyError> {
        let value = self.required(name)?;
        value
            .as_mapping()
            .cloned()
            .ok_or_else(|| self.mismatch(name, "mapping", value))
    }

    pub(crate) fn str_list(&self, name: &str) -> Result<Vec<String>, ReplyError> {
        let value = self.required(name)?;
        let items = value
            .as_sequence()
            .ok_or_else(|| self.mismatch(name, "sequence", value))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| self.mismatch(name, "sequence of text", item))
            })
            .collect()
    }
}

impl ReadReply {
    pub(crate) fn decode(result: &Fields<'_>) -> Result<Self, ReplyError> {
        Ok(ReadReply {
            txn_type: result.str("type")?,
            identifier: result.opt_str("identifier")?,
            req_id: result.u64("reqId")?,
            seq_no: result.nullable_u64("seqNo")?,
            txn_time: result.nullable_u64("txnTime")?,
            state_proof: result
                .optional_nested("state_proof")?
                .map(|fields| StateProof::decode(&fields))
                .transpose()?,
            data: result.required("data")?.clone(),
            signature_type: result.opt_str("signature_type")?,
            origin: result.opt_str("origin")?,
            dest: result.opt_str("dest")?,
            reference: result.opt_u64("ref")?,
            tag: result.opt_str("tag")?,
        })
    }
}

impl StateProof {
    fn decode(fields: &Fields<'_>) -> Result<Self, ReplyError> {
        Ok(StateProof {
            root_hash: fields.str("root_hash")?,
            proof_nodes: fields.str("proof_nodes")?,
            multi_signature: fields
                .optional_nested("multi_signature")?
                .map(|sig| MultiSignature::decode(&sig))
                .transpose()?,
        })
    }
}

impl MultiSignature {
    fn decode(fields: &Fields<'_>) -> Result<Self, ReplyError> {
        let value = fields.nested("value")?;
        Ok(MultiSignature {
            value: MultiSignatureValue {
                timestamp: value.u64("timestamp")?,
                ledger_id: value.u64("ledger_id")?,
                txn_root_hash: value.str("txn_root_hash")?,
                pool_state_root_hash: value.str("pool_state_root_hash")?,
                state_root_hash: value.str("state_root_hash")?,
            },
            signature: fields.str("signature")?,
            participants: fields.str_list("participants")?,
        })
    }
}

impl WriteReply {
    pub(crate) fn decode(result: &Fields<'_>) -> Result<Self, ReplyError> {
        let txn = result.nested("txn")?;
        let metadata = result.nested("txnMetadata")?;

        Ok(WriteReply {
            ver: result.str("ver")?,
            txn: WriteTxn {
                txn_type: txn.str("type")?,
                protocol_version: txn.u64("protocolVersion")?,
                data: txn.mapping("data")?,
                metadata: txn.mapping("metadata")?,
            },
            txn_metadata: TxnMetadata {
                txn_time: metadata.u64("txnTime")?,
                seq_no: metadata.u64("seqNo")?,
                txn_id: metadata.opt_str("txnId")?,
            },
            req_signature: result
                .optional_nested("reqSignature")?
                .map(|sig| ReqSignature::decode(&sig))
                .transpose()?,
            root_hash: result.str("rootHash")?,
            audit_path: result.str_list("auditPath")?,
        })
    }
}

impl ReqSignature {
    fn decode(fields: &Fields<'_>) -> Result<Self, ReplyError> {
        let values = match fields.optional("values") {
            None => Vec::new(),
            Some(Value::Sequence(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let entry = Fields::of(item, &format!("{}.values[{i}]", fields.path))?;
                    Ok(ReqSignatureValue {
                        from: entry.str("from")?,
                        value: entry.str("value")?,
                    })
                })
                .collect::<Result<_, ReplyError>>()?,
            Some(other) => return Err(fields.mismatch("values", "sequence", other)),
        };

        Ok(ReqSignature {
            sig_type: fields.opt_str("type")?,
            values,
        })
    }
}

impl ErrorReply {
    pub(crate) fn decode(reply: &Fields<'_>) -> Result<Self, ReplyError> {
        Ok(ErrorReply {
            op: reply.str("op")?,
            reason: reply.str("reason")?,
        })
    }
}
