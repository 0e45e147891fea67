// src/models/claim_def.rs
//! Schema and credential definition payloads.
//!
//! Issuers publish a SCHEMA naming the credential attributes, then a
//! CLAIM_DEF holding the public keys used to verify credentials issued
//! against that schema. These types read both back out of ledger replies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ReplyError, RequestError};
use crate::models::reply::{Fields, ReadReply};
use crate::models::value::Value;

const SCHEMA_MARKER: &str = "2";
const CLAIM_DEF_MARKER: &str = "3";

/// A credential schema as stored on the ledger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SchemaData {
    /// `<issuer>:2:<name>:<version>`, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Ledger sequence number of the SCHEMA transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq_no: Option<u64>,
    pub name: String,
    pub version: String,
    pub attr_names: Vec<String>,
}

impl SchemaData {
    /// Extracts the schema from a GET_SCHEMA reply.
    ///
    /// # Errors
    /// [`ReplyError::Decode`] if `data` lacks `name`, `version` or `attr_names`.
    pub fn from_read_reply(reply: &ReadReply) -> Result<Self, ReplyError> {
        let data = reply.parsed_data();
        let fields = Fields::of(&data, "data")?;
        let name = fields.str("name")?;
        let version = fields.str("version")?;

        Ok(SchemaData {
            id: reply
                .dest
                .as_deref()
                .map(|issuer| schema_id(issuer, &name, &version)),
            seq_no: reply.seq_no,
            attr_names: fields.str_list("attr_names")?,
            name,
            version,
        })
    }
}

/// Formats a schema id from its parts.
pub fn schema_id(issuer_did: &str, name: &str, version: &str) -> String {
    format!("{issuer_did}:{SCHEMA_MARKER}:{name}:{version}")
}

/// Splits `<issuer>:2:<name>:<version>` into issuer, name and version.
pub fn parse_schema_id(id: &str) -> Result<(String, String, String), RequestError> {
    match id.split(':').collect::<Vec<_>>()[..] {
        [issuer, SCHEMA_MARKER, name, version]
            if !issuer.is_empty() && !name.is_empty() && !version.is_empty() =>
        {
            Ok((issuer.to_owned(), name.to_owned(), version.to_owned()))
        }
        _ => Err(RequestError::MalformedId(id.to_owned())),
    }
}

/// The parts of a credential definition id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimDefId {
    pub origin: String,
    /// Usually `CL`.
    pub signature_type: String,
    /// Sequence number of the schema the definition is built on.
    pub schema_ref: u32,
    pub tag: String,
}

/// Splits `<origin>:3:<signature type>:<schema seq no>:<tag>`.
///
/// # Errors
/// [`RequestError::MalformedId`] if a part is missing or empty, the marker is
/// not `3`, or the schema reference is not a number.
pub fn parse_claim_def_id(id: &str) -> Result<ClaimDefId, RequestError> {
    match id.split(':').collect::<Vec<_>>()[..] {
        [origin, CLAIM_DEF_MARKER, signature_type, schema_ref, tag]
            if !origin.is_empty() && !signature_type.is_empty() && !tag.is_empty() =>
        {
            let schema_ref = schema_ref
                .parse()
                .map_err(|_| RequestError::MalformedId(id.to_owned()))?;
            Ok(ClaimDefId {
                origin: origin.to_owned(),
                signature_type: signature_type.to_owned(),
                schema_ref,
                tag: tag.to_owned(),
            })
        }
        _ => Err(RequestError::MalformedId(id.to_owned())),
    }
}

/// Public keys of a credential definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClaimDefData {
    /// Primary CL public key.
    pub primary: HashMap<String, Value>,
    /// Revocation public key, for definitions that support revocation.
    pub revocation: Option<HashMap<String, Value>>,
}

impl ClaimDefData {
    /// Extracts the keys from a GET_CLAIM_DEF reply.
    ///
    /// `data.primary` must be a mapping; `data.revocation` is taken only when
    /// it is one.
    pub fn from_read_reply(reply: &ReadReply) -> Result<Self, ReplyError> {
        let data = reply.parsed_data();
        let fields = Fields::of(&data, "data")?;

        Ok(ClaimDefData {
            primary: fields.mapping("primary")?,
            revocation: data.get("revocation").and_then(Value::as_mapping).cloned(),
        })
    }

    /// Primary key as JSON text.
    pub fn primary_key_json(&self) -> String {
        Value::Mapping(self.primary.clone()).to_json_string()
    }

    /// Revocation key as JSON text, `null` when there is none.
    pub fn revocation_key_json(&self) -> String {
        self.revocation
            .as_ref()
            .map_or(Value::Null, |key| Value::Mapping(key.clone()))
            .to_json_string()
    }

    /// Keys as JSON, ready for [`crate::services::request_builder::build_claim_def`].
    pub fn to_json(&self) -> (serde_json::Value, Option<serde_json::Value>) {
        (
            Value::Mapping(self.primary.clone()).into(),
            self.revocation.clone().map(|key| Value::Mapping(key).into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reply_parser::parse_read_reply;

    fn claim_def_reply(data: &str) -> ReadReply {
        parse_read_reply(&format!(
            r#"{{"op": "REPLY", "result": {{"type": "108", "reqId": 1, "seqNo": 20, "txnTime": 1, "origin": "Origin", "ref": 15, "signature_type": "CL", "tag": "default", "data": {data}}}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_claim_def_from_reply() {
        let reply = claim_def_reply(r#"{"primary": {"n": "779", "s": "750"}, "revocation": {"g": "1 2"}}"#);
        assert_eq!(reply.reference, Some(15));

        let claim_def = ClaimDefData::from_read_reply(&reply).unwrap();
        assert_eq!(claim_def.primary.get("n").and_then(Value::as_str), Some("779"));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&claim_def.primary_key_json()).unwrap(),
            serde_json::json!({"n": "779", "s": "750"})
        );
        assert_eq!(claim_def.revocation_key_json(), r#"{"g":"1 2"}"#);
    }

    #[test]
    fn test_claim_def_without_revocation() {
        let reply = claim_def_reply(r#"{"primary": {"n": "1"}, "revocation": "none"}"#);
        let claim_def = ClaimDefData::from_read_reply(&reply).unwrap();
        assert!(claim_def.revocation.is_none());
        assert_eq!(claim_def.revocation_key_json(), "null");

        let (primary, revocation) = claim_def.to_json();
        assert_eq!(primary, serde_json::json!({"n": "1"}));
        assert!(revocation.is_none());
    }

    #[test]
    fn test_claim_def_bad_primary() {
        let reply = claim_def_reply(r#"{"primary": "nope"}"#);
        match ClaimDefData::from_read_reply(&reply) {
            Err(ReplyError::Decode { field, .. }) => assert_eq!(field, "data.primary"),
            other => panic!("expected decode error, got {other:?}"),
        }

        let reply = claim_def_reply("null");
        assert!(ClaimDefData::from_read_reply(&reply).is_err());
    }

    #[test]
    fn test_schema_from_reply() {
        let reply = parse_read_reply(
            r#"{"op": "REPLY", "result": {"type": "107", "reqId": 1, "seqNo": 14, "txnTime": 1, "dest": "Issuer",
                "data": {"name": "gvt", "version": "1.0", "attr_names": ["age", "name"]}}}"#,
        )
        .unwrap();

        let schema = SchemaData::from_read_reply(&reply).unwrap();
        assert_eq!(schema.id.as_deref(), Some("Issuer:2:gvt:1.0"));
        assert_eq!(schema.seq_no, Some(14));
        assert_eq!(schema.attr_names, vec!["age", "name"]);
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(
            parse_schema_id("Issuer:2:gvt:1.0").unwrap(),
            ("Issuer".to_owned(), "gvt".to_owned(), "1.0".to_owned())
        );
        assert!(parse_schema_id("Issuer:3:gvt:1.0").is_err());
        assert!(parse_schema_id("Issuer:2:gvt").is_err());

        assert_eq!(
            parse_claim_def_id("Origin:3:CL:15:default").unwrap(),
            ClaimDefId {
                origin: "Origin".to_owned(),
                signature_type: "CL".to_owned(),
                schema_ref: 15,
                tag: "default".to_owned(),
            }
        );

        let tagged = parse_claim_def_id("Origin:3:CL:15:mytag").unwrap();
        assert_eq!(tagged.tag, "mytag");
        assert_eq!(tagged.signature_type, "CL");
        assert!(parse_claim_def_id("Origin:3:CL:15:").is_err());
        assert!(matches!(
            parse_claim_def_id("Origin:3:CL:x:default"),
            Err(RequestError::MalformedId(_))
        ));
    }
}
