// src/models/request.rs
//! Ledger request envelope and the wire constants request builders share.

use serde::{Deserialize, Serialize};

use crate::error::SerializeError;
use crate::models::value::Value;
use crate::utils::serialization::serialize_for_signing;

/// Protocol version stamped on every request.
pub const PROTOCOL_VERSION: u32 = 2;

/// Identifier used for reads that have no natural submitter.
pub const DEFAULT_REQUEST_DID: &str = "LibindyDid111111111111";

/// Transaction type codes.
pub mod txn_type {
    pub const NODE: &str = "0";
    pub const NYM: &str = "1";
    pub const GET_TXN: &str = "3";
    pub const GET_TXN_AUTHR_AGRMT: &str = "6";
    pub const GET_TXN_AUTHR_AGRMT_AML: &str = "7";
    pub const ATTRIB: &str = "100";
    pub const SCHEMA: &str = "101";
    pub const CLAIM_DEF: &str = "102";
    pub const GET_ATTR: &str = "104";
    pub const GET_NYM: &str = "105";
    pub const GET_SCHEMA: &str = "107";
    pub const GET_CLAIM_DEF: &str = "108";
    pub const POOL_UPGRADE: &str = "109";
    pub const NODE_UPGRADE: &str = "110";
    pub const POOL_CONFIG: &str = "111";
    pub const GET_AUTH_RULE: &str = "121";
}

/// Role codes carried by NYM transactions.
pub mod role {
    /// Common user
    pub const NO_ROLE: &str = "";
    pub const TRUSTEE: &str = "0";
    pub const STEWARD: &str = "2";
    pub const ENDORSER: &str = "101";
    pub const NETWORK_MONITOR: &str = "201";
}

/// Sub-ledgers addressable by GET_TXN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerType {
    Pool = 0,
    Domain = 1,
    Config = 2,
}

impl LedgerType {
    pub fn id(self) -> i32 {
        self as i32
    }
}

/// Transaction Author Agreement acceptance attached to writes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TaaAcceptance {
    #[serde(rename = "taaDigest")]
    pub digest: String,
    pub mechanism: String,
    /// Acceptance time in seconds, truncated to the start of its day.
    pub time: u64,
}

impl TaaAcceptance {
    const SEC_IN_DAY: u64 = 86400;

    pub fn new(digest: &str, mechanism: &str, time: u64) -> Self {
        TaaAcceptance {
            digest: digest.to_owned(),
            mechanism: mechanism.to_owned(),
            time: time / Self::SEC_IN_DAY * Self::SEC_IN_DAY,
        }
    }
}

/// A ledger request.
///
/// `operation` holds the transaction-specific payload and must carry a
/// `type` field with one of the [`txn_type`] codes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub operation: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endorser: Option<String>,
    #[serde(default = "new_request_id")]
    pub req_id: u64,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taa_acceptance: Option<TaaAcceptance>,
}

/// A fresh random 32-bit request id.
pub fn new_request_id() -> u64 {
    u64::from(rand::random::<u32>())
}

fn default_protocol_version() -> u32 {
    PROTOCOL_VERSION
}

impl Request {
    /// Wraps `operation` in an unsigned request.
    ///
    /// # Arguments
    /// * `operation` - Transaction payload; must carry a `type` code
    /// * `identifier` - Submitter DID, `None` for reads sent anonymously
    ///
    /// # Returns
    /// A request with protocol version 2 and a fresh random `reqId`.
    ///
    /// # Example
    /// ```
    /// use did_ledger_client::Request;
    /// use serde_json::json;
    ///
    /// let request = Request::new(json!({"type": "105", "dest": "D"}), None);
    /// assert_eq!(request.operation_type(), Some("105"));
    /// assert_eq!(request.protocol_version, 2);
    /// assert!(request.identifier.is_none());
    /// ```
    pub fn new(operation: serde_json::Value, identifier: Option<&str>) -> Self {
        Request {
            operation,
            identifier: identifier.map(str::to_owned),
            endorser: None,
            req_id: new_request_id(),
            protocol_version: PROTOCOL_VERSION,
            signature: None,
            taa_acceptance: None,
        }
    }

    /// The `operation.type` code, if present and text.
    pub fn operation_type(&self) -> Option<&str> {
        self.operation.get("type").and_then(serde_json::Value::as_str)
    }

    /// Names the endorser DID that will countersign this request.
    pub fn with_endorser(mut self, endorser: &str) -> Self {
        self.endorser = Some(endorser.to_owned());
        self
    }

    /// Attaches a Transaction Author Agreement acceptance. `time` is
    /// truncated to the start of its UTC day.
    pub fn with_taa_acceptance(mut self, digest: &str, mechanism: &str, time: u64) -> Self {
        self.taa_acceptance = Some(TaaAcceptance::new(digest, mechanism, time));
        self
    }

    /// The exact string a signer must sign for this request.
    pub fn signature_input(&self) -> Result<String, SerializeError> {
        let projection = Value::from_serialize(self)?;
        serialize_for_signing(&projection)
    }

    /// Wire form of the request, as sent to the ledger.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_field_names() {
        let request = Request::new(json!({"type": txn_type::GET_NYM, "dest": "D"}), Some("X"))
            .with_endorser("E")
            .with_taa_acceptance("abc", "on_file", 1_600_000_123);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["operation"]["type"], "105");
        assert_eq!(json["identifier"], "X");
        assert_eq!(json["endorser"], "E");
        assert_eq!(json["protocolVersion"], 2);
        assert_eq!(json["reqId"], request.req_id);
        assert_eq!(json["taaAcceptance"]["taaDigest"], "abc");
        assert_eq!(json["taaAcceptance"]["mechanism"], "on_file");
        assert!(json.get("signature").is_none());
    }

    #[test]
    fn test_taa_time_truncated_to_day() {
        let taa = TaaAcceptance::new("d", "m", 1_600_000_123);
        assert_eq!(taa.time, 1_599_955_200);
        assert_eq!(taa.time % 86400, 0);
    }

    #[test]
    fn test_signature_input_skips_signature() {
        let mut request = Request::new(json!({"type": "1", "dest": "D"}), Some("X"));
        request.req_id = 7;
        let unsigned = request.signature_input().unwrap();
        request.signature = Some("sig".into());

        assert_eq!(request.signature_input().unwrap(), unsigned);
        assert_eq!(unsigned, "identifier:X|operation:dest:D|type:1|protocolVersion:2|reqId:7");
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let request: Request =
            serde_json::from_str(r#"{"operation": {"type": "105", "dest": "D"}}"#).unwrap();
        assert_eq!(request.protocol_version, PROTOCOL_VERSION);
        assert_eq!(request.operation_type(), Some("105"));
        assert!(request.req_id <= u64::from(u32::MAX));
    }

    #[test]
    fn test_ledger_type_ids() {
        assert_eq!(LedgerType::Pool.id(), 0);
        assert_eq!(LedgerType::Domain.id(), 1);
        assert_eq!(LedgerType::Config.id(), 2);
    }
}
