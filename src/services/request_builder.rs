// src/services/request_builder.rs
//! Builders for ledger requests.
//!
//! Each builder shapes the `operation` payload for one transaction type and
//! wraps it in a [`Request`] with protocol version 2 and a fresh request id.
//! Write requests still need a signature; see
//! [`crate::wallet::key_management::sign_request`].

use serde_json::{json, Map, Value as JsonValue};

use crate::error::RequestError;
use crate::models::request::{txn_type, LedgerType, Request, DEFAULT_REQUEST_DID};
use crate::utils::crypto::hash_hex;

/// Credential definition signature type.
pub const CL_SIGNATURE_TYPE: &str = "CL";
/// Tag used for credential definitions written by this client.
pub const DEFAULT_CLAIM_DEF_TAG: &str = "default";

/// Actions that AUTH_RULE lookups can be narrowed to.
pub mod auth_action {
    pub const ADD: &str = "ADD";
    pub const EDIT: &str = "EDIT";
}

/// GET_NYM for `did`.
pub fn build_get_nym(did: &str, from: Option<&str>) -> Request {
    Request::new(json!({"type": txn_type::GET_NYM, "dest": did}), from)
}

/// NYM creating or updating `did`. Empty `verkey` and `role` are left out.
pub fn build_nym(did: &str, verkey: &str, from: &str, role: &str) -> Request {
    let mut operation = operation(txn_type::NYM);
    operation.insert("dest".into(), did.into());
    insert_non_empty(&mut operation, "verkey", verkey);
    insert_non_empty(&mut operation, "role", role);
    Request::new(JsonValue::Object(operation), Some(from))
}

/// GET_ATTR reading the raw attribute named `raw`.
pub fn build_get_attrib_raw(did: &str, raw: &str, from: Option<&str>) -> Request {
    get_attrib(did, "raw", raw.to_owned(), from)
}

/// GET_ATTR reading the hashed attribute whose content is `data`.
pub fn build_get_attrib_hash(did: &str, data: &str, from: Option<&str>) -> Request {
    get_attrib(did, "hash", hash_hex(data.as_bytes()), from)
}

/// GET_ATTR reading the encrypted attribute `enc`.
pub fn build_get_attrib_enc(did: &str, enc: &str, from: Option<&str>) -> Request {
    get_attrib(did, "enc", enc.to_owned(), from)
}

fn get_attrib(did: &str, field: &str, value: String, from: Option<&str>) -> Request {
    let mut operation = operation(txn_type::GET_ATTR);
    operation.insert("dest".into(), did.into());
    operation.insert(field.into(), value.into());
    Request::new(JsonValue::Object(operation), from)
}

/// ATTRIB storing `data` as the JSON text of the `raw` field.
///
/// # Arguments
/// * `did` - Target DID
/// * `from` - Submitter DID
/// * `data` - Attribute content, e.g. `{"endpoint": {"endpoint": "..."}}`
pub fn build_attrib_raw(did: &str, from: &str, data: &JsonValue) -> Request {
    attrib(did, from, "raw", data.to_string())
}

/// ATTRIB storing only the SHA-256 of `data`.
pub fn build_attrib_hash(did: &str, from: &str, data: &str) -> Request {
    attrib(did, from, "hash", hash_hex(data.as_bytes()))
}

/// ATTRIB storing `data` as already-encrypted content.
pub fn build_attrib_enc(did: &str, from: &str, data: &str) -> Request {
    attrib(did, from, "enc", data.to_owned())
}

fn attrib(did: &str, from: &str, field: &str, value: String) -> Request {
    let mut operation = operation(txn_type::ATTRIB);
    operation.insert("dest".into(), did.into());
    operation.insert(field.into(), value.into());
    Request::new(JsonValue::Object(operation), Some(from))
}

pub fn build_schema(
    issuer_did: &str,
    name: &str,
    version: &str,
    from: &str,
    attr_names: &[String],
) -> Request {
    Request::new(
        json!({
            "type": txn_type::SCHEMA,
            "dest": issuer_did,
            "data": {
                "name": name,
                "version": version,
                "attr_names": attr_names,
            },
        }),
        Some(from),
    )
}

pub fn build_get_schema(issuer_did: &str, name: &str, version: &str, from: Option<&str>) -> Request {
    Request::new(
        json!({
            "type": txn_type::GET_SCHEMA,
            "dest": issuer_did,
            "data": {"name": name, "version": version},
        }),
        from,
    )
}

/// CLAIM_DEF for the schema with sequence number `schema_ref`.
///
/// `revocation` is omitted from the payload when absent.
pub fn build_claim_def(
    from: &str,
    schema_ref: u32,
    primary: &JsonValue,
    revocation: Option<&JsonValue>,
) -> Request {
    let mut data = Map::new();
    data.insert("primary".into(), primary.clone());
    if let Some(revocation) = revocation {
        data.insert("revocation".into(), revocation.clone());
    }

    Request::new(
        json!({
            "type": txn_type::CLAIM_DEF,
            "signature_type": CL_SIGNATURE_TYPE,
            "ref": schema_ref,
            "tag": DEFAULT_CLAIM_DEF_TAG,
            "data": data,
        }),
        Some(from),
    )
}

/// GET_CLAIM_DEF for one credential definition. Sent without an identifier.
///
/// # Arguments
/// * `origin` - DID of the issuer that wrote the definition
/// * `schema_ref` - Sequence number of the schema
/// * `signature_type` - Signature type of the definition, e.g. [`CL_SIGNATURE_TYPE`]
/// * `tag` - Definition tag; definitions with other tags are different ledger objects
pub fn build_get_claim_def(
    origin: &str,
    schema_ref: u32,
    signature_type: &str,
    tag: &str,
) -> Request {
    Request::new(
        json!({
            "type": txn_type::GET_CLAIM_DEF,
            "origin": origin,
            "signature_type": signature_type,
            "ref": schema_ref,
            "tag": tag,
        }),
        None,
    )
}

/// GET_TXN for transaction `seq_no` on `ledger`.
///
/// # Errors
/// [`RequestError::InvalidSeqNo`] unless `seq_no > 0`.
pub fn build_get_txn(
    ledger: LedgerType,
    seq_no: i64,
    from: Option<&str>,
) -> Result<Request, RequestError> {
    if seq_no <= 0 {
        return Err(RequestError::InvalidSeqNo(seq_no));
    }

    Ok(Request::new(
        json!({
            "type": txn_type::GET_TXN,
            "data": seq_no,
            "ledgerId": ledger.id(),
        }),
        from,
    ))
}

/// GET_AUTH_RULE listing every rule on the ledger.
pub fn build_get_auth_rules() -> Request {
    Request::new(JsonValue::Object(operation(txn_type::GET_AUTH_RULE)), Some(DEFAULT_REQUEST_DID))
}

/// GET_AUTH_RULE narrowed to one transaction type, action and field.
///
/// Actions other than [`auth_action::ADD`] and [`auth_action::EDIT`]
/// fall back to listing every rule.
pub fn build_get_auth_rule(auth_type: &str, action: &str, field: &str) -> Request {
    let mut operation = operation(txn_type::GET_AUTH_RULE);

    match action {
        auth_action::ADD | auth_action::EDIT => {
            insert_non_empty(&mut operation, "auth_action", action);
            insert_non_empty(&mut operation, "auth_type", auth_type);
            insert_non_empty(&mut operation, "field", field);
            operation.insert("new_value".into(), "".into());
            if action == auth_action::EDIT {
                operation.insert("old_value".into(), "".into());
            }
        }
        _ => return build_get_auth_rules(),
    }

    Request::new(JsonValue::Object(operation), Some(DEFAULT_REQUEST_DID))
}

/// GET_TXN_AUTHR_AGRMT for the latest Transaction Author Agreement.
pub fn build_get_txn_author_agreement() -> Request {
    Request::new(
        JsonValue::Object(operation(txn_type::GET_TXN_AUTHR_AGRMT)),
        Some(DEFAULT_REQUEST_DID),
    )
}

/// GET_TXN_AUTHR_AGRMT_AML for the current acceptance mechanism list.
pub fn build_get_acceptance_mechanisms() -> Request {
    Request::new(
        JsonValue::Object(operation(txn_type::GET_TXN_AUTHR_AGRMT_AML)),
        Some(DEFAULT_REQUEST_DID),
    )
}

/// Parses a caller-supplied request. Missing `reqId` and `protocolVersion`
/// are filled in.
pub fn build_custom(request_json: &str) -> Result<Request, RequestError> {
    let request: Request = serde_json::from_str(request_json)?;
    if request.operation_type().is_none() {
        return Err(RequestError::MissingOperation);
    }
    Ok(request)
}

fn operation(txn_type: &str) -> Map<String, JsonValue> {
    let mut operation = Map::new();
    operation.insert("type".into(), txn_type.into());
    operation
}

fn insert_non_empty(operation: &mut Map<String, JsonValue>, key: &str, value: &str) {
    if !value.is_empty() {
        operation.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::{role, PROTOCOL_VERSION};

    #[test]
    fn test_get_nym() {
        let request = build_get_nym("WvRwKqxFLtJ3YbhmHZBpmy", None);
        assert_eq!(request.operation, json!({"type": "105", "dest": "WvRwKqxFLtJ3YbhmHZBpmy"}));
        assert_eq!(request.identifier, None);
        assert_eq!(request.protocol_version, PROTOCOL_VERSION);
    }

    #[test]
    fn test_nym_omits_empty_fields() {
        let request = build_nym("D", "", "F", role::NO_ROLE);
        assert_eq!(request.operation, json!({"type": "1", "dest": "D"}));
        assert_eq!(request.identifier.as_deref(), Some("F"));

        let request = build_nym("D", "~V", "F", role::ENDORSER);
        assert_eq!(
            request.operation,
            json!({"type": "1", "dest": "D", "verkey": "~V", "role": "101"})
        );
    }

    #[test]
    fn test_get_attrib_variants() {
        let raw = build_get_attrib_raw("D", "endpoint", Some("D"));
        assert_eq!(raw.operation, json!({"type": "104", "dest": "D", "raw": "endpoint"}));
        assert_eq!(raw.identifier.as_deref(), Some("D"));

        let hash = build_get_attrib_hash("D", "hello", None);
        assert_eq!(
            hash.operation["hash"],
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );

        let enc = build_get_attrib_enc("D", "ciphertext", None);
        assert_eq!(enc.operation["enc"], "ciphertext");
    }

    #[test]
    fn test_attrib_raw_is_json_text() {
        let data = json!({"endpoint": {"endpoint": "http://127.0.0.1:8080"}});
        let request = build_attrib_raw("D", "F", &data);

        assert_eq!(request.operation["type"], "100");
        let raw = request.operation["raw"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<JsonValue>(raw).unwrap(), data);
    }

    #[test]
    fn test_attrib_hash_and_enc() {
        let hash = build_attrib_hash("D", "F", "hello");
        assert_eq!(
            hash.operation["hash"],
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        let enc = build_attrib_enc("D", "F", "opaque");
        assert_eq!(enc.operation["enc"], "opaque");
        assert!(enc.operation.get("raw").is_none());
    }

    #[test]
    fn test_schema_requests() {
        let attrs = vec!["name".to_owned(), "age".to_owned()];
        let request = build_schema("Issuer", "gvt", "1.0", "F", &attrs);
        assert_eq!(
            request.operation,
            json!({"type": "101", "dest": "Issuer", "data": {"name": "gvt", "version": "1.0", "attr_names": ["name", "age"]}})
        );

        let get = build_get_schema("Issuer", "gvt", "1.0", None);
        assert_eq!(
            get.operation,
            json!({"type": "107", "dest": "Issuer", "data": {"name": "gvt", "version": "1.0"}})
        );
    }

    #[test]
    fn test_claim_def_requests() {
        let primary = json!({"n": "1", "s": "2"});
        let request = build_claim_def("F", 15, &primary, None);
        assert_eq!(
            request.operation,
            json!({"type": "102", "signature_type": "CL", "ref": 15, "tag": "default", "data": {"primary": {"n": "1", "s": "2"}}})
        );

        let revocation = json!({"g": "3"});
        let with_revocation = build_claim_def("F", 15, &primary, Some(&revocation));
        assert_eq!(with_revocation.operation["data"]["revocation"], revocation);

        let get = build_get_claim_def("Origin", 15, CL_SIGNATURE_TYPE, DEFAULT_CLAIM_DEF_TAG);
        assert_eq!(
            get.operation,
            json!({"type": "108", "origin": "Origin", "signature_type": "CL", "ref": 15, "tag": "default"})
        );
        assert_eq!(get.identifier, None);

        let tagged = build_get_claim_def("Origin", 15, CL_SIGNATURE_TYPE, "mytag");
        assert_eq!(tagged.operation["tag"], "mytag");
    }

    #[test]
    fn test_get_txn() {
        let request = build_get_txn(LedgerType::Domain, 12, None).unwrap();
        assert_eq!(request.operation, json!({"type": "3", "data": 12, "ledgerId": 1}));

        assert!(matches!(
            build_get_txn(LedgerType::Pool, 0, None),
            Err(RequestError::InvalidSeqNo(0))
        ));
        assert!(matches!(
            build_get_txn(LedgerType::Pool, -4, None),
            Err(RequestError::InvalidSeqNo(-4))
        ));
    }

    #[test]
    fn test_auth_rule_requests() {
        let all = build_get_auth_rules();
        assert_eq!(all.operation, json!({"type": "121"}));
        assert_eq!(all.identifier.as_deref(), Some(DEFAULT_REQUEST_DID));

        let add = build_get_auth_rule("1", auth_action::ADD, "role");
        assert_eq!(
            add.operation,
            json!({"type": "121", "auth_type": "1", "auth_action": "ADD", "field": "role", "new_value": ""})
        );

        let edit = build_get_auth_rule("1", auth_action::EDIT, "role");
        assert_eq!(edit.operation["old_value"], "");
        assert_eq!(edit.operation["auth_action"], "EDIT");

        let fallback = build_get_auth_rule("1", "", "role");
        assert_eq!(fallback.operation, json!({"type": "121"}));
    }

    #[test]
    fn test_taa_reads() {
        assert_eq!(build_get_txn_author_agreement().operation, json!({"type": "6"}));
        assert_eq!(build_get_acceptance_mechanisms().operation, json!({"type": "7"}));
    }

    #[test]
    fn test_build_custom() {
        let request =
            build_custom(r#"{"operation": {"type": "105", "dest": "D"}, "identifier": "X", "reqId": 99}"#)
                .unwrap();
        assert_eq!(request.req_id, 99);
        assert_eq!(request.identifier.as_deref(), Some("X"));

        assert!(matches!(
            build_custom(r#"{"operation": {"dest": "D"}}"#),
            Err(RequestError::MissingOperation)
        ));
        assert!(matches!(build_custom("{"), Err(RequestError::Json(_))));
    }

    #[test]
    fn test_request_ids_are_fresh() {
        let ids: std::collections::HashSet<u64> =
            (0..32).map(|_| build_get_nym("D", None).req_id).collect();
        assert!(ids.len() > 1);
    }
}
