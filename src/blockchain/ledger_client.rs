// src/blockchain/ledger_client.rs
//! Ledger client: submits reads, signs and submits writes.
//!
//! Every submission is its own future. The request body goes through the
//! [`Transport`] under a timeout, and the raw response is classified and
//! decoded by [`crate::services::reply_parser`]. Nothing is shared between
//! in-flight calls, so any number of them may run at once on one client.

use std::time::Duration;

use log::{debug, info};
use serde_json::Value as JsonValue;
use tokio::time::timeout;

use crate::blockchain::transport::{ProxyTransport, Transport};
use crate::error::{LedgerError, ReplyError};
use crate::models::claim_def::{parse_claim_def_id, parse_schema_id};
use crate::models::reply::{ReadReply, WriteReply};
use crate::models::request::{LedgerType, Request, TaaAcceptance};
use crate::services::reply_parser::{parse_read_reply, parse_write_reply};
use crate::services::request_builder as builder;
use crate::utils::config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use crate::wallet::key_management::{sign_request, Signer};

/// Client for one ledger pool, reached through `T`.
///
/// # Example
/// ```no_run
/// # async fn run() -> Result<(), did_ledger_client::error::LedgerError> {
/// use did_ledger_client::blockchain::ledger_client::LedgerClient;
/// use did_ledger_client::utils::config::ClientConfig;
///
/// let client = LedgerClient::from_config(&ClientConfig::default())?;
/// let reply = client.get_nym("WvRwKqxFLtJ3YbhmHZBpmy").await?;
/// println!("{:?}", reply.parsed_data());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LedgerClient<T: Transport> {
    transport: T,
    timeout: Duration,
    /// Attached to every write that does not carry its own acceptance
    taa_acceptance: Option<TaaAcceptance>,
}

impl LedgerClient<ProxyTransport> {
    /// Creates a client for the indy-vdr-proxy named in `config`.
    ///
    /// # Errors
    /// Returns [`LedgerError::Transport`] if the proxy URL is invalid.
    pub fn from_config(config: &ClientConfig) -> Result<Self, LedgerError> {
        let transport = ProxyTransport::new(&config.proxy_url)?;
        info!(
            "Ledger client using proxy {} with {}s timeout",
            transport.base_url(),
            config.timeout_secs
        );

        Ok(LedgerClient::new(transport)
            .with_timeout(config.timeout())
            .with_taa_acceptance(config.taa_acceptance()))
    }
}

impl<T: Transport> LedgerClient<T> {
    pub fn new(transport: T) -> Self {
        LedgerClient {
            transport,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            taa_acceptance: None,
        }
    }

    /// Upper bound on each network round trip.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_taa_acceptance(mut self, taa_acceptance: Option<TaaAcceptance>) -> Self {
        self.taa_acceptance = taa_acceptance;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn round_trip(&self, body: String) -> Result<String, LedgerError> {
        match timeout(self.timeout, self.transport.submit(body)).await {
            Ok(response) => Ok(response?),
            Err(_) => Err(LedgerError::Timeout(self.timeout)),
        }
    }

    /// Submits an unsigned read request.
    ///
    /// # Errors
    /// - [`LedgerError::Timeout`] if the ledger does not answer in time
    /// - [`LedgerError::Transport`] on network failure
    /// - [`LedgerError::Reply`] if the ledger rejected the request or the
    ///   reply could not be decoded
    pub async fn submit_read(&self, request: &Request) -> Result<ReadReply, LedgerError> {
        debug!("Submitting read request {} ({:?})", request.req_id, request.operation_type());
        let response = self.round_trip(request.to_json()?).await?;
        Ok(parse_read_reply(&response)?)
    }

    /// Signs and submits a write request.
    ///
    /// The configured TAA acceptance is attached first unless the request
    /// already carries one, since it is part of the signed content.
    pub async fn submit_write(
        &self,
        mut request: Request,
        signer: &dyn Signer,
    ) -> Result<WriteReply, LedgerError> {
        if request.taa_acceptance.is_none() {
            request.taa_acceptance = self.taa_acceptance.clone();
        }
        sign_request(&mut request, signer)?;

        info!("Submitting write request {} ({:?})", request.req_id, request.operation_type());
        let response = self.round_trip(request.to_json()?).await?;
        Ok(parse_write_reply(&response)?)
    }

    /// Fetches the pool's genesis transactions.
    pub async fn genesis(&self) -> Result<String, LedgerError> {
        match timeout(self.timeout, self.transport.genesis()).await {
            Ok(genesis) => Ok(genesis?),
            Err(_) => Err(LedgerError::Timeout(self.timeout)),
        }
    }

    pub async fn get_nym(&self, did: &str) -> Result<ReadReply, LedgerError> {
        self.submit_read(&builder::build_get_nym(did, None)).await
    }

    /// Reads the raw attribute `raw` of `did`.
    pub async fn get_attrib(&self, did: &str, raw: &str) -> Result<ReadReply, LedgerError> {
        self.submit_read(&builder::build_get_attrib_raw(did, raw, Some(did)))
            .await
    }

    /// Reads the registered endpoint of `did`.
    pub async fn get_endpoint(&self, did: &str) -> Result<ReadReply, LedgerError> {
        self.get_attrib(did, "endpoint").await
    }

    /// Reads a schema by its `<issuer>:2:<name>:<version>` id.
    pub async fn get_schema(&self, schema_id: &str) -> Result<ReadReply, LedgerError> {
        let (issuer, name, version) = parse_schema_id(schema_id)?;
        self.submit_read(&builder::build_get_schema(&issuer, &name, &version, None))
            .await
    }

    /// Reads a credential definition by its `<origin>:3:<signature type>:<ref>:<tag>` id.
    pub async fn get_claim_def(&self, claim_def_id: &str) -> Result<ReadReply, LedgerError> {
        let id = parse_claim_def_id(claim_def_id)?;
        let request =
            builder::build_get_claim_def(&id.origin, id.schema_ref, &id.signature_type, &id.tag);
        self.submit_read(&request).await
    }

    pub async fn get_auth_rules(&self) -> Result<ReadReply, LedgerError> {
        self.submit_read(&builder::build_get_auth_rules()).await
    }

    pub async fn get_txn_type_auth_rule(
        &self,
        auth_type: &str,
        action: &str,
        field: &str,
    ) -> Result<ReadReply, LedgerError> {
        self.submit_read(&builder::build_get_auth_rule(auth_type, action, field))
            .await
    }

    pub async fn get_txn(&self, ledger: LedgerType, seq_no: i64) -> Result<ReadReply, LedgerError> {
        self.submit_read(&builder::build_get_txn(ledger, seq_no, None)?)
            .await
    }

    pub async fn get_txn_author_agreement(&self) -> Result<ReadReply, LedgerError> {
        self.submit_read(&builder::build_get_txn_author_agreement())
            .await
    }

    pub async fn get_acceptance_methods(&self) -> Result<ReadReply, LedgerError> {
        self.submit_read(&builder::build_get_acceptance_mechanisms())
            .await
    }

    pub async fn create_nym(
        &self,
        did: &str,
        verkey: &str,
        role: &str,
        from: &str,
        signer: &dyn Signer,
    ) -> Result<(), LedgerError> {
        self.submit_write(builder::build_nym(did, verkey, from, role), signer)
            .await?;
        Ok(())
    }

    /// Writes `data` as a raw attribute of `did`.
    pub async fn create_attrib(
        &self,
        did: &str,
        from: &str,
        data: &JsonValue,
        signer: &dyn Signer,
    ) -> Result<(), LedgerError> {
        self.submit_write(builder::build_attrib_raw(did, from, data), signer)
            .await?;
        Ok(())
    }

    /// Registers `endpoint` for `did` as its `endpoint` attribute.
    pub async fn set_endpoint(
        &self,
        did: &str,
        from: &str,
        endpoint: &str,
        signer: &dyn Signer,
    ) -> Result<(), LedgerError> {
        let data = serde_json::json!({"endpoint": {"endpoint": endpoint}});
        self.create_attrib(did, from, &data, signer).await
    }

    pub async fn create_schema(
        &self,
        issuer_did: &str,
        name: &str,
        version: &str,
        from: &str,
        attr_names: &[String],
        signer: &dyn Signer,
    ) -> Result<WriteReply, LedgerError> {
        let request = builder::build_schema(issuer_did, name, version, from, attr_names);
        self.submit_write(request, signer).await
    }

    /// Writes a credential definition and returns its ledger transaction id.
    pub async fn create_claim_def(
        &self,
        from: &str,
        schema_ref: u32,
        primary: &JsonValue,
        revocation: Option<&JsonValue>,
        signer: &dyn Signer,
    ) -> Result<String, LedgerError> {
        let request = builder::build_claim_def(from, schema_ref, primary, revocation);
        let reply = self.submit_write(request, signer).await?;
        reply
            .txn_metadata
            .txn_id
            .ok_or_else(|| ReplyError::decode("result.txnMetadata.txnId", "missing required field").into())
    }
}
