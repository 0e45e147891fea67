// src/lib.rs
//! # DID Ledger Client
//!
//! Client library for Indy-style DID ledgers.
//!
//! ## Architecture Overview
//! 1. **Models**: value tree, DIDs, request envelope and typed replies
//! 2. **Utils**: canonical signing serialization, hashing, configuration
//! 3. **Wallet**: Ed25519 key derivation and request signing
//! 4. **Services**: request builders and the reply classifier
//! 5. **Blockchain**: transport to the ledger and the [`LedgerClient`]

// Module declarations (organized by functional domain)
pub mod blockchain; // Ledger transport and client
pub mod error;
pub mod models; // Data structures
pub mod services; // Request building and reply parsing
pub mod utils; // Helper functions
pub mod wallet; // Cryptographic key operations

pub use blockchain::ledger_client::LedgerClient;
pub use blockchain::transport::{ProxyTransport, Transport};
pub use error::{LedgerError, ReplyError, SeedError, SerializeError};
pub use models::did::{abbreviate_verkey, create_did, expand_verkey, parse_did, Did, DidValue};
pub use models::reply::{ErrorReply, ReadReply, WriteReply};
pub use models::request::Request;
pub use models::value::Value;
pub use services::reply_parser::parse_reply;
pub use utils::serialization::serialize_for_signing;
pub use wallet::key_management::{derive_key_pair, Ed25519Signer, KeyPair, Signer};
