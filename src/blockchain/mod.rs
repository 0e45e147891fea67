// src/blockchain/mod.rs
pub mod ledger_client;
pub mod transport;
