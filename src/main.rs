// src/main.rs

//! # DID Ledger Client - Demo Entry Point
//!
//! Derives a ledger DID from a seed and, optionally, looks a DID up on the
//! ledger through an indy-vdr-proxy.
//!
//! ## Environment Variables
//! - `INDY_SEED`: (Optional) seed as 32 characters, base64 or 64 hex digits. Random when unset
//! - `INDY_LOOKUP_DID`: (Optional) DID to read with GET_NYM
//! - `INDY_PROXY_URL`: (Optional) proxy URL (default: http://localhost:3030/)
//! - `INDY_TIMEOUT_SECS`: (Optional) per-request timeout (default: 30)
//! - `RUST_LOG`: log filter, e.g. `debug`

use anyhow::Context;
use did_ledger_client::utils::config::ClientConfig;
use did_ledger_client::wallet::key_management::{create_did_with_keys, DidInfo};
use did_ledger_client::LedgerClient;
use dotenv::dotenv;
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    let config = ClientConfig::load().context("Failed to read INDY_* configuration")?;

    let info = DidInfo {
        seed: std::env::var("INDY_SEED").unwrap_or_default(),
        use_content_id: true,
        method: "sov".to_owned(),
        ..DidInfo::default()
    };
    let (did, key_pair) =
        create_did_with_keys(&info).context("Failed to derive DID - check INDY_SEED")?;

    println!("DID:                {}", did);
    println!("Verkey:             {}", key_pair.public_key());
    println!("Abbreviated verkey: {}", did.abbreviated_verkey());

    let Ok(lookup) = std::env::var("INDY_LOOKUP_DID") else {
        return Ok(());
    };

    let client = LedgerClient::from_config(&config).context("Invalid INDY_PROXY_URL")?;
    info!("Looking up {} on the ledger", lookup);

    let reply = client
        .get_nym(&lookup)
        .await
        .with_context(|| format!("GET_NYM for {} failed", lookup))?;

    match reply.seq_no {
        Some(seq_no) => println!(
            "NYM {} (seqNo {}): {}",
            lookup,
            seq_no,
            reply.parsed_data().to_json_string()
        ),
        None => println!("NYM {} is not on the ledger", lookup),
    }

    Ok(())
}
