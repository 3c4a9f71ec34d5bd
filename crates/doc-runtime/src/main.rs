//! `doc-runtime` binary: listens for accepted proposals until Ctrl-C, or
//! exits with the listener's error when the receive loop aborts.

use anyhow::{Context, Result};
use doc_runtime::{init_logging, DocRuntime, InMemoryContentStore, InMemoryKeyProvider, RuntimeConfig};
use shared_crypto::Secp256k1KeyPair;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Hex private key the application signs event-driven transactions with.
const APP_KEY_VAR: &str = "DL_APP_PRIVATE_KEY";

fn app_key() -> Result<Secp256k1KeyPair> {
    match std::env::var(APP_KEY_VAR) {
        Ok(hex) => Secp256k1KeyPair::from_hex(hex.trim()).with_context(|| format!("parsing {APP_KEY_VAR}")),
        Err(_) => {
            warn!("{APP_KEY_VAR} not set, using a generated application key");
            Ok(Secp256k1KeyPair::generate())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("loading configuration")?;
    init_logging(&config)?;

    let keys = InMemoryKeyProvider::new(app_key()?);
    let store = InMemoryContentStore::new();
    let mut runtime = DocRuntime::new(config, Arc::new(store), Arc::new(keys))?;
    runtime.start().await?;

    info!("Doc runtime is running. Press Ctrl+C to stop.");
    tokio::select! {
        signal = tokio::signal::ctrl_c() => signal.context("waiting for Ctrl+C")?,
        () = runtime.stopped() => error!("Event listener stopped unexpectedly"),
    }

    runtime.shutdown().await
}
