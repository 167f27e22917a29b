//! Command-line front end for the forecast assistant.

pub mod commands;
pub mod render;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use shared::{session, ApiClient, ChatEndpoint, Config, Outcome, Reports, RequestLifecycle};
use tracing_subscriber::EnvFilter;

/// Install JSON logging on stderr, filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .init();
}

/// Backend handles shared by the binaries.
pub struct Backend {
    pub reports: Reports,
    pub chat: Arc<dyn ChatEndpoint>,
    pub lifecycle: RequestLifecycle,
}

impl Backend {
    pub fn from_config(config: &Config) -> shared::Result<Self> {
        let client = Arc::new(ApiClient::from_config(config)?);
        let lifecycle = RequestLifecycle::new(session::from_config(config), config.deadlines);

        Ok(Self {
            reports: Reports::new(client.clone(), lifecycle.clone()),
            chat: client,
            lifecycle,
        })
    }
}

/// Turn a non-success outcome into an error for the command line.
pub fn require<T>(outcome: Outcome<T>) -> Result<T> {
    match outcome {
        Outcome::Success(value) => Ok(value),
        Outcome::AuthUnavailable => Err(anyhow!(
            "No usable session. Set SESSION_TOKEN or SESSION_TOKEN_FILE and sign in again."
        )),
        Outcome::Timeout => Err(anyhow!("The backend did not answer in time")),
        Outcome::TransportFailure(reason) => Err(anyhow!("Could not reach the backend: {}", reason)),
        Outcome::ServerRejected(reason) => Err(anyhow!("The backend rejected the request: {}", reason)),
    }
}
