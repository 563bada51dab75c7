pub mod api;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod remote;
pub mod session;
pub mod shell;
pub mod validation;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::config::PortalConfig;
use crate::credentials::FileCredentialStore;
use crate::session::SessionStore;
use crate::shell::{Shell, TerminalNavigator};

pub fn run() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the prompts.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("HealthConnect starting v{}", config::APP_VERSION);

    let config = PortalConfig::from_env();
    tracing::info!(
        api = %config.api_base_url,
        credentials = %config.credentials_path().display(),
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let client = ApiClient::from_config(&config)?;
    let credentials = Arc::new(FileCredentialStore::new(config.credentials_path()));
    let session = Arc::new(SessionStore::restore(
        client,
        credentials,
        Arc::new(TerminalNavigator),
        config.public_entry_url.clone(),
    ));

    Shell::new(runtime.handle().clone(), config, session).start();

    tracing::info!("HealthConnect exiting");
    Ok(())
}
