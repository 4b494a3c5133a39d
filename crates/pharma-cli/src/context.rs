//! Configuration loading and page assembly.

use std::path::Path;

use anyhow::{Context, Result};
use pharma_client::{ClientConfig, PharmaClient};
use pharma_workflow::Page;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Print view state as JSON instead of text.
    pub json: bool,
    /// Where to write a QR code SVG when an action produces one.
    pub qr_out: Option<std::path::PathBuf>,
}

/// Load from `path` when given, otherwise from `PHARMA_*` variables.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => ClientConfig::from_env().context("loading configuration from environment"),
    }
}

/// HTTP clients and a page over them.
pub fn build_page(config: &ClientConfig) -> Result<Page> {
    let client = PharmaClient::new(config).context("loading contract artifacts")?;
    let page = Page::from_client(&client, config)?;
    tracing::debug!(
        rpc = %config.rpc_url,
        ipfs = %config.ipfs_api_url,
        "page assembled"
    );
    Ok(page)
}
