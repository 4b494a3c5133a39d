//! Client configuration.
//!
//! Endpoints for the ledger node and the content store, the paths of the
//! bundled contract artifacts, and timeouts. Defaults target a local
//! development chain and a local IPFS daemon. Override via environment
//! variables or a YAML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::abi::{self, U256};

/// Five ether, in wei.
pub const DEFAULT_PURCHASE_VALUE_WEI: &str = "5000000000000000000";

/// Configuration for the ledger, wallet, and content store clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of the ledger node / wallet.
    /// Default: <http://localhost:7545>
    pub rpc_url: String,
    /// Content store write API (the `/api/v0/add` host).
    /// Default: <http://localhost:5001>
    pub ipfs_api_url: String,
    /// Public retrieval gateway used in displayed links.
    /// Default: <http://localhost:8080>
    pub ipfs_gateway_url: String,
    /// Truffle artifact of the `Register` contract.
    pub register_artifact: PathBuf,
    /// Truffle artifact of the `SupplyChain` contract.
    pub supply_chain_artifact: PathBuf,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Upper bound on a single orchestrator step in seconds.
    pub step_timeout_secs: u64,
    /// Delay before the first receipt poll, doubled on each further poll.
    pub receipt_poll_interval_ms: u64,
    /// Receipt polls before a submitted transaction is reported as unmined.
    pub receipt_poll_attempts: u32,
    /// Value attached to `sellMedicine` / `buyMedicine`, decimal wei.
    pub purchase_value_wei: String,
    /// Title printed on generated invoices.
    pub invoice_title: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:7545".to_string(),
            ipfs_api_url: "http://localhost:5001".to_string(),
            ipfs_gateway_url: "http://localhost:8080".to_string(),
            register_artifact: PathBuf::from("artifacts/Register.json"),
            supply_chain_artifact: PathBuf::from("artifacts/SupplyChain.json"),
            timeout_secs: 30,
            step_timeout_secs: 120,
            receipt_poll_interval_ms: 250,
            receipt_poll_attempts: 8,
            purchase_value_wei: DEFAULT_PURCHASE_VALUE_WEI.to_string(),
            invoice_title: "BAYER MANUFACTURING LTD".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PHARMA_RPC_URL` (default: `http://localhost:7545`)
    /// - `PHARMA_IPFS_API_URL` (default: `http://localhost:5001`)
    /// - `PHARMA_IPFS_GATEWAY_URL` (default: `http://localhost:8080`)
    /// - `PHARMA_REGISTER_ARTIFACT` (default: `artifacts/Register.json`)
    /// - `PHARMA_SUPPLY_CHAIN_ARTIFACT` (default: `artifacts/SupplyChain.json`)
    /// - `PHARMA_TIMEOUT_SECS` (default: 30)
    /// - `PHARMA_STEP_TIMEOUT_SECS` (default: 120)
    /// - `PHARMA_PURCHASE_VALUE_WEI` (default: 5 ether)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            rpc_url: env_url("PHARMA_RPC_URL", &defaults.rpc_url)?.to_string(),
            ipfs_api_url: env_url("PHARMA_IPFS_API_URL", &defaults.ipfs_api_url)?.to_string(),
            ipfs_gateway_url: env_url("PHARMA_IPFS_GATEWAY_URL", &defaults.ipfs_gateway_url)?
                .to_string(),
            register_artifact: env_path("PHARMA_REGISTER_ARTIFACT", defaults.register_artifact),
            supply_chain_artifact: env_path(
                "PHARMA_SUPPLY_CHAIN_ARTIFACT",
                defaults.supply_chain_artifact,
            ),
            timeout_secs: env_number("PHARMA_TIMEOUT_SECS", defaults.timeout_secs)?,
            step_timeout_secs: env_number("PHARMA_STEP_TIMEOUT_SECS", defaults.step_timeout_secs)?,
            purchase_value_wei: std::env::var("PHARMA_PURCHASE_VALUE_WEI")
                .unwrap_or(defaults.purchase_value_wei),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file. Absent keys take their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&raw).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The configured purchase value as a 256-bit quantity.
    pub fn purchase_value(&self) -> Result<U256, ConfigError> {
        abi::parse_decimal(&self.purchase_value_wei).map_err(|_| ConfigError::InvalidNumber {
            key: "purchase_value_wei".to_string(),
            value: self.purchase_value_wei.clone(),
        })
    }

    /// Parsed JSON-RPC endpoint.
    pub fn rpc_endpoint(&self) -> Result<Url, ConfigError> {
        parse_url("rpc_url", &self.rpc_url)
    }

    /// Parsed content store write API base.
    pub fn ipfs_api_endpoint(&self) -> Result<Url, ConfigError> {
        parse_url("ipfs_api_url", &self.ipfs_api_url)
    }

    /// Parsed public retrieval gateway base.
    pub fn ipfs_gateway_endpoint(&self) -> Result<Url, ConfigError> {
        parse_url("ipfs_gateway_url", &self.ipfs_gateway_url)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.rpc_endpoint()?;
        self.ipfs_api_endpoint()?;
        self.ipfs_gateway_endpoint()?;
        self.purchase_value()?;
        if self.receipt_poll_attempts == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "receipt_poll_attempts".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(key.to_string(), e.to_string()))
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

fn env_path(var: &str, default: PathBuf) -> PathBuf {
    std::env::var_os(var).map(PathBuf::from).unwrap_or(default)
}

fn env_number(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            key: var.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid number for {key}: {value:?}")]
    InvalidNumber { key: String, value: String },
    #[error("cannot read config file {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("cannot parse config {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("cannot load contract artifact {path}: {reason}")]
    Artifact { path: String, reason: String },
    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_services() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.rpc_endpoint().unwrap().as_str(), "http://localhost:7545/");
        assert_eq!(cfg.ipfs_api_endpoint().unwrap().as_str(), "http://localhost:5001/");
        assert_eq!(cfg.ipfs_gateway_endpoint().unwrap().as_str(), "http://localhost:8080/");
        assert_eq!(cfg.purchase_value().unwrap().to_string(), DEFAULT_PURCHASE_VALUE_WEI);
    }

    #[test]
    fn yaml_overrides_selected_keys() {
        let cfg = ClientConfig::from_yaml_str(
            "rpc_url: http://node.internal:8545\ntimeout_secs: 5\n",
        )
        .unwrap();
        assert_eq!(cfg.rpc_endpoint().unwrap().as_str(), "http://node.internal:8545/");
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.ipfs_api_url, "http://localhost:5001");
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        let err = ClientConfig::from_yaml_str("rpc_endpoint: http://x\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn yaml_rejects_bad_url() {
        let err = ClientConfig::from_yaml_str("ipfs_api_url: not a url\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(..)));
    }

    #[test]
    fn yaml_rejects_bad_purchase_value() {
        let err = ClientConfig::from_yaml_str("purchase_value_wei: five\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn yaml_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pharma.yaml");
        std::fs::write(&path, "invoice_title: ACME PHARMA\n").unwrap();
        let cfg = ClientConfig::from_yaml_file(&path).unwrap();
        assert_eq!(cfg.invoice_title, "ACME PHARMA");
    }

    #[test]
    fn missing_yaml_file_is_a_read_error() {
        let err = ClientConfig::from_yaml_file(Path::new("/nonexistent/pharma.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("NONEXISTENT_VAR_PHARMA_1", "https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("TEST_BAD_URL_PHARMA", "not a url");
        let result = env_url("TEST_BAD_URL_PHARMA", "https://example.com");
        std::env::remove_var("TEST_BAD_URL_PHARMA");
        assert!(result.is_err());
    }
}
