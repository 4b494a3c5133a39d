//! # pharma-client -- Typed clients for the supply-chain collaborators
//!
//! Three external systems sit behind this crate:
//! - **Wallet** via the node's account API ([`wallet`])
//! - **Ledger contracts** via JSON-RPC `eth_call` / `eth_sendTransaction` ([`ledger`])
//! - **Content store** via the IPFS HTTP `add` endpoint ([`ipfs`])
//!
//! ## Architecture
//!
//! Each collaborator is a trait ([`WalletProvider`], [`LedgerGateway`],
//! [`ContentStore`]) with one HTTP implementation. Orchestration code
//! depends on the traits only, so tests substitute in-process doubles.
//!
//! The contract interface ([`contract`]) is compiled in and values are
//! encoded with alloy ([`abi`]). The deployment table and declared return
//! shapes are loaded from the bundled artifacts at construction.

pub mod abi;
pub mod artifact;
pub mod config;
pub mod contract;
pub mod error;
pub mod ipfs;
pub mod ledger;
pub(crate) mod receipt;
pub mod records;
pub mod rpc;
pub mod wallet;

pub use abi::{DynSolValue, Returned, U256};
pub use artifact::Deployments;
pub use config::{ClientConfig, ConfigError};
pub use contract::{AllocationTarget, Call, ContractKind};
pub use error::{LedgerError, StoreError, WalletError};
pub use ipfs::{ContentStore, IpfsClient};
pub use ledger::{ContractBinding, LedgerGateway, RpcLedger, WriteReceipt};
pub use receipt::ReceiptPolling;
pub use records::{AllocatedMedicine, Medicine, NewMedicine, RegisteredUser};
pub use wallet::{RpcWallet, Session, SessionBinder, WalletProvider};

use std::time::Duration;

use rpc::RpcTransport;

/// Top-level client. Holds one implementation of each collaborator, all
/// sharing a single HTTP connection pool.
#[derive(Debug, Clone)]
pub struct PharmaClient {
    wallet: RpcWallet,
    ledger: RpcLedger,
    store: IpfsClient,
}

impl PharmaClient {
    /// Build clients from configuration, loading both contract artifacts.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let deployments = Deployments::load(&config.register_artifact, &config.supply_chain_artifact)?;
        Self::with_deployments(config, deployments)
    }

    /// Build clients against an explicit deployment table.
    pub fn with_deployments(config: &ClientConfig, deployments: Deployments) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let rpc = RpcTransport::new(http.clone(), config.rpc_endpoint()?);
        let polling = ReceiptPolling {
            interval: Duration::from_millis(config.receipt_poll_interval_ms),
            attempts: config.receipt_poll_attempts,
        };

        Ok(Self {
            wallet: RpcWallet::new(rpc.clone()),
            ledger: RpcLedger::new(rpc, deployments, polling),
            store: IpfsClient::new(http, config.ipfs_api_endpoint()?, config.ipfs_gateway_endpoint()?),
        })
    }

    pub fn wallet(&self) -> &RpcWallet {
        &self.wallet
    }

    pub fn ledger(&self) -> &RpcLedger {
        &self.ledger
    }

    pub fn store(&self) -> &IpfsClient {
        &self.store
    }
}
