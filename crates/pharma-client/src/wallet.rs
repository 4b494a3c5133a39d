//! # Wallet Session Binder
//!
//! Obtains the active account and network from the wallet provider and
//! caches them for the lifetime of a page.
//!
//! The binder prompts for account access at most once per successful bind:
//! the first successful [`SessionBinder::bind`] stores the [`Session`], and
//! every later call returns it without touching the provider. A failed bind
//! caches nothing, so the next user action prompts again.

use std::sync::Arc;

use async_trait::async_trait;
use pharma_core::{AccountAddress, ChainId};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::error::WalletError;
use crate::rpc::{RpcError, RpcTransport, METHOD_NOT_FOUND_CODE};

/// The account and network a page operates as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub account: AccountAddress,
    pub chain_id: ChainId,
}

/// A source of accounts and network identity.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user for account access. The first account is the active one.
    async fn request_accounts(&self) -> Result<Vec<AccountAddress>, WalletError>;

    /// The network the provider is connected to.
    async fn network_id(&self) -> Result<ChainId, WalletError>;
}

/// Wallet provider over the node's JSON-RPC account API.
#[derive(Debug, Clone)]
pub struct RpcWallet {
    rpc: RpcTransport,
}

impl RpcWallet {
    pub fn new(rpc: RpcTransport) -> Self {
        Self { rpc }
    }

    async fn accounts(&self, method: &str) -> Result<Vec<AccountAddress>, RpcError> {
        let result = self.rpc.call(method, serde_json::json!([])).await?;
        let list = result.as_array().ok_or_else(|| RpcError::Malformed {
            method: method.to_string(),
            reason: "expected an array of accounts".to_string(),
        })?;
        list.iter()
            .map(|v| {
                v.as_str()
                    .and_then(|s| AccountAddress::parse(s).ok())
                    .ok_or_else(|| RpcError::Malformed {
                        method: method.to_string(),
                        reason: format!("invalid account {v}"),
                    })
            })
            .collect()
    }
}

fn wallet_error(e: RpcError) -> WalletError {
    match e {
        e if e.is_user_rejection() => WalletError::UserDeniedAccess,
        RpcError::Malformed { method, reason } => WalletError::Malformed { method, reason },
        other => WalletError::NoWalletDetected(other.to_string()),
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<AccountAddress>, WalletError> {
        match self.accounts("eth_requestAccounts").await {
            Ok(accounts) => Ok(accounts),
            // Plain nodes expose unlocked accounts without a permission prompt.
            Err(e) if e.code() == Some(METHOD_NOT_FOUND_CODE) => {
                tracing::debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.accounts("eth_accounts").await.map_err(wallet_error)
            }
            Err(e) => Err(wallet_error(e)),
        }
    }

    async fn network_id(&self) -> Result<ChainId, WalletError> {
        let result = self
            .rpc
            .call("net_version", serde_json::json!([]))
            .await
            .map_err(wallet_error)?;
        let raw = match &result {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(WalletError::Malformed {
                    method: "net_version".to_string(),
                    reason: format!("unexpected network id {other}"),
                })
            }
        };
        ChainId::parse(&raw).map_err(|e| WalletError::Malformed {
            method: "net_version".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Page-scoped session cache in front of a [`WalletProvider`].
#[derive(Clone)]
pub struct SessionBinder {
    provider: Arc<dyn WalletProvider>,
    session: Arc<OnceCell<Session>>,
}

impl std::fmt::Debug for SessionBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBinder")
            .field("session", &self.session.get())
            .finish_non_exhaustive()
    }
}

impl SessionBinder {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider,
            session: Arc::new(OnceCell::new()),
        }
    }

    /// Bind the session, prompting the provider only if not yet bound.
    pub async fn bind(&self) -> Result<Session, WalletError> {
        let session = self
            .session
            .get_or_try_init(|| async {
                let accounts = self.provider.request_accounts().await?;
                let account = accounts
                    .into_iter()
                    .next()
                    .ok_or(WalletError::UserDeniedAccess)?;
                let chain_id = self.provider.network_id().await?;
                tracing::info!(account = %account, chain_id = %chain_id, "wallet session bound");
                Ok::<_, WalletError>(Session { account, chain_id })
            })
            .await?;
        Ok(session.clone())
    }

    /// The bound session, if any.
    pub fn current(&self) -> Option<&Session> {
        self.session.get()
    }
}
