//! Client error types, one enum per collaborator.

use pharma_core::{ChainId, TxHash};

use crate::abi::AbiError;
use crate::contract::ContractKind;
use crate::rpc::RpcError;

/// Errors from the wallet session binder.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// No wallet provider answered.
    #[error("no wallet detected: {0}")]
    NoWalletDetected(String),
    /// The user declined account access, or no account was exposed.
    #[error("user denied account access")]
    UserDeniedAccess,
    /// The provider answered with something other than accounts / a network id.
    #[error("malformed wallet response to {method}: {reason}")]
    Malformed { method: String, reason: String },
}

/// Errors from the ledger contract gateway.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The deployment table has no usable address for the session's network.
    #[error("{contract} is not deployed on network {chain_id}")]
    NetworkNotDeployed {
        contract: ContractKind,
        chain_id: ChainId,
    },
    /// Transport or node-level failure of a read or write.
    #[error("ledger RPC error: {0}")]
    Rpc(RpcError),
    /// The user declined to sign the transaction.
    #[error("user rejected the transaction")]
    UserRejected,
    /// The transaction was mined but reverted.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    /// The transaction was not mined within the polling budget.
    #[error("transaction {0} was not mined in time")]
    Unmined(TxHash),
    /// The response could not be decoded into the expected shape.
    #[error("malformed response from {method}: {reason}")]
    Malformed { method: String, reason: String },
    /// Call arguments did not match the method signature.
    #[error("invalid call: {0}")]
    Encoding(#[from] AbiError),
}

impl LedgerError {
    pub(crate) fn malformed(method: &str, reason: impl std::fmt::Display) -> Self {
        Self::Malformed {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<RpcError> for LedgerError {
    fn from(e: RpcError) -> Self {
        if e.is_user_rejection() {
            Self::UserRejected
        } else {
            Self::Rpc(e)
        }
    }
}

/// Errors from the content-addressed store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or failed internally.
    #[error("content store {endpoint} unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },
    /// The store refused the payload.
    #[error("content store rejected payload: {0}")]
    InvalidPayload(String),
    /// The store answered without a usable identifier.
    #[error("malformed response from content store {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_4001_becomes_user_rejected() {
        let err: LedgerError = RpcError::Node {
            method: "eth_sendTransaction".into(),
            code: 4001,
            message: "denied".into(),
        }
        .into();
        assert!(matches!(err, LedgerError::UserRejected));
    }

    #[test]
    fn other_node_errors_stay_rpc() {
        let err: LedgerError = RpcError::Node {
            method: "eth_call".into(),
            code: -32000,
            message: "VM Exception while processing transaction: revert".into(),
        }
        .into();
        assert!(matches!(err, LedgerError::Rpc(_)));
        assert!(err.to_string().contains("revert"));
    }

    #[test]
    fn not_deployed_names_contract_and_network() {
        let err = LedgerError::NetworkNotDeployed {
            contract: ContractKind::SupplyChain,
            chain_id: ChainId(5777),
        };
        assert_eq!(err.to_string(), "SupplyChain is not deployed on network 5777");
    }
}
