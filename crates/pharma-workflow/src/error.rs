//! # Orchestrator-Boundary Errors
//!
//! Every failure inside a workflow is converted to a [`WorkflowError`]
//! before it reaches the view. The view never sees a collaborator error
//! type: it sees an [`ErrorKind`] (stored in the `Failed` state) and a
//! user-facing message.

use std::fmt;

use pharma_client::{LedgerError, StoreError, WalletError};
use pharma_invoice::InvoiceError;
use serde::Serialize;
use thiserror::Error;

/// Discriminant of a [`WorkflowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    WalletUnavailable,
    UserDeniedAccess,
    NetworkNotDeployed,
    RpcError,
    UserRejectedTransaction,
    StoreUnreachable,
    InvalidPayload,
    InvalidInput,
    InvalidCredentials,
    MalformedResponse,
    DocumentFailed,
    TimedOut,
    Busy,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::WalletUnavailable => "WalletUnavailable",
            Self::UserDeniedAccess => "UserDeniedAccess",
            Self::NetworkNotDeployed => "NetworkNotDeployed",
            Self::RpcError => "RpcError",
            Self::UserRejectedTransaction => "UserRejectedTransaction",
            Self::StoreUnreachable => "StoreUnreachable",
            Self::InvalidPayload => "InvalidPayload",
            Self::InvalidInput => "InvalidInput",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::MalformedResponse => "MalformedResponse",
            Self::DocumentFailed => "DocumentFailed",
            Self::TimedOut => "TimedOut",
            Self::Busy => "Busy",
        };
        f.write_str(s)
    }
}

/// A failed workflow step.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("no wallet detected: {0}")]
    WalletUnavailable(String),

    #[error("account access was denied")]
    UserDeniedAccess,

    #[error("{0}")]
    NetworkNotDeployed(String),

    #[error("ledger call failed: {0}")]
    Rpc(String),

    #[error("transaction was rejected in the wallet")]
    UserRejectedTransaction,

    #[error("content store unreachable: {0}")]
    StoreUnreachable(String),

    #[error("content store rejected the upload: {0}")]
    InvalidPayload(String),

    /// A required form field is empty or unparseable.
    #[error("invalid input in {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// `loginUser` returned false.
    #[error("incorrect username or password")]
    InvalidCredentials,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("document generation failed: {0}")]
    Document(#[from] InvoiceError),

    /// A remote step did not finish within the step timeout.
    #[error("{step} timed out")]
    TimedOut { step: &'static str },

    /// Another submission from the same trigger is still in flight.
    #[error("a submission is already in progress")]
    Busy,
}

impl WorkflowError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: "required".to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WalletUnavailable(_) => ErrorKind::WalletUnavailable,
            Self::UserDeniedAccess => ErrorKind::UserDeniedAccess,
            Self::NetworkNotDeployed(_) => ErrorKind::NetworkNotDeployed,
            Self::Rpc(_) => ErrorKind::RpcError,
            Self::UserRejectedTransaction => ErrorKind::UserRejectedTransaction,
            Self::StoreUnreachable(_) => ErrorKind::StoreUnreachable,
            Self::InvalidPayload(_) => ErrorKind::InvalidPayload,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Document(_) => ErrorKind::DocumentFailed,
            Self::TimedOut { .. } => ErrorKind::TimedOut,
            Self::Busy => ErrorKind::Busy,
        }
    }

    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::WalletUnavailable(_) => {
                "No wallet detected. Install or unlock a wallet provider and try again.".to_string()
            }
            Self::UserDeniedAccess => "Account access was denied in the wallet.".to_string(),
            Self::NetworkNotDeployed(detail) => {
                format!("Contracts are not deployed on the selected network ({detail}).")
            }
            Self::Rpc(detail) => format!("The ledger call failed: {detail}"),
            Self::UserRejectedTransaction => "The transaction was rejected in the wallet.".to_string(),
            Self::StoreUnreachable(_) => "The document store could not be reached.".to_string(),
            Self::InvalidPayload(detail) => format!("The document store rejected the upload: {detail}"),
            Self::InvalidInput { field, reason } if reason == "required" => {
                format!("Please fill in {field}.")
            }
            Self::InvalidInput { field, reason } => format!("Invalid {field}: {reason}"),
            Self::InvalidCredentials => "Incorrect username or password. Please try again.".to_string(),
            Self::MalformedResponse(detail) => format!("Unexpected response from the ledger: {detail}"),
            Self::Document(e) => format!("The document could not be generated: {e}"),
            Self::TimedOut { step } => format!("Timed out waiting for {step}."),
            Self::Busy => "A submission is already in progress.".to_string(),
        }
    }
}

impl From<WalletError> for WorkflowError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::NoWalletDetected(detail) => Self::WalletUnavailable(detail),
            WalletError::UserDeniedAccess => Self::UserDeniedAccess,
            WalletError::Malformed { .. } => Self::MalformedResponse(e.to_string()),
        }
    }
}

impl From<LedgerError> for WorkflowError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NetworkNotDeployed { .. } => Self::NetworkNotDeployed(e.to_string()),
            LedgerError::UserRejected => Self::UserRejectedTransaction,
            LedgerError::Malformed { .. } => Self::MalformedResponse(e.to_string()),
            LedgerError::Encoding(inner) => Self::invalid("call arguments", inner),
            LedgerError::Rpc(_) | LedgerError::Reverted(_) | LedgerError::Unmined(_) => {
                Self::Rpc(e.to_string())
            }
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unreachable { .. } => Self::StoreUnreachable(e.to_string()),
            StoreError::InvalidPayload(detail) => Self::InvalidPayload(detail),
            StoreError::Malformed { .. } => Self::MalformedResponse(e.to_string()),
        }
    }
}

impl From<pharma_client::abi::AbiError> for WorkflowError {
    fn from(e: pharma_client::abi::AbiError) -> Self {
        Self::invalid("call arguments", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_client::ContractKind;
    use pharma_core::ChainId;

    #[test]
    fn ledger_errors_map_to_taxonomy() {
        let not_deployed: WorkflowError = LedgerError::NetworkNotDeployed {
            contract: ContractKind::SupplyChain,
            chain_id: ChainId(1),
        }
        .into();
        assert_eq!(not_deployed.kind(), ErrorKind::NetworkNotDeployed);
        assert!(not_deployed.user_message().contains("network 1"));

        let rejected: WorkflowError = LedgerError::UserRejected.into();
        assert_eq!(rejected.kind(), ErrorKind::UserRejectedTransaction);

        let malformed: WorkflowError = LedgerError::Malformed {
            method: "medicines".into(),
            reason: "short".into(),
        }
        .into();
        assert_eq!(malformed.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn wallet_and_store_errors_map_to_taxonomy() {
        let e: WorkflowError = WalletError::NoWalletDetected("refused".into()).into();
        assert_eq!(e.kind(), ErrorKind::WalletUnavailable);
        let e: WorkflowError = WalletError::UserDeniedAccess.into();
        assert_eq!(e.kind(), ErrorKind::UserDeniedAccess);
        let e: WorkflowError = StoreError::Unreachable {
            endpoint: "http://localhost:5001/api/v0/add".into(),
            reason: "refused".into(),
        }
        .into();
        assert_eq!(e.kind(), ErrorKind::StoreUnreachable);
        let e: WorkflowError = StoreError::InvalidPayload("empty".into()).into();
        assert_eq!(e.kind(), ErrorKind::InvalidPayload);
    }

    #[test]
    fn missing_field_message_names_field() {
        let e = WorkflowError::missing("toAddress");
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert_eq!(e.user_message(), "Please fill in toAddress.");
    }
}
