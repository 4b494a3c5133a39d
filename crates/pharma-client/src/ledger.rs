//! # Ledger Contract Gateway
//!
//! Resolves a contract's deployed address for the session's network and
//! exposes typed reads (`eth_call`) and writes (`eth_sendTransaction`).
//!
//! ## Resolution
//!
//! Addresses come only from the bundled deployment table. A network with no
//! entry, or an entry at the zero address, fails with
//! [`LedgerError::NetworkNotDeployed`]; no binding is ever built against an
//! undeployed address.
//!
//! ## Reads and writes
//!
//! Reads are idempotent. Writes submit a new transaction each time and are
//! never retried here: a failed write goes back to the caller, and only a
//! fresh user action submits again. After submission the gateway waits for
//! the receipt; a receipt with status `0x0` is [`LedgerError::Reverted`].

use std::sync::Arc;

use async_trait::async_trait;
use pharma_core::{AccountAddress, ChainId, TxHash};
use serde::Serialize;
use serde_json::Value;

use crate::abi::{self, AbiError, Outputs, Returned, U256};
use crate::artifact::Deployments;
use crate::contract::{Call, ContractKind, EventSpec, EVENTS};
use crate::error::LedgerError;
use crate::receipt::{wait_for_receipt, ReceiptPolling};
use crate::rpc::{parse_quantity, RpcTransport};
use crate::wallet::Session;

/// A contract resolved to its address on the session's network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractBinding {
    pub contract: ContractKind,
    pub address: AccountAddress,
    pub chain_id: ChainId,
}

/// A decoded event from a transaction receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub name: &'static str,
    pub values: Returned,
}

/// Outcome of a mined, successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReceipt {
    pub transaction_id: TxHash,
    pub events: Vec<EmittedEvent>,
}

impl WriteReceipt {
    /// First event of the given kind.
    pub fn event(&self, spec: &EventSpec) -> Option<&EmittedEvent> {
        self.events.iter().find(|e| e.name == spec.name)
    }
}

/// Typed access to the ledger contracts.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Look up `contract`'s address on the session's network.
    fn resolve(&self, session: &Session, contract: ContractKind) -> Result<ContractBinding, LedgerError>;

    /// Execute a call without submitting a transaction. Return values
    /// carry the names the contract declares for them.
    async fn read(
        &self,
        binding: &ContractBinding,
        call: &Call,
        from: Option<&AccountAddress>,
    ) -> Result<Returned, LedgerError>;

    /// Submit a transaction from `from` and wait for it to be mined.
    async fn write(
        &self,
        binding: &ContractBinding,
        call: &Call,
        from: &AccountAddress,
        value: Option<U256>,
    ) -> Result<WriteReceipt, LedgerError>;
}

/// Gateway over a JSON-RPC node.
#[derive(Debug, Clone)]
pub struct RpcLedger {
    rpc: RpcTransport,
    deployments: Arc<Deployments>,
    polling: ReceiptPolling,
}

impl RpcLedger {
    pub fn new(rpc: RpcTransport, deployments: Deployments, polling: ReceiptPolling) -> Self {
        Self {
            rpc,
            deployments: Arc::new(deployments),
            polling,
        }
    }

    fn check_contract(binding: &ContractBinding, call: &Call) -> Result<(), LedgerError> {
        if binding.contract != call.method().contract {
            return Err(AbiError::ArgumentMismatch(format!(
                "{} is not a {} method",
                call.method().signature(),
                binding.contract
            ))
            .into());
        }
        Ok(())
    }

    fn decode_events(&self, binding: &ContractBinding, receipt: &Value) -> Result<Vec<EmittedEvent>, LedgerError> {
        let Some(logs) = receipt.get("logs").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        let mut events = Vec::new();
        for log in logs {
            let emitter = log
                .get("address")
                .and_then(Value::as_str)
                .and_then(|a| AccountAddress::parse(a).ok());
            if emitter.as_ref() != Some(&binding.address) {
                continue;
            }
            let Some(topic) = log
                .get("topics")
                .and_then(Value::as_array)
                .and_then(|t| t.first())
                .and_then(Value::as_str)
            else {
                continue;
            };
            let Some(spec) = EVENTS
                .iter()
                .find(|e| e.contract == binding.contract && abi::to_hex_data(&e.topic()) == topic.to_ascii_lowercase())
            else {
                continue;
            };
            let data = log.get("data").and_then(Value::as_str).unwrap_or("0x");
            let bytes = abi::from_hex_data(data).map_err(|e| LedgerError::malformed(spec.name, e))?;
            let values = Outputs::from_types(spec.inputs)
                .and_then(|shape| shape.decode(&bytes))
                .map_err(|e| LedgerError::malformed(spec.name, e))?;
            events.push(EmittedEvent {
                name: spec.name,
                values,
            });
        }
        Ok(events)
    }
}

#[async_trait]
impl LedgerGateway for RpcLedger {
    fn resolve(&self, session: &Session, contract: ContractKind) -> Result<ContractBinding, LedgerError> {
        let address = self
            .deployments
            .address(contract, session.chain_id)
            .cloned()
            .ok_or(LedgerError::NetworkNotDeployed {
                contract,
                chain_id: session.chain_id,
            })?;
        Ok(ContractBinding {
            contract,
            address,
            chain_id: session.chain_id,
        })
    }

    async fn read(
        &self,
        binding: &ContractBinding,
        call: &Call,
        from: Option<&AccountAddress>,
    ) -> Result<Returned, LedgerError> {
        Self::check_contract(binding, call)?;
        let method = call.method();
        let mut tx = serde_json::json!({
            "to": binding.address.as_str(),
            "data": abi::to_hex_data(&call.calldata()),
        });
        if let Some(from) = from {
            tx["from"] = Value::String(from.as_str().to_string());
        }

        tracing::debug!(contract = %binding.contract, method = method.name, "ledger read");
        let result = self.rpc.call("eth_call", serde_json::json!([tx, "latest"])).await?;

        let hex = result
            .as_str()
            .ok_or_else(|| LedgerError::malformed(method.name, "eth_call result is not a hex string"))?;
        let data = abi::from_hex_data(hex).map_err(|e| LedgerError::malformed(method.name, e))?;
        let outputs = self.deployments.outputs(method)?;
        if data.is_empty() && !outputs.is_empty() {
            return Err(LedgerError::malformed(
                method.name,
                format!("empty return data from {}", binding.address),
            ));
        }
        outputs.decode(&data).map_err(|e| LedgerError::malformed(method.name, e))
    }

    async fn write(
        &self,
        binding: &ContractBinding,
        call: &Call,
        from: &AccountAddress,
        value: Option<U256>,
    ) -> Result<WriteReceipt, LedgerError> {
        Self::check_contract(binding, call)?;
        let method = call.method();
        let mut tx = serde_json::json!({
            "from": from.as_str(),
            "to": binding.address.as_str(),
            "data": abi::to_hex_data(&call.calldata()),
        });
        if let Some(value) = value {
            tx["value"] = Value::String(abi::hex_quantity(&value));
        }

        tracing::debug!(contract = %binding.contract, method = method.name, from = %from, "submitting transaction");
        let result = self
            .rpc
            .call("eth_sendTransaction", serde_json::json!([tx]))
            .await
            .map_err(|e| {
                tracing::warn!(method = method.name, error = %e, "transaction submission failed");
                LedgerError::from(e)
            })?;
        let transaction_id = result
            .as_str()
            .and_then(|s| TxHash::parse(s).ok())
            .ok_or_else(|| LedgerError::malformed("eth_sendTransaction", "result is not a transaction hash"))?;

        let receipt = wait_for_receipt(&self.rpc, &transaction_id, &self.polling).await?;
        if receipt.get("status").and_then(parse_quantity) == Some(0) {
            tracing::warn!(method = method.name, tx = %transaction_id, "transaction reverted");
            return Err(LedgerError::Reverted(transaction_id));
        }

        let events = self.decode_events(binding, &receipt)?;
        tracing::info!(method = method.name, tx = %transaction_id, events = events.len(), "transaction settled");
        Ok(WriteReceipt {
            transaction_id,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MEDICINE_CREATED;

    fn binding() -> ContractBinding {
        ContractBinding {
            contract: ContractKind::SupplyChain,
            address: AccountAddress::parse("0x00000000000000000000000000000000000000cc").unwrap(),
            chain_id: ChainId(5777),
        }
    }

    fn ledger() -> RpcLedger {
        let deployments = Deployments::new().with(
            ContractKind::SupplyChain,
            ChainId(5777),
            binding().address,
        );
        let rpc = RpcTransport::new(reqwest::Client::new(), "http://127.0.0.1:1".parse().unwrap());
        RpcLedger::new(rpc, deployments, ReceiptPolling::default())
    }

    fn session(chain: u64) -> Session {
        Session {
            account: AccountAddress::parse("0x00000000000000000000000000000000000000aa").unwrap(),
            chain_id: ChainId(chain),
        }
    }

    #[test]
    fn resolve_uses_deployment_table() {
        let b = ledger().resolve(&session(5777), ContractKind::SupplyChain).unwrap();
        assert_eq!(b, binding());
    }

    #[test]
    fn resolve_fails_closed_on_unknown_network() {
        let err = ledger().resolve(&session(1), ContractKind::SupplyChain).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::NetworkNotDeployed { chain_id: ChainId(1), .. }
        ));
        assert!(ledger().resolve(&session(5777), ContractKind::Register).is_err());
    }

    #[test]
    fn events_are_decoded_from_matching_logs() {
        let data = abi::encode_params(&[
            abi::uint(U256::from(9u64)),
            abi::string("X"),
            abi::address(&session(1).account),
        ]);
        let receipt = serde_json::json!({
            "status": "0x1",
            "logs": [
                {
                    "address": binding().address.as_str(),
                    "topics": [abi::to_hex_data(&MEDICINE_CREATED.topic())],
                    "data": abi::to_hex_data(&data),
                },
                {
                    "address": "0x00000000000000000000000000000000000000dd",
                    "topics": [abi::to_hex_data(&MEDICINE_CREATED.topic())],
                    "data": abi::to_hex_data(&data),
                },
                {
                    "address": binding().address.as_str(),
                    "topics": ["0x00"],
                    "data": "0x",
                }
            ]
        });
        let events = ledger().decode_events(&binding(), &receipt).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "MedicineCreated");
        assert_eq!(events[0].values.get("", 0), Some(&abi::uint(U256::from(9u64))));
        assert_eq!(events[0].values.get("", 2), Some(&abi::address(&session(1).account)));
    }

    #[test]
    fn call_for_other_contract_is_rejected() {
        let call = Call::login_user("u", "p").unwrap();
        assert!(matches!(
            RpcLedger::check_contract(&binding(), &call),
            Err(LedgerError::Encoding(_))
        ));
    }
}
