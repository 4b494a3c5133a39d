//! Receipt polling for submitted transactions.
//!
//! `eth_getTransactionReceipt` returns `null` until the transaction is
//! mined. Polling is a read and is safe to repeat; the submission itself is
//! never repeated.

use std::time::Duration;

use pharma_core::TxHash;
use serde_json::Value;

use crate::error::LedgerError;
use crate::rpc::RpcTransport;

/// Cap on the backoff exponent (interval * 16).
const MAX_BACKOFF_SHIFT: u32 = 4;

/// How long to wait for a transaction to be mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolling {
    /// Delay after the first empty poll; doubles on each further poll.
    pub interval: Duration,
    /// Total number of polls.
    pub attempts: u32,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
            attempts: 8,
        }
    }
}

impl ReceiptPolling {
    /// Delay before poll number `attempt + 1`.
    fn delay(&self, attempt: u32) -> Duration {
        self.interval * 2u32.pow(attempt.min(MAX_BACKOFF_SHIFT))
    }
}

/// Poll until the receipt is available or the budget is spent.
pub(crate) async fn wait_for_receipt(
    rpc: &RpcTransport,
    tx: &TxHash,
    polling: &ReceiptPolling,
) -> Result<Value, LedgerError> {
    for attempt in 0..polling.attempts {
        let receipt = rpc
            .call("eth_getTransactionReceipt", serde_json::json!([tx.as_str()]))
            .await?;
        if !receipt.is_null() {
            return Ok(receipt);
        }
        if attempt + 1 == polling.attempts {
            break;
        }
        let delay = polling.delay(attempt);
        tracing::debug!(
            attempt = attempt + 1,
            max_attempts = polling.attempts,
            tx = %tx,
            "transaction pending, polling again in {delay:?}"
        );
        tokio::time::sleep(delay).await;
    }
    tracing::warn!(tx = %tx, attempts = polling.attempts, "transaction not mined within polling budget");
    Err(LedgerError::Unmined(tx.clone()))
}
