//! # Page Context
//!
//! Everything an orchestrator needs, passed in explicitly: the session
//! binder, the three remote seams, the document renderer and a clock.
//! A [`Page`] lives as long as the page it serves. Orchestrators on the
//! same page share its session binder, so the wallet is prompted at most
//! once per page.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use pharma_client::{
    Call, ClientConfig, ConfigError, ContentStore, ContractBinding, ContractKind, LedgerGateway, PharmaClient,
    Returned, Session, SessionBinder, WalletProvider, WriteReceipt, U256,
};
use pharma_core::{AccountAddress, Clock, ContentId, SystemClock};
use pharma_invoice::{DocumentRenderer, InvoiceRenderer};

use crate::error::WorkflowError;

/// Per-step limits and fixed amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Upper bound on any single remote step.
    pub step_timeout: Duration,
    /// Value attached to sell and buy transactions.
    pub purchase_value: U256,
    /// Most records a catalogue read will fetch.
    pub catalogue_limit: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(120),
            purchase_value: U256::from(5_000_000_000_000_000_000u64),
            catalogue_limit: 10_000,
        }
    }
}

impl WorkflowSettings {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            step_timeout: Duration::from_secs(config.step_timeout_secs),
            purchase_value: config.purchase_value()?,
            ..Self::default()
        })
    }
}

/// Page-scoped collaborators.
#[derive(Clone)]
pub struct Page {
    binder: SessionBinder,
    ledger: Arc<dyn LedgerGateway>,
    store: Arc<dyn ContentStore>,
    renderer: Arc<dyn DocumentRenderer>,
    clock: Arc<dyn Clock>,
    settings: WorkflowSettings,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("binder", &self.binder)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Page {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        ledger: Arc<dyn LedgerGateway>,
        store: Arc<dyn ContentStore>,
        renderer: Arc<dyn DocumentRenderer>,
        clock: Arc<dyn Clock>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            binder: SessionBinder::new(wallet),
            ledger,
            store,
            renderer,
            clock,
            settings,
        }
    }

    /// A page over the HTTP clients, stamping documents with wall-clock time.
    pub fn from_client(client: &PharmaClient, config: &ClientConfig) -> Result<Self, ConfigError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(Self::new(
            Arc::new(client.wallet().clone()),
            Arc::new(client.ledger().clone()),
            Arc::new(client.store().clone()),
            Arc::new(InvoiceRenderer::new(config.invoice_title.clone(), clock.clone())),
            clock,
            WorkflowSettings::from_config(config)?,
        ))
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn renderer(&self) -> &dyn DocumentRenderer {
        self.renderer.as_ref()
    }

    /// The bound session, if a previous action bound one.
    pub fn current_session(&self) -> Option<&Session> {
        self.binder.current()
    }

    /// Run one remote step under the step timeout.
    pub(crate) async fn step<T, E, F>(&self, step: &'static str, fut: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<WorkflowError>,
    {
        match tokio::time::timeout(self.settings.step_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let e = e.into();
                tracing::warn!(step, error = %e, "workflow step failed");
                Err(e)
            }
            Err(_) => {
                tracing::warn!(step, timeout = ?self.settings.step_timeout, "workflow step timed out");
                Err(WorkflowError::TimedOut { step })
            }
        }
    }

    /// Bind the session (prompting at most once) and resolve `contract`.
    pub async fn bind(&self, contract: ContractKind) -> Result<(Session, ContractBinding), WorkflowError> {
        let session = self.step("wallet", self.binder.bind()).await?;
        let binding = self.ledger.resolve(&session, contract)?;
        Ok((session, binding))
    }

    pub(crate) async fn read(
        &self,
        binding: &ContractBinding,
        call: Call,
        from: Option<&AccountAddress>,
    ) -> Result<Returned, WorkflowError> {
        self.step(call.method().name, self.ledger.read(binding, &call, from)).await
    }

    pub(crate) async fn write(
        &self,
        binding: &ContractBinding,
        call: Call,
        session: &Session,
        value: Option<U256>,
    ) -> Result<WriteReceipt, WorkflowError> {
        let name = call.method().name;
        let receipt = self
            .step(name, self.ledger.write(binding, &call, &session.account, value))
            .await?;
        tracing::info!(method = name, tx = %receipt.transaction_id, "write settled");
        Ok(receipt)
    }

    pub(crate) async fn upload(&self, bytes: Vec<u8>) -> Result<ContentId, WorkflowError> {
        self.step("upload", self.store.upload(bytes)).await
    }

    pub(crate) fn retrieval_link(&self, cid: &ContentId) -> String {
        self.store.retrieval_link(cid)
    }
}
