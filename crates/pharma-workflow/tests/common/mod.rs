//! In-process doubles for the workflow seams. Every double records its
//! calls so tests can assert exactly which remote steps ran.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pharma_client::abi::{DynSolValue, Returned};
use pharma_client::ledger::EmittedEvent;
use pharma_client::{
    Call, ContentStore, ContractBinding, ContractKind, LedgerError, LedgerGateway, Medicine, Session, StoreError,
    WalletError, WalletProvider, WriteReceipt, U256,
};
use pharma_core::{AccountAddress, ChainId, ContentId, FixedClock, MedicineId, MedicineStatus, Timestamp, TxHash};
use pharma_invoice::{DocumentRenderer, Fields, InvoiceError, InvoiceRenderer, LayoutKind};
use pharma_workflow::{FormKind, Orchestrator, Page, WorkflowSettings};
use tokio::sync::Notify;

pub const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";
pub const CONTRACT: &str = "0x00000000000000000000000000000000000000cc";
pub const TX: &str = "0xabababababababababababababababababababababababababababababababab";

pub fn account() -> AccountAddress {
    AccountAddress::parse(ACCOUNT).unwrap()
}

pub fn now() -> Timestamp {
    Timestamp::parse("2026-03-14T09:26:53Z").unwrap()
}

// ── Wallet ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockWallet {
    pub prompts: AtomicUsize,
    pub fail: Mutex<Option<fn() -> WalletError>>,
}

impl MockWallet {
    pub fn failing(f: fn() -> WalletError) -> Self {
        Self {
            prompts: AtomicUsize::new(0),
            fail: Mutex::new(Some(f)),
        }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<AccountAddress>, WalletError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if let Some(f) = *self.fail.lock().unwrap() {
            return Err(f());
        }
        Ok(vec![account()])
    }

    async fn network_id(&self) -> Result<ChainId, WalletError> {
        Ok(ChainId(5777))
    }
}

// ── Ledger ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLedger {
    pub undeployed: bool,
    pub reads: Mutex<Vec<Call>>,
    pub writes: Mutex<Vec<(Call, Option<U256>)>>,
    pub responses: Mutex<HashMap<&'static str, Returned>>,
    pub events: Mutex<Vec<EmittedEvent>>,
    pub write_error: Mutex<Option<fn() -> LedgerError>>,
    /// When set, writes wait for a notification before returning.
    pub gate: Option<Arc<Notify>>,
    /// When set, every read sleeps this long first.
    pub read_delay: Option<Duration>,
}

impl MockLedger {
    pub fn respond(&self, method: &'static str, values: Vec<DynSolValue>) {
        self.responses.lock().unwrap().insert(method, Returned::positional(values));
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn read_methods(&self) -> Vec<&'static str> {
        self.reads.lock().unwrap().iter().map(|c| c.method().name).collect()
    }

    pub fn written(&self, i: usize) -> (Call, Option<U256>) {
        self.writes.lock().unwrap()[i].clone()
    }
}

#[async_trait]
impl LedgerGateway for MockLedger {
    fn resolve(&self, session: &Session, contract: ContractKind) -> Result<ContractBinding, LedgerError> {
        if self.undeployed {
            return Err(LedgerError::NetworkNotDeployed {
                contract,
                chain_id: session.chain_id,
            });
        }
        Ok(ContractBinding {
            contract,
            address: AccountAddress::parse(CONTRACT).unwrap(),
            chain_id: session.chain_id,
        })
    }

    async fn read(
        &self,
        _binding: &ContractBinding,
        call: &Call,
        _from: Option<&AccountAddress>,
    ) -> Result<Returned, LedgerError> {
        self.reads.lock().unwrap().push(call.clone());
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        let name = call.method().name;
        self.responses
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| LedgerError::Malformed {
                method: name.to_string(),
                reason: "no scripted response".to_string(),
            })
    }

    async fn write(
        &self,
        _binding: &ContractBinding,
        call: &Call,
        _from: &AccountAddress,
        value: Option<U256>,
    ) -> Result<WriteReceipt, LedgerError> {
        self.writes.lock().unwrap().push((call.clone(), value));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(f) = *self.write_error.lock().unwrap() {
            return Err(f());
        }
        Ok(WriteReceipt {
            transaction_id: TxHash::parse(TX).unwrap(),
            events: self.events.lock().unwrap().clone(),
        })
    }
}

// ── Content store ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    pub uploads: Mutex<Vec<Vec<u8>>>,
    pub fail: bool,
}

impl MockStore {
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn uploaded(&self, i: usize) -> Vec<u8> {
        self.uploads.lock().unwrap()[i].clone()
    }
}

#[async_trait]
impl ContentStore for MockStore {
    async fn upload(&self, bytes: Vec<u8>) -> Result<ContentId, StoreError> {
        if self.fail {
            return Err(StoreError::Unreachable {
                endpoint: "http://localhost:5001/api/v0/add".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(bytes);
        Ok(ContentId::new(format!("QmDoc{}", uploads.len())).unwrap())
    }

    fn retrieval_link(&self, cid: &ContentId) -> String {
        format!("http://localhost:8080/ipfs/{cid}")
    }
}

// ── Renderer ─────────────────────────────────────────────────────────

/// Real renderer on a fixed clock that counts calls.
pub struct CountingRenderer {
    inner: InvoiceRenderer,
    pub renders: AtomicUsize,
}

impl Default for CountingRenderer {
    fn default() -> Self {
        Self {
            inner: InvoiceRenderer::new("BAYER MANUFACTURING LTD", Arc::new(FixedClock(now()))),
            renders: AtomicUsize::new(0),
        }
    }
}

impl DocumentRenderer for CountingRenderer {
    fn render(&self, layout: LayoutKind, fields: &Fields) -> Result<Vec<u8>, InvoiceError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        self.inner.render(layout, fields)
    }
}

// ── Harness ──────────────────────────────────────────────────────────

pub struct Harness {
    pub wallet: Arc<MockWallet>,
    pub ledger: Arc<MockLedger>,
    pub store: Arc<MockStore>,
    pub renderer: Arc<CountingRenderer>,
    pub page: Page,
}

impl Harness {
    pub fn new(wallet: MockWallet, ledger: MockLedger, store: MockStore) -> Self {
        Self::with_settings(wallet, ledger, store, WorkflowSettings::default())
    }

    pub fn with_settings(wallet: MockWallet, ledger: MockLedger, store: MockStore, settings: WorkflowSettings) -> Self {
        let wallet = Arc::new(wallet);
        let ledger = Arc::new(ledger);
        let store = Arc::new(store);
        let renderer = Arc::new(CountingRenderer::default());
        let page = Page::new(
            wallet.clone(),
            ledger.clone(),
            store.clone(),
            renderer.clone(),
            Arc::new(FixedClock(now())),
            settings,
        );
        Self {
            wallet,
            ledger,
            store,
            renderer,
            page,
        }
    }

    pub fn default_mocks() -> Self {
        Self::new(MockWallet::default(), MockLedger::default(), MockStore::default())
    }

    pub fn orchestrator(&self, kind: FormKind) -> Orchestrator {
        Orchestrator::new(self.page.clone(), kind)
    }

    /// Total remote calls across every seam.
    pub fn remote_calls(&self) -> usize {
        self.wallet.prompts.load(Ordering::SeqCst)
            + self.ledger.read_count()
            + self.ledger.write_count()
            + self.store.upload_count()
    }

    pub fn render_count(&self) -> usize {
        self.renderer.renders.load(Ordering::SeqCst)
    }
}

pub fn snapshot(id: u64, name: &str, price: u64, status: MedicineStatus) -> Medicine {
    Medicine {
        id: MedicineId::from_u64(id),
        prefix: "PCM".into(),
        name: name.into(),
        composition: "acetaminophen".into(),
        description: "tablets".into(),
        manufacturer_date: "2025-01-01".into(),
        expiry_date: "2027-01-01".into(),
        price: U256::from(price),
        current_status: status,
        owner: account(),
        ipfs_hashes: vec![],
    }
}

pub fn values(record: Medicine) -> Vec<DynSolValue> {
    record.into_values().unwrap()
}
