//! # View State
//!
//! Page-local state the renderer draws from: the form being edited, the
//! last-known status per record, and what the last action produced.
//! Nothing here outlives the page.

use std::collections::BTreeMap;

use pharma_client::Medicine;
use pharma_core::{ContentId, MedicineId, MedicineStatus, Route, TxHash};
use serde::Serialize;

use crate::actions::{Form, FormKind};
use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
}

/// The banner shown after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// What a successful action hands back to the view. `record` is only set
/// from a read taken after the action's write, so its status is current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    pub message: String,
    pub transaction: Option<TxHash>,
    pub content: Option<ContentId>,
    pub document_link: Option<String>,
    pub record: Option<Medicine>,
    pub status: Option<(MedicineId, MedicineStatus)>,
    pub redirect: Option<Route>,
    pub qr_payload: Option<String>,
}

impl Settlement {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(skip)]
    form: Form,
    statuses: BTreeMap<MedicineId, MedicineStatus>,
    message: Option<StatusMessage>,
    last_transaction: Option<TxHash>,
    last_content: Option<ContentId>,
    document_link: Option<String>,
    record: Option<Medicine>,
    redirect: Option<Route>,
    qr_payload: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    pub fn status_of(&self, id: &MedicineId) -> Option<&MedicineStatus> {
        self.statuses.get(id)
    }

    pub fn statuses(&self) -> &BTreeMap<MedicineId, MedicineStatus> {
        &self.statuses
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn last_transaction(&self) -> Option<&TxHash> {
        self.last_transaction.as_ref()
    }

    pub fn last_content(&self) -> Option<&ContentId> {
        self.last_content.as_ref()
    }

    pub fn document_link(&self) -> Option<&str> {
        self.document_link.as_deref()
    }

    pub fn record(&self) -> Option<&Medicine> {
        self.record.as_ref()
    }

    pub fn redirect(&self) -> Option<Route> {
        self.redirect
    }

    pub fn qr_payload(&self) -> Option<&str> {
        self.qr_payload.as_deref()
    }

    /// Fold a settled action in and clear the form. Everything the last
    /// action produced is replaced; only known statuses carry over.
    pub(crate) fn apply(&mut self, settlement: Settlement) {
        if let Some((id, status)) = settlement.status {
            self.statuses.insert(id, status);
        }
        if let Some(record) = &settlement.record {
            self.statuses.insert(record.id.clone(), record.current_status.clone());
        }
        self.message = Some(StatusMessage {
            level: MessageLevel::Success,
            text: settlement.message,
        });
        self.last_transaction = settlement.transaction;
        self.last_content = settlement.content;
        self.document_link = settlement.document_link;
        self.record = settlement.record;
        self.redirect = settlement.redirect;
        self.qr_payload = settlement.qr_payload;
        self.form.clear();
    }

    /// Show a failure. The form is kept so the user can correct and resubmit.
    pub(crate) fn show_error(&mut self, kind: FormKind, error: &WorkflowError) {
        self.message = Some(StatusMessage {
            level: MessageLevel::Error,
            text: format!("{}: {}", kind.failure_prefix(), error.user_message()),
        });
        self.redirect = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_records_status_and_clears_form() {
        let mut view = ViewState::new();
        view.form_mut().set("medicineId", "7");
        let id = MedicineId::from_u64(7);
        view.apply(Settlement {
            status: Some((id.clone(), MedicineStatus::QualityChecked)),
            ..Settlement::message("done")
        });
        assert!(view.form().is_empty());
        assert_eq!(view.status_of(&id), Some(&MedicineStatus::QualityChecked));
        assert_eq!(view.message().unwrap().level, MessageLevel::Success);
    }

    #[test]
    fn each_settlement_replaces_the_last_outputs() {
        let mut view = ViewState::new();
        let id = MedicineId::from_u64(7);
        view.apply(Settlement {
            content: Some(ContentId::new("QmInvoice").unwrap()),
            document_link: Some("http://localhost:8080/ipfs/QmInvoice".into()),
            status: Some((id.clone(), MedicineStatus::QualityChecked)),
            ..Settlement::message("allocated")
        });
        view.apply(Settlement::message("shipped"));

        assert!(view.document_link().is_none());
        assert!(view.last_content().is_none());
        assert!(view.last_transaction().is_none());
        assert_eq!(view.status_of(&id), Some(&MedicineStatus::QualityChecked));
        assert_eq!(view.message().unwrap().text, "shipped");
    }

    #[test]
    fn error_keeps_form() {
        let mut view = ViewState::new();
        view.form_mut().set("medicineId", "7");
        view.show_error(FormKind::Verify, &WorkflowError::UserRejectedTransaction);
        assert!(!view.form().is_empty());
        let msg = view.message().unwrap();
        assert_eq!(msg.level, MessageLevel::Error);
        assert!(msg.text.starts_with("Failed to verify IPFS hashes: "));
    }

    #[test]
    fn serializes_without_form() {
        let mut view = ViewState::new();
        view.form_mut().set("password", "hunter2");
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
