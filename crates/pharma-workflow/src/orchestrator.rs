//! # Workflow Orchestrator
//!
//! One orchestrator per page form. [`Orchestrator::submit`] runs the
//! form's action through the state machine:
//!
//! 1. Validate the form locally. An invalid form is rejected with zero
//!    remote calls and the machine stays `Idle`.
//! 2. `Binding`: bind the session and resolve the contract.
//! 3. `Submitting`: run the action's ordered sequence.
//! 4. `Settled` (view updated, form cleared) or `Failed(kind)` (message
//!    shown, form kept).
//!
//! Errors never escape `submit`; they become an [`Outcome`] and a status
//! message on the [`ViewState`].

use serde::Serialize;

use crate::actions::FormKind;
use crate::error::{ErrorKind, WorkflowError};
use crate::page::Page;
use crate::pipeline;
use crate::state::{StateError, StateMachine, WorkflowState};
use crate::view::ViewState;

/// Result of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum Outcome {
    /// The action completed.
    Settled,
    /// A remote step failed; the machine is in `Failed`.
    Failed(ErrorKind),
    /// Refused before any remote call (invalid form, or busy).
    Rejected(ErrorKind),
}

/// Page-level controller for one form.
#[derive(Debug)]
pub struct Orchestrator {
    page: Page,
    kind: FormKind,
    machine: StateMachine,
    view: ViewState,
}

impl Orchestrator {
    pub fn new(page: Page, kind: FormKind) -> Self {
        Self {
            page,
            kind,
            machine: StateMachine::new(),
            view: ViewState::new(),
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn state(&self) -> WorkflowState {
        self.machine.state()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Run the current form's action. A finished run is cleared first, so
    /// a rejected form leaves the machine idle.
    pub async fn submit(&mut self) -> Outcome {
        if matches!(self.machine.state(), WorkflowState::Settled | WorkflowState::Failed(_)) {
            log_transition(self.machine.reset());
        }

        let action = match self.kind.parse(self.view.form()) {
            Ok(action) => action,
            Err(e) => {
                tracing::debug!(form = %self.kind, error = %e, "form rejected");
                self.view.show_error(self.kind, &e);
                return Outcome::Rejected(e.kind());
            }
        };

        if let Err(e) = self.machine.begin() {
            tracing::warn!(form = %self.kind, error = %e, "submission while busy");
            self.view.show_error(self.kind, &WorkflowError::Busy);
            return Outcome::Rejected(ErrorKind::Busy);
        }

        let (session, binding) = match self.page.bind(self.kind.contract()).await {
            Ok(bound) => bound,
            Err(e) => return self.fail(e),
        };
        log_transition(self.machine.bound());

        tracing::debug!(form = %self.kind, account = %session.account, "submitting");
        match pipeline::execute(&self.page, &session, &binding, action).await {
            Ok(settlement) => {
                log_transition(self.machine.settle());
                self.view.apply(settlement);
                log_transition(self.machine.reset());
                Outcome::Settled
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: WorkflowError) -> Outcome {
        let kind = error.kind();
        tracing::warn!(form = %self.kind, kind = %kind, error = %error, "workflow failed");
        log_transition(self.machine.fail(kind));
        self.view.show_error(self.kind, &error);
        Outcome::Failed(kind)
    }
}

// Transitions inside `submit` follow the protocol; a rejection is only logged.
fn log_transition(result: Result<(), StateError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "unexpected workflow transition");
    }
}
