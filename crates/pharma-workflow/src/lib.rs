//! # pharma-workflow -- Workflow Orchestration
//!
//! Sequences the wallet, ledger, document and upload seams for each user
//! action and derives the view state pages render.
//!
//! ## Architecture
//!
//! - [`Page`] holds the page-scoped collaborators. It is passed into every
//!   [`Orchestrator`] explicitly; there is no process-wide session.
//! - [`Orchestrator`] drives one form through the [`StateMachine`]
//!   (`Idle -> Binding -> Submitting -> Settled | Failed`).
//! - [`Trigger`] wraps an orchestrator and drops presses while a
//!   submission is in flight.
//! - `dashboard` adds read-only catalogue, allocation and user queries to
//!   [`Page`].
//!
//! ## Failure policy
//!
//! Nothing is retried. A failed step leaves earlier steps' effects in
//! place (an uploaded document may be left unreferenced) and the user
//! re-runs the whole action. Every remote step is bounded by
//! [`WorkflowSettings::step_timeout`].

pub mod actions;
pub mod dashboard;
pub mod error;
pub mod orchestrator;
pub mod page;
mod pipeline;
pub mod state;
pub mod trigger;
pub mod view;

pub use actions::{Action, Form, FormKind};
pub use error::{ErrorKind, WorkflowError};
pub use orchestrator::{Orchestrator, Outcome};
pub use page::{Page, WorkflowSettings};
pub use state::{StateError, StateMachine, WorkflowState};
pub use trigger::Trigger;
pub use view::{MessageLevel, Settlement, StatusMessage, ViewState};
