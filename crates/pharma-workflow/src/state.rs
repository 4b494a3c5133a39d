//! # Workflow State Machine
//!
//! Every action runs through the same protocol:
//!
//! ```text
//! Idle ──begin()──▶ Binding ──bound()──▶ Submitting ──settle()──▶ Settled
//!   ▲                  │                      │                      │
//!   │                  └──────fail()──────────┴──▶ Failed            │
//!   │                                               │                │
//!   └───────────────────────reset()─────────────────┴────────────────┘
//! ```
//!
//! `Failed` carries the [`ErrorKind`] of the step that failed. A new user
//! action from `Failed` or `Settled` resets to `Idle` first; nothing is
//! retried automatically.
//!
//! Transitions are checked at runtime and every accepted transition is
//! recorded, so tests can assert which states a run passed through.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::error::ErrorKind;

/// The state of one orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum WorkflowState {
    /// Waiting for a user action.
    Idle,
    /// Acquiring the session and contract binding.
    Binding,
    /// Running the action's read/render/upload/write sequence.
    Submitting,
    /// The action completed; view state has been updated.
    Settled,
    /// A step failed.
    Failed(ErrorKind),
}

impl WorkflowState {
    /// Whether an action is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Binding | Self::Submitting)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Binding => "BINDING",
            Self::Submitting => "SUBMITTING",
            Self::Settled => "SETTLED",
            Self::Failed(_) => "FAILED",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(kind) => write!(f, "FAILED({kind})"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Attempted transition is not valid from the current state.
    #[error("invalid workflow transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

/// Runtime-checked state holder with a transition log.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: WorkflowState,
    history: Vec<(WorkflowState, WorkflowState)>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Idle
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Accepted transitions, oldest first.
    pub fn history(&self) -> &[(WorkflowState, WorkflowState)] {
        &self.history
    }

    /// Whether the machine has ever entered `state`.
    pub fn visited(&self, state: WorkflowState) -> bool {
        self.history.iter().any(|(_, to)| *to == state)
    }

    /// Start a user action. Resets a finished run first.
    pub fn begin(&mut self) -> Result<(), StateError> {
        if matches!(self.state, WorkflowState::Settled | WorkflowState::Failed(_)) {
            self.reset()?;
        }
        self.require(WorkflowState::Idle, WorkflowState::Binding)?;
        self.transition(WorkflowState::Binding);
        Ok(())
    }

    /// Session and binding acquired.
    pub fn bound(&mut self) -> Result<(), StateError> {
        self.require(WorkflowState::Binding, WorkflowState::Submitting)?;
        self.transition(WorkflowState::Submitting);
        Ok(())
    }

    /// The action's final step succeeded.
    pub fn settle(&mut self) -> Result<(), StateError> {
        self.require(WorkflowState::Submitting, WorkflowState::Settled)?;
        self.transition(WorkflowState::Settled);
        Ok(())
    }

    /// A step failed during binding or submission.
    pub fn fail(&mut self, kind: ErrorKind) -> Result<(), StateError> {
        let target = WorkflowState::Failed(kind);
        if !self.state.is_busy() {
            return Err(self.invalid(target));
        }
        self.transition(target);
        Ok(())
    }

    /// Return to `Idle` after a finished run.
    pub fn reset(&mut self) -> Result<(), StateError> {
        match self.state {
            WorkflowState::Settled | WorkflowState::Failed(_) => {
                self.transition(WorkflowState::Idle);
                Ok(())
            }
            _ => Err(self.invalid(WorkflowState::Idle)),
        }
    }

    fn require(&self, expected: WorkflowState, target: WorkflowState) -> Result<(), StateError> {
        if self.state != expected {
            return Err(self.invalid(target));
        }
        Ok(())
    }

    fn invalid(&self, target: WorkflowState) -> StateError {
        StateError::InvalidTransition {
            from: self.state.to_string(),
            to: target.to_string(),
        }
    }

    fn transition(&mut self, to: WorkflowState) {
        tracing::trace!(from = %self.state, to = %to, "workflow transition");
        self.history.push((self.state, to));
        self.state = to;
    }
}
