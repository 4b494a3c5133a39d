//! # Duplicate-Submission Guard
//!
//! A [`Trigger`] is the control a user presses. While a submission it
//! started is in flight, further presses are ignored: they return
//! [`Outcome::Rejected`] with [`ErrorKind::Busy`] and make no remote call.
//! The view disables the control whenever [`Trigger::is_enabled`] is false.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::ErrorKind;
use crate::orchestrator::{Orchestrator, Outcome};
use crate::view::ViewState;

#[derive(Debug, Clone)]
pub struct Trigger {
    inner: Arc<Mutex<Orchestrator>>,
}

impl Trigger {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(orchestrator)),
        }
    }

    /// Whether a press would start a submission.
    pub fn is_enabled(&self) -> bool {
        self.inner.try_lock().is_ok()
    }

    /// Press the control.
    pub async fn fire(&self) -> Outcome {
        let Ok(mut orchestrator) = self.inner.try_lock() else {
            tracing::debug!("trigger pressed while a submission is in flight; ignored");
            return Outcome::Rejected(ErrorKind::Busy);
        };
        orchestrator.submit().await
    }

    /// Edit or inspect the view once no submission is in flight.
    pub async fn with_view<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let mut orchestrator = self.inner.lock().await;
        f(orchestrator.view_mut())
    }
}
