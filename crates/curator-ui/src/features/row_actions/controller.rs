//! Optimistic per-row actions with a time-boxed undo.
//!
//! # Design
//! - The badge swap happens before the request; a failed request restores the
//!   snapshot taken just before it.
//! - A successful action with an `undo_url` arms one token and one toast; the
//!   timer that expires the token also dismisses the toast.
//! - Undo never rolls back locally. The only way back is the reversal request,
//!   followed by a reload because the optimistic DOM change is not reliably reversible.
//! - Each call owns its row; concurrent actions on different rows do not interact.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use curator_api_models::{ActionName, RowActionResponse};
use tracing::{debug, warn};

use crate::core::capabilities::{
    Clock, Navigator, Notifier, Scheduler, ToastHandle, ToastKind, ToastRequest,
};
use crate::core::config::UiConfig;
use crate::core::error::{RowActionError, TransportError, UndoError};
use crate::features::row_actions::actions::{Score, failure_message, marked_message};
use crate::features::undo::{UndoRegistry, UndoTokenId};

/// Text of the toast shown after a successful undo.
pub const UNDONE_MESSAGE: &str = "Action undone";

/// HTTP capability for row and undo requests.
#[async_trait(?Send)]
pub trait RowTransport {
    /// Request `url` asking for a JSON body.
    async fn perform(&self, url: &str) -> Result<RowActionResponse, TransportError>;
    /// Request the reversal target; success is the HTTP status alone.
    async fn revert(&self, url: &str) -> Result<(), TransportError>;
}

/// Badge appearance captured before an optimistic update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSnapshot {
    /// Badge text, when the row has a badge.
    pub badge_label: Option<String>,
    /// Badge class attribute, when the row has a badge.
    pub badge_class: Option<String>,
}

/// The DOM subtree a row action owns.
pub trait RowView {
    /// Capture the current appearance.
    fn snapshot(&self) -> RowSnapshot;
    /// Show `score` on the badge.
    fn apply_score(&self, score: Score);
    /// Dim the row and ignore pointer input while a request is in flight.
    fn set_pending(&self, pending: bool);
    /// Put back an earlier snapshot exactly.
    fn restore(&self, snapshot: &RowSnapshot);
}

/// A row action control that was activated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowActionTrigger {
    /// Action name declared on the control.
    pub action: ActionName,
    /// Target URL declared on the control.
    pub url: String,
}

/// Result of a row action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowActionOutcome {
    /// The server accepted the action.
    Applied {
        /// Token armed for the action, when it is reversible.
        undo: Option<UndoTokenId>,
    },
    /// The request failed and the row was restored.
    Failed(RowActionError),
}

/// Timings used by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowActionSettings {
    /// Undo window; also the undo toast lifetime.
    pub undo_window_ms: u32,
    /// Lifetime of the "Action undone" toast.
    pub undone_toast_ms: u32,
    /// Lifetime of error toasts.
    pub error_toast_ms: u32,
}

impl From<&UiConfig> for RowActionSettings {
    fn from(config: &UiConfig) -> Self {
        Self {
            undo_window_ms: config.undo_window_ms,
            undone_toast_ms: config.undone_toast_ms,
            error_toast_ms: config.error_toast_ms,
        }
    }
}

/// Capabilities the controller drives.
#[derive(Clone)]
pub struct RowActionDeps {
    /// HTTP capability.
    pub transport: Rc<dyn RowTransport>,
    /// Toast capability.
    pub notifier: Rc<dyn Notifier>,
    /// Navigation capability.
    pub navigator: Rc<dyn Navigator>,
    /// Wall clock.
    pub clock: Rc<dyn Clock>,
    /// Background timer.
    pub scheduler: Rc<dyn Scheduler>,
}

/// Row action and undo controller.
pub struct RowActionController {
    deps: RowActionDeps,
    settings: RowActionSettings,
    registry: Rc<RefCell<UndoRegistry>>,
    toasts: Rc<RefCell<HashMap<UndoTokenId, ToastHandle>>>,
}

impl RowActionController {
    /// Build a controller.
    #[must_use]
    pub fn new(deps: RowActionDeps, settings: RowActionSettings) -> Self {
        Self {
            registry: Rc::new(RefCell::new(UndoRegistry::new(u64::from(
                settings.undo_window_ms,
            )))),
            toasts: Rc::new(RefCell::new(HashMap::new())),
            deps,
            settings,
        }
    }

    /// Shared undo registry.
    #[must_use]
    pub fn registry(&self) -> Rc<RefCell<UndoRegistry>> {
        Rc::clone(&self.registry)
    }

    /// Run a row action: optimistic update, request, then undo or rollback.
    pub async fn trigger(
        &self,
        trigger: RowActionTrigger,
        row: Option<Rc<dyn RowView>>,
    ) -> RowActionOutcome {
        let score = Score::from_action(&trigger.action);
        let snapshot = row.as_ref().map(|row| {
            let snapshot = row.snapshot();
            row.set_pending(true);
            row.apply_score(score);
            snapshot
        });
        debug!(action = %trigger.action, url = %trigger.url, "row action submitted");

        match self.deps.transport.perform(&trigger.url).await {
            Ok(response) => {
                if let Some(row) = &row {
                    row.set_pending(false);
                }
                let undo = response
                    .undo_target()
                    .map(|target| self.arm_undo(target, marked_message(&trigger.action)));
                RowActionOutcome::Applied { undo }
            }
            Err(source) => {
                if let (Some(row), Some(snapshot)) = (&row, &snapshot) {
                    row.restore(snapshot);
                    row.set_pending(false);
                }
                let error = RowActionError::Transport { source };
                warn!(action = %trigger.action, error = %error, "row action failed");
                self.deps.notifier.show(ToastRequest::plain(
                    failure_message(&error.user_message()),
                    ToastKind::Error,
                    self.settings.error_toast_ms,
                ));
                RowActionOutcome::Failed(error)
            }
        }
    }

    fn arm_undo(&self, target: &str, description: String) -> UndoTokenId {
        let now = self.deps.clock.now_ms();
        let id = self
            .registry
            .borrow_mut()
            .arm(target, description.clone(), now);
        let handle = self.deps.notifier.show(ToastRequest::with_undo(
            description,
            id,
            self.settings.undo_window_ms,
        ));
        self.toasts.borrow_mut().insert(id, handle);

        let registry = Rc::clone(&self.registry);
        let toasts = Rc::clone(&self.toasts);
        let notifier = Rc::clone(&self.deps.notifier);
        self.deps.scheduler.schedule(
            self.settings.undo_window_ms,
            Box::new(move || {
                registry.borrow_mut().expire(id);
                let handle = toasts.borrow_mut().remove(&id);
                if let Some(handle) = handle {
                    notifier.dismiss(handle);
                }
            }),
        );
        id
    }

    /// Undo control activated for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`UndoError::Expired`], [`UndoError::AlreadyConsumed`], or
    /// [`UndoError::Unknown`] when the token cannot be consumed, and
    /// [`UndoError::Request`] when the reversal request fails. Every error is
    /// also shown to the user.
    pub async fn undo(&self, id: UndoTokenId) -> Result<(), UndoError> {
        let now = self.deps.clock.now_ms();
        let consumed = self.registry.borrow_mut().consume(id, now);
        let handle = self.toasts.borrow_mut().remove(&id);
        if let Some(handle) = handle {
            self.deps.notifier.dismiss(handle);
        }

        let endpoint = match consumed {
            Ok(endpoint) => endpoint,
            Err(err) => {
                warn!(token = id.get(), error = %err, "undo rejected");
                self.show_error(err.to_string());
                return Err(err);
            }
        };

        match self.deps.transport.revert(&endpoint).await {
            Ok(()) => {
                self.deps.notifier.show(ToastRequest::plain(
                    UNDONE_MESSAGE,
                    ToastKind::Success,
                    self.settings.undone_toast_ms,
                ));
                self.deps.navigator.reload();
                Ok(())
            }
            Err(source) => {
                let err = UndoError::Request { source };
                warn!(token = id.get(), error = %err, "undo request failed");
                self.show_error(err.to_string());
                Err(err)
            }
        }
    }

    fn show_error(&self, message: String) {
        self.deps.notifier.show(ToastRequest::plain(
            message,
            ToastKind::Error,
            self.settings.error_toast_ms,
        ));
    }
}
