//! Sequential, category-scoped bulk dispatch.
//!
//! # Design
//! - Confirmation first; a declined prompt leaves no trace.
//! - Categories are submitted one at a time in first-seen order. The first
//!   failure stops the rest and categories already applied stay applied.
//! - Only an explicit `status == "success"` body counts; HTTP success alone does not.
//! - An in-flight flag rejects re-entrant dispatch even when the trigger control
//!   is not the one that started the first call.

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use curator_api_models::{ActionName, BulkActionRequest, BulkActionResponse};
use tracing::{debug, info, warn};

use crate::core::capabilities::{
    ConfirmDialog, Navigator, Notifier, ToastKind, ToastRequest, TriggerControl,
};
use crate::core::config::UiConfig;
use crate::core::error::{DispatchError, TransportError};
use crate::features::selection::SelectionSource;

/// Prefix of the toast shown when a dispatch fails.
pub const ERROR_PREFIX: &str = "An error occurred: ";

/// HTTP capability for the bulk endpoint.
#[async_trait(?Send)]
pub trait BulkTransport {
    /// Submit one category-scoped request and decode the body.
    ///
    /// Non-success HTTP statuses are not errors here as long as the body
    /// decodes; the body decides.
    async fn submit(&self, request: &BulkActionRequest)
    -> Result<BulkActionResponse, TransportError>;
}

/// Result of one `execute` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing was selected; nothing happened.
    NothingSelected,
    /// The user declined the confirmation prompt.
    Declined,
    /// Another dispatch is still running.
    Busy,
    /// Every category succeeded and the page was reloaded.
    Applied {
        /// Categories submitted, in order.
        categories: Vec<String>,
        /// Items submitted across all categories.
        items: usize,
    },
    /// A category failed; later categories were not attempted.
    Failed(DispatchError),
}

/// Dispatcher settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkSettings {
    /// Label shown on the trigger while busy.
    pub loading_label: String,
    /// Lifetime of the failure toast.
    pub error_toast_ms: u32,
}

impl From<&UiConfig> for BulkSettings {
    fn from(config: &UiConfig) -> Self {
        Self {
            loading_label: config.loading_label.clone(),
            error_toast_ms: config.error_toast_ms,
        }
    }
}

/// Capabilities the dispatcher drives.
#[derive(Clone)]
pub struct BulkDeps {
    /// Bulk endpoint client.
    pub transport: Rc<dyn BulkTransport>,
    /// Confirmation prompt.
    pub confirm: Rc<dyn ConfirmDialog>,
    /// Toast capability.
    pub notifier: Rc<dyn Notifier>,
    /// Navigation capability.
    pub navigator: Rc<dyn Navigator>,
}

/// Prompt text: action label and selected count.
#[must_use]
pub fn confirmation_message(action: &ActionName, count: usize) -> String {
    format!(
        "Are you sure you want to {} for {count} items?",
        action.display_label()
    )
}

/// Bulk action dispatcher.
pub struct BulkDispatcher {
    deps: BulkDeps,
    settings: BulkSettings,
    in_flight: Cell<bool>,
}

impl BulkDispatcher {
    /// Build a dispatcher.
    #[must_use]
    pub const fn new(deps: BulkDeps, settings: BulkSettings) -> Self {
        Self {
            deps,
            settings,
            in_flight: Cell::new(false),
        }
    }

    /// Whether a dispatch is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    /// Apply `action` to every selected row.
    pub async fn execute(
        &self,
        action: &ActionName,
        source: &dyn SelectionSource,
        control: &dyn TriggerControl,
    ) -> DispatchOutcome {
        if self.in_flight.get() {
            debug!(action = %action, "bulk dispatch ignored while busy");
            return DispatchOutcome::Busy;
        }
        let count = source.selected_group().item_count();
        if count == 0 {
            return DispatchOutcome::NothingSelected;
        }

        self.in_flight.set(true);
        let outcome = self.run(action, count, source, control).await;
        self.in_flight.set(false);
        outcome
    }

    async fn run(
        &self,
        action: &ActionName,
        count: usize,
        source: &dyn SelectionSource,
        control: &dyn TriggerControl,
    ) -> DispatchOutcome {
        let prompt = confirmation_message(action, count);
        if !self.deps.confirm.confirm(&prompt).await {
            debug!(action = %action, "bulk dispatch declined");
            return DispatchOutcome::Declined;
        }

        control.enter_loading(&self.settings.loading_label);

        // The prompt may have been open across a re-render.
        let group = source.selected_group();
        if group.is_empty() {
            control.restore();
            return DispatchOutcome::NothingSelected;
        }

        for (category, ids) in group.iter() {
            let request = BulkActionRequest {
                media_type: category.to_string(),
                ids: ids.to_vec(),
                action: action.clone(),
            };
            debug!(action = %action, category, items = ids.len(), "bulk category submitted");
            if let Err(err) = self.submit(request).await {
                warn!(action = %action, category = err.category(), error = %err, "bulk dispatch failed");
                control.restore();
                self.deps.notifier.show(ToastRequest::plain(
                    format!("{ERROR_PREFIX}{}", err.user_message()),
                    ToastKind::Error,
                    self.settings.error_toast_ms,
                ));
                return DispatchOutcome::Failed(err);
            }
        }

        let categories: Vec<String> = group.categories().into_iter().map(str::to_string).collect();
        info!(action = %action, categories = categories.len(), items = group.item_count(), "bulk dispatch applied");
        self.deps.navigator.reload();
        DispatchOutcome::Applied {
            categories,
            items: group.item_count(),
        }
    }

    async fn submit(&self, request: BulkActionRequest) -> Result<(), DispatchError> {
        let response = self
            .deps
            .transport
            .submit(&request)
            .await
            .map_err(|source| DispatchError::Transport {
                category: request.media_type.clone(),
                source,
            })?;
        response
            .into_ack()
            .map(|_| ())
            .map_err(|err| DispatchError::Rejected {
                category: request.media_type,
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::core::error::NETWORK_FAILURE;
    use crate::core::testing::{
        RecordingControl, RecordingNavigator, RecordingNotifier, ScriptedBulkTransport,
        ScriptedConfirm,
    };
    use crate::features::selection::{RowHandle, SelectionModel};

    struct Harness {
        dispatcher: BulkDispatcher,
        transport: Rc<ScriptedBulkTransport>,
        confirm: Rc<ScriptedConfirm>,
        notifier: Rc<RecordingNotifier>,
        navigator: Rc<RecordingNavigator>,
        control: RecordingControl,
    }

    fn harness(confirm: bool) -> Harness {
        harness_with(ScriptedConfirm::answering(confirm))
    }

    fn harness_with(confirm: ScriptedConfirm) -> Harness {
        let transport = Rc::new(ScriptedBulkTransport::default());
        let confirm = Rc::new(confirm);
        let notifier = Rc::new(RecordingNotifier::default());
        let navigator = Rc::new(RecordingNavigator::default());
        let deps = BulkDeps {
            transport: transport.clone(),
            confirm: confirm.clone(),
            notifier: notifier.clone(),
            navigator: navigator.clone(),
        };
        Harness {
            dispatcher: BulkDispatcher::new(deps, BulkSettings::from(&UiConfig::default())),
            transport,
            confirm,
            notifier,
            navigator,
            control: RecordingControl::default(),
        }
    }

    fn selection() -> SelectionModel {
        let mut model = SelectionModel::new();
        model.resync(vec![
            RowHandle::new(1, "movie").with_selected(true),
            RowHandle::new(3, "show").with_selected(true),
            RowHandle::new(2, "movie").with_selected(true),
            RowHandle::new(4, "movie"),
        ]);
        model
    }

    fn success() -> Result<BulkActionResponse, TransportError> {
        Ok(BulkActionResponse {
            status: Some("success".into()),
            ..BulkActionResponse::default()
        })
    }

    #[tokio::test]
    async fn categories_run_in_first_seen_order_then_reload() {
        let h = harness(true);
        h.transport.push(success());
        h.transport.push(success());
        let action = ActionName::from(ActionName::KEEP);

        let outcome = h.dispatcher.execute(&action, &selection(), &h.control).await;

        assert_eq!(
            outcome,
            DispatchOutcome::Applied {
                categories: vec!["movie".into(), "show".into()],
                items: 3,
            }
        );
        let requests = h.transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].media_type, "movie");
        assert_eq!(requests[0].ids, vec![1, 2]);
        assert_eq!(requests[1].media_type, "show");
        assert_eq!(requests[1].ids, vec![3]);
        assert_eq!(h.navigator.reloads(), 1);
        assert_eq!(h.control.loading_labels(), vec!["Processing...".to_string()]);
        assert_eq!(h.control.restores(), 0);
        assert_eq!(
            h.confirm.prompts(),
            vec!["Are you sure you want to keep for 3 items?".to_string()]
        );
        assert!(!h.dispatcher.is_busy());
    }

    #[tokio::test]
    async fn first_failure_halts_remaining_categories() {
        let h = harness(true);
        h.transport.push(Ok(BulkActionResponse {
            status: Some("error".into()),
            message: Some("Invalid media type".into()),
            ..BulkActionResponse::default()
        }));
        h.transport.push(success());
        let action = ActionName::from(ActionName::DELETE);

        let outcome = h.dispatcher.execute(&action, &selection(), &h.control).await;

        let DispatchOutcome::Failed(err) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(err.category(), "movie");
        assert_eq!(h.transport.requests().len(), 1);
        assert_eq!(h.navigator.reloads(), 0);
        assert_eq!(h.control.restores(), 1);
        let shown = h.notifier.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].message, "An error occurred: Invalid media type");
        assert_eq!(shown[0].kind, ToastKind::Error);
    }

    #[tokio::test]
    async fn network_and_malformed_failures_abort() {
        let h = harness(true);
        h.transport.push(Err(TransportError::network("offline")));
        let action = ActionName::from(ActionName::KEEP);
        let outcome = h.dispatcher.execute(&action, &selection(), &h.control).await;
        assert!(matches!(outcome, DispatchOutcome::Failed(DispatchError::Transport { .. })));
        assert_eq!(
            h.notifier.shown()[0].message,
            format!("{ERROR_PREFIX}{NETWORK_FAILURE}")
        );

        h.transport.push(Ok(BulkActionResponse::default()));
        let outcome = h.dispatcher.execute(&action, &selection(), &h.control).await;
        let DispatchOutcome::Failed(err) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(err.user_message(), "Unknown error");
        assert_eq!(h.navigator.reloads(), 0);
        assert!(!h.dispatcher.is_busy());
    }

    #[tokio::test]
    async fn declined_confirmation_has_no_side_effects() {
        let h = harness(false);
        let action = ActionName::from(ActionName::KEEP);
        let outcome = h.dispatcher.execute(&action, &selection(), &h.control).await;
        assert_eq!(outcome, DispatchOutcome::Declined);
        assert!(h.transport.requests().is_empty());
        assert!(h.control.loading_labels().is_empty());
        assert!(h.notifier.shown().is_empty());
    }

    #[tokio::test]
    async fn empty_selection_is_a_silent_no_op() {
        let h = harness(true);
        let action = ActionName::from(ActionName::KEEP);
        let outcome = h
            .dispatcher
            .execute(&action, &SelectionModel::new(), &h.control)
            .await;
        assert_eq!(outcome, DispatchOutcome::NothingSelected);
        assert!(h.confirm.prompts().is_empty());
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn second_dispatch_while_prompt_open_is_busy() {
        let h = harness_with(ScriptedConfirm::yielding(true));
        h.transport.push(success());
        h.transport.push(success());
        let action = ActionName::from(ActionName::KEEP);
        let selection = selection();
        let other_control = RecordingControl::default();

        let (first, second) = tokio::join!(
            h.dispatcher.execute(&action, &selection, &h.control),
            h.dispatcher.execute(&action, &selection, &other_control),
        );

        assert!(matches!(first, DispatchOutcome::Applied { items: 3, .. }));
        assert_eq!(second, DispatchOutcome::Busy);
        assert_eq!(h.confirm.prompts().len(), 1);
        assert_eq!(h.transport.requests().len(), 2);
        assert!(other_control.loading_labels().is_empty());
        assert_eq!(other_control.restores(), 0);
        assert!(!h.dispatcher.is_busy());
    }

    #[tokio::test]
    async fn selection_emptied_while_prompt_open_aborts() {
        let source = Rc::new(RefCell::new(selection()));
        let confirm = ScriptedConfirm::answering(true);
        let rerendered = Rc::clone(&source);
        confirm.while_open(move || {
            rerendered.borrow_mut().resync(Vec::new());
        });
        let h = harness_with(confirm);
        let action = ActionName::from(ActionName::DELETE);

        let outcome = h.dispatcher.execute(&action, &*source, &h.control).await;

        assert_eq!(outcome, DispatchOutcome::NothingSelected);
        assert_eq!(h.confirm.prompts().len(), 1);
        assert_eq!(h.control.loading_labels().len(), 1);
        assert_eq!(h.control.restores(), 1);
        assert!(h.transport.requests().is_empty());
        assert!(h.notifier.shown().is_empty());
        assert_eq!(h.navigator.reloads(), 0);
        assert!(!h.dispatcher.is_busy());
    }

    #[test]
    fn prompt_names_action_and_count() {
        assert_eq!(
            confirmation_message(&ActionName::from(ActionName::RESET_GRACE_PERIOD), 12),
            "Are you sure you want to reset grace period for 12 items?"
        );
    }
}
