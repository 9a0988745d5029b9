//! In-memory capability fakes shared by controller tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use curator_api_models::{BulkActionRequest, BulkActionResponse, RowActionResponse};

use crate::core::capabilities::{
    Clock, ConfirmDialog, Millis, Navigator, Notifier, Scheduler, ToastHandle, ToastRequest,
    TriggerControl,
};
use crate::core::error::{StorageError, TransportError};
use crate::core::logging::LineSink;
use crate::features::bulk::BulkTransport;
use crate::features::preferences::PreferenceStorage;
use crate::features::row_actions::{RowSnapshot, RowTransport, RowView, Score};

/// Log sink that keeps every line.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingLines {
    lines: Arc<Mutex<Vec<(tracing::Level, String)>>>,
}

impl RecordingLines {
    pub(crate) fn lines(&self) -> Vec<(tracing::Level, String)> {
        self.lines.lock().unwrap().clone()
    }
}

impl LineSink for RecordingLines {
    fn write_line(&self, level: tracing::Level, line: &str) {
        self.lines.lock().unwrap().push((level, line.to_string()));
    }
}

fn unscripted() -> TransportError {
    TransportError::network("no scripted response")
}

#[derive(Default)]
pub(crate) struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    pub(crate) fn advance(&self, by: Millis) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

#[derive(Default)]
pub(crate) struct ManualScheduler {
    tasks: RefCell<Vec<(u32, Box<dyn FnOnce()>)>>,
}

impl ManualScheduler {
    pub(crate) fn delays(&self) -> Vec<u32> {
        self.tasks.borrow().iter().map(|(delay, _)| *delay).collect()
    }

    pub(crate) fn run_all(&self) {
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        for (_, task) in tasks {
            task();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        self.tasks.borrow_mut().push((delay_ms, task));
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    next: Cell<u64>,
    shown: RefCell<Vec<ToastRequest>>,
    dismissed: RefCell<Vec<ToastHandle>>,
}

impl RecordingNotifier {
    pub(crate) fn shown(&self) -> Vec<ToastRequest> {
        self.shown.borrow().clone()
    }

    pub(crate) fn dismissed(&self) -> Vec<ToastHandle> {
        self.dismissed.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, toast: ToastRequest) -> ToastHandle {
        let handle = ToastHandle(self.next.get());
        self.next.set(handle.0 + 1);
        self.shown.borrow_mut().push(toast);
        handle
    }

    fn dismiss(&self, handle: ToastHandle) {
        self.dismissed.borrow_mut().push(handle);
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    reloads: Cell<usize>,
    replaced: RefCell<Vec<String>>,
    assigned: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn reloads(&self) -> usize {
        self.reloads.get()
    }

    pub(crate) fn replaced(&self) -> Vec<String> {
        self.replaced.borrow().clone()
    }

    pub(crate) fn assigned(&self) -> Vec<String> {
        self.assigned.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    fn replace(&self, url: &str) {
        self.replaced.borrow_mut().push(url.to_string());
    }

    fn assign(&self, url: &str) {
        self.assigned.borrow_mut().push(url.to_string());
    }
}

pub(crate) struct ScriptedConfirm {
    answer: bool,
    yields: bool,
    prompts: RefCell<Vec<String>>,
    while_open: RefCell<Option<Box<dyn Fn()>>>,
}

impl ScriptedConfirm {
    pub(crate) fn answering(answer: bool) -> Self {
        Self {
            answer,
            yields: false,
            prompts: RefCell::new(Vec::new()),
            while_open: RefCell::new(None),
        }
    }

    /// Suspends once before answering, like a dialog awaiting the user.
    pub(crate) fn yielding(answer: bool) -> Self {
        Self {
            yields: true,
            ..Self::answering(answer)
        }
    }

    /// Run `hook` while the prompt is open.
    pub(crate) fn while_open(&self, hook: impl Fn() + 'static) {
        *self.while_open.borrow_mut() = Some(Box::new(hook));
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ConfirmDialog for ScriptedConfirm {
    async fn confirm(&self, message: &str) -> bool {
        self.prompts.borrow_mut().push(message.to_string());
        if let Some(hook) = self.while_open.borrow().as_ref() {
            hook();
        }
        if self.yields {
            tokio::task::yield_now().await;
        }
        self.answer
    }
}

#[derive(Default)]
pub(crate) struct RecordingControl {
    loading: RefCell<Vec<String>>,
    restores: Cell<usize>,
}

impl RecordingControl {
    pub(crate) fn loading_labels(&self) -> Vec<String> {
        self.loading.borrow().clone()
    }

    pub(crate) fn restores(&self) -> usize {
        self.restores.get()
    }
}

impl TriggerControl for RecordingControl {
    fn enter_loading(&self, label: &str) {
        self.loading.borrow_mut().push(label.to_string());
    }

    fn restore(&self) {
        self.restores.set(self.restores.get() + 1);
    }
}

#[derive(Default)]
pub(crate) struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
    fail_reads: Cell<bool>,
}

impl MemoryStorage {
    pub(crate) fn insert(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }
}

impl PreferenceStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::Unavailable {
                detail: "storage disabled".to_string(),
            });
        }
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert(key, value);
        Ok(())
    }
}

/// Row whose badge lives in memory.
pub(crate) struct FakeRow {
    badge: RefCell<RowSnapshot>,
    pending: RefCell<Vec<bool>>,
}

impl FakeRow {
    pub(crate) fn with_badge(label: &str, class: &str) -> Self {
        Self {
            badge: RefCell::new(RowSnapshot {
                badge_label: Some(label.to_string()),
                badge_class: Some(class.to_string()),
            }),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.borrow().last().copied().unwrap_or(false)
    }

    pub(crate) fn pending_history(&self) -> Vec<bool> {
        self.pending.borrow().clone()
    }
}

impl RowView for FakeRow {
    fn snapshot(&self) -> RowSnapshot {
        self.badge.borrow().clone()
    }

    fn apply_score(&self, score: Score) {
        *self.badge.borrow_mut() = RowSnapshot {
            badge_label: Some(score.label().to_string()),
            badge_class: Some(score.badge_class()),
        };
    }

    fn set_pending(&self, pending: bool) {
        self.pending.borrow_mut().push(pending);
    }

    fn restore(&self, snapshot: &RowSnapshot) {
        *self.badge.borrow_mut() = snapshot.clone();
    }
}

#[derive(Default)]
pub(crate) struct ScriptedBulkTransport {
    responses: RefCell<VecDeque<Result<BulkActionResponse, TransportError>>>,
    requests: RefCell<Vec<BulkActionRequest>>,
}

impl ScriptedBulkTransport {
    pub(crate) fn push(&self, response: Result<BulkActionResponse, TransportError>) {
        self.responses.borrow_mut().push_back(response);
    }

    pub(crate) fn requests(&self) -> Vec<BulkActionRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl BulkTransport for ScriptedBulkTransport {
    async fn submit(
        &self,
        request: &BulkActionRequest,
    ) -> Result<BulkActionResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted()))
    }
}

#[derive(Default)]
pub(crate) struct ScriptedRowTransport {
    performs: RefCell<VecDeque<Result<RowActionResponse, TransportError>>>,
    reverts: RefCell<VecDeque<Result<(), TransportError>>>,
    performed: RefCell<Vec<String>>,
    reverted: RefCell<Vec<String>>,
    observer: RefCell<Option<Box<dyn Fn() -> String>>>,
    observed: RefCell<Vec<String>>,
}

impl ScriptedRowTransport {
    pub(crate) fn push_perform(&self, response: Result<RowActionResponse, TransportError>) {
        self.performs.borrow_mut().push_back(response);
    }

    pub(crate) fn push_revert(&self, response: Result<(), TransportError>) {
        self.reverts.borrow_mut().push_back(response);
    }

    /// Record `observer()` whenever a row action request is issued.
    pub(crate) fn on_perform(&self, observer: impl Fn() -> String + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(observer));
    }

    pub(crate) fn labels_at_request(&self) -> Vec<String> {
        self.observed.borrow().clone()
    }

    pub(crate) fn performed(&self) -> Vec<String> {
        self.performed.borrow().clone()
    }

    pub(crate) fn reverted(&self) -> Vec<String> {
        self.reverted.borrow().clone()
    }
}

#[async_trait(?Send)]
impl RowTransport for ScriptedRowTransport {
    async fn perform(&self, url: &str) -> Result<RowActionResponse, TransportError> {
        self.performed.borrow_mut().push(url.to_string());
        if let Some(observer) = self.observer.borrow().as_ref() {
            self.observed.borrow_mut().push(observer());
        }
        self.performs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted()))
    }

    async fn revert(&self, url: &str) -> Result<(), TransportError> {
        self.reverted.borrow_mut().push(url.to_string());
        self.reverts
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(unscripted()))
    }
}
