//! Browser capabilities consumed by the DOM-free controllers.
//!
//! # Design
//! - Everything the controllers need from the page (dialogs, toasts, timers,
//!   navigation) sits behind a small trait so the state machines run natively in tests.
//! - The UI thread is single-threaded, so async traits are `?Send` and shared
//!   handles are `Rc`.

use async_trait::async_trait;

use crate::features::undo::UndoTokenId;

/// Milliseconds since the Unix epoch.
pub type Millis = u64;

/// Wall clock used for undo deadlines.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> Millis;
}

/// Background timer. Tasks fire whether or not the tab is visible.
pub trait Scheduler {
    /// Run `task` once after `delay_ms`.
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>);
}

/// Confirmation prompt shown before destructive bulk work.
#[async_trait(?Send)]
pub trait ConfirmDialog {
    /// Ask the user; `true` means proceed.
    async fn confirm(&self, message: &str) -> bool;
}

/// Page-level navigation.
pub trait Navigator {
    /// Reload the current page so every row reflects server state.
    fn reload(&self);
    /// Navigate to `url` replacing the current history entry.
    fn replace(&self, url: &str);
    /// Navigate to `url` with a new history entry.
    fn assign(&self, url: &str);
}

/// Toast severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    /// Informational toast, also used for undo prompts.
    Info,
    /// Success toast.
    Success,
    /// Error toast.
    Error,
}

/// Opaque handle to a visible toast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastHandle(pub u64);

/// Toast request handed to a [`Notifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToastRequest {
    /// Display text.
    pub message: String,
    /// Severity.
    pub kind: ToastKind,
    /// Auto-dismiss delay.
    pub duration_ms: u32,
    /// Undo affordance to render next to the text.
    pub undo: Option<UndoTokenId>,
}

impl ToastRequest {
    /// Plain toast without an undo control.
    #[must_use]
    pub fn plain(message: impl Into<String>, kind: ToastKind, duration_ms: u32) -> Self {
        Self {
            message: message.into(),
            kind,
            duration_ms,
            undo: None,
        }
    }

    /// Toast carrying an undo control bound to `token`.
    #[must_use]
    pub fn with_undo(message: impl Into<String>, token: UndoTokenId, duration_ms: u32) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Info,
            duration_ms,
            undo: Some(token),
        }
    }
}

/// Toast rendering primitive: `show(text, options) -> handle`.
pub trait Notifier {
    /// Display a toast.
    fn show(&self, toast: ToastRequest) -> ToastHandle;
    /// Remove a toast early. Unknown handles are ignored.
    fn dismiss(&self, handle: ToastHandle);
}

/// Control that started a long-running operation (e.g. a bulk action button).
pub trait TriggerControl {
    /// Disable the control and swap its label.
    fn enter_loading(&self, label: &str);
    /// Restore the label and enabled state captured by [`Self::enter_loading`].
    fn restore(&self);
}
