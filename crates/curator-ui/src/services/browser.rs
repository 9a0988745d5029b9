//! Window-backed clock, timers, dialogs, and navigation.

use async_trait::async_trait;
use gloo::console;
use gloo::utils::window;
use gloo_timers::callback::Timeout;

use crate::core::capabilities::{Clock, ConfirmDialog, Millis, Navigator, Scheduler};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BrowserClock;

impl Clock for BrowserClock {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now_ms(&self) -> Millis {
        js_sys::Date::now() as Millis
    }
}

/// Plain `setTimeout`; it keeps firing while the tab is hidden.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TimerScheduler;

impl Scheduler for TimerScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        Timeout::new(delay_ms, task).forget();
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LocationNavigator;

impl Navigator for LocationNavigator {
    fn reload(&self) {
        if let Err(err) = window().location().reload() {
            console::error!("page reload failed", err);
        }
    }

    fn replace(&self, url: &str) {
        if let Err(err) = window().location().replace(url) {
            console::error!("location replace failed", url, err);
        }
    }

    fn assign(&self, url: &str) {
        if let Err(err) = window().location().assign(url) {
            console::error!("location assign failed", url, err);
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct NativeConfirm;

#[async_trait(?Send)]
impl ConfirmDialog for NativeConfirm {
    async fn confirm(&self, message: &str) -> bool {
        gloo::dialogs::confirm(message)
    }
}
