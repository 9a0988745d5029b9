//! Toast host backed by a yewdux store.
//!
//! # Design
//! - Controllers talk to [`StoreNotifier`]; the host only renders the store.
//! - Every toast auto-dismisses after its own duration; early dismissal is idempotent.

use std::cell::Cell;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use yew::prelude::*;
use yewdux::prelude::{Dispatch, use_selector};
use yewdux::store::Store;

use crate::core::capabilities::{Notifier, ToastHandle, ToastKind, ToastRequest};
use crate::features::undo::UndoTokenId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ToastEntry {
    pub handle: ToastHandle,
    pub request: ToastRequest,
}

/// Toasts currently on screen, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Store)]
pub(crate) struct ToastStore {
    pub toasts: Vec<ToastEntry>,
}

impl ToastStore {
    fn remove(&mut self, handle: ToastHandle) {
        self.toasts.retain(|entry| entry.handle != handle);
    }
}

#[derive(Clone)]
pub(crate) struct StoreNotifier {
    dispatch: Dispatch<ToastStore>,
    next: Rc<Cell<u64>>,
}

impl StoreNotifier {
    pub(crate) fn new() -> Self {
        Self {
            dispatch: Dispatch::<ToastStore>::new(),
            next: Rc::new(Cell::new(1)),
        }
    }
}

impl Notifier for StoreNotifier {
    fn show(&self, toast: ToastRequest) -> ToastHandle {
        let handle = ToastHandle(self.next.get());
        self.next.set(handle.0 + 1);
        let duration = toast.duration_ms;
        self.dispatch.reduce_mut(move |store| {
            store.toasts.push(ToastEntry {
                handle,
                request: toast,
            });
        });
        let dispatch = self.dispatch.clone();
        Timeout::new(duration, move || {
            dispatch.reduce_mut(|store| store.remove(handle));
        })
        .forget();
        handle
    }

    fn dismiss(&self, handle: ToastHandle) {
        self.dispatch.reduce_mut(|store| store.remove(handle));
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct ToastHostProps {
    pub on_undo: Callback<UndoTokenId>,
    #[prop_or_default]
    pub class: Classes,
}

#[function_component(ToastHost)]
pub(crate) fn toast_host(props: &ToastHostProps) -> Html {
    let toasts = use_selector(|store: &ToastStore| store.toasts.clone());
    let on_dismiss = Callback::from(|handle: ToastHandle| {
        Dispatch::<ToastStore>::new().reduce_mut(|store| store.remove(handle));
    });

    html! {
        <div class={classes!("toast-host", props.class.clone())} aria-live="polite" aria-atomic="true">
            {for toasts.iter().map(|entry| render_toast(entry, &on_dismiss, &props.on_undo))}
        </div>
    }
}

fn render_toast(
    entry: &ToastEntry,
    on_dismiss: &Callback<ToastHandle>,
    on_undo: &Callback<UndoTokenId>,
) -> Html {
    let class = match entry.request.kind {
        ToastKind::Info => "info",
        ToastKind::Success => "success",
        ToastKind::Error => "error",
    };
    let handle = entry.handle;
    let on_close = {
        let on_dismiss = on_dismiss.clone();
        Callback::from(move |_| on_dismiss.emit(handle))
    };
    let undo = entry.request.undo.map(|token| {
        let on_undo = on_undo.clone();
        let onclick = Callback::from(move |_| on_undo.emit(token));
        html! { <button class="undo" onclick={onclick}>{"Undo"}</button> }
    });

    html! {
        <div class={classes!("toast", class)} role="status">
            <span>{entry.request.message.clone()}</span>
            {for undo}
            <button class="ghost" aria-label="Dismiss" onclick={on_close}>{"✕"}</button>
        </div>
    }
}
