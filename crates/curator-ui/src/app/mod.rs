//! Browser entry point: wires the controllers to the server-rendered page.
//!
//! # Design
//! - Document-level delegated listeners survive partial re-renders untouched.
//! - Elements inside the swapped region are rebound by role after each
//!   re-render, replacing the previous listener.
//! - Every re-render is a full resynchronization barrier for the selection.
//! - Network work runs on `spawn_local`; failures end in a toast, never a panic.

mod bindings;
mod console_log;
mod dom;
mod preferences;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use curator_api_models::ActionName;
use gloo::console;
use gloo::events::{EventListener, EventListenerOptions};
use gloo::utils::document;
use tracing::level_filters::LevelFilter;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, Event, HtmlAnchorElement, HtmlButtonElement, HtmlElement, HtmlInputElement,
    KeyboardEvent, MouseEvent,
};
use yew::{Callback, Classes};

use crate::app::bindings::ListenerRegistry;
use crate::app::dom::{ButtonControl, DomRow};
use crate::app::preferences::{LocalPreferenceStorage, current_url, load_config};
use crate::components::toast::{StoreNotifier, ToastHost, ToastHostProps};
use crate::core::capabilities::{Navigator, Notifier};
use crate::core::config::UiConfig;
use crate::core::shortcuts::{Shortcut, advance_cursor, interpret_shortcut};
use crate::features::bulk::{BulkDeps, BulkDispatcher, BulkSettings, DispatchOutcome};
use crate::features::mass_edit::{MassEditController, ModeTransition};
use crate::features::preferences::{LoadDecision, PreferenceSettings, PreferenceStore};
use crate::features::row_actions::{
    RowActionController, RowActionDeps, RowActionSettings, RowActionTrigger, RowView,
};
use crate::features::undo::UndoTokenId;
use crate::services::api::ApiClient;
use crate::services::browser::{BrowserClock, LocationNavigator, NativeConfirm, TimerScheduler};

const SELECT_ALL_ROLE: &str = "select-all";
const SUMMARY_LISTENER: &str = "dom-summary";

struct Page {
    config: UiConfig,
    mass_edit: Rc<RefCell<MassEditController>>,
    dispatcher: Rc<BulkDispatcher>,
    row_actions: Rc<RowActionController>,
    preferences: Option<PreferenceStore>,
    listeners: RefCell<ListenerRegistry>,
    cursor: Cell<Option<usize>>,
}

impl Page {
    fn resync(self: &Rc<Self>) {
        let selectors = &self.config.selectors;
        let rows = dom::collect_rows(selectors);
        let transition = self.mass_edit.borrow_mut().resync(rows);
        self.apply(&transition);
        self.bind_select_all();
        self.cursor.set(None);
    }

    fn apply(&self, transition: &ModeTransition) {
        let selectors = &self.config.selectors;
        dom::apply_mode(selectors, transition.view);
        dom::apply_changes(selectors, &transition.cleared);
        dom::render_summary(selectors, &transition.summary);
    }

    fn toggle_mode(&self) {
        let transition = self.mass_edit.borrow_mut().toggle();
        self.apply(&transition);
    }

    fn bind_select_all(self: &Rc<Self>) {
        let Some(select_all) = dom::by_id::<Element>(&self.config.selectors.select_all) else {
            self.listeners.borrow_mut().unbind(SELECT_ALL_ROLE);
            return;
        };
        let page = Rc::downgrade(self);
        let listener = EventListener::new(&select_all, "change", move |event| {
            let Some(page) = page.upgrade() else {
                return;
            };
            let checked = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                .is_some_and(|input| input.checked());
            let changes = page
                .mass_edit
                .borrow_mut()
                .selection_mut()
                .select_all(checked);
            dom::apply_changes(&page.config.selectors, &changes);
        });
        self.listeners.borrow_mut().bind(SELECT_ALL_ROLE, listener);
    }

    fn on_click(&self, event: &Event) {
        let Some(target) = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
        else {
            return;
        };
        let selectors = &self.config.selectors;

        if let Some(link) = dom::closest(&target, &selectors.row_action) {
            event.prevent_default();
            self.run_row_action(&link);
        } else if let Some(input) = dom::closest(&target, &selectors.row_checkbox)
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
        {
            self.on_checkbox(&input, event);
        } else if dom::closest(&target, &format!("#{}", selectors.mass_edit_toggle)).is_some() {
            self.toggle_mode();
        } else if let Some(button) = dom::closest(&target, &selectors.bulk_action)
            .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok())
        {
            self.run_bulk(button);
        } else if let Some(anchor) = dom::closest(&target, "a[href]") {
            self.follow_link(&anchor, event);
        }
    }

    fn on_checkbox(&self, input: &HtmlInputElement, event: &Event) {
        let Some((category, id)) = dom::row_key(input) else {
            return;
        };
        let with_range = event
            .dyn_ref::<MouseEvent>()
            .is_some_and(MouseEvent::shift_key);
        let changes = self
            .mass_edit
            .borrow_mut()
            .selection_mut()
            .set_from_click(&category, id, input.checked(), with_range);
        dom::apply_changes(&self.config.selectors, &changes);
    }

    fn run_row_action(&self, link: &Element) {
        let selectors = &self.config.selectors;
        let Some(action) = link.get_attribute("data-action") else {
            return;
        };
        let Some(url) = link
            .dyn_ref::<HtmlAnchorElement>()
            .map(HtmlAnchorElement::href)
            .or_else(|| link.get_attribute("href"))
            .filter(|url| !url.is_empty())
        else {
            return;
        };
        let row = dom::closest(link, &selectors.row_container)
            .and_then(|row| row.dyn_into::<HtmlElement>().ok())
            .map(|row| Rc::new(DomRow::new(row, selectors.score_badge.clone())) as Rc<dyn RowView>);
        let trigger = RowActionTrigger {
            action: ActionName::new(action),
            url,
        };
        let controller = Rc::clone(&self.row_actions);
        spawn_local(async move {
            controller.trigger(trigger, row).await;
        });
    }

    fn run_bulk(&self, button: HtmlButtonElement) {
        let Some(action) = button.get_attribute("data-action") else {
            return;
        };
        let dispatcher = Rc::clone(&self.dispatcher);
        let source = Rc::clone(&self.mass_edit);
        spawn_local(async move {
            let control = ButtonControl::new(button);
            let action = ActionName::new(action);
            if let DispatchOutcome::Failed(err) = dispatcher.execute(&action, &*source, &control).await
            {
                console::error!(
                    "bulk action failed",
                    action.to_string(),
                    err.category().to_string(),
                    err.user_message()
                );
            }
        });
    }

    fn follow_link(&self, anchor: &Element, event: &Event) {
        let Some(store) = &self.preferences else {
            return;
        };
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            if mouse.button() != 0
                || mouse.ctrl_key()
                || mouse.meta_key()
                || mouse.shift_key()
                || mouse.alt_key()
            {
                return;
            }
        }
        if anchor.has_attribute("download")
            || anchor
                .get_attribute("target")
                .is_some_and(|target| target == "_blank")
        {
            return;
        }
        let (Some(href), Some(current)) = (anchor.get_attribute("href"), current_url()) else {
            return;
        };
        if store.follow_link(&current, &href) {
            event.prevent_default();
        }
    }

    fn on_history_push(&self) {
        if let (Some(store), Some(url)) = (&self.preferences, current_url()) {
            store.on_history_push(&url);
        }
    }

    fn on_keydown(&self, event: &KeyboardEvent) {
        let target = event
            .target()
            .and_then(|target| target.dyn_into::<HtmlElement>().ok());
        let in_text_field = target
            .as_ref()
            .is_some_and(|element| matches!(element.tag_name().as_str(), "INPUT" | "TEXTAREA"));
        let Some(shortcut) = interpret_shortcut(&event.key(), event.shift_key(), in_text_field)
        else {
            return;
        };
        let selectors = &self.config.selectors;

        match shortcut {
            Shortcut::FocusSearch => {
                event.prevent_default();
                if let Some(search) = dom::by_id::<HtmlElement>(&selectors.search) {
                    search.focus().ok();
                }
            }
            Shortcut::ToggleMassEdit => self.toggle_mode(),
            Shortcut::Dismiss => {
                if self.mass_edit.borrow().is_active() {
                    let transition = self.mass_edit.borrow_mut().exit();
                    self.apply(&transition);
                }
                if let Some(help) = dom::by_id::<Element>(&selectors.help_overlay) {
                    dom::hide(&help);
                }
            }
            Shortcut::BlurInput => {
                if let Some(element) = target {
                    element.blur().ok();
                }
            }
            Shortcut::ToggleHelp => {
                event.prevent_default();
                if let Some(help) = dom::by_id::<Element>(&selectors.help_overlay) {
                    dom::toggle_hidden(&help);
                }
            }
            Shortcut::NextRow | Shortcut::PrevRow => {
                let rows = dom::cursor_rows(selectors);
                if let Some(index) = advance_cursor(shortcut, self.cursor.get(), rows.len()) {
                    event.prevent_default();
                    self.cursor.set(Some(index));
                    dom::highlight_row(&rows, index);
                }
            }
            Shortcut::RowAction(action) => {
                let rows = dom::cursor_rows(selectors);
                let link = self
                    .cursor
                    .get()
                    .and_then(|index| rows.get(index))
                    .and_then(|row| {
                        row.query_selector(&format!("a[data-action=\"{action}\"]"))
                            .ok()
                            .flatten()
                    })
                    .and_then(|link| link.dyn_into::<HtmlElement>().ok());
                if let Some(link) = link {
                    event.prevent_default();
                    link.click();
                }
            }
        }
    }
}

fn build_page(config: UiConfig) -> Page {
    let navigator: Rc<dyn Navigator> = Rc::new(LocationNavigator);
    let notifier: Rc<dyn Notifier> = Rc::new(StoreNotifier::new());
    let api = Rc::new(ApiClient::new(config.bulk_endpoint.clone()));

    let preferences = match PreferenceSettings::try_from(&config) {
        Ok(settings) => Some(PreferenceStore::new(
            Rc::new(LocalPreferenceStorage),
            Rc::clone(&navigator),
            settings,
        )),
        Err(err) => {
            console::error!("preference store disabled", format!("{err:?}"));
            None
        }
    };

    let dispatcher = BulkDispatcher::new(
        BulkDeps {
            transport: api.clone(),
            confirm: Rc::new(NativeConfirm),
            notifier: Rc::clone(&notifier),
            navigator: Rc::clone(&navigator),
        },
        BulkSettings::from(&config),
    );
    let row_actions = RowActionController::new(
        RowActionDeps {
            transport: api,
            notifier,
            navigator,
            clock: Rc::new(BrowserClock),
            scheduler: Rc::new(TimerScheduler),
        },
        RowActionSettings::from(&config),
    );

    let mut mass_edit = MassEditController::new();
    let selectors = config.selectors.clone();
    mass_edit
        .selection_mut()
        .on_change(SUMMARY_LISTENER, move |summary| {
            dom::render_summary(&selectors, summary);
        });

    Page {
        config,
        mass_edit: Rc::new(RefCell::new(mass_edit)),
        dispatcher: Rc::new(dispatcher),
        row_actions: Rc::new(row_actions),
        preferences,
        listeners: RefCell::new(ListenerRegistry::default()),
        cursor: Cell::new(None),
    }
}

fn mount_toasts(page: &Page) {
    let root_id = &page.config.selectors.toast_root;
    let root = match document().get_element_by_id(root_id) {
        Some(root) => root,
        None => {
            let Some(body) = document().body() else {
                console::error!("no document body; toasts disabled");
                return;
            };
            let created = document().create_element("div").and_then(|root| {
                root.set_id(root_id);
                body.append_child(&root).map(|_| root)
            });
            match created {
                Ok(root) => root,
                Err(err) => {
                    console::error!("toast root creation failed", err);
                    return;
                }
            }
        }
    };

    let controller = Rc::clone(&page.row_actions);
    let on_undo = Callback::from(move |token: UndoTokenId| {
        let controller = Rc::clone(&controller);
        spawn_local(async move {
            if let Err(err) = controller.undo(token).await {
                console::warn!("undo failed", err.to_string());
            }
        });
    });
    yew::Renderer::<ToastHost>::with_root_and_props(
        root,
        ToastHostProps {
            on_undo,
            class: Classes::new(),
        },
    )
    .render();
}

fn bind_document(page: &Rc<Page>) {
    let selectors = &page.config.selectors;
    let target = document();

    let weak = Rc::downgrade(page);
    EventListener::new_with_options(
        &target,
        "click",
        EventListenerOptions::enable_prevent_default(),
        move |event| with_page(&weak, |page| page.on_click(event)),
    )
    .forget();

    let weak = Rc::downgrade(page);
    EventListener::new(&target, "keydown", move |event| {
        if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
            with_page(&weak, |page| page.on_keydown(event));
        }
    })
    .forget();

    let weak = Rc::downgrade(page);
    EventListener::new(&target, selectors.rerender_event.clone(), move |_| {
        if let Some(page) = weak.upgrade() {
            page.resync();
        }
    })
    .forget();

    let weak = Rc::downgrade(page);
    EventListener::new(&target, selectors.history_push_event.clone(), move |_| {
        with_page(&weak, Page::on_history_push);
    })
    .forget();
}

fn with_page(page: &Weak<Page>, f: impl FnOnce(&Page)) {
    if let Some(page) = page.upgrade() {
        f(&page);
    }
}

/// Entry point invoked from the page's wasm bootstrap.
pub fn run_app() {
    console_error_panic_hook::set_once();
    console_log::init(LevelFilter::INFO);
    let config = load_config();
    let page = Rc::new(build_page(config));

    if let (Some(store), Some(url)) = (&page.preferences, current_url()) {
        if let LoadDecision::Redirect(_) = store.on_load(&url) {
            return;
        }
    }

    mount_toasts(&page);
    page.resync();
    bind_document(&page);
    // Listeners hold weak references; the page lives as long as the document.
    std::mem::forget(page);
}
