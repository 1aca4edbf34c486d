//! The active page and the subscriptions bound to it
//!
//! Exactly one tab is shown at a time. While it is shown, a [`PageSignals`]
//! set ties the chrome's navigation controls and the notebook's reorder
//! notification to that tab's view. Showing another tab tears the whole set
//! down before the next one is created, so a view never has handlers from
//! two activations and no handler outlives its tab being shown.

use std::fmt;

use log::{debug, trace};

use super::{Chrome, EventQueue, ShellEvent, TabCollection};
use crate::engine::{BackForwardList, WebView};
use crate::toolkit::{Connection, Handle, Object, ObjectId, Runtime, Unmanaged, Widget};
use crate::utils::error::{Result, ShellError};

/// The tab currently shown. Replaced as a whole when another tab is shown.
pub struct ActivePage {
    index: usize,
    view: Handle<WebView, Unmanaged>,
    history: Handle<BackForwardList, Unmanaged>,
}

impl ActivePage {
    fn new(rt: &Runtime, index: usize, view: &WebView) -> Option<Self> {
        let history = view.back_forward_list()?;
        Some(Self {
            index,
            view: Handle::acquire(rt, view.id()),
            history: Handle::acquire(rt, history.id()),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn view(&self) -> &WebView {
        self.view.get()
    }

    pub fn history(&self) -> &BackForwardList {
        self.history.get()
    }
}

impl fmt::Debug for ActivePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivePage")
            .field("index", &self.index)
            .field("view", &self.view.id())
            .field("history", &self.history.id())
            .finish()
    }
}

/// Subscriptions live only while their tab is the active page
#[derive(Debug)]
pub struct PageSignals {
    back: Connection,
    forward: Connection,
    history: Connection,
    title: Connection,
    uri: Connection,
    load: Connection,
    reorder: Connection,
    refresh: Connection,
}

impl PageSignals {
    /// Size of every bound set
    pub const COUNT: usize = 8;

    fn bind(chrome: &Chrome, page: &ActivePage, queue: &EventQueue) -> Self {
        let view = page.view();

        let sender = queue.clone();
        let back = chrome
            .back_button()
            .connect_clicked(move |_, _| sender.push(ShellEvent::BackClicked));
        let sender = queue.clone();
        let forward = chrome
            .forward_button()
            .connect_clicked(move |_, _| sender.push(ShellEvent::ForwardClicked));
        let sender = queue.clone();
        let history = page
            .history()
            .connect_changed(move |_, list| sender.push(ShellEvent::HistoryChanged { list }));
        let sender = queue.clone();
        let title = view.connect_notify_title(move |_, view| {
            sender.push(ShellEvent::PageTitleChanged { view });
        });
        let sender = queue.clone();
        let uri = view.connect_notify_uri(move |_, view| {
            sender.push(ShellEvent::UriChanged { view });
        });
        let sender = queue.clone();
        let load = view.connect_load_changed(move |_, view, event| {
            sender.push(ShellEvent::LoadChanged { view, event });
        });
        let sender = queue.clone();
        let reorder = chrome.notebook().connect_page_reordered(move |_, child, index| {
            sender.push(ShellEvent::PageReordered { child, index });
        });
        let sender = queue.clone();
        let shown = view.id();
        let refresh = chrome.entry().connect_refresh_clicked(move |_, _| {
            sender.push(ShellEvent::RefreshRequested { view: shown });
        });

        Self {
            back,
            forward,
            history,
            title,
            uri,
            load,
            reorder,
            refresh,
        }
    }

    /// Every connection in the set
    pub fn connections(&self) -> [&Connection; Self::COUNT] {
        [
            &self.back,
            &self.forward,
            &self.history,
            &self.title,
            &self.uri,
            &self.load,
            &self.reorder,
            &self.refresh,
        ]
    }

    /// Number of connections in this set the runtime still dispatches to
    pub fn live_count(&self, rt: &Runtime) -> usize {
        self.connections()
            .iter()
            .filter(|connection| connection.is_live(rt))
            .count()
    }

    fn disconnect(self, rt: &Runtime) {
        self.back.disconnect(rt);
        self.forward.disconnect(rt);
        self.history.disconnect(rt);
        self.title.disconnect(rt);
        self.uri.disconnect(rt);
        self.load.disconnect(rt);
        self.reorder.disconnect(rt);
        self.refresh.disconnect(rt);
    }
}

/// Tracks the shown tab and owns its [`PageSignals`]
pub struct PageController {
    rt: Runtime,
    default_title: String,
    active: Option<ActivePage>,
    signals: Option<PageSignals>,
}

impl PageController {
    pub fn new(rt: &Runtime, default_title: &str) -> Self {
        Self {
            rt: rt.clone(),
            default_title: default_title.to_string(),
            active: None,
            signals: None,
        }
    }

    /// Show the tab at `index`: drop the current subscriptions, bring the
    /// chrome in line with the tab's view and subscribe to it.
    pub fn show(
        &mut self,
        chrome: &Chrome,
        tabs: &TabCollection,
        queue: &EventQueue,
        index: usize,
    ) -> Result<()> {
        let tab = tabs.get(index).ok_or(ShellError::NoSuchTab {
            index,
            len: tabs.len(),
        })?;
        self.teardown();

        let page = ActivePage::new(&self.rt, index, tab.view())
            .ok_or(ShellError::NoSuchTab {
                index,
                len: tabs.len(),
            })?;
        let view = page.view();
        let title = view.title();
        chrome.set_title(title.as_deref(), &self.default_title);
        chrome.sync_histnav(view);
        let uri = view.uri().unwrap_or_default();
        chrome.entry().set_uri(&uri);

        let signals = PageSignals::bind(chrome, &page, queue);
        debug!("showing tab {} ({})", index, view.id());

        if uri.is_empty() {
            chrome.entry().grab_focus();
        } else {
            view.grab_focus();
        }

        self.active = Some(page);
        self.signals = Some(signals);
        Ok(())
    }

    /// Switch to the tab at `index`. Always runs the full teardown and bind
    /// cycle, even when that tab is already shown.
    pub fn switch(
        &mut self,
        chrome: &Chrome,
        tabs: &TabCollection,
        queue: &EventQueue,
        index: usize,
    ) -> Result<()> {
        trace!("switching to tab {}", index);
        self.show(chrome, tabs, queue, index)
    }

    /// Drop the subscriptions and forget the shown tab
    pub fn teardown(&mut self) {
        if let Some(signals) = self.signals.take() {
            signals.disconnect(&self.rt);
        }
        if let Some(page) = self.active.take() {
            trace!("tab {} no longer shown", page.index);
        }
    }

    /// A tab other than the shown one was removed at `index`
    pub fn note_removed(&mut self, index: usize) {
        if let Some(page) = self.active.as_mut() {
            if index < page.index {
                page.index -= 1;
            }
        }
    }

    /// The shown tab was moved to `index`
    pub fn note_reordered(&mut self, index: usize) {
        if let Some(page) = self.active.as_mut() {
            page.index = index;
        }
    }

    pub fn active(&self) -> Option<&ActivePage> {
        self.active.as_ref()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().map(|page| page.index)
    }

    pub fn signals(&self) -> Option<&PageSignals> {
        self.signals.as_ref()
    }

    pub fn is_active_view(&self, view: ObjectId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|page| page.view.id() == view)
    }

    pub fn is_active_history(&self, list: ObjectId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|page| page.history.id() == list)
    }

    pub fn default_title(&self) -> &str {
        &self.default_title
    }
}

impl fmt::Debug for PageController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageController")
            .field("active", &self.active)
            .field("bound", &self.signals.is_some())
            .finish()
    }
}
