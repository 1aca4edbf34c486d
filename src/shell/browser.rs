//! The top-level browser

use std::fmt;

use log::{debug, info, trace, warn};

use super::{
    guess_uri, Chrome, ChromeSignals, EventQueue, LastTabPolicy, PageController, ShellConfig,
    ShellEvent, Shortcut, TabCollection,
};
use crate::toolkit::{LoadEvent, Object, ObjectId, Runtime, Widget};
use crate::utils::error::{Result, ShellError};

/// A browser window: chrome, tabs and the shown page.
///
/// Toolkit callbacks only queue [`ShellEvent`]s; [`Browser::pump`] handles
/// them one at a time. Public operations pump before returning, so the
/// state they leave behind is settled.
///
/// With the default [`LastTabPolicy::CloseWindow`], removing the last tab
/// closes the browser.
pub struct Browser {
    rt: Runtime,
    config: ShellConfig,
    queue: EventQueue,
    page: PageController,
    tabs: TabCollection,
    chrome_signals: Option<ChromeSignals>,
    chrome: Option<Chrome>,
}

impl Browser {
    /// Open a window with one tab per uri (a "session"). An empty session
    /// opens a single blank tab.
    pub fn new<S: AsRef<str>>(rt: &Runtime, config: ShellConfig, uris: &[S]) -> Self {
        let queue = EventQueue::new();
        let chrome = Chrome::build(rt, &config);
        let mut tabs = TabCollection::new(rt, chrome.notebook(), &queue, &config.tab_placeholder);
        if uris.is_empty() {
            tabs.append("");
        }
        for uri in uris {
            tabs.append(uri.as_ref());
        }
        chrome.notebook().set_show_tabs(tabs.len() > 1);
        let chrome_signals = chrome.connect(&queue);

        let mut browser = Self {
            rt: rt.clone(),
            page: PageController::new(rt, &config.default_title),
            config,
            queue,
            tabs,
            chrome_signals: Some(chrome_signals),
            chrome: Some(chrome),
        };
        if let Err(err) = browser.switch_page(0) {
            warn!("could not show the first tab: {err}");
        }
        if let Some(chrome) = &browser.chrome {
            chrome.window().show_all();
        }
        info!("browser opened with {} tab(s)", browser.tabs.len());
        browser.pump();
        browser
    }

    /// Handle every queued event, including those queued while handling.
    /// Returns how many were taken off the queue.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            handled += 1;
            if self.is_closed() {
                trace!("browser closed, dropping {:?}", event);
                continue;
            }
            if let Err(err) = self.handle(event) {
                warn!("{err}");
            }
        }
        handled
    }

    fn handle(&mut self, event: ShellEvent) -> Result<()> {
        trace!("handling {:?}", event);
        match event {
            ShellEvent::EntryActivated => self.navigate_from_entry(),
            ShellEvent::PageSwitched { child, index } => {
                if self.page.is_active_view(child) {
                    trace!("page {} already shown", index);
                    return Ok(());
                }
                match self.tabs.position_of_view(child) {
                    Some(position) => self.switch_page(position),
                    None => {
                        debug!("notebook switched to unknown page {}", child);
                        Ok(())
                    }
                }
            }
            ShellEvent::PageAdded { .. } | ShellEvent::PageRemoved { .. } => {
                let chrome = self.chrome.as_ref().ok_or(ShellError::Closed)?;
                let notebook = chrome.notebook();
                notebook.set_show_tabs(notebook.n_pages() > 1);
                Ok(())
            }
            ShellEvent::NewTabClicked => self.open_blank_tab().map(|_| ()),
            ShellEvent::Shortcut(shortcut) => self.apply_shortcut(shortcut),
            ShellEvent::WindowDestroyed => {
                info!("window destroyed");
                self.close();
                Ok(())
            }
            ShellEvent::CloseClicked { button } => {
                let index = self
                    .tabs
                    .identify(button)
                    .ok_or(ShellError::UnknownCloseControl(button))?;
                self.remove_tab_at(index)
            }
            ShellEvent::TabTitleChanged { view } => {
                if let Some(tab) = self.tabs.position_of_view(view).and_then(|i| self.tabs.get(i)) {
                    tab.sync_title(self.tabs.placeholder());
                }
                Ok(())
            }
            ShellEvent::BackClicked => {
                if let Some(page) = self.page.active() {
                    page.view().go_back();
                }
                Ok(())
            }
            ShellEvent::ForwardClicked => {
                if let Some(page) = self.page.active() {
                    page.view().go_forward();
                }
                Ok(())
            }
            ShellEvent::HistoryChanged { list } => {
                let chrome = self.chrome.as_ref().ok_or(ShellError::Closed)?;
                match self.page.active() {
                    Some(page) if self.page.is_active_history(list) => {
                        chrome.sync_histnav(page.view());
                    }
                    _ => trace!("history {} is not shown", list),
                }
                Ok(())
            }
            ShellEvent::PageTitleChanged { view } => {
                let chrome = self.chrome.as_ref().ok_or(ShellError::Closed)?;
                match self.page.active() {
                    Some(page) if self.page.is_active_view(view) => {
                        let title = page.view().title();
                        chrome.set_title(title.as_deref(), &self.config.default_title);
                    }
                    _ => trace!("title of hidden view {} changed", view),
                }
                Ok(())
            }
            ShellEvent::UriChanged { view } => {
                let chrome = self.chrome.as_ref().ok_or(ShellError::Closed)?;
                match self.page.active() {
                    Some(page) if self.page.is_active_view(view) => {
                        let uri = page.view().uri().unwrap_or_default();
                        chrome.entry().set_uri(&uri);
                    }
                    _ => trace!("uri of hidden view {} changed", view),
                }
                Ok(())
            }
            ShellEvent::LoadChanged { view, event } => {
                if self.page.is_active_view(view) {
                    self.log_load(view, event);
                }
                Ok(())
            }
            ShellEvent::PageReordered { child, index } => self.apply_reorder(child, index),
            ShellEvent::RefreshRequested { view } => {
                match self.page.active() {
                    Some(page) if self.page.is_active_view(view) => {
                        page.view().reload();
                        page.view().grab_focus();
                    }
                    _ => trace!("refresh for hidden view {}", view),
                }
                Ok(())
            }
        }
    }

    fn log_load(&self, view: ObjectId, event: LoadEvent) {
        let uri = self
            .page
            .active()
            .and_then(|page| page.view().uri())
            .unwrap_or_default();
        match event {
            LoadEvent::Started => debug!("{} started loading {}", view, uri),
            LoadEvent::Redirected => debug!("{} redirected to {}", view, uri),
            LoadEvent::Committed => trace!("{} committed {}", view, uri),
            LoadEvent::Finished => debug!("{} finished loading {}", view, uri),
        }
    }

    fn navigate_from_entry(&mut self) -> Result<()> {
        let chrome = self.chrome.as_ref().ok_or(ShellError::Closed)?;
        let text = chrome.entry().text().unwrap_or_default();
        let uri = guess_uri(&text);
        if let Some(page) = self.page.active() {
            page.view().load_uri(&uri);
            page.view().grab_focus();
        }
        Ok(())
    }

    // Select `index` in the notebook and run a full page switch. The
    // switch-page the notebook queues is then a no-op.
    fn switch_page(&mut self, index: usize) -> Result<()> {
        let chrome = self.chrome.as_ref().ok_or(ShellError::Closed)?;
        chrome.notebook().set_current_page(index);
        self.page.switch(chrome, &self.tabs, &self.queue, index)
    }

    fn open_blank_tab(&mut self) -> Result<usize> {
        self.ensure_open()?;
        let index = self.tabs.append("");
        self.switch_page(index)?;
        Ok(index)
    }

    fn remove_tab_at(&mut self, index: usize) -> Result<()> {
        self.ensure_open()?;
        let len = self.tabs.len();
        if index >= len {
            return Err(ShellError::NoSuchTab { index, len });
        }

        let was_active = self.page.active_index() == Some(index);
        if was_active {
            self.page.teardown();
        }
        drop(self.tabs.remove(index));
        if !was_active {
            self.page.note_removed(index);
        }

        if self.tabs.is_empty() {
            return self.last_tab_closed();
        }
        if was_active {
            let next = index.min(self.tabs.len() - 1);
            self.switch_page(next)?;
        }
        Ok(())
    }

    fn last_tab_closed(&mut self) -> Result<()> {
        match self.config.last_tab_policy {
            LastTabPolicy::CloseWindow => {
                info!("last tab closed");
                self.close();
                Ok(())
            }
            LastTabPolicy::KeepOne => {
                debug!("last tab closed, opening a blank one");
                self.open_blank_tab().map(|_| ())
            }
        }
    }

    fn apply_shortcut(&mut self, shortcut: Shortcut) -> Result<()> {
        debug!("shortcut {:?}", shortcut);
        match shortcut {
            Shortcut::FocusEntry => {
                let chrome = self.chrome.as_ref().ok_or(ShellError::Closed)?;
                chrome.entry().grab_focus();
                Ok(())
            }
            Shortcut::NewTab => self.open_blank_tab().map(|_| ()),
            Shortcut::CloseTab => match self.page.active_index() {
                Some(index) => self.remove_tab_at(index),
                None => Ok(()),
            },
            Shortcut::Quit => {
                self.close();
                Ok(())
            }
            Shortcut::NextTab | Shortcut::PreviousTab | Shortcut::GotoTab(_) | Shortcut::LastTab => {
                let current = self.page.active_index().unwrap_or(0);
                match shortcut.target(current, self.tabs.len()) {
                    Some(index) => self.switch_page(index),
                    None => {
                        trace!("{:?} has no tab to go to", shortcut);
                        Ok(())
                    }
                }
            }
        }
    }

    // The notebook has already moved `child` to `index`. Only the shown tab
    // can be moved; anything else is put back where the collection has it.
    fn apply_reorder(&mut self, child: ObjectId, index: usize) -> Result<()> {
        let old = match self.page.active_index() {
            Some(old) if self.page.is_active_view(child) => old,
            _ => {
                if let (Some(chrome), Some(position)) =
                    (self.chrome.as_ref(), self.tabs.position_of_view(child))
                {
                    chrome.notebook().reorder_child(child, position);
                }
                return Err(ShellError::ReorderNotActive { child });
            }
        };
        if self.tabs.reorder(old, index) {
            self.page.note_reordered(index);
            debug!("moved shown tab from {} to {}", old, index);
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(ShellError::Closed)
        } else {
            Ok(())
        }
    }

    /// Open a tab loading `uri` without showing it. Returns its index.
    pub fn open_new_tab(&mut self, uri: &str) -> Result<usize> {
        self.ensure_open()?;
        let index = self.tabs.append(uri);
        self.pump();
        Ok(index)
    }

    /// Open a blank tab and show it, as the new-tab button does
    pub fn new_tab(&mut self) -> Result<usize> {
        let index = self.open_blank_tab()?;
        self.pump();
        Ok(index)
    }

    /// Show the tab at `index`
    pub fn switch_tab(&mut self, index: usize) -> Result<()> {
        self.ensure_open()?;
        let len = self.tabs.len();
        if index >= len {
            return Err(ShellError::NoSuchTab { index, len });
        }
        self.switch_page(index)?;
        self.pump();
        Ok(())
    }

    /// Close the tab at `index`, as its close button does
    pub fn close_tab(&mut self, index: usize) -> Result<()> {
        self.remove_tab_at(index)?;
        self.pump();
        Ok(())
    }

    /// Drag the shown tab to `index`
    pub fn move_active_tab(&mut self, index: usize) -> Result<()> {
        let chrome = self.chrome.as_ref().ok_or(ShellError::Closed)?;
        let len = self.tabs.len();
        if index >= len {
            return Err(ShellError::NoSuchTab { index, len });
        }
        if let Some(page) = self.page.active() {
            chrome.notebook().reorder_child(page.view().id(), index);
        }
        self.pump();
        Ok(())
    }

    /// Load what the user typed into the address bar
    pub fn navigate(&mut self, text: &str) -> Result<()> {
        let chrome = self.chrome.as_ref().ok_or(ShellError::Closed)?;
        chrome.entry().set_text(text);
        chrome.entry().activate();
        self.pump();
        Ok(())
    }

    /// Close every tab and the window. Idempotent.
    pub fn close(&mut self) {
        let Some(chrome) = self.chrome.take() else {
            return;
        };
        info!("closing browser with {} tab(s)", self.tabs.len());
        self.page.teardown();
        if let Some(signals) = self.chrome_signals.take() {
            signals.disconnect(&self.rt);
        }
        self.tabs.clear();
        drop(chrome);
        self.queue.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.chrome.is_none()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.rt
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn chrome(&self) -> Option<&Chrome> {
        self.chrome.as_ref()
    }

    pub fn tabs(&self) -> &TabCollection {
        &self.tabs
    }

    pub fn page(&self) -> &PageController {
        &self.page
    }

    pub fn active_index(&self) -> Option<usize> {
        self.page.active_index()
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Browser")
            .field("tabs", &self.tabs)
            .field("page", &self.page)
            .field("closed", &self.is_closed())
            .finish()
    }
}
