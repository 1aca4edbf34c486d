//! Tabs and the ordered tab collection

use std::fmt;

use log::{debug, trace};

use super::{relocate, EventQueue, ShellEvent};
use crate::engine::WebView;
use crate::toolkit::{
    Button, Connection, Container, HBox, Handle, Label, Notebook, Object, ObjectId, RefCounted,
    Runtime, Unique, Widget,
};

// Subscriptions living as long as the tab itself.
struct TabSignals {
    close_clicked: Connection,
    title_changed: Connection,
}

impl TabSignals {
    fn disconnect(self, rt: &Runtime) {
        self.close_clicked.disconnect(rt);
        self.title_changed.disconnect(rt);
    }
}

/// One page of the browser: a content view, its tab title and close button.
///
/// The view is torn down with the tab even though the notebook also refers
/// to it. Per-tab subscriptions are disconnected before anything is released.
pub struct Tab {
    signals: Option<TabSignals>,
    view: Handle<WebView, Unique>,
    title: Handle<Label, RefCounted>,
    close: Handle<Button, RefCounted>,
}

impl Tab {
    fn open(rt: &Runtime, uri: &str, placeholder: &str, queue: &EventQueue) -> Self {
        let view: Handle<WebView, Unique> = Handle::adopt(WebView::create_with_uri(rt, uri));
        let title: Handle<Label, RefCounted> = Handle::adopt(Label::create(rt, placeholder));
        let close: Handle<Button, RefCounted> = Handle::adopt(Button::create(rt, "window-close"));
        title.set_can_focus(false);
        close.set_can_focus(false);

        let sender = queue.clone();
        let close_clicked = close.connect_clicked(move |_, button| {
            sender.push(ShellEvent::CloseClicked { button });
        });
        let sender = queue.clone();
        let title_changed = view.connect_notify_title(move |_, view| {
            sender.push(ShellEvent::TabTitleChanged { view });
        });

        Self {
            signals: Some(TabSignals {
                close_clicked,
                title_changed,
            }),
            view,
            title,
            close,
        }
    }

    pub fn view(&self) -> &WebView {
        self.view.get()
    }

    pub fn title_label(&self) -> &Label {
        self.title.get()
    }

    pub fn close_button(&self) -> &Button {
        self.close.get()
    }

    /// Show the view's title in the tab strip, or `placeholder` without one
    pub fn sync_title(&self, placeholder: &str) {
        let title = self.view.title();
        let title = title.as_deref().filter(|t| !t.is_empty());
        self.title.set_text(title.unwrap_or(placeholder));
    }
}

impl Drop for Tab {
    fn drop(&mut self) {
        if let Some(signals) = self.signals.take() {
            signals.disconnect(self.view.runtime());
        }
        trace!("dropping tab for {}", self.view.id());
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("view", &self.view.id())
            .field("title", &self.title.text())
            .field("close", &self.close.id())
            .finish()
    }
}

/// Tabs in on-screen order, kept in step with the notebook pages.
///
/// Elements only move through [`TabCollection::reorder`]; every other
/// mutation appends or removes.
pub struct TabCollection {
    rt: Runtime,
    notebook: Notebook,
    queue: EventQueue,
    placeholder: String,
    tabs: Vec<Tab>,
}

impl TabCollection {
    pub fn new(rt: &Runtime, notebook: &Notebook, queue: &EventQueue, placeholder: &str) -> Self {
        Self {
            rt: rt.clone(),
            notebook: notebook.clone(),
            queue: queue.clone(),
            placeholder: placeholder.to_string(),
            tabs: Vec::new(),
        }
    }

    /// Open a tab loading `uri` (blank for an empty string) at the end of
    /// the notebook. Does not change which tab is shown. Returns its index.
    pub fn append(&mut self, uri: &str) -> usize {
        let tab = Tab::open(&self.rt, uri, &self.placeholder, &self.queue);

        let tab_content = HBox::create(&self.rt);
        tab_content.set_can_focus(false);
        tab_content.add(tab.title_label());
        tab_content.add(tab.close_button());
        tab_content.show_all();
        tab.view().show_all();

        let index = self.notebook.append_page(tab.view(), tab_content);
        self.notebook.set_tab_reorderable(tab.view().id(), true);
        debug!("opened tab {} for {:?}", index, uri);

        self.tabs.push(tab);
        index
    }

    /// Take the tab at `index` out of the collection. Its resources are
    /// released when the returned value is dropped.
    pub fn remove(&mut self, index: usize) -> Option<Tab> {
        if index >= self.tabs.len() {
            return None;
        }
        debug!("removing tab {}", index);
        Some(self.tabs.remove(index))
    }

    /// Index of the tab owning close button `button`
    pub fn identify(&self, button: ObjectId) -> Option<usize> {
        self.tabs.iter().position(|t| t.close.id() == button)
    }

    /// Index of the tab showing `view`
    pub fn position_of_view(&self, view: ObjectId) -> Option<usize> {
        self.tabs.iter().position(|t| t.view.id() == view)
    }

    /// Move the tab at `old` to `new`; the tabs in between shift by one.
    /// The notebook is expected to have moved its page already.
    pub fn reorder(&mut self, old: usize, new: usize) -> bool {
        relocate(&mut self.tabs, old, new)
    }

    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Release every tab, last first
    pub fn clear(&mut self) {
        while let Some(tab) = self.tabs.pop() {
            drop(tab);
        }
    }
}

impl fmt::Debug for TabCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tabs.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(rt: &Runtime) -> (Handle<Notebook, RefCounted>, TabCollection, EventQueue) {
        let notebook: Handle<Notebook, RefCounted> = Handle::adopt(Notebook::create(rt));
        let queue = EventQueue::new();
        let tabs = TabCollection::new(rt, &notebook, &queue, "New tab");
        (notebook, tabs, queue)
    }

    #[test]
    fn test_append_adds_reorderable_page() {
        let rt = Runtime::new();
        let (notebook, mut tabs, _queue) = collection(&rt);
        assert_eq!(tabs.append("https://a.example/"), 0);
        assert_eq!(tabs.append(""), 1);

        assert_eq!(notebook.n_pages(), 2);
        let view = tabs.get(1).map(|t| t.view().id());
        assert_eq!(view, notebook.nth_page(1));
        let first = notebook.nth_page(0).expect("first page exists");
        assert!(notebook.is_tab_reorderable(first));
        assert_eq!(tabs.get(1).and_then(|t| t.title_label().text()).as_deref(), Some("New tab"));
    }

    #[test]
    fn test_removed_tab_releases_everything() {
        let rt = Runtime::new();
        let (notebook, mut tabs, _queue) = collection(&rt);
        tabs.append("");
        let before = rt.live_objects();
        let handlers = rt.total_handlers();
        tabs.append("https://b.example/");

        drop(tabs.remove(1));
        assert_eq!(rt.live_objects(), before);
        assert_eq!(rt.total_handlers(), handlers);
        assert_eq!(notebook.n_pages(), 1);
        assert!(tabs.remove(1).is_none());
    }

    #[test]
    fn test_identify_by_close_button() {
        let rt = Runtime::new();
        let (_notebook, mut tabs, queue) = collection(&rt);
        tabs.append("");
        tabs.append("");
        let button = tabs.get(1).map(|t| t.close_button().clone());
        let button = button.expect("second tab exists");

        assert_eq!(tabs.identify(button.id()), Some(1));
        button.clicked();
        assert_eq!(
            queue.drain(),
            vec![ShellEvent::CloseClicked {
                button: button.id()
            }]
        );
    }

    #[test]
    fn test_title_sync_uses_placeholder() {
        let rt = Runtime::new();
        let (_notebook, mut tabs, queue) = collection(&rt);
        tabs.append("https://a.example/");
        let tab = tabs.get(0).expect("tab exists");

        tab.view().set_document_title("Example");
        assert_eq!(
            queue.drain(),
            vec![ShellEvent::TabTitleChanged {
                view: tab.view().id()
            }]
        );
        tab.sync_title(tabs.placeholder());
        assert_eq!(tab.title_label().text().as_deref(), Some("Example"));

        tab.view().load_uri("https://b.example/");
        tab.sync_title(tabs.placeholder());
        assert_eq!(tab.title_label().text().as_deref(), Some("New tab"));
    }

    #[test]
    fn test_reorder_moves_only_range() {
        let rt = Runtime::new();
        let (_notebook, mut tabs, _queue) = collection(&rt);
        for _ in 0..4 {
            tabs.append("");
        }
        let ids: Vec<_> = tabs.iter().map(|t| t.view().id()).collect();
        assert!(tabs.reorder(1, 3));
        let moved: Vec<_> = tabs.iter().map(|t| t.view().id()).collect();
        assert_eq!(moved, vec![ids[0], ids[2], ids[3], ids[1]]);
    }

    #[test]
    fn test_clear_leaves_notebook_empty() {
        let rt = Runtime::new();
        let (notebook, mut tabs, _queue) = collection(&rt);
        tabs.append("");
        tabs.append("");
        tabs.clear();
        assert!(tabs.is_empty());
        assert_eq!(notebook.n_pages(), 0);
        assert_eq!(rt.live_objects(), 1);
    }
}
