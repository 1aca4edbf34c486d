//! Concrete widget classes

use log::{debug, trace};

use super::{
    object_type, Container, Floating, KeyEvent, Object, ObjectId, ObjectKind, ObjectType, Payload,
    Propagation, Runtime, Widget,
};

fn create<T: ObjectType>(rt: &Runtime) -> Floating<T> {
    let id = rt.create(T::KIND);
    Floating::new(T::wrap(rt, id))
}

object_type!(
    /// Top-level window
    Window,
    ObjectKind::Window
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowState {
    width: u32,
    height: u32,
}

impl Window {
    pub fn create(rt: &Runtime, title: &str) -> Floating<Self> {
        let window: Floating<Self> = create(rt);
        rt.set_data(
            window.id(),
            WindowState {
                width: 0,
                height: 0,
            },
        );
        window.set_title(title);
        window
    }

    pub fn set_title(&self, title: &str) {
        self.rt.set_text(self.id, title);
    }

    pub fn title(&self) -> Option<String> {
        self.rt.text(self.id)
    }

    pub fn set_default_size(&self, width: u32, height: u32) {
        self.rt.with_data(self.id, |s: &mut WindowState| {
            s.width = width;
            s.height = height;
        });
    }

    pub fn default_size(&self) -> Option<(u32, u32)> {
        self.rt
            .with_data(self.id, |s: &mut WindowState| (s.width, s.height))
    }

    pub fn set_titlebar(&self, titlebar: &HeaderBar) {
        self.add(titlebar);
    }

    /// Deliver a key press; returns `Stop` if a handler consumed it
    pub fn key_press(&self, event: KeyEvent) -> Propagation {
        self.emit("key-press-event", Payload::Key(event))
    }

    pub fn connect_key_press<F>(&self, f: F) -> super::Connection
    where
        F: Fn(&Runtime, KeyEvent) -> Propagation + 'static,
    {
        self.connect("key-press-event", move |rt, emission| match emission.payload {
            Payload::Key(event) => f(rt, *event),
            _ => Propagation::Proceed,
        })
    }
}

impl Widget for Window {}
impl Container for Window {}

object_type!(
    /// Title bar holding navigation controls
    HeaderBar,
    ObjectKind::HeaderBar
);

impl HeaderBar {
    pub fn create(rt: &Runtime) -> Floating<Self> {
        create(rt)
    }

    pub fn pack_start(&self, child: &dyn Widget) {
        self.add(child);
    }

    pub fn pack_end(&self, child: &dyn Widget) {
        self.add(child);
    }

    pub fn set_custom_title(&self, child: &dyn Widget) {
        self.add(child);
    }
}

impl Widget for HeaderBar {}
impl Container for HeaderBar {}

object_type!(
    /// Horizontal box
    HBox,
    ObjectKind::HBox
);

impl HBox {
    pub fn create(rt: &Runtime) -> Floating<Self> {
        create(rt)
    }
}

impl Widget for HBox {}
impl Container for HBox {}

object_type!(
    /// Icon button
    Button,
    ObjectKind::Button
);

#[derive(Debug, Clone)]
struct ButtonState {
    icon: String,
}

impl Button {
    pub fn create(rt: &Runtime, icon: &str) -> Floating<Self> {
        let button: Floating<Self> = create(rt);
        rt.set_data(
            button.id(),
            ButtonState {
                icon: icon.to_string(),
            },
        );
        button
    }

    pub fn icon(&self) -> Option<String> {
        self.rt
            .with_data(self.id, |s: &mut ButtonState| s.icon.clone())
    }

    /// Simulate a click; insensitive buttons ignore it
    pub fn clicked(&self) {
        if self.is_sensitive() {
            self.emit("clicked", Payload::None);
        } else {
            trace!("{:?} is insensitive, click ignored", self);
        }
    }

    pub fn connect_clicked<F>(&self, f: F) -> super::Connection
    where
        F: Fn(&Runtime, ObjectId) + 'static,
    {
        self.connect("clicked", move |rt, emission| {
            f(rt, emission.source);
            Propagation::Proceed
        })
    }
}

impl Widget for Button {}

object_type!(
    /// Static text
    Label,
    ObjectKind::Label
);

impl Label {
    pub fn create(rt: &Runtime, text: &str) -> Floating<Self> {
        let label: Floating<Self> = create(rt);
        label.set_text(text);
        label
    }

    pub fn set_text(&self, text: &str) {
        self.rt.set_text(self.id, text);
    }

    pub fn text(&self) -> Option<String> {
        self.rt.text(self.id)
    }
}

impl Widget for Label {}

object_type!(
    /// Address field with a refresh icon
    UriEntry,
    ObjectKind::UriEntry
);

impl UriEntry {
    pub fn create(rt: &Runtime) -> Floating<Self> {
        create(rt)
    }

    pub fn text(&self) -> Option<String> {
        self.rt.text(self.id)
    }

    /// Replace the text as if typed by the user
    pub fn set_text(&self, text: &str) {
        self.rt.set_text(self.id, text);
    }

    /// Show the uri of the current page, unless the user is editing
    pub fn set_uri(&self, uri: &str) {
        if self.has_focus() {
            debug!("entry has focus, keeping user text over {:?}", uri);
            return;
        }
        self.rt.set_text(self.id, uri);
    }

    /// Simulate pressing Enter
    pub fn activate(&self) {
        self.emit("activate", Payload::None);
    }

    /// Simulate clicking the refresh icon
    pub fn refresh(&self) {
        self.emit("refresh-clicked", Payload::None);
    }

    pub fn connect_activate<F>(&self, f: F) -> super::Connection
    where
        F: Fn(&Runtime, ObjectId) + 'static,
    {
        self.connect("activate", move |rt, emission| {
            f(rt, emission.source);
            Propagation::Proceed
        })
    }

    pub fn connect_refresh_clicked<F>(&self, f: F) -> super::Connection
    where
        F: Fn(&Runtime, ObjectId) + 'static,
    {
        self.connect("refresh-clicked", move |rt, emission| {
            f(rt, emission.source);
            Propagation::Proceed
        })
    }
}

impl Widget for UriEntry {}

object_type!(
    /// Paged container with a tab strip
    Notebook,
    ObjectKind::Notebook
);

struct NotebookPage {
    child: ObjectId,
    tab_label: ObjectId,
    reorderable: bool,
    // Destroy watch on the child.
    watch: Option<super::Connection>,
}

#[derive(Default)]
struct NotebookState {
    pages: Vec<NotebookPage>,
    current: Option<usize>,
    show_tabs: bool,
    teardown: Option<super::Connection>,
}

impl Notebook {
    pub fn create(rt: &Runtime) -> Floating<Self> {
        let notebook: Floating<Self> = create(rt);
        rt.set_data(notebook.id(), NotebookState::default());
        let teardown = notebook.connect("destroy", |rt, emission| {
            Notebook::wrap(rt, emission.source).release_watches();
            Propagation::Proceed
        });
        rt.with_data(notebook.id(), |s: &mut NotebookState| {
            s.teardown = Some(teardown);
        });
        notebook
    }

    // Pages still attached when the notebook goes away keep their children
    // alive; their watches must not outlive the notebook.
    fn release_watches(&self) {
        let taken = self.rt.with_data(self.id, |s: &mut NotebookState| {
            let watches: Vec<_> = s.pages.iter_mut().filter_map(|p| p.watch.take()).collect();
            (watches, s.teardown.take())
        });
        let Some((watches, teardown)) = taken else {
            return;
        };
        for watch in watches.into_iter().chain(teardown) {
            if watch.is_live(&self.rt) {
                watch.disconnect(&self.rt);
            }
        }
    }

    /// Append `child` with `tab_label` in the tab strip. The notebook takes a
    /// reference on the child and claims the label. Returns the page index.
    pub fn append_page(&self, child: &dyn Widget, tab_label: Floating<HBox>) -> usize {
        let child = child.id();
        let tab_label = tab_label.into_claimed();
        self.rt.add_child(self.id, child);
        self.rt.add_child(self.id, tab_label);

        let notebook = self.id;
        let watch = self.rt.connect(child, "destroy", move |rt, emission| {
            Notebook::wrap(rt, notebook).page_destroyed(emission.source);
            Propagation::Proceed
        });

        let appended = self.rt.with_data(self.id, |s: &mut NotebookState| {
            s.pages.push(NotebookPage {
                child,
                tab_label,
                reorderable: false,
                watch: Some(watch),
            });
            let first = s.current.is_none();
            if first {
                s.current = Some(0);
            }
            (s.pages.len() - 1, first)
        });
        let Some((index, first)) = appended else {
            return 0;
        };

        self.emit("page-added", Payload::Page { child, index });
        if first {
            self.emit("switch-page", Payload::Page { child, index });
        }
        index
    }

    fn page_destroyed(&self, child: ObjectId) {
        let removed = self
            .rt
            .with_data(self.id, |s: &mut NotebookState| {
                let index = s.pages.iter().position(|p| p.child == child)?;
                let page = s.pages.remove(index);
                let switched = match s.current {
                    Some(current) if current == index => {
                        if s.pages.is_empty() {
                            s.current = None;
                            None
                        } else {
                            let next = index.min(s.pages.len() - 1);
                            s.current = Some(next);
                            Some((s.pages[next].child, next))
                        }
                    }
                    Some(current) if current > index => {
                        s.current = Some(current - 1);
                        None
                    }
                    _ => None,
                };
                Some((index, page, switched))
            })
            .flatten();

        let Some((index, page, switched)) = removed else {
            return;
        };
        if let Some(watch) = page.watch.filter(|w| w.is_live(&self.rt)) {
            watch.disconnect(&self.rt);
        }
        let tab_label = page.tab_label;
        trace!("{:?} lost page {} at {}", self, child, index);
        self.rt.remove_child(self.id, tab_label);
        self.emit("page-removed", Payload::Page { child, index });
        if let Some((child, index)) = switched {
            self.emit("switch-page", Payload::Page { child, index });
        }
    }

    pub fn n_pages(&self) -> usize {
        self.rt
            .with_data(self.id, |s: &mut NotebookState| s.pages.len())
            .unwrap_or(0)
    }

    pub fn current_page(&self) -> Option<usize> {
        self.rt
            .with_data(self.id, |s: &mut NotebookState| s.current)
            .flatten()
    }

    pub fn nth_page(&self, index: usize) -> Option<ObjectId> {
        self.rt
            .with_data(self.id, |s: &mut NotebookState| {
                s.pages.get(index).map(|p| p.child)
            })
            .flatten()
    }

    pub fn page_num(&self, child: ObjectId) -> Option<usize> {
        self.rt
            .with_data(self.id, |s: &mut NotebookState| {
                s.pages.iter().position(|p| p.child == child)
            })
            .flatten()
    }

    pub fn tab_label(&self, child: ObjectId) -> Option<ObjectId> {
        self.rt
            .with_data(self.id, |s: &mut NotebookState| {
                s.pages.iter().find(|p| p.child == child).map(|p| p.tab_label)
            })
            .flatten()
    }

    /// Select page `index`; emits `switch-page` only when the page changes
    pub fn set_current_page(&self, index: usize) {
        let target = self
            .rt
            .with_data(self.id, |s: &mut NotebookState| {
                if index < s.pages.len() && s.current != Some(index) {
                    s.current = Some(index);
                    Some(s.pages[index].child)
                } else {
                    None
                }
            })
            .flatten();
        if let Some(child) = target {
            self.emit("switch-page", Payload::Page { child, index });
        }
    }

    pub fn set_show_tabs(&self, show: bool) {
        self.rt
            .with_data(self.id, |s: &mut NotebookState| s.show_tabs = show);
    }

    pub fn show_tabs(&self) -> bool {
        self.rt
            .with_data(self.id, |s: &mut NotebookState| s.show_tabs)
            .unwrap_or(false)
    }

    pub fn set_tab_reorderable(&self, child: ObjectId, reorderable: bool) {
        self.rt.with_data(self.id, |s: &mut NotebookState| {
            if let Some(page) = s.pages.iter_mut().find(|p| p.child == child) {
                page.reorderable = reorderable;
            }
        });
    }

    pub fn is_tab_reorderable(&self, child: ObjectId) -> bool {
        self.rt
            .with_data(self.id, |s: &mut NotebookState| {
                s.pages.iter().any(|p| p.child == child && p.reorderable)
            })
            .unwrap_or(false)
    }

    /// Move a reorderable page, as a tab drag does, and emit `page-reordered`
    pub fn reorder_child(&self, child: ObjectId, index: usize) {
        let moved = self
            .rt
            .with_data(self.id, |s: &mut NotebookState| {
                let old = s.pages.iter().position(|p| p.child == child)?;
                if !s.pages[old].reorderable {
                    return None;
                }
                let new = index.min(s.pages.len() - 1);
                if old == new {
                    return None;
                }
                let current = s.current.map(|c| s.pages[c].child);
                if old < new {
                    s.pages[old..=new].rotate_left(1);
                } else {
                    s.pages[new..=old].rotate_right(1);
                }
                s.current = current.and_then(|c| s.pages.iter().position(|p| p.child == c));
                Some(new)
            })
            .flatten();
        if let Some(index) = moved {
            self.emit("page-reordered", Payload::Page { child, index });
        }
    }

    fn connect_page_signal<F>(&self, signal: &str, f: F) -> super::Connection
    where
        F: Fn(&Runtime, ObjectId, usize) + 'static,
    {
        self.connect(signal, move |rt, emission| {
            if let Payload::Page { child, index } = emission.payload {
                f(rt, *child, *index);
            }
            Propagation::Proceed
        })
    }

    pub fn connect_switch_page<F>(&self, f: F) -> super::Connection
    where
        F: Fn(&Runtime, ObjectId, usize) + 'static,
    {
        self.connect_page_signal("switch-page", f)
    }

    pub fn connect_page_added<F>(&self, f: F) -> super::Connection
    where
        F: Fn(&Runtime, ObjectId, usize) + 'static,
    {
        self.connect_page_signal("page-added", f)
    }

    pub fn connect_page_removed<F>(&self, f: F) -> super::Connection
    where
        F: Fn(&Runtime, ObjectId, usize) + 'static,
    {
        self.connect_page_signal("page-removed", f)
    }

    pub fn connect_page_reordered<F>(&self, f: F) -> super::Connection
    where
        F: Fn(&Runtime, ObjectId, usize) + 'static,
    {
        self.connect_page_signal("page-reordered", f)
    }
}

impl Widget for Notebook {}
impl Container for Notebook {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::{Handle, RefCounted, Unique};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(nb: &Notebook, signal: &str, log: &Rc<RefCell<Vec<(String, usize)>>>) -> super::super::Connection {
        let log = Rc::clone(log);
        let name = signal.to_string();
        nb.connect_page_signal(signal, move |_, _, index| {
            log.borrow_mut().push((name.clone(), index));
        })
    }

    fn page(rt: &Runtime, nb: &Notebook) -> Handle<Label, Unique> {
        let child: Handle<Label, Unique> = Handle::adopt(Label::create(rt, "page"));
        nb.append_page(&*child, HBox::create(rt));
        nb.set_tab_reorderable(child.id(), true);
        child
    }

    #[test]
    fn test_entry_set_uri_respects_focus() {
        let rt = Runtime::new();
        let entry: Handle<UriEntry, RefCounted> = Handle::adopt(UriEntry::create(&rt));
        entry.set_uri("https://a.example/");
        assert_eq!(entry.text().as_deref(), Some("https://a.example/"));

        entry.grab_focus();
        entry.set_text("typing");
        entry.set_uri("https://b.example/");
        assert_eq!(entry.text().as_deref(), Some("typing"));
    }

    #[test]
    fn test_insensitive_button_ignores_click() {
        let rt = Runtime::new();
        let button: Handle<Button, RefCounted> = Handle::adopt(Button::create(&rt, "go-previous"));
        let clicks = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&clicks);
        let conn = button.connect_clicked(move |_, _| *counter.borrow_mut() += 1);

        button.clicked();
        button.set_sensitive(false);
        button.clicked();
        assert_eq!(*clicks.borrow(), 1);
        assert_eq!(button.icon().as_deref(), Some("go-previous"));
        conn.disconnect(&rt);
    }

    #[test]
    fn test_notebook_first_page_becomes_current() {
        let rt = Runtime::new();
        let nb: Handle<Notebook, RefCounted> = Handle::adopt(Notebook::create(&rt));
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = record(&nb, "page-added", &log);
        let b = record(&nb, "switch-page", &log);

        let _first = page(&rt, &nb);
        let _second = page(&rt, &nb);

        assert_eq!(nb.current_page(), Some(0));
        assert_eq!(
            *log.borrow(),
            vec![
                ("page-added".to_string(), 0),
                ("switch-page".to_string(), 0),
                ("page-added".to_string(), 1),
            ]
        );
        a.disconnect(&rt);
        b.disconnect(&rt);
    }

    #[test]
    fn test_notebook_destroyed_current_page_selects_next() {
        let rt = Runtime::new();
        let nb: Handle<Notebook, RefCounted> = Handle::adopt(Notebook::create(&rt));
        let first = page(&rt, &nb);
        let second = page(&rt, &nb);
        let _third = page(&rt, &nb);
        nb.set_current_page(1);

        let log = Rc::new(RefCell::new(Vec::new()));
        let removed = record(&nb, "page-removed", &log);
        let switched = record(&nb, "switch-page", &log);

        drop(second);
        assert_eq!(nb.n_pages(), 2);
        assert_eq!(nb.current_page(), Some(1));
        assert_eq!(
            *log.borrow(),
            vec![("page-removed".to_string(), 1), ("switch-page".to_string(), 1)]
        );

        log.borrow_mut().clear();
        drop(first);
        assert_eq!(nb.current_page(), Some(0));
        assert_eq!(*log.borrow(), vec![("page-removed".to_string(), 0)]);

        removed.disconnect(&rt);
        switched.disconnect(&rt);
    }

    #[test]
    fn test_notebook_page_watch_goes_with_page() {
        let rt = Runtime::new();
        let nb: Handle<Notebook, RefCounted> = Handle::adopt(Notebook::create(&rt));
        let first = page(&rt, &nb);
        let second = page(&rt, &nb);
        assert_eq!(rt.handler_count(first.id()), 1);
        assert_eq!(rt.total_handlers(), 3);

        drop(first);
        assert_eq!(rt.total_handlers(), 2);
        assert_eq!(rt.handler_count(second.id()), 1);
    }

    #[test]
    fn test_notebook_teardown_disconnects_child_watches() {
        let rt = Runtime::new();
        let nb: Handle<Notebook, RefCounted> = Handle::adopt(Notebook::create(&rt));
        let child = page(&rt, &nb);
        assert_eq!(rt.handler_count(child.id()), 1);

        drop(nb);
        assert!(child.is_alive());
        assert_eq!(rt.handler_count(child.id()), 0);
        assert_eq!(rt.total_handlers(), 0);
    }

    #[test]
    fn test_notebook_tab_label_released_with_page() {
        let rt = Runtime::new();
        let nb: Handle<Notebook, RefCounted> = Handle::adopt(Notebook::create(&rt));
        let child = page(&rt, &nb);
        let label = nb.tab_label(child.id()).expect("page has a tab label");
        assert!(rt.is_alive(label));

        drop(child);
        assert!(!rt.is_alive(label));
        assert!(nb.children().is_empty());
    }

    #[test]
    fn test_notebook_reorder_keeps_current_child() {
        let rt = Runtime::new();
        let nb: Handle<Notebook, RefCounted> = Handle::adopt(Notebook::create(&rt));
        let pages: Vec<_> = (0..4).map(|_| page(&rt, &nb)).collect();
        nb.set_current_page(1);

        let log = Rc::new(RefCell::new(Vec::new()));
        let conn = record(&nb, "page-reordered", &log);
        nb.reorder_child(pages[1].id(), 3);

        assert_eq!(nb.nth_page(3), Some(pages[1].id()));
        assert_eq!(nb.nth_page(1), Some(pages[2].id()));
        assert_eq!(nb.current_page(), Some(3));
        assert_eq!(*log.borrow(), vec![("page-reordered".to_string(), 3)]);
        conn.disconnect(&rt);
    }

    #[test]
    fn test_window_key_press_reports_stop() {
        let rt = Runtime::new();
        let window: Handle<Window, Unique> = Handle::adopt(Window::create(&rt, "t"));
        window.set_default_size(800, 600);
        assert_eq!(window.default_size(), Some((800, 600)));

        let conn = window.connect_key_press(|_, event| {
            if event.ctrl {
                Propagation::Stop
            } else {
                Propagation::Proceed
            }
        });
        let key = crate::toolkit::Key::Char('t');
        assert_eq!(window.key_press(KeyEvent::ctrl(key)), Propagation::Stop);
        assert_eq!(window.key_press(KeyEvent::new(key)), Propagation::Proceed);
        conn.disconnect(&rt);
    }
}
