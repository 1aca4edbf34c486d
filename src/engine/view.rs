//! Content view widget

use log::{debug, trace};

use super::BackForwardList;
use crate::toolkit::{
    object_type, Connection, Floating, LoadEvent, Object, ObjectId, ObjectKind, ObjectType,
    Payload, Propagation, Runtime, Widget,
};

object_type!(
    /// A page of web content
    WebView,
    ObjectKind::WebView
);

#[derive(Debug)]
struct ViewState {
    uri: Option<String>,
    title: Option<String>,
    history: ObjectId,
}

impl WebView {
    pub fn create(rt: &Runtime) -> Floating<Self> {
        let id = rt.create(Self::KIND);
        let history = BackForwardList::create(rt);
        // The view owns its history list; nobody else ever sinks it.
        let history_id = history.into_claimed();
        rt.add_child(id, history_id);
        rt.set_data(
            id,
            ViewState {
                uri: None,
                title: None,
                history: history_id,
            },
        );
        Floating::new(Self::wrap(rt, id))
    }

    /// Create a view and start loading `uri` (nothing for an empty uri)
    pub fn create_with_uri(rt: &Runtime, uri: &str) -> Floating<Self> {
        let view = Self::create(rt);
        view.load_uri(uri);
        view
    }

    pub fn uri(&self) -> Option<String> {
        self.rt
            .with_data(self.id, |s: &mut ViewState| s.uri.clone())
            .flatten()
    }

    pub fn title(&self) -> Option<String> {
        self.rt
            .with_data(self.id, |s: &mut ViewState| s.title.clone())
            .flatten()
    }

    /// Non-owning view of the history list; valid while this view lives
    pub fn back_forward_list(&self) -> Option<BackForwardList> {
        self.rt
            .with_data(self.id, |s: &mut ViewState| s.history)
            .map(|id| BackForwardList::wrap(&self.rt, id))
    }

    pub fn can_go_back(&self) -> bool {
        self.back_forward_list()
            .is_some_and(|list| list.can_go_back())
    }

    pub fn can_go_forward(&self) -> bool {
        self.back_forward_list()
            .is_some_and(|list| list.can_go_forward())
    }

    pub fn load_uri(&self, uri: &str) {
        if uri.is_empty() {
            trace!("{:?}: nothing to load", self);
            return;
        }
        debug!("{:?} loading {}", self, uri);
        self.load(uri, true);
    }

    pub fn reload(&self) {
        if self.uri().is_none() {
            return;
        }
        self.load_changed(LoadEvent::Started);
        self.load_changed(LoadEvent::Finished);
    }

    pub fn go_back(&self) {
        if let Some(uri) = self.back_forward_list().and_then(|list| list.go_back()) {
            self.load(&uri, false);
        }
    }

    pub fn go_forward(&self) {
        if let Some(uri) = self.back_forward_list().and_then(|list| list.go_forward()) {
            self.load(&uri, false);
        }
    }

    /// Report the title parsed from the loaded document
    pub fn set_document_title(&self, title: &str) {
        self.rt.with_data(self.id, |s: &mut ViewState| {
            s.title = Some(title.to_string());
        });
        self.emit("notify::title", Payload::None);
    }

    fn load(&self, uri: &str, record: bool) {
        self.load_changed(LoadEvent::Started);
        let had_title = self
            .rt
            .with_data(self.id, |s: &mut ViewState| {
                s.uri = Some(uri.to_string());
                s.title.take().is_some()
            })
            .unwrap_or(false);
        self.emit("notify::uri", Payload::None);
        if record {
            if let Some(list) = self.back_forward_list() {
                list.push(uri);
            }
        }
        self.load_changed(LoadEvent::Committed);
        if had_title {
            self.emit("notify::title", Payload::None);
        }
        self.load_changed(LoadEvent::Finished);
    }

    fn load_changed(&self, event: LoadEvent) {
        self.emit("load-changed", Payload::Load(event));
    }

    pub fn connect_notify_uri<F>(&self, f: F) -> Connection
    where
        F: Fn(&Runtime, ObjectId) + 'static,
    {
        self.connect("notify::uri", move |rt, emission| {
            f(rt, emission.source);
            Propagation::Proceed
        })
    }

    pub fn connect_notify_title<F>(&self, f: F) -> Connection
    where
        F: Fn(&Runtime, ObjectId) + 'static,
    {
        self.connect("notify::title", move |rt, emission| {
            f(rt, emission.source);
            Propagation::Proceed
        })
    }

    pub fn connect_load_changed<F>(&self, f: F) -> Connection
    where
        F: Fn(&Runtime, ObjectId, LoadEvent) + 'static,
    {
        self.connect("load-changed", move |rt, emission| {
            if let Payload::Load(event) = emission.payload {
                f(rt, emission.source, *event);
            }
            Propagation::Proceed
        })
    }
}

impl Widget for WebView {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::{Handle, Unique};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_new_view_has_no_uri_or_title() {
        let rt = Runtime::new();
        let view: Handle<WebView, Unique> = Handle::adopt(WebView::create_with_uri(&rt, ""));
        assert_eq!(view.uri(), None);
        assert_eq!(view.title(), None);
        assert!(!view.can_go_back());
    }

    #[test]
    fn test_load_emits_sequence() {
        let rt = Runtime::new();
        let view: Handle<WebView, Unique> = Handle::adopt(WebView::create(&rt));
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let conn = view.connect_load_changed(move |_, _, event| sink.borrow_mut().push(event));

        view.load_uri("https://example.com/");
        assert_eq!(
            *events.borrow(),
            vec![LoadEvent::Started, LoadEvent::Committed, LoadEvent::Finished]
        );
        assert_eq!(view.uri().as_deref(), Some("https://example.com/"));
        conn.disconnect(&rt);
    }

    #[test]
    fn test_navigation_clears_title() {
        let rt = Runtime::new();
        let view: Handle<WebView, Unique> =
            Handle::adopt(WebView::create_with_uri(&rt, "https://a.example/"));
        view.set_document_title("A");
        assert_eq!(view.title().as_deref(), Some("A"));

        view.load_uri("https://b.example/");
        assert_eq!(view.title(), None);
        assert!(view.can_go_back());

        view.go_back();
        assert_eq!(view.uri().as_deref(), Some("https://a.example/"));
        assert!(view.can_go_forward());
        view.go_forward();
        assert_eq!(view.uri().as_deref(), Some("https://b.example/"));
    }

    #[test]
    fn test_history_list_dies_with_view() {
        let rt = Runtime::new();
        let view: Handle<WebView, Unique> = Handle::adopt(WebView::create(&rt));
        let list = view.back_forward_list().expect("live view has a history list");
        assert!(list.is_alive());

        drop(view);
        assert!(!list.is_alive());
        assert_eq!(rt.live_objects(), 0);
    }
}
