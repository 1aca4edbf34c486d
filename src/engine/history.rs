//! Back/forward history of a content view

use log::trace;

use crate::toolkit::{
    object_type, Connection, Floating, Object, ObjectId, ObjectKind, ObjectType, Payload,
    Propagation, Runtime,
};

object_type!(
    /// History list owned by a [`super::WebView`]
    BackForwardList,
    ObjectKind::BackForwardList
);

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<String>,
    current: Option<usize>,
}

impl BackForwardList {
    pub(crate) fn create(rt: &Runtime) -> Floating<Self> {
        let id = rt.create(Self::KIND);
        rt.set_data(id, HistoryState::default());
        Floating::new(Self::wrap(rt, id))
    }

    fn changed(&self) {
        self.emit("changed", Payload::None);
    }

    /// Record a new navigation, dropping any forward entries
    pub(crate) fn push(&self, uri: &str) {
        self.rt.with_data(self.id, |s: &mut HistoryState| {
            let keep = s.current.map_or(0, |c| c + 1);
            s.entries.truncate(keep);
            s.entries.push(uri.to_string());
            s.current = Some(s.entries.len() - 1);
        });
        trace!("{:?} pushed {}", self, uri);
        self.changed();
    }

    pub(crate) fn go_back(&self) -> Option<String> {
        let uri = self
            .rt
            .with_data(self.id, |s: &mut HistoryState| match s.current {
                Some(c) if c > 0 => {
                    s.current = Some(c - 1);
                    Some(s.entries[c - 1].clone())
                }
                _ => None,
            })
            .flatten();
        if uri.is_some() {
            self.changed();
        }
        uri
    }

    pub(crate) fn go_forward(&self) -> Option<String> {
        let uri = self
            .rt
            .with_data(self.id, |s: &mut HistoryState| match s.current {
                Some(c) if c + 1 < s.entries.len() => {
                    s.current = Some(c + 1);
                    Some(s.entries[c + 1].clone())
                }
                _ => None,
            })
            .flatten();
        if uri.is_some() {
            self.changed();
        }
        uri
    }

    pub fn can_go_back(&self) -> bool {
        self.rt
            .with_data(self.id, |s: &mut HistoryState| {
                matches!(s.current, Some(c) if c > 0)
            })
            .unwrap_or(false)
    }

    pub fn can_go_forward(&self) -> bool {
        self.rt
            .with_data(self.id, |s: &mut HistoryState| {
                matches!(s.current, Some(c) if c + 1 < s.entries.len())
            })
            .unwrap_or(false)
    }

    pub fn current_uri(&self) -> Option<String> {
        self.rt
            .with_data(self.id, |s: &mut HistoryState| {
                s.current.map(|c| s.entries[c].clone())
            })
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.rt
            .with_data(self.id, |s: &mut HistoryState| s.entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn connect_changed<F>(&self, f: F) -> Connection
    where
        F: Fn(&Runtime, ObjectId) + 'static,
    {
        self.connect("changed", move |rt, emission| {
            f(rt, emission.source);
            Propagation::Proceed
        })
    }
}
