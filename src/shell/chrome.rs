//! Window, navigation bar and notebook shared by every tab

use log::{debug, trace};

use super::{EventQueue, ShellConfig, ShellEvent, Shortcut};
use crate::engine::WebView;
use crate::toolkit::{
    Button, Connection, Container, HBox, Handle, HeaderBar, Notebook, Object, Propagation,
    RefCounted, Runtime, Unique, UriEntry, Widget, Window,
};

/// The browser's fixed widgets
pub struct Chrome {
    histnav: Handle<HBox, RefCounted>,
    back: Handle<Button, RefCounted>,
    forward: Handle<Button, RefCounted>,
    new_tab: Handle<Button, RefCounted>,
    entry: Handle<UriEntry, RefCounted>,
    notebook: Handle<Notebook, RefCounted>,
    header: Handle<HeaderBar, RefCounted>,
    window: Handle<Window, Unique>,
}

impl Chrome {
    pub fn build(rt: &Runtime, config: &ShellConfig) -> Self {
        let window: Handle<Window, Unique> =
            Handle::adopt(Window::create(rt, &config.default_title));
        let header: Handle<HeaderBar, RefCounted> = Handle::adopt(HeaderBar::create(rt));
        let histnav: Handle<HBox, RefCounted> = Handle::adopt(HBox::create(rt));
        let back: Handle<Button, RefCounted> = Handle::adopt(Button::create(rt, "go-previous"));
        let forward: Handle<Button, RefCounted> = Handle::adopt(Button::create(rt, "go-next"));
        let new_tab: Handle<Button, RefCounted> = Handle::adopt(Button::create(rt, "add"));
        let entry: Handle<UriEntry, RefCounted> = Handle::adopt(UriEntry::create(rt));
        let notebook: Handle<Notebook, RefCounted> = Handle::adopt(Notebook::create(rt));

        back.set_can_focus(false);
        forward.set_can_focus(false);
        histnav.add(back.get());
        histnav.add(forward.get());
        header.pack_start(histnav.get());
        header.set_custom_title(entry.get());
        new_tab.set_can_focus(false);
        new_tab.show();
        header.pack_end(new_tab.get());

        window.set_default_size(config.window_width, config.window_height);
        window.set_titlebar(header.get());
        window.add(notebook.get());
        debug!("built chrome in {:?}", window.get());

        Self {
            histnav,
            back,
            forward,
            new_tab,
            entry,
            notebook,
            header,
            window,
        }
    }

    /// Subscribe the permanent chrome handlers
    pub fn connect(&self, queue: &EventQueue) -> ChromeSignals {
        let sender = queue.clone();
        let activate = self.entry.connect_activate(move |_, _| {
            sender.push(ShellEvent::EntryActivated);
        });
        let sender = queue.clone();
        let switch_page = self.notebook.connect_switch_page(move |_, child, index| {
            sender.push(ShellEvent::PageSwitched { child, index });
        });
        let sender = queue.clone();
        let page_added = self.notebook.connect_page_added(move |_, _, index| {
            sender.push(ShellEvent::PageAdded { index });
        });
        let sender = queue.clone();
        let page_removed = self.notebook.connect_page_removed(move |_, _, index| {
            sender.push(ShellEvent::PageRemoved { index });
        });
        let sender = queue.clone();
        let new_tab = self.new_tab.connect_clicked(move |_, _| {
            sender.push(ShellEvent::NewTabClicked);
        });
        let sender = queue.clone();
        let key_press = self.window.connect_key_press(move |_, event| {
            match Shortcut::from_key(event) {
                Some(shortcut) => {
                    sender.push(ShellEvent::Shortcut(shortcut));
                    Propagation::Stop
                }
                None => Propagation::Proceed,
            }
        });
        let sender = queue.clone();
        let destroy = self.window.connect_destroy(move |_, _| {
            sender.push(ShellEvent::WindowDestroyed);
        });

        ChromeSignals {
            activate,
            switch_page,
            page_added,
            page_removed,
            new_tab,
            key_press,
            destroy,
        }
    }

    /// Show `title`, or the default title for an untitled page
    pub fn set_title(&self, title: Option<&str>, default: &str) {
        self.window
            .set_title(title.filter(|t| !t.is_empty()).unwrap_or(default));
    }

    /// Enable the history buttons according to `view`
    pub fn sync_histnav(&self, view: &WebView) {
        self.back.set_sensitive(view.can_go_back());
        self.forward.set_sensitive(view.can_go_forward());
    }

    pub fn window(&self) -> &Window {
        self.window.get()
    }

    pub fn header_bar(&self) -> &HeaderBar {
        self.header.get()
    }

    pub fn back_button(&self) -> &Button {
        self.back.get()
    }

    pub fn forward_button(&self) -> &Button {
        self.forward.get()
    }

    pub fn new_tab_button(&self) -> &Button {
        self.new_tab.get()
    }

    pub fn entry(&self) -> &UriEntry {
        self.entry.get()
    }

    pub fn notebook(&self) -> &Notebook {
        self.notebook.get()
    }
}

/// Chrome subscriptions alive for the whole browser lifetime
#[derive(Debug)]
pub struct ChromeSignals {
    activate: Connection,
    switch_page: Connection,
    page_added: Connection,
    page_removed: Connection,
    new_tab: Connection,
    key_press: Connection,
    destroy: Connection,
}

impl ChromeSignals {
    pub const COUNT: usize = 7;

    pub fn disconnect(self, rt: &Runtime) {
        let connections = [
            self.activate,
            self.switch_page,
            self.page_added,
            self.page_removed,
            self.new_tab,
            self.key_press,
            self.destroy,
        ];
        for connection in connections {
            // Handlers on a window destroyed by the user went with it.
            if connection.is_live(rt) {
                connection.disconnect(rt);
            } else {
                trace!("{:?} already gone with its object", connection);
            }
        }
    }
}
