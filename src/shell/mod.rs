//! Browser shell
//!
//! The shell ties the toolkit and the engine together: it owns the tabs,
//! decides which one is shown and keeps the window chrome in line with it.
//!
//! - **tab**: tabs and the ordered tab collection
//! - **page**: the active page and the subscriptions bound to it
//! - **reorder**: in-place relocation used for tab drags
//! - **browser**: the window, its event queue and key bindings

mod browser;
mod chrome;
mod event;
mod keys;
mod page;
mod reorder;
mod tab;
mod uri;

pub use browser::Browser;
pub use chrome::{Chrome, ChromeSignals};
pub use event::{EventQueue, ShellEvent};
pub use keys::Shortcut;
pub use page::{ActivePage, PageController, PageSignals};
pub use reorder::relocate;
pub use tab::{Tab, TabCollection};
pub use uri::guess_uri;

/// What happens when the last tab is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastTabPolicy {
    /// Close the browser window
    #[default]
    CloseWindow,
    /// Open a fresh blank tab
    KeepOne,
}

/// Shell configuration
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Window title for pages without one
    pub default_title: String,
    /// Tab label for pages without a title
    pub tab_placeholder: String,
    pub last_tab_policy: LastTabPolicy,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            default_title: crate::NAME.to_string(),
            tab_placeholder: "New tab".to_string(),
            last_tab_policy: LastTabPolicy::default(),
            window_width: 1024,
            window_height: 768,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_config_default() {
        let config = ShellConfig::default();
        assert_eq!(config.default_title, "Vireo");
        assert_eq!(config.tab_placeholder, "New tab");
        assert_eq!(config.last_tab_policy, LastTabPolicy::CloseWindow);
        assert_eq!((config.window_width, config.window_height), (1024, 768));
    }
}
