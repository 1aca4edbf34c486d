//! Window key bindings

use crate::toolkit::{Key, KeyEvent};

/// A key binding the browser window handles itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl+Tab
    NextTab,
    /// Ctrl+Shift+Tab
    PreviousTab,
    /// Ctrl+L
    FocusEntry,
    /// Ctrl+T
    NewTab,
    /// Ctrl+W
    CloseTab,
    /// Ctrl+Q
    Quit,
    /// Ctrl+1 through Ctrl+8, zero-based
    GotoTab(usize),
    /// Ctrl+9
    LastTab,
}

impl Shortcut {
    /// Map a key press to a binding, if it is one
    pub fn from_key(event: KeyEvent) -> Option<Self> {
        if !event.ctrl {
            return None;
        }
        let shortcut = match (event.shift, event.key) {
            (true, Key::Tab) => Self::PreviousTab,
            (false, Key::Tab) => Self::NextTab,
            (false, Key::Char('l')) => Self::FocusEntry,
            (false, Key::Char('t')) => Self::NewTab,
            (false, Key::Char('w')) => Self::CloseTab,
            (false, Key::Char('q')) => Self::Quit,
            (false, Key::Digit(n @ 1..=8)) => Self::GotoTab(usize::from(n) - 1),
            (false, Key::Digit(9)) => Self::LastTab,
            _ => return None,
        };
        Some(shortcut)
    }

    /// The page a navigation binding selects, given the current page and the
    /// page count. `None` for bindings that do not select a page, or when the
    /// requested page does not exist.
    pub fn target(self, current: usize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self {
            Self::NextTab => Some((current + 1) % len),
            Self::PreviousTab => Some(if current == 0 { len - 1 } else { current - 1 }),
            Self::GotoTab(n) => (n < len).then_some(n),
            Self::LastTab => Some(len - 1),
            Self::FocusEntry | Self::NewTab | Self::CloseTab | Self::Quit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_requires_ctrl() {
        assert_eq!(Shortcut::from_key(KeyEvent::new(Key::Char('t'))), None);
        assert_eq!(
            Shortcut::from_key(KeyEvent::ctrl(Key::Char('t'))),
            Some(Shortcut::NewTab)
        );
    }

    #[test]
    fn test_tab_cycling_keys() {
        assert_eq!(Shortcut::from_key(KeyEvent::ctrl(Key::Tab)), Some(Shortcut::NextTab));
        assert_eq!(
            Shortcut::from_key(KeyEvent::ctrl_shift(Key::Tab)),
            Some(Shortcut::PreviousTab)
        );
        assert_eq!(Shortcut::from_key(KeyEvent::ctrl_shift(Key::Char('t'))), None);
    }

    #[test]
    fn test_digits() {
        assert_eq!(
            Shortcut::from_key(KeyEvent::ctrl(Key::Digit(1))),
            Some(Shortcut::GotoTab(0))
        );
        assert_eq!(
            Shortcut::from_key(KeyEvent::ctrl(Key::Digit(8))),
            Some(Shortcut::GotoTab(7))
        );
        assert_eq!(Shortcut::from_key(KeyEvent::ctrl(Key::Digit(9))), Some(Shortcut::LastTab));
        assert_eq!(Shortcut::from_key(KeyEvent::ctrl(Key::Digit(0))), None);
    }

    #[test]
    fn test_targets_wrap() {
        assert_eq!(Shortcut::NextTab.target(2, 3), Some(0));
        assert_eq!(Shortcut::PreviousTab.target(0, 3), Some(2));
        assert_eq!(Shortcut::PreviousTab.target(2, 3), Some(1));
        assert_eq!(Shortcut::LastTab.target(0, 5), Some(4));
    }

    #[test]
    fn test_goto_missing_tab_is_ignored() {
        assert_eq!(Shortcut::GotoTab(3).target(0, 3), None);
        assert_eq!(Shortcut::GotoTab(2).target(0, 3), Some(2));
        assert_eq!(Shortcut::NextTab.target(0, 0), None);
        assert_eq!(Shortcut::Quit.target(0, 3), None);
    }
}
