//! Desktop frontend for the Vireo shell

mod app;

pub use app::{run, BrowserApp};

/// UI configuration
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub default_zoom: f32,
    pub theme: Theme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_zoom: 1.0,
            theme: Theme::System,
        }
    }
}

/// UI theme
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    /// Parse a theme name as given on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        assert_eq!(Theme::from_name("Dark"), Some(Theme::Dark));
        assert_eq!(Theme::from_name("light"), Some(Theme::Light));
        assert_eq!(Theme::from_name("sepia"), None);
    }
}
