//! # Vireo - a tabbed browser shell
//!
//! Vireo drives a reference-counted widget toolkit and a web engine model.
//! The interesting part is lifetime management: who owns each toolkit
//! object, when floating references are claimed, and which signal handlers
//! are connected while a given tab is shown.
//!
//! ## Architecture
//!
//! - **toolkit**: object runtime, ownership handles, signals and widgets
//! - **engine**: content views and their back/forward history
//! - **shell**: tabs, the active page, the browser window
//! - **ui**: eframe/egui frontend
//! - **utils**: shared utilities and error types

pub mod engine;
pub mod shell;
pub mod toolkit;
pub mod ui;
pub mod utils;

// Re-export main types for convenience
pub use shell::{Browser, LastTabPolicy, ShellConfig};
pub use utils::error::{Result, ShellError};

/// Browser version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "Vireo";
