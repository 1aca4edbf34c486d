//! Embedded web engine model
//!
//! Each content view is a widget in the toolkit runtime. It owns a
//! back/forward history list, which callers only ever see through a
//! non-owning view whose lifetime is tied to the content view.
//!
//! Loads complete synchronously: `load_uri` emits the whole
//! started/committed/finished sequence before returning. The engine never
//! fetches anything, so a page's title stays absent until
//! [`WebView::set_document_title`] reports one.

mod history;
mod view;

pub use history::BackForwardList;
pub use view::WebView;

pub use crate::toolkit::LoadEvent;
