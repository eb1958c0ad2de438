//! Serializers: AST back to Markdown, or to HTML.
//!
//! Both walk the tree recursively and match on every node kind; unknown
//! kinds and fragments render as the concatenation of their children.

mod html;
mod markdown;
mod writer;

pub use html::{to_html, to_html_with_options};
pub use markdown::to_markdown;
pub use writer::HtmlWriter;
