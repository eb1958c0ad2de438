//! Block-level parser for Markdown.
//!
//! The block parser is line-oriented and handles, in priority order:
//! - Front matter
//! - HTML and `%%` comments
//! - Fenced code and math blocks
//! - Callouts and blockquotes
//! - Lists (including task items)
//! - Thematic breaks
//! - ATX and setext headings
//! - Pipe tables
//! - Footnote definitions
//! - HTML blocks
//! - Paragraphs

mod container;
mod parser;
mod table;

pub use parser::BlockParser;
