//! vaultdown: Obsidian-flavored Markdown parser, rewriter and serializer
//!
//! Text goes through three stages:
//! 1. [`parse`] builds a [`Node`] tree (block parser, then inline parser on
//!    leaf text).
//! 2. An [`Executor`] applies a priority-ordered set of [`Rule`]s, producing
//!    a new tree that shares every untouched subtree with the input.
//! 3. [`to_markdown`] or [`to_html`] renders the result.
//!
//! # Design Principles
//! - Liberal recovery: parsing never fails, unterminated constructs degrade
//!   to text or run to the end of input
//! - Bounded recursion: container nesting is capped by [`limits`]
//! - Rules are data: name, priority and enabled flag are introspectable,
//!   only predicates and custom rewrites are code
//!
//! # Example
//! ```
//! use vaultdown::rule::catalog;
//! use vaultdown::{Executor, parse, to_markdown};
//!
//! let doc = parse("See [[Other Note|this]] and ==that==.");
//! let executor = Executor::with_rules([
//!     catalog::wikilinks_to_links(|name| format!("{name}.md")),
//!     catalog::unwrap_highlight(),
//! ])?;
//! let out = executor.execute(&doc)?;
//! assert_eq!(to_markdown(&out), "See [this](<Other Note.md>) and that.\n");
//! # Ok::<(), vaultdown::Error>(())
//! ```

pub mod block;
pub mod cursor;
pub mod error;
pub mod escape;
pub mod executor;
pub mod inline;
pub mod limits;
pub mod node;
pub mod render;
pub mod rule;

// Re-export primary types
pub use block::BlockParser;
pub use error::{Error, Result};
pub use executor::{Context, Executor, Stats};
pub use inline::{InlineParser, parse_inline};
pub use node::{Align, Attrs, Body, Fold, LinkType, Node, NodeKind};
pub use render::{HtmlWriter, to_html, to_html_with_options, to_markdown};
pub use rule::{Condition, Matcher, Rewriter, Rule, RuleBuilder, Transform};

/// Parsing/rendering options.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Pass raw inline and block HTML through when rendering HTML; escape it otherwise.
    pub allow_html: bool,
    /// Recognize a `---` front matter block at the start of the document.
    pub front_matter: bool,
    /// Maximum depth of nested quotes, callouts and lists.
    pub max_nesting: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allow_html: true,
            front_matter: true,
            max_nesting: limits::MAX_BLOCK_NESTING,
        }
    }
}

/// Parse a document with default options.
///
/// # Example
/// ```
/// use vaultdown::{NodeKind, parse};
///
/// let doc = parse("> [!note] Title\n> body");
/// let callout = &doc.children()[0];
/// assert_eq!(callout.kind, NodeKind::Callout);
/// assert_eq!(callout.attrs.callout_type.as_deref(), Some("note"));
/// ```
pub fn parse(input: &str) -> Node {
    parse_with_options(input, &Options::default())
}

/// Parse a document with options.
pub fn parse_with_options(input: &str, options: &Options) -> Node {
    BlockParser::new(options).parse(input)
}

/// Convert Markdown to HTML.
///
/// This is the primary API for simple use cases.
///
/// # Example
/// ```
/// let html = vaultdown::markdown_to_html("# Hello\n\n==World==");
/// assert!(html.contains("<h1>Hello</h1>"));
/// assert!(html.contains("<p><mark>World</mark></p>"));
/// ```
pub fn markdown_to_html(input: &str) -> String {
    to_html(&parse(input))
}

/// Parse and re-serialize, producing canonical Markdown.
///
/// Normalizing already-normalized text returns it unchanged.
pub fn normalize(input: &str) -> String {
    to_markdown(&parse(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_fixed_point() {
        let input = "Title\n===\n* a\n    + b\n\n| x |\n|:-:|\n| 1 |\n";
        let once = normalize(input);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_options_default() {
        let options = Options::default();
        assert!(options.allow_html);
        assert!(options.front_matter);
        assert_eq!(options.max_nesting, limits::MAX_BLOCK_NESTING);
    }

    #[test]
    fn test_escaped_html_option() {
        let options = Options {
            allow_html: false,
            ..Options::default()
        };
        let html = to_html_with_options(&parse("<b>x</b>"), &options);
        assert_eq!(html, "&lt;b&gt;x&lt;/b&gt;\n");
    }
}
