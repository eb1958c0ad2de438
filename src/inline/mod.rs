//! Inline parser for Markdown.
//!
//! A single left-to-right scan over the text of a leaf block. Plain text
//! accumulates until a construct matches at the cursor; the pending text is
//! then flushed as a `Text` node and the construct's node is emitted.
//!
//! At each position constructs are tried in a fixed order:
//! backslash escape, code span, inline math, wiki embed / wiki link,
//! footnote reference, image, link, highlight, strike, the emphasis family,
//! inline HTML and autolinks. The first one that matches wins.

mod code_span;
mod emphasis;
mod links;

pub use links::{IMAGE_EXTENSIONS, is_image_file};

use tracing::warn;

use crate::cursor::Cursor;
use crate::escape::is_ascii_punctuation;
use crate::limits::MAX_INLINE_NESTING;
use crate::node::{Node, NodeKind};

/// Parse a span of text into inline nodes.
///
/// ```
/// use vaultdown::{parse_inline, NodeKind};
///
/// let nodes = parse_inline("see [[Note|here]]");
/// assert_eq!(nodes[1].kind, NodeKind::WikiLink);
/// ```
pub fn parse_inline(text: &str) -> Vec<Node> {
    InlineParser::new().parse(text)
}

/// Inline parser state: only the current nesting depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineParser {
    depth: usize,
}

impl InlineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse inline content into nodes.
    pub fn parse(&self, text: &str) -> Vec<Node> {
        let mut cur = Cursor::new(text);
        let mut out = Vec::new();
        let mut text_start = 0;

        while let Some(b) = cur.peek() {
            let start = cur.offset();
            if let Some(node) = self.try_construct(b, &mut cur) {
                flush_text(&mut out, cur.slice(text_start, start));
                out.push(node);
                text_start = cur.offset();
                continue;
            }
            match b {
                // An unmatched delimiter run stays literal as a whole
                b'`' | b'$' | b'*' | b'=' | b'~' => cur.advance(cur.run_length(b)),
                _ => cur.bump_char(),
            }
        }

        flush_text(&mut out, cur.slice_from(text_start));
        out
    }

    fn try_construct(&self, b: u8, cur: &mut Cursor<'_>) -> Option<Node> {
        match b {
            b'\\' => try_escape(cur),
            b'`' => code_span::try_code_span(cur),
            b'$' => code_span::try_math_span(cur),
            b'!' => links::try_wiki(cur).or_else(|| links::try_image(cur)),
            b'[' => links::try_wiki(cur)
                .or_else(|| links::try_footnote_ref(cur))
                .or_else(|| links::try_link(cur, self)),
            b'=' | b'~' | b'*' => emphasis::try_delimited(cur, self),
            b'<' => links::try_angle(cur),
            b'h' => links::try_bare_autolink(cur),
            _ => None,
        }
    }

    /// Parse the inner text of a construct one level deeper.
    fn nested(&self, text: &str) -> Vec<Node> {
        if self.depth + 1 >= MAX_INLINE_NESTING {
            warn!(depth = self.depth, "inline nesting limit reached, keeping text literal");
            return vec![Node::text(text)];
        }
        InlineParser {
            depth: self.depth + 1,
        }
        .parse(text)
    }
}

fn flush_text(out: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        out.push(Node::text(text));
    }
}

/// `\` followed by ASCII punctuation.
fn try_escape(cur: &mut Cursor<'_>) -> Option<Node> {
    let escaped = cur.peek_ahead(1).filter(|&b| is_ascii_punctuation(b))?;
    cur.advance(2);
    Some(Node::leaf(NodeKind::EscapedChar, char::from(escaped).to_string()))
}
