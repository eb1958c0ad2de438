//! Code spans and inline math.
//!
//! Both are raw zones: their content is kept verbatim and never re-parsed.

use crate::cursor::Cursor;
use crate::node::{Node, NodeKind};

const TICK: u8 = b'`';
const DOLLAR: u8 = b'$';

/// A backtick run closed by the next run of the same length.
pub(super) fn try_code_span(cur: &mut Cursor<'_>) -> Option<Node> {
    let run = cur.run_length(TICK);
    let mut c = *cur;
    c.advance(run);
    let inner_start = c.offset();

    while let Some(rel) = c.find(TICK) {
        c.advance(rel);
        let close = c.offset();
        let len = c.run_length(TICK);
        c.advance(len);
        if len == run {
            let raw = c.slice(inner_start, close);
            *cur = c;
            return Some(Node::leaf(NodeKind::InlineCode, strip_padding(raw)));
        }
    }
    None
}

/// One leading and one trailing space are dropped when both are present,
/// unless the content is nothing but spaces.
fn strip_padding(raw: &str) -> &str {
    if raw.len() >= 2
        && raw.starts_with(' ')
        && raw.ends_with(' ')
        && !raw.bytes().all(|b| b == b' ')
    {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// `$x$`: a single dollar followed by non-whitespace, closed by the first
/// later dollar that does not follow whitespace. `$$` inline is literal.
pub(super) fn try_math_span(cur: &mut Cursor<'_>) -> Option<Node> {
    if cur.run_length(DOLLAR) != 1 {
        return None;
    }
    let mut c = *cur;
    c.bump();
    let inner_start = c.offset();
    if c.peek().is_none_or(|b| b.is_ascii_whitespace()) {
        return None;
    }

    while let Some(rel) = c.find(DOLLAR) {
        c.advance(rel);
        let close = c.offset();
        let after_space = c.peek_back().is_some_and(|b| b.is_ascii_whitespace());
        c.bump();
        if !after_space {
            let value = c.slice(inner_start, close);
            *cur = c;
            return Some(Node::leaf(NodeKind::MathSpan, value));
        }
    }
    None
}
