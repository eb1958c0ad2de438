//! Emphasis family, highlight and strikethrough.
//!
//! All five constructs share one rule: the opener is a run of exactly the
//! construct's delimiter length followed by non-whitespace, and the closer
//! is the first later run that does not follow whitespace and is either of
//! the same length or longer with its leading surplus closing a construct
//! still open inside (`**bold *italic***`). The inner text is parsed again.

use super::InlineParser;
use crate::cursor::Cursor;
use crate::node::{Node, NodeKind};

/// Construct produced by a delimiter run of a given length.
fn kind_for(delim: u8, run: usize) -> Option<NodeKind> {
    match (delim, run) {
        (b'*', 1) => Some(NodeKind::Emphasis),
        (b'*', 2) => Some(NodeKind::Strong),
        (b'*', 3) => Some(NodeKind::StrongEmphasis),
        (b'=', 2) => Some(NodeKind::Highlight),
        (b'~', 2) => Some(NodeKind::Strike),
        _ => None,
    }
}

pub(super) fn try_delimited(cur: &mut Cursor<'_>, parser: &InlineParser) -> Option<Node> {
    let delim = cur.peek()?;
    let run = cur.run_length(delim);
    let kind = kind_for(delim, run)?;

    let mut c = *cur;
    c.advance(run);
    let inner_start = c.offset();
    if c.peek().is_none_or(|b| b.is_ascii_whitespace()) {
        return None;
    }

    let inner_end = find_closer(&mut c, inner_start, delim, run)?;
    let inner = c.slice(inner_start, inner_end);
    *cur = c;
    Some(Node::container(kind, parser.nested(inner)))
}

/// Move past the first closing run and return the offset where the inner
/// text ends.
///
/// A longer run closes only when its surplus closes an inner opener; the
/// trailing `run` bytes then belong to this construct.
fn find_closer(c: &mut Cursor<'_>, inner_start: usize, delim: u8, run: usize) -> Option<usize> {
    while let Some(rel) = c.find(delim) {
        c.advance(rel);
        let start = c.offset();
        let after_space = c.peek_back().is_some_and(|b| b.is_ascii_whitespace());
        let len = c.run_length(delim);
        c.advance(len);
        if after_space || len < run {
            continue;
        }
        if len == run {
            return Some(start);
        }
        let surplus = len - run;
        if kind_for(delim, surplus).is_some()
            && has_open_run(c.slice(inner_start, start).as_bytes(), delim, surplus)
        {
            return Some(start + surplus);
        }
    }
    None
}

/// Whether `text` ends with an unclosed opener run of exactly `len`
/// delimiters.
fn has_open_run(text: &[u8], delim: u8, len: usize) -> bool {
    let mut open = false;
    let mut i = 0;
    while i < text.len() {
        if text[i] != delim {
            i += 1;
            continue;
        }
        let start = i;
        while i < text.len() && text[i] == delim {
            i += 1;
        }
        if i - start != len {
            continue;
        }
        let after_space = start > 0 && text[start - 1].is_ascii_whitespace();
        if open && !after_space {
            open = false;
        } else if text.get(i).is_some_and(|b| !b.is_ascii_whitespace()) {
            open = true;
        }
    }
    open
}

#[cfg(test)]
mod tests {
    use crate::inline::parse_inline;
    use crate::node::{Node, NodeKind};

    fn single(input: &str) -> Node {
        let mut nodes = parse_inline(input);
        assert_eq!(nodes.len(), 1, "expected one node for {input:?}: {nodes:?}");
        nodes.remove(0)
    }

    #[test]
    fn test_emphasis() {
        let node = single("*hello*");
        assert_eq!(node.kind, NodeKind::Emphasis);
        assert_eq!(node.children(), [Node::text("hello")]);
    }

    #[test]
    fn test_strong() {
        assert_eq!(single("**hello**").kind, NodeKind::Strong);
    }

    #[test]
    fn test_strong_emphasis() {
        assert_eq!(single("***hello***").kind, NodeKind::StrongEmphasis);
    }

    #[test]
    fn test_highlight_and_strike() {
        assert_eq!(single("==mark==").kind, NodeKind::Highlight);
        assert_eq!(single("~~gone~~").kind, NodeKind::Strike);
    }

    #[test]
    fn test_single_tilde_and_equals_are_text() {
        assert_eq!(parse_inline("~a~"), vec![Node::text("~a~")]);
        assert_eq!(parse_inline("=a="), vec![Node::text("=a=")]);
    }

    #[test]
    fn test_nested_emphasis_inside_strong() {
        let node = single("**a *b* c**");
        assert_eq!(node.kind, NodeKind::Strong);
        let inner: Vec<_> = node.children().iter().map(|n| n.kind.clone()).collect();
        assert_eq!(
            inner,
            [NodeKind::Text, NodeKind::Emphasis, NodeKind::Text]
        );
    }

    #[test]
    fn test_closes_at_first_closer() {
        let nodes = parse_inline("*a* b*");
        assert_eq!(nodes[0].kind, NodeKind::Emphasis);
        assert_eq!(nodes[0].text_content(), "a");
        assert_eq!(nodes[1], Node::text(" b*"));
    }

    #[test]
    fn test_whitespace_after_opener_is_literal() {
        assert_eq!(parse_inline("* a*"), vec![Node::text("* a*")]);
    }

    #[test]
    fn test_closer_after_whitespace_is_skipped() {
        let node = single("*a *b*");
        assert_eq!(node.kind, NodeKind::Emphasis);
        assert_eq!(node.text_content(), "a *b");
    }

    #[test]
    fn test_emphasis_closing_with_strong() {
        let node = single("*italic **bold***");
        assert_eq!(node.kind, NodeKind::Emphasis);
        assert_eq!(node.children()[0], Node::text("italic "));
        assert_eq!(node.children()[1].kind, NodeKind::Strong);
        assert_eq!(node.children()[1].text_content(), "bold");
    }

    #[test]
    fn test_strong_closing_with_emphasis() {
        let node = single("**bold *italic***");
        assert_eq!(node.kind, NodeKind::Strong);
        assert_eq!(node.children()[0], Node::text("bold "));
        assert_eq!(node.children()[1].kind, NodeKind::Emphasis);
        assert_eq!(node.children()[1].text_content(), "italic");
    }

    #[test]
    fn test_longer_run_without_inner_opener_is_skipped() {
        let node = single("*a **b** c*");
        assert_eq!(node.kind, NodeKind::Emphasis);
        let inner: Vec<_> = node.children().iter().map(|n| n.kind.clone()).collect();
        assert_eq!(inner, [NodeKind::Text, NodeKind::Strong, NodeKind::Text]);
    }

    #[test]
    fn test_four_stars_are_literal() {
        assert_eq!(parse_inline("****a****"), vec![Node::text("****a****")]);
    }
}
