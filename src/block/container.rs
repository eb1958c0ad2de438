//! Container blocks: callouts, blockquotes and lists.

use tracing::warn;

use super::parser::{BlockParser, Matched, is_thematic_break};
use crate::cursor::{indent_width, is_blank};
use crate::limits::MAX_LIST_MARKER_DIGITS;
use crate::node::{Attrs, Fold, Node, NodeKind};

impl BlockParser {
    /// `> [!type][+-] title` followed by quoted body lines.
    pub(super) fn try_callout(&self, lines: &[&str], pos: usize) -> Matched {
        if !is_quote_line(lines[pos]) {
            return None;
        }
        let (callout_type, fold, title) = callout_header(lines[pos])?;
        let end = quote_end(lines, pos + 1);
        let body: Vec<&str> = lines[pos + 1..end].iter().map(|l| unquote(l)).collect();

        let mut children = Vec::new();
        if !title.is_empty() {
            children.push(Node::container(
                NodeKind::CalloutTitle,
                self.inline.parse(title),
            ));
        }
        children.extend(self.parse_body(&body, "callout"));

        let attrs = Attrs {
            callout_type: Some(callout_type.to_owned()),
            fold,
            ..Attrs::default()
        };
        Some((Node::container(NodeKind::Callout, children).with_attrs(attrs), end))
    }

    pub(super) fn try_blockquote(&self, lines: &[&str], pos: usize) -> Matched {
        if !is_quote_line(lines[pos]) {
            return None;
        }
        let end = quote_end(lines, pos);
        let body: Vec<&str> = lines[pos..end].iter().map(|l| unquote(l)).collect();
        let node = Node::container(NodeKind::BlockQuote, self.parse_body(&body, "blockquote"));
        Some((node, end))
    }

    pub(super) fn try_list(&self, lines: &[&str], pos: usize) -> Matched {
        list_marker(lines[pos])?;
        Some(self.parse_list(lines, pos, 0))
    }

    /// Parse one list whose first item is `lines[pos]`.
    ///
    /// Items at the base indent are siblings, deeper items become a nested
    /// list appended to the previous item, and anything else ends the list.
    fn parse_list(&self, lines: &[&str], pos: usize, level: u8) -> (Node, usize) {
        let base = indent_width(lines[pos]);
        let ordered = list_marker(lines[pos]).is_some_and(|m| m.ordered);
        let mut items: Vec<Node> = Vec::new();
        let mut i = pos;

        while i < lines.len() {
            if is_blank(lines[i]) {
                // Blank lines only continue the list when another item follows
                let next = i + lines[i..].iter().take_while(|l| is_blank(l)).count();
                let continues = next < lines.len()
                    && list_marker(lines[next]).is_some_and(|m| {
                        let indent = indent_width(lines[next]);
                        indent > base || (indent == base && m.ordered == ordered)
                    });
                if !continues {
                    break;
                }
                i = next;
                continue;
            }

            let Some(marker) = list_marker(lines[i]) else {
                break;
            };
            let indent = indent_width(lines[i]);
            if indent < base || (indent == base && marker.ordered != ordered) {
                break;
            }

            if indent > base && !items.is_empty() {
                if self.depth + usize::from(level) + 1 < self.options.max_nesting
                    && level < u8::MAX
                {
                    let (nested, next) = self.parse_list(lines, i, level + 1);
                    if let Some(parent) = items.last_mut() {
                        parent.children_mut().push(nested);
                    }
                    i = next;
                    continue;
                }
                warn!(level, "list nesting limit reached, keeping item as a sibling");
            }

            items.push(self.list_item(&marker, level));
            i += 1;
        }

        let attrs = Attrs {
            ordered: Some(ordered),
            level: Some(level),
            ..Attrs::default()
        };
        (Node::container(NodeKind::List, items).with_attrs(attrs), i)
    }

    fn list_item(&self, marker: &ListMarker<'_>, level: u8) -> Node {
        let (task, content) = split_task(marker.content);
        let attrs = Attrs {
            level: Some(level),
            task,
            number: marker.number,
            ..Attrs::default()
        };
        Node::container(NodeKind::ListItem, self.inline.parse(content)).with_attrs(attrs)
    }
}

pub(super) fn is_quote_line(line: &str) -> bool {
    line.trim_start().starts_with('>')
}

fn quote_end(lines: &[&str], from: usize) -> usize {
    from + lines[from..]
        .iter()
        .take_while(|l| is_quote_line(l))
        .count()
}

/// Strip leading indentation, one `>` and one following space.
pub(super) fn unquote(line: &str) -> &str {
    let t = line.trim_start();
    let t = t.strip_prefix('>').unwrap_or(t);
    t.strip_prefix([' ', '\t']).unwrap_or(t)
}

/// Type, fold marker and title of a callout header line.
fn callout_header(line: &str) -> Option<(&str, Option<Fold>, &str)> {
    let rest = unquote(line).trim_start().strip_prefix("[!")?;
    let end = rest.find(']')?;
    let callout_type = &rest[..end];
    if callout_type.is_empty()
        || !callout_type
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return None;
    }

    let rest = &rest[end + 1..];
    let (fold, rest) = match rest.as_bytes().first() {
        Some(b'+') => (Some(Fold::Open), &rest[1..]),
        Some(b'-') => (Some(Fold::Closed), &rest[1..]),
        _ => (None, rest),
    };
    Some((callout_type, fold, rest.trim()))
}

/// A parsed list item marker.
#[derive(Debug)]
pub(super) struct ListMarker<'a> {
    pub(super) ordered: bool,
    pub(super) number: Option<u32>,
    pub(super) content: &'a str,
}

/// Match `- `, `+ `, `* `, `N. ` or `N) ` after any indentation.
///
/// A line that is a thematic break is never a list item.
pub(super) fn list_marker(line: &str) -> Option<ListMarker<'_>> {
    let t = line.trim_start();
    if is_thematic_break(t) {
        return None;
    }
    let bytes = t.as_bytes();
    let (number, marker_len) = match bytes.first()? {
        b'-' | b'+' | b'*' => (None, 1),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > MAX_LIST_MARKER_DIGITS || !matches!(bytes.get(digits), Some(b'.' | b')')) {
                return None;
            }
            (t[..digits].parse().ok(), digits + 1)
        }
        _ => return None,
    };

    let rest = &t[marker_len..];
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }
    Some(ListMarker {
        ordered: number.is_some(),
        number,
        content: rest.trim(),
    })
}

/// Strip a `[ ]` / `[x]` task box, returning the checked state.
fn split_task(content: &str) -> (Option<bool>, &str) {
    for (prefix, checked) in [("[ ]", false), ("[x]", true), ("[X]", true)] {
        if let Some(rest) = content.strip_prefix(prefix) {
            if rest.is_empty() || rest.starts_with([' ', '\t']) {
                return (Some(checked), rest.trim_start());
            }
        }
    }
    (None, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;

    fn parse(input: &str) -> Node {
        BlockParser::new(&Options::default()).parse(input)
    }

    #[test]
    fn test_callout_with_title_and_body() {
        let doc = parse("> [!note] Title\n> body");
        let callout = &doc.children()[0];
        assert_eq!(callout.kind, NodeKind::Callout);
        assert_eq!(callout.attrs.callout_type.as_deref(), Some("note"));
        assert_eq!(callout.children()[0].kind, NodeKind::CalloutTitle);
        assert_eq!(callout.children()[0].text_content(), "Title");
        assert_eq!(callout.children()[1].kind, NodeKind::Paragraph);
        assert_eq!(callout.children()[1].text_content(), "body");
    }

    #[test]
    fn test_callout_fold_marker() {
        let doc = parse("> [!faq]- Closed by default\n> answer");
        assert_eq!(doc.children()[0].attrs.fold, Some(Fold::Closed));
        let doc = parse("> [!tip]+\n> open");
        let callout = &doc.children()[0];
        assert_eq!(callout.attrs.fold, Some(Fold::Open));
        assert_eq!(callout.children()[0].kind, NodeKind::Paragraph);
    }

    #[test]
    fn test_callout_body_is_a_block_tree() {
        let doc = parse("> [!warning]\n> - a\n> - b\n>\n> > nested");
        let callout = &doc.children()[0];
        let kinds: Vec<_> = callout.children().iter().map(|n| n.kind.clone()).collect();
        assert_eq!(kinds, [NodeKind::List, NodeKind::BlockQuote]);
    }

    #[test]
    fn test_blockquote() {
        let doc = parse("> one\n> two\n\nafter");
        let quote = &doc.children()[0];
        assert_eq!(quote.kind, NodeKind::BlockQuote);
        assert_eq!(quote.children()[0].text_content(), "one\ntwo");
        assert_eq!(doc.children()[1].kind, NodeKind::Paragraph);
    }

    #[test]
    fn test_quote_without_callout_syntax() {
        let doc = parse("> [!not a type] text");
        assert_eq!(doc.children()[0].kind, NodeKind::BlockQuote);
    }

    #[test]
    fn test_nested_quotes_hit_depth_limit() {
        let options = Options {
            max_nesting: 2,
            ..Options::default()
        };
        let doc = BlockParser::new(&options).parse("> > > > deep");
        let mut node = &doc.children()[0];
        let mut depth = 0;
        while node.kind == NodeKind::BlockQuote {
            depth += 1;
            node = &node.children()[0];
        }
        assert_eq!(depth, 3);
        assert_eq!(node.kind, NodeKind::Paragraph);
        assert_eq!(node.text_content(), "> deep");
    }

    #[test]
    fn test_unordered_list() {
        let doc = parse("- a\n- b\n* c");
        let list = &doc.children()[0];
        assert_eq!(list.attrs.ordered, Some(false));
        assert_eq!(list.attrs.level, Some(0));
        assert_eq!(list.children().len(), 3);
    }

    #[test]
    fn test_ordered_list_numbers() {
        let doc = parse("3. three\n4) four");
        let list = &doc.children()[0];
        assert_eq!(list.attrs.ordered, Some(true));
        let numbers: Vec<_> = list.children().iter().map(|i| i.attrs.number).collect();
        assert_eq!(numbers, [Some(3), Some(4)]);
    }

    #[test]
    fn test_family_change_ends_list() {
        let doc = parse("- a\n1. b");
        assert_eq!(doc.children().len(), 2);
    }

    #[test]
    fn test_nested_list_attaches_to_previous_item() {
        let doc = parse("- a\n    - b\n    - c\n- d");
        let list = &doc.children()[0];
        assert_eq!(list.children().len(), 2);
        let first = &list.children()[0];
        let nested = first.children().last().map(|n| n.kind.clone());
        assert_eq!(nested, Some(NodeKind::List));
        let nested = &first.children()[1];
        assert_eq!(nested.attrs.level, Some(1));
        assert_eq!(nested.children()[0].attrs.level, Some(1));
        assert_eq!(nested.children().len(), 2);
    }

    #[test]
    fn test_task_items() {
        let doc = parse("- [ ] todo\n- [x] done\n- [link](u)");
        let items = doc.children()[0].children();
        assert_eq!(items[0].attrs.task, Some(false));
        assert_eq!(items[0].text_content(), "todo");
        assert_eq!(items[1].attrs.task, Some(true));
        assert_eq!(items[2].attrs.task, None);
        assert_eq!(items[2].children()[0].kind, NodeKind::Link);
    }

    #[test]
    fn test_thematic_break_is_not_list() {
        let doc = parse("- - -");
        assert_eq!(doc.children()[0].kind, NodeKind::HorizontalRule);
    }

    #[test]
    fn test_blank_line_between_items() {
        let doc = parse("- a\n\n- b\n\npara");
        assert_eq!(doc.children()[0].children().len(), 2);
        assert_eq!(doc.children()[1].kind, NodeKind::Paragraph);
    }

    #[test]
    fn test_list_marker_needs_space() {
        assert!(list_marker("-a").is_none());
        assert!(list_marker("1.5 apples").is_none());
        assert!(list_marker("1234567890. big").is_none());
        assert!(list_marker("-").is_some());
    }
}
