//! Block parser implementation.
//!
//! The parser walks a slice of lines. At each non-blank line the matchers in
//! [`MATCHERS`] are tried in order and the first one that accepts the line
//! produces a node and the index of the next unconsumed line. Lines no
//! matcher accepts start a paragraph.

use tracing::{trace, warn};

use super::{container, table};
use crate::Options;
use crate::cursor::{is_blank, split_lines};
use crate::inline::InlineParser;
use crate::limits::MAX_HEADING_LEVEL;
use crate::node::{Attrs, Node, NodeKind};

/// A matched block and the index of the first line after it.
pub(super) type Matched = Option<(Node, usize)>;

type BlockMatcher = fn(&BlockParser, &[&str], usize) -> Matched;

/// Block matchers in priority order.
const MATCHERS: [(&str, BlockMatcher); 13] = [
    ("front_matter", BlockParser::try_front_matter),
    ("comment", BlockParser::try_comment),
    ("code_fence", BlockParser::try_code_fence),
    ("math_block", BlockParser::try_math_block),
    ("callout", BlockParser::try_callout),
    ("blockquote", BlockParser::try_blockquote),
    ("list", BlockParser::try_list),
    ("thematic_break", BlockParser::try_thematic_break),
    ("atx_heading", BlockParser::try_atx_heading),
    ("setext_heading", BlockParser::try_setext_heading),
    ("table", BlockParser::try_table),
    ("footnote_def", BlockParser::try_footnote_def),
    ("html_block", BlockParser::try_html_block),
];

/// Block parser state.
///
/// Container bodies are parsed by a copy of the parser one level deeper.
#[derive(Debug, Clone, Copy)]
pub struct BlockParser {
    pub(super) options: Options,
    pub(super) depth: usize,
    pub(super) inline: InlineParser,
}

impl BlockParser {
    /// Create a new block parser.
    pub fn new(options: &Options) -> Self {
        Self {
            options: *options,
            depth: 0,
            inline: InlineParser::new(),
        }
    }

    /// Parse a whole document.
    pub fn parse(&self, input: &str) -> Node {
        let lines = split_lines(input);
        Node::document(self.parse_lines(&lines))
    }

    /// Parse a run of lines into block nodes.
    pub(super) fn parse_lines(&self, lines: &[&str]) -> Vec<Node> {
        let mut blocks = Vec::new();
        let mut pos = 0;
        while pos < lines.len() {
            if is_blank(lines[pos]) {
                pos += 1;
                continue;
            }
            let (node, next) = self.parse_block(lines, pos);
            blocks.push(node);
            pos = next;
        }
        blocks
    }

    fn parse_block(&self, lines: &[&str], pos: usize) -> (Node, usize) {
        for (name, matcher) in MATCHERS {
            if let Some((node, next)) = matcher(self, lines, pos) {
                trace!(line = pos, matcher = name, "block matched");
                return (node, next.max(pos + 1));
            }
        }
        self.paragraph(lines, pos)
    }

    /// Parser for a container body one level down, or `None` at the limit.
    pub(super) fn nested(&self) -> Option<Self> {
        (self.depth < self.options.max_nesting).then(|| Self {
            depth: self.depth + 1,
            ..*self
        })
    }

    /// Parse the unwrapped body of a quote or callout.
    pub(super) fn parse_body(&self, body: &[&str], container: &'static str) -> Vec<Node> {
        if let Some(parser) = self.nested() {
            return parser.parse_lines(body);
        }
        warn!(depth = self.depth, container, "block nesting limit reached, keeping body as text");
        if body.iter().all(|line| is_blank(line)) {
            return Vec::new();
        }
        vec![Node::paragraph(vec![Node::text(body.join("\n"))])]
    }

    /// Whether a line would start a block other than a paragraph.
    ///
    /// Only looks at the opening line(s), so it never recurses.
    fn opens_block(&self, lines: &[&str], pos: usize) -> bool {
        let line = lines[pos];
        let t = line.trim_start();
        comment_close(t).is_some()
            || fence_open(t).is_some()
            || t.starts_with("$$")
            || t.starts_with('>')
            || container::list_marker(line).is_some()
            || is_thematic_break(t)
            || atx_heading(t).is_some()
            || setext_level(lines, pos).is_some()
            || table::starts_table(lines, pos)
            || footnote_def(t).is_some()
            || is_html_block_open(t)
    }

    fn try_front_matter(&self, lines: &[&str], pos: usize) -> Matched {
        if pos != 0 || self.depth != 0 || !self.options.front_matter {
            return None;
        }
        if lines[0].trim_end() != "---" {
            return None;
        }
        let close = lines.iter().skip(1).position(|l| l.trim_end() == "---")? + 1;
        let value = lines[1..close].join("\n");
        Some((Node::leaf(NodeKind::FrontMatter, value), close + 1))
    }

    /// `<!-- ... -->` or `%% ... %%`, kept verbatim.
    fn try_comment(&self, lines: &[&str], pos: usize) -> Matched {
        let t = lines[pos].trim_start();
        let close = comment_close(t)?;
        let open_len = if close == "-->" { 4 } else { 2 };

        let end = if t[open_len..].contains(close) {
            pos
        } else {
            lines[pos + 1..]
                .iter()
                .position(|l| l.contains(close))
                .map_or(lines.len() - 1, |i| pos + 1 + i)
        };
        let value = lines[pos..=end].join("\n");
        Some((Node::leaf(NodeKind::HtmlComment, value), end + 1))
    }

    fn try_code_fence(&self, lines: &[&str], pos: usize) -> Matched {
        let (fence, len, info) = fence_open(lines[pos].trim_start())?;
        let end = pos
            + 1
            + lines[pos + 1..]
                .iter()
                .take_while(|l| !closes_fence(l, fence, len))
                .count();
        let body = lines[pos + 1..end].join("\n");
        let attrs = Attrs {
            lang: info.split_whitespace().next().map(str::to_owned),
            ..Attrs::default()
        };
        let node = Node::leaf(NodeKind::CodeBlock, body).with_attrs(attrs);
        Some((node, (end + 1).min(lines.len())))
    }

    /// `$$ ... $$`, on one line or spread over several.
    fn try_math_block(&self, lines: &[&str], pos: usize) -> Matched {
        let rest = lines[pos].trim().strip_prefix("$$")?;
        if let Some(inner) = rest.strip_suffix("$$") {
            return Some((Node::leaf(NodeKind::MathBlock, inner.trim()), pos + 1));
        }

        let mut body = Vec::new();
        if !rest.trim().is_empty() {
            body.push(rest.trim());
        }
        for (i, line) in lines.iter().enumerate().skip(pos + 1) {
            if let Some(before) = line.trim_end().strip_suffix("$$") {
                if !before.trim().is_empty() {
                    body.push(before);
                }
                return Some((Node::leaf(NodeKind::MathBlock, body.join("\n")), i + 1));
            }
            body.push(line);
        }
        Some((Node::leaf(NodeKind::MathBlock, body.join("\n")), lines.len()))
    }

    fn try_thematic_break(&self, lines: &[&str], pos: usize) -> Matched {
        is_thematic_break(lines[pos])
            .then(|| (Node::new(NodeKind::HorizontalRule), pos + 1))
    }

    fn try_atx_heading(&self, lines: &[&str], pos: usize) -> Matched {
        let (level, text) = atx_heading(lines[pos].trim_start())?;
        Some((self.heading(level, text), pos + 1))
    }

    fn try_setext_heading(&self, lines: &[&str], pos: usize) -> Matched {
        let level = setext_level(lines, pos)?;
        Some((self.heading(level, lines[pos].trim()), pos + 2))
    }

    fn heading(&self, level: u8, text: &str) -> Node {
        let attrs = Attrs {
            level: Some(level),
            ..Attrs::default()
        };
        Node::container(NodeKind::Heading, self.inline.parse(text)).with_attrs(attrs)
    }

    /// `[^id]: text`, one line.
    fn try_footnote_def(&self, lines: &[&str], pos: usize) -> Matched {
        let (id, content) = footnote_def(lines[pos].trim_start())?;
        let attrs = Attrs {
            id: Some(id.to_owned()),
            ..Attrs::default()
        };
        let node = Node::container(NodeKind::FootnoteDef, self.inline.parse(content))
            .with_attrs(attrs);
        Some((node, pos + 1))
    }

    /// A line starting with `<tag`, up to the next blank line.
    fn try_html_block(&self, lines: &[&str], pos: usize) -> Matched {
        if !is_html_block_open(lines[pos].trim_start()) {
            return None;
        }
        let end = pos + lines[pos..].iter().take_while(|l| !is_blank(l)).count();
        let value = lines[pos..end].join("\n");
        Some((Node::leaf(NodeKind::HtmlBlock, value), end))
    }

    fn paragraph(&self, lines: &[&str], pos: usize) -> (Node, usize) {
        let mut end = pos + 1;
        while end < lines.len() && !is_blank(lines[end]) && !self.opens_block(lines, end) {
            end += 1;
        }
        let text = lines[pos..end]
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n");
        (Node::paragraph(self.inline.parse(&text)), end)
    }
}

/// Close marker for a comment opening at the start of `t`.
fn comment_close(t: &str) -> Option<&'static str> {
    if t.starts_with("<!--") {
        Some("-->")
    } else if t.starts_with("%%") {
        Some("%%")
    } else {
        None
    }
}

/// Fence character, fence length and info string.
fn fence_open(t: &str) -> Option<(u8, usize, &str)> {
    let fence = t.bytes().next().filter(|&b| b == b'`' || b == b'~')?;
    let len = t.bytes().take_while(|&b| b == fence).count();
    if len < 3 {
        return None;
    }
    let info = t[len..].trim();
    if fence == b'`' && info.contains('`') {
        return None;
    }
    Some((fence, len, info))
}

fn closes_fence(line: &str, fence: u8, len: usize) -> bool {
    let t = line.trim();
    t.len() >= len && t.bytes().all(|b| b == fence)
}

/// Three or more `*`, `-` or `_`, optionally separated by spaces.
pub(super) fn is_thematic_break(line: &str) -> bool {
    let t = line.trim();
    let Some(marker) = t.bytes().next() else {
        return false;
    };
    if !matches!(marker, b'*' | b'-' | b'_') {
        return false;
    }
    let mut count = 0;
    for b in t.bytes() {
        if b == marker {
            count += 1;
        } else if b != b' ' && b != b'\t' {
            return false;
        }
    }
    count >= 3
}

/// Level and text of an ATX heading, without any closing `#` sequence.
fn atx_heading(t: &str) -> Option<(u8, &str)> {
    let level = t.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > MAX_HEADING_LEVEL {
        return None;
    }
    let rest = &t[level..];
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }
    let text = rest.trim();
    let stripped = text.trim_end_matches('#');
    let text = if stripped.is_empty() {
        stripped
    } else if stripped.ends_with([' ', '\t']) {
        stripped.trim_end()
    } else {
        text
    };
    Some((level as u8, text))
}

/// Level of a setext heading whose text is `lines[pos]`.
///
/// `=` underlines may be a single character; `-` underlines need two so a
/// lone `-` stays an empty list item.
fn setext_level(lines: &[&str], pos: usize) -> Option<u8> {
    if is_blank(lines[pos]) {
        return None;
    }
    let under = lines.get(pos + 1)?.trim();
    if !under.is_empty() && under.bytes().all(|b| b == b'=') {
        Some(1)
    } else if under.len() >= 2 && under.bytes().all(|b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

fn footnote_def(t: &str) -> Option<(&str, &str)> {
    let rest = t.strip_prefix("[^")?;
    let (id, content) = rest.split_once("]:")?;
    if id.is_empty() || id.contains(|c: char| c.is_whitespace() || c == '[' || c == ']') {
        return None;
    }
    Some((id, content.trim()))
}

fn is_html_block_open(t: &str) -> bool {
    let Some(rest) = t.strip_prefix('<') else {
        return false;
    };
    if rest.starts_with("http://") || rest.starts_with("https://") {
        return false;
    }
    rest.bytes().next().is_some_and(|b| b.is_ascii_alphabetic())
}
