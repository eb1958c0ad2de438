//! Markdown serializer.
//!
//! Produces normalized Markdown: blocks separated by one blank line, ATX
//! headings, `-` bullets, four-space list nesting, `***` rules. Parsing the
//! output again yields the same tree, so a second pass is a fixed point.

use crate::node::{Align, Node, NodeKind};

/// Render a node (usually a document) back to Markdown.
///
/// ```
/// use vaultdown::{parse, to_markdown};
///
/// let doc = parse("Title\n=====\n* a\n* b");
/// assert_eq!(to_markdown(&doc), "# Title\n\n- a\n- b\n");
/// ```
pub fn to_markdown(node: &Node) -> String {
    let mut out = String::new();
    MarkdownRenderer::default().node(node, &mut out);
    out
}

#[derive(Debug, Default)]
struct MarkdownRenderer {
    /// Inside a table cell, where `|` must be escaped.
    in_table: bool,
}

impl MarkdownRenderer {
    fn node(&mut self, node: &Node, out: &mut String) {
        let value = node.value().unwrap_or("");
        match &node.kind {
            NodeKind::Document => self.blocks(node.children(), out),
            NodeKind::FrontMatter => {
                out.push_str("---\n");
                push_line(out, value);
                out.push_str("---\n");
            }
            NodeKind::HtmlComment | NodeKind::HtmlBlock => push_line(out, value),
            NodeKind::CodeBlock => code_block(node, value, out),
            NodeKind::MathBlock => {
                out.push_str("$$\n");
                push_line(out, value);
                out.push_str("$$\n");
            }
            NodeKind::Callout => self.callout(node, out),
            NodeKind::BlockQuote => {
                let mut body = String::new();
                self.blocks(node.children(), &mut body);
                quote_into(out, &body);
            }
            NodeKind::List => self.list(node, 0, out),
            NodeKind::ListItem => self.list_item(node, false, 0, 0, out),
            NodeKind::HorizontalRule => out.push_str("***\n"),
            NodeKind::Heading => {
                let level = node.attrs.level.unwrap_or(1).clamp(1, 6);
                out.extend(std::iter::repeat_n('#', usize::from(level)));
                out.push(' ');
                self.children(node, out);
                out.push('\n');
            }
            NodeKind::Table => self.table(node, out),
            NodeKind::TableRow => self.table_row(node, out),
            NodeKind::FootnoteDef => {
                out.push_str("[^");
                out.push_str(node.attrs.id.as_deref().unwrap_or(""));
                out.push_str("]: ");
                self.children(node, out);
                out.push('\n');
            }
            NodeKind::Paragraph => {
                self.children(node, out);
                out.push('\n');
            }
            NodeKind::Text => {
                if self.in_table {
                    out.push_str(&value.replace('|', "\\|"));
                } else {
                    out.push_str(value);
                }
            }
            NodeKind::InlineCode => code_span(value, out),
            NodeKind::MathSpan => {
                out.push('$');
                out.push_str(value);
                out.push('$');
            }
            NodeKind::WikiLink => wiki(node, false, out),
            NodeKind::Embed => wiki(node, true, out),
            NodeKind::FootnoteRef => {
                out.push_str("[^");
                out.push_str(node.attrs.id.as_deref().unwrap_or(""));
                out.push(']');
            }
            NodeKind::Image => image(node, out),
            NodeKind::Link => {
                out.push('[');
                self.children(node, out);
                out.push_str("](");
                destination(node, out);
                out.push(')');
            }
            NodeKind::Highlight => self.wrap("==", node, out),
            NodeKind::Strike => self.wrap("~~", node, out),
            NodeKind::StrongEmphasis => self.wrap("***", node, out),
            NodeKind::Strong => self.wrap("**", node, out),
            NodeKind::Emphasis => self.wrap("*", node, out),
            NodeKind::HtmlInline => out.push_str(value),
            NodeKind::AutoLink => {
                out.push('<');
                out.push_str(value);
                out.push('>');
            }
            NodeKind::EscapedChar => {
                out.push('\\');
                out.push_str(value);
            }
            NodeKind::CalloutTitle
            | NodeKind::TableCell
            | NodeKind::Fragment
            | NodeKind::Other(_) => self.children(node, out),
        }
    }

    fn children(&mut self, node: &Node, out: &mut String) {
        for child in node.children() {
            self.node(child, out);
        }
    }

    fn wrap(&mut self, delim: &str, node: &Node, out: &mut String) {
        out.push_str(delim);
        self.children(node, out);
        out.push_str(delim);
    }

    /// Blocks separated by one blank line; blocks rendering to nothing are skipped.
    fn blocks(&mut self, nodes: &[Node], out: &mut String) {
        let mut first = true;
        for node in nodes {
            let mut block = String::new();
            self.node(node, &mut block);
            if block.is_empty() {
                continue;
            }
            if !first {
                out.push('\n');
            }
            first = false;
            out.push_str(&block);
            if !block.ends_with('\n') {
                out.push('\n');
            }
        }
    }

    fn callout(&mut self, node: &Node, out: &mut String) {
        let (title, body) = match node.children().split_first() {
            Some((first, rest)) if first.kind == NodeKind::CalloutTitle => (Some(first), rest),
            _ => (None, node.children()),
        };

        let mut text = String::from("[!");
        text.push_str(node.attrs.callout_type.as_deref().unwrap_or("note"));
        text.push(']');
        if let Some(fold) = node.attrs.fold {
            text.push_str(fold.as_str());
        }
        if let Some(title) = title {
            text.push(' ');
            self.children(title, &mut text);
        }
        text.push('\n');
        self.blocks(body, &mut text);

        quote_into(out, &text);
    }

    fn list(&mut self, list: &Node, depth: u8, out: &mut String) {
        let ordered = list.attrs.ordered.unwrap_or(false);
        let depth = list.attrs.level.unwrap_or(depth);
        for (index, item) in list.children().iter().enumerate() {
            if item.kind == NodeKind::ListItem {
                self.list_item(item, ordered, index, depth, out);
            } else {
                let start = out.len();
                self.node(item, out);
                if out.len() > start && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }

    /// One item line, followed by any nested lists one level deeper.
    fn list_item(&mut self, item: &Node, ordered: bool, index: usize, depth: u8, out: &mut String) {
        let level = item.attrs.level.unwrap_or(depth);
        out.extend(std::iter::repeat_n(' ', 4 * usize::from(level)));
        if ordered {
            match item.attrs.number {
                Some(number) => out.push_str(&number.to_string()),
                None => out.push_str(&(index + 1).to_string()),
            }
            out.push_str(". ");
        } else {
            out.push_str("- ");
        }
        match item.attrs.task {
            Some(true) => out.push_str("[x] "),
            Some(false) => out.push_str("[ ] "),
            None => {}
        }

        let (nested, inline): (Vec<&Node>, Vec<&Node>) = item
            .children()
            .iter()
            .partition(|child| child.kind == NodeKind::List);
        for child in inline {
            self.node(child, out);
        }
        out.push('\n');
        for list in nested {
            self.list(list, level.saturating_add(1), out);
        }
    }

    fn table(&mut self, node: &Node, out: &mut String) {
        let Some((header, body)) = node.children().split_first() else {
            return;
        };
        self.table_row(header, out);

        let align = node.attrs.align.as_deref().unwrap_or(&[]);
        out.push('|');
        for column in 0..header.children().len() {
            out.push_str(match align.get(column).copied().unwrap_or_default() {
                Align::Left => " :--- |",
                Align::Center => " :---: |",
                Align::Right => " ---: |",
                Align::None => " --- |",
            });
        }
        out.push('\n');

        for row in body {
            self.table_row(row, out);
        }
    }

    fn table_row(&mut self, row: &Node, out: &mut String) {
        let was_in_table = std::mem::replace(&mut self.in_table, true);
        out.push('|');
        for cell in row.children() {
            out.push(' ');
            self.node(cell, out);
            out.push_str(" |");
        }
        out.push('\n');
        self.in_table = was_in_table;
    }
}

/// Push a value followed by a newline, or nothing for an empty value.
fn push_line(out: &mut String, value: &str) {
    if !value.is_empty() {
        out.push_str(value);
        out.push('\n');
    }
}

/// Prefix every line with `> `; empty lines get a bare `>`.
fn quote_into(out: &mut String, text: &str) {
    for line in text.lines() {
        if line.is_empty() {
            out.push_str(">\n");
        } else {
            out.push_str("> ");
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// A fence one character longer than any fence-like run inside the body.
///
/// Tildes are used when the language tag holds a backtick, since a backtick
/// fence cannot carry one.
fn code_block(node: &Node, value: &str, out: &mut String) {
    let lang = node.attrs.lang.as_deref().unwrap_or("");
    let fence_char = if lang.contains('`') { '~' } else { '`' };
    let longest = value
        .lines()
        .map(|line| line.trim_start().chars().take_while(|&c| c == fence_char).count())
        .max()
        .unwrap_or(0);
    let fence: String = std::iter::repeat_n(fence_char, longest.max(2) + 1).collect();

    out.push_str(&fence);
    out.push_str(lang);
    out.push('\n');
    push_line(out, value);
    out.push_str(&fence);
    out.push('\n');
}

/// Backtick fence longer than any run in the content, padded when needed.
fn code_span(value: &str, out: &mut String) {
    let mut longest = 0;
    let mut run = 0;
    for b in value.bytes() {
        if b == b'`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let fence = "`".repeat(longest + 1);
    let pad = value.starts_with('`')
        || value.ends_with('`')
        || (value.starts_with(' ') && value.ends_with(' ') && !value.bytes().all(|b| b == b' '));

    out.push_str(&fence);
    if pad {
        out.push(' ');
    }
    out.push_str(value);
    if pad {
        out.push(' ');
    }
    out.push_str(&fence);
}

fn wiki(node: &Node, embed: bool, out: &mut String) {
    if embed {
        out.push('!');
    }
    out.push_str("[[");
    out.push_str(node.attrs.file.as_deref().unwrap_or(""));
    if let Some(heading) = &node.attrs.heading {
        out.push('#');
        out.push_str(heading);
    }
    if let Some(alias) = &node.attrs.alias {
        out.push('|');
        out.push_str(alias);
    }
    out.push_str("]]");
}

/// Wiki images go back to `![[file|alt]]` (or `[[file|alt]]` when linked
/// rather than embedded), others to `![alt](url "title")`.
fn image(node: &Node, out: &mut String) {
    let alt = node.attrs.alt.as_deref().unwrap_or("");
    if let Some(embed) = node.attrs.embed {
        if embed {
            out.push('!');
        }
        out.push_str("[[");
        let target = node.attrs.file.as_deref().or(node.attrs.url.as_deref());
        out.push_str(target.unwrap_or(""));
        if !alt.is_empty() {
            out.push('|');
            out.push_str(alt);
        }
        out.push_str("]]");
        return;
    }
    out.push_str("![");
    out.push_str(alt);
    out.push_str("](");
    destination(node, out);
    out.push(')');
}

/// `url "title"`, with `<url>` when the URL contains spaces.
fn destination(node: &Node, out: &mut String) {
    let url = node.attrs.url.as_deref().unwrap_or("");
    if url.contains(' ') {
        out.push('<');
        out.push_str(url);
        out.push('>');
    } else {
        out.push_str(url);
    }
    if let Some(title) = &node.attrs.title {
        out.push_str(" \"");
        out.push_str(title);
        out.push('"');
    }
}
