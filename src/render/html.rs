//! HTML serializer.
//!
//! Obsidian-specific constructs map onto the markup Obsidian's own reading
//! view uses: callouts become `div.callout` with title and content
//! sub-divs, wiki links become `a.internal-link`, highlights `<mark>`.

use super::HtmlWriter;
use crate::Options;
use crate::escape::slugify;
use crate::node::{Align, Node, NodeKind};

/// Render a node (usually a document) to HTML with default options.
pub fn to_html(node: &Node) -> String {
    to_html_with_options(node, &Options::default())
}

/// Render a node to HTML.
pub fn to_html_with_options(node: &Node, options: &Options) -> String {
    let mut renderer = HtmlRenderer {
        writer: HtmlWriter::new(),
        options,
    };
    renderer.node(node);
    renderer.writer.into_string()
}

struct HtmlRenderer<'o> {
    writer: HtmlWriter,
    options: &'o Options,
}

impl HtmlRenderer<'_> {
    fn node(&mut self, node: &Node) {
        let value = node.value().unwrap_or("");
        match &node.kind {
            NodeKind::Document => self.children(node),
            NodeKind::FrontMatter => {}
            NodeKind::HtmlComment => {
                if !value.starts_with("%%") {
                    self.raw_block(value);
                }
            }
            NodeKind::HtmlBlock => self.raw_block(value),
            NodeKind::CodeBlock => {
                let w = &mut self.writer;
                w.code_block_start(node.attrs.lang.as_deref());
                w.write_escaped_text(value);
                if !value.is_empty() {
                    w.newline();
                }
                w.code_block_end();
            }
            NodeKind::MathBlock => {
                let w = &mut self.writer;
                w.write_str("<pre><code class=\"language-math math-display\">");
                w.write_escaped_text(value);
                w.code_block_end();
            }
            NodeKind::Callout => self.callout(node),
            NodeKind::CalloutTitle => self.children(node),
            NodeKind::BlockQuote => {
                self.writer.blockquote_start();
                self.children(node);
                self.writer.blockquote_end();
            }
            NodeKind::List => self.list(node),
            NodeKind::ListItem => self.list_item(node),
            NodeKind::HorizontalRule => self.writer.thematic_break(),
            NodeKind::Heading => {
                let level = node.attrs.level.unwrap_or(1).clamp(1, 6);
                self.writer.heading_start(level);
                self.children(node);
                self.writer.heading_end(level);
            }
            NodeKind::Table => self.table(node),
            NodeKind::TableRow => self.table_row(node, "td", None),
            NodeKind::TableCell => self.children(node),
            NodeKind::FootnoteDef => self.footnote_def(node),
            NodeKind::Paragraph => {
                self.writer.paragraph_start();
                self.children(node);
                self.writer.paragraph_end();
            }
            NodeKind::Text => self.writer.write_decoded_text(value),
            NodeKind::InlineCode => self.writer.inline_code(value),
            NodeKind::MathSpan => {
                let w = &mut self.writer;
                w.write_str("<code class=\"language-math math-inline\">");
                w.write_escaped_text(value);
                w.close_tag("code");
            }
            NodeKind::WikiLink => self.wiki_link(node),
            NodeKind::Embed => self.embed(node),
            NodeKind::FootnoteRef => self.footnote_ref(node),
            NodeKind::Image => self.image(node),
            NodeKind::Link => {
                let w = &mut self.writer;
                w.write_str("<a href=\"");
                w.write_url(node.attrs.url.as_deref().unwrap_or(""));
                w.write_char('"');
                if let Some(title) = &node.attrs.title {
                    w.attr("title", title);
                }
                w.write_char('>');
                self.children(node);
                self.writer.close_tag("a");
            }
            NodeKind::Highlight => self.wrap("mark", node),
            NodeKind::Strike => self.wrap("del", node),
            NodeKind::StrongEmphasis => {
                self.writer.open_tag("strong");
                self.wrap("em", node);
                self.writer.close_tag("strong");
            }
            NodeKind::Strong => self.wrap("strong", node),
            NodeKind::Emphasis => self.wrap("em", node),
            NodeKind::HtmlInline => {
                if self.options.allow_html {
                    self.writer.write_str(value);
                } else {
                    self.writer.write_escaped_text(value);
                }
            }
            NodeKind::AutoLink => {
                let w = &mut self.writer;
                w.write_str("<a href=\"");
                w.write_url(value);
                w.write_str("\">");
                w.write_escaped_text(value);
                w.close_tag("a");
            }
            NodeKind::EscapedChar => self.writer.write_escaped_text(value),
            NodeKind::Fragment | NodeKind::Other(_) => self.children(node),
        }
    }

    fn children(&mut self, node: &Node) {
        for child in node.children() {
            self.node(child);
        }
    }

    fn wrap(&mut self, tag: &str, node: &Node) {
        self.writer.open_tag(tag);
        self.children(node);
        self.writer.close_tag(tag);
    }

    /// Raw HTML, or escaped text when raw HTML is disabled.
    fn raw_block(&mut self, value: &str) {
        if self.options.allow_html {
            self.writer.write_str(value);
        } else {
            self.writer.write_escaped_text(value);
        }
        self.writer.newline();
    }

    fn callout(&mut self, node: &Node) {
        let callout_type = node
            .attrs
            .callout_type
            .as_deref()
            .unwrap_or("note")
            .to_ascii_lowercase();

        let w = &mut self.writer;
        w.write_str("<div class=\"callout\"");
        w.attr("data-callout", &callout_type);
        if let Some(fold) = node.attrs.fold {
            w.attr("data-callout-fold", fold.as_str());
        }
        w.write_str(">\n<div class=\"callout-title\">");

        let (title, body) = match node.children().split_first() {
            Some((first, rest)) if first.kind == NodeKind::CalloutTitle => (Some(first), rest),
            _ => (None, node.children()),
        };
        match title {
            Some(title) => self.children(title),
            None => self.writer.write_escaped_text(&default_title(&callout_type)),
        }

        self.writer.write_str("</div>\n<div class=\"callout-content\">\n");
        for child in body {
            self.node(child);
        }
        self.writer.write_str("</div>\n</div>\n");
    }

    fn list(&mut self, node: &Node) {
        let ordered = node.attrs.ordered.unwrap_or(false);
        if ordered {
            let start = node.children().first().and_then(|item| item.attrs.number);
            self.writer.ol_start(start);
        } else {
            self.writer.ul_start();
        }
        self.children(node);
        if ordered {
            self.writer.ol_end();
        } else {
            self.writer.ul_end();
        }
    }

    /// Inline content first, then any nested block (list) on its own line.
    fn list_item(&mut self, node: &Node) {
        self.writer.li_start();
        if let Some(checked) = node.attrs.task {
            self.writer.task_checkbox(checked);
        }
        for child in node.children() {
            if is_block(&child.kind) && !self.writer.at_line_start() {
                self.writer.newline();
            }
            self.node(child);
        }
        self.writer.li_end();
    }

    fn table(&mut self, node: &Node) {
        let align = node.attrs.align.as_deref().unwrap_or(&[]);
        let Some((header, body)) = node.children().split_first() else {
            return;
        };

        self.writer.write_str("<table>\n<thead>\n");
        self.table_row(header, "th", Some(align));
        self.writer.write_str("</thead>\n");
        if !body.is_empty() {
            self.writer.write_str("<tbody>\n");
            for row in body {
                self.table_row(row, "td", Some(align));
            }
            self.writer.write_str("</tbody>\n");
        }
        self.writer.write_str("</table>\n");
    }

    fn table_row(&mut self, row: &Node, tag: &str, align: Option<&[Align]>) {
        self.writer.write_str("<tr>\n");
        for (i, cell) in row.children().iter().enumerate() {
            let align = align
                .and_then(|a| a.get(i))
                .filter(|a| **a != Align::None)
                .map(|a| a.as_str());
            self.writer.cell_start(tag, align);
            self.node(cell);
            self.writer.close_tag(tag);
            self.writer.newline();
        }
        self.writer.write_str("</tr>\n");
    }

    fn footnote_ref(&mut self, node: &Node) {
        let id = node.attrs.id.as_deref().unwrap_or("");
        let w = &mut self.writer;
        w.write_str("<sup class=\"footnote-ref\"><a");
        w.attr("href", &format!("#fn-{id}"));
        w.attr("id", &format!("fnref-{id}"));
        w.write_char('>');
        w.write_escaped_text(id);
        w.write_str("</a></sup>");
    }

    fn footnote_def(&mut self, node: &Node) {
        let id = node.attrs.id.as_deref().unwrap_or("");
        self.writer.write_str("<div class=\"footnote\"");
        self.writer.attr("id", &format!("fn-{id}"));
        self.writer.write_str("><p>");
        self.children(node);
        self.writer.write_str(" <a");
        self.writer.attr("href", &format!("#fnref-{id}"));
        self.writer.write_str(" class=\"footnote-backref\">\u{21a9}</a></p></div>\n");
    }

    fn wiki_link(&mut self, node: &Node) {
        let file = node.attrs.file.as_deref().unwrap_or("");
        let heading = node.attrs.heading.as_deref();

        let mut href = file.to_string();
        if let Some(heading) = heading {
            href.push('#');
            href.push_str(&slugify(heading));
        }

        let w = &mut self.writer;
        w.write_str("<a href=\"");
        w.write_url(&href);
        w.write_char('"');
        w.attr("class", "internal-link");
        w.write_char('>');
        w.write_decoded_text(&node.wiki_label());
        w.close_tag("a");
    }

    fn embed(&mut self, node: &Node) {
        let w = &mut self.writer;
        w.write_str("<span class=\"internal-embed\"");
        w.attr("src", &wiki_target(node));
        w.write_char('>');
        w.write_decoded_text(&node.wiki_label());
        w.write_str("</span>");
    }

    fn image(&mut self, node: &Node) {
        let w = &mut self.writer;
        w.write_str("<img src=\"");
        w.write_url(node.attrs.url.as_deref().unwrap_or(""));
        w.write_char('"');
        w.attr("alt", node.attrs.alt.as_deref().unwrap_or(""));
        if let Some(title) = &node.attrs.title {
            w.attr("title", title);
        }
        w.write_str(" />");
    }
}

/// Block kinds that need to start on their own line inside a list item.
fn is_block(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::List
            | NodeKind::Paragraph
            | NodeKind::CodeBlock
            | NodeKind::BlockQuote
            | NodeKind::Callout
            | NodeKind::Table
            | NodeKind::Heading
    )
}

/// Capitalized callout type, used when a callout has no title.
fn default_title(callout_type: &str) -> String {
    let mut chars = callout_type.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `file#heading` as written in the wiki link.
fn wiki_target(node: &Node) -> String {
    let file = node.attrs.file.as_deref().unwrap_or("");
    match node.attrs.heading.as_deref() {
        Some(heading) => format!("{file}#{heading}"),
        None => file.to_string(),
    }
}
