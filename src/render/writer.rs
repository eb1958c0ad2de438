//! HTML output writer with a pre-allocated, reusable buffer.

use std::fmt::Write as _;

use crate::escape;

/// HTML output writer.
///
/// # Example
/// ```
/// use vaultdown::render::HtmlWriter;
///
/// let mut writer = HtmlWriter::new();
/// writer.paragraph_start();
/// writer.write_escaped_text("Hello <World>");
/// writer.paragraph_end();
///
/// assert_eq!(writer.into_string(), "<p>Hello &lt;World&gt;</p>\n");
/// ```
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    /// Create a new writer with default capacity.
    #[inline]
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(1024),
        }
    }

    /// Write a string without escaping.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    #[inline]
    pub fn write_char(&mut self, c: char) {
        self.out.push(c);
    }

    /// Write text with HTML escaping.
    #[inline]
    pub fn write_escaped_text(&mut self, text: &str) {
        escape::escape_into(&mut self.out, text);
    }

    /// Write text after decoding character references, escaping the result.
    #[inline]
    pub fn write_decoded_text(&mut self, text: &str) {
        escape::escape_into(&mut self.out, &escape::decode_entities(text));
    }

    /// Write a link destination for an `href` or `src` attribute.
    #[inline]
    pub fn write_url(&mut self, url: &str) {
        escape::escape_url_into(&mut self.out, url);
    }

    /// Write a decimal number.
    #[inline]
    pub fn write_u32(&mut self, n: u32) {
        let _ = write!(self.out, "{n}");
    }

    #[inline]
    pub fn newline(&mut self) {
        self.out.push('\n');
    }

    /// Whether the output ends with a newline (or is empty).
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    /// Take ownership of the output.
    #[inline]
    pub fn into_string(self) -> String {
        self.out
    }

    // --- HTML Tag Helpers ---

    /// Write opening tag: `<tagname>`
    #[inline]
    pub fn open_tag(&mut self, tag: &str) {
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push('>');
    }

    /// Write closing tag: `</tagname>`
    #[inline]
    pub fn close_tag(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    /// Write ` name="value"` with the value escaped.
    #[inline]
    pub fn attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        escape::escape_into(&mut self.out, value);
        self.out.push('"');
    }

    // --- Common HTML Elements ---

    #[inline]
    pub fn paragraph_start(&mut self) {
        self.out.push_str("<p>");
    }

    #[inline]
    pub fn paragraph_end(&mut self) {
        self.out.push_str("</p>\n");
    }

    /// Write heading start: `<hN>`
    #[inline]
    pub fn heading_start(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.out.push_str("<h");
        self.out.push(char::from(b'0' + level));
        self.out.push('>');
    }

    /// Write heading end: `</hN>\n`
    #[inline]
    pub fn heading_end(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.out.push_str("</h");
        self.out.push(char::from(b'0' + level));
        self.out.push_str(">\n");
    }

    /// Write code block start with optional language class.
    #[inline]
    pub fn code_block_start(&mut self, lang: Option<&str>) {
        match lang {
            Some(l) if !l.is_empty() => {
                self.out.push_str("<pre><code class=\"language-");
                escape::escape_into(&mut self.out, l);
                self.out.push_str("\">");
            }
            _ => self.out.push_str("<pre><code>"),
        }
    }

    #[inline]
    pub fn code_block_end(&mut self) {
        self.out.push_str("</code></pre>\n");
    }

    #[inline]
    pub fn thematic_break(&mut self) {
        self.out.push_str("<hr />\n");
    }

    #[inline]
    pub fn blockquote_start(&mut self) {
        self.out.push_str("<blockquote>\n");
    }

    #[inline]
    pub fn blockquote_end(&mut self) {
        self.out.push_str("</blockquote>\n");
    }

    #[inline]
    pub fn ul_start(&mut self) {
        self.out.push_str("<ul>\n");
    }

    #[inline]
    pub fn ul_end(&mut self) {
        self.out.push_str("</ul>\n");
    }

    /// Write list start (ordered): `<ol>\n` or `<ol start="N">\n`
    #[inline]
    pub fn ol_start(&mut self, start: Option<u32>) {
        match start {
            Some(n) if n != 1 => {
                self.out.push_str("<ol start=\"");
                self.write_u32(n);
                self.out.push_str("\">\n");
            }
            _ => self.out.push_str("<ol>\n"),
        }
    }

    #[inline]
    pub fn ol_end(&mut self) {
        self.out.push_str("</ol>\n");
    }

    #[inline]
    pub fn li_start(&mut self) {
        self.out.push_str("<li>");
    }

    #[inline]
    pub fn li_end(&mut self) {
        self.out.push_str("</li>\n");
    }

    /// Write a disabled task checkbox followed by a space.
    #[inline]
    pub fn task_checkbox(&mut self, checked: bool) {
        if checked {
            self.out
                .push_str("<input type=\"checkbox\" checked=\"\" disabled=\"\" /> ");
        } else {
            self.out.push_str("<input type=\"checkbox\" disabled=\"\" /> ");
        }
    }

    /// Write inline code: `<code>escaped_content</code>`
    #[inline]
    pub fn inline_code(&mut self, content: &str) {
        self.out.push_str("<code>");
        escape::escape_into(&mut self.out, content);
        self.out.push_str("</code>");
    }

    /// Write a table cell start, with an `align` attribute when set.
    #[inline]
    pub fn cell_start(&mut self, tag: &str, align: Option<&str>) {
        self.out.push('<');
        self.out.push_str(tag);
        if let Some(align) = align {
            self.out.push_str(" align=\"");
            self.out.push_str(align);
            self.out.push('"');
        }
        self.out.push('>');
    }
}
