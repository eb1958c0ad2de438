//! HTML escaping utilities.
//!
//! Fast-path optimized: scans for the first escapable character,
//! then bulk-copies segments between escapes.

use std::borrow::Cow;

use memchr::{memchr2, memchr3};

/// Lookup table for characters escaped in text and attribute values.
const ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table[b'\'' as usize] = true;
    table
};

/// Escape HTML text or attribute content into an output buffer.
///
/// Escapes `<`, `>`, `&`, `"` and `'`.
///
/// # Example
/// ```
/// use vaultdown::escape::escape_into;
///
/// let mut out = String::new();
/// escape_into(&mut out, "<a title='x'>");
/// assert_eq!(out, "&lt;a title=&#39;x&#39;&gt;");
/// ```
#[inline]
pub fn escape_into(out: &mut String, input: &str) {
    let bytes = input.as_bytes();
    let mut pos = match first_escape(bytes) {
        Some(p) => p,
        None => {
            out.push_str(input);
            return;
        }
    };

    out.push_str(&input[..pos]);

    while pos < bytes.len() {
        let scan_start = pos;
        while pos < bytes.len() && !ESCAPE_TABLE[bytes[pos] as usize] {
            pos += 1;
        }

        // Escapable bytes are ASCII, so both ends are char boundaries
        out.push_str(&input[scan_start..pos]);

        if pos < bytes.len() {
            out.push_str(match bytes[pos] {
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'&' => "&amp;",
                b'"' => "&quot;",
                _ => "&#39;",
            });
            pos += 1;
        }
    }
}

/// Escape and return as a new String.
///
/// Prefer `escape_into` to reuse buffers.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    escape_into(&mut out, input);
    out
}

/// Check if a string needs any escaping.
#[inline]
pub fn needs_escape(input: &str) -> bool {
    first_escape(input.as_bytes()).is_some()
}

#[inline]
fn first_escape(input: &[u8]) -> Option<usize> {
    let a = memchr3(b'<', b'>', b'&', input);
    let b = memchr2(b'"', b'\'', input);
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Decode named and numeric character references (`&amp;`, `&#39;`, ...).
#[inline]
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if memchr::memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    html_escape::decode_html_entities(input)
}

/// Characters that can be backslash-escaped in Markdown.
#[inline]
pub fn is_ascii_punctuation(b: u8) -> bool {
    matches!(b,
        b'!' | b'"' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'(' | b')' |
        b'*' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b';' | b'<' |
        b'=' | b'>' | b'?' | b'@' | b'[' | b'\\' | b']' | b'^' | b'_' |
        b'`' | b'{' | b'|' | b'}' | b'~'
    )
}

/// Percent-encode a link destination, then HTML-escape it for an `href`.
///
/// Spaces, control characters and non-ASCII bytes are percent-encoded;
/// existing `%XX` sequences are kept.
pub fn escape_url_into(out: &mut String, url: &str) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    for &b in url.as_bytes() {
        match b {
            b' ' => out.push_str("%20"),
            b'"' => out.push_str("%22"),
            b'\\' => out.push_str("%5C"),
            b'<' => out.push_str("&lt;"),
            b'>' => out.push_str("&gt;"),
            b'&' => out.push_str("&amp;"),
            b'\'' => out.push_str("&#39;"),
            0x00..=0x1F | 0x7F..=0xFF => {
                out.push('%');
                out.push(HEX[(b >> 4) as usize] as char);
                out.push(HEX[(b & 0xF) as usize] as char);
            }
            _ => out.push(b as char),
        }
    }
}

/// Turn heading text into an anchor slug.
///
/// Letters and digits are lowercased, runs of spaces, dashes and
/// underscores collapse to one `-`, and other characters are dropped.
///
/// ```
/// use vaultdown::escape::slugify;
/// assert_eq!(slugify("Getting Started!"), "getting-started");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c == ' ' || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
