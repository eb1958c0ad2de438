//! Wiki links, embeds, footnote references, links, images, inline HTML
//! and autolinks.

use super::InlineParser;
use crate::cursor::Cursor;
use crate::limits::MAX_LINK_SCAN;
use crate::node::{Attrs, LinkType, Node, NodeKind};

const WIKI_OPEN: &str = "[[";
const WIKI_CLOSE: &str = "]]";
const WIKI_ALIAS: char = '|';
const WIKI_HEADING: char = '#';

/// File extensions that turn a link target into an image.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp"];

/// Whether a link target names an image file (case-insensitive extension).
///
/// ```
/// use vaultdown::inline::is_image_file;
/// assert!(is_image_file("assets/Photo.PNG"));
/// assert!(!is_image_file("notes/photo.md"));
/// ```
pub fn is_image_file(target: &str) -> bool {
    let path = target.split(['?', '#']).next().unwrap_or(target);
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// `[[target|alias]]` or `![[target]]`.
pub(super) fn try_wiki(cur: &mut Cursor<'_>) -> Option<Node> {
    let mut c = *cur;
    let embed = c.eat(b'!');
    if !c.eat_str(WIKI_OPEN) {
        return None;
    }
    let rest = c.remaining_str();
    let window = &rest.as_bytes()[..rest.len().min(MAX_LINK_SCAN)];
    let rel = memchr::memmem::find(window, WIKI_CLOSE.as_bytes())?;
    let inner = &rest[..rel];
    if inner.contains(['\n', '[']) {
        return None;
    }
    let node = wiki_node(inner, embed)?;
    c.advance(rel + WIKI_CLOSE.len());
    *cur = c;
    Some(node)
}

fn wiki_node(inner: &str, embed: bool) -> Option<Node> {
    let (target, alias) = match inner.split_once(WIKI_ALIAS) {
        Some((target, alias)) => (target, Some(alias.trim())),
        None => (inner, None),
    };
    let (file, heading) = match target.split_once(WIKI_HEADING) {
        Some((file, heading)) => (file.trim(), Some(heading.trim())),
        None => (target.trim(), None),
    };
    let alias = alias.filter(|a| !a.is_empty()).map(str::to_owned);
    let heading = heading.filter(|h| !h.is_empty()).map(str::to_owned);

    if file.is_empty() && heading.is_none() {
        return None;
    }

    if is_image_file(file) {
        let attrs = Attrs {
            url: Some(file.to_owned()),
            alt: alias,
            file: Some(file.to_owned()),
            embed: Some(embed),
            ..Attrs::default()
        };
        return Some(Node::new(NodeKind::Image).with_attrs(attrs));
    }

    let (kind, link_type) = if embed {
        (NodeKind::Embed, LinkType::Embed)
    } else if file.is_empty() {
        (NodeKind::WikiLink, LinkType::InternalHeading)
    } else if heading.is_some() {
        (NodeKind::WikiLink, LinkType::ExternalHeading)
    } else {
        (NodeKind::WikiLink, LinkType::Article)
    };

    let attrs = Attrs {
        file: Some(file.to_owned()),
        heading,
        alias,
        link_type: Some(link_type),
        ..Attrs::default()
    };
    Some(Node::new(kind).with_attrs(attrs))
}

/// `[^id]`
pub(super) fn try_footnote_ref(cur: &mut Cursor<'_>) -> Option<Node> {
    let rest = cur.remaining_str().strip_prefix("[^")?;
    let end = rest.find(']')?;
    let id = &rest[..end];
    if id.is_empty() || id.bytes().any(|b| b.is_ascii_whitespace() || b == b'[') {
        return None;
    }
    cur.advance(2 + end + 1);
    let attrs = Attrs {
        id: Some(id.to_owned()),
        ..Attrs::default()
    };
    Some(Node::new(NodeKind::FootnoteRef).with_attrs(attrs))
}

/// `![alt](url "title")`
pub(super) fn try_image(cur: &mut Cursor<'_>) -> Option<Node> {
    let mut c = *cur;
    if !c.eat(b'!') {
        return None;
    }
    let (alt, url, title) = parse_bracketed(&mut c)?;
    *cur = c;
    Some(image_node(alt, url, title))
}

/// `[label](url "title")`; an image URL turns the link into an image.
pub(super) fn try_link(cur: &mut Cursor<'_>, parser: &InlineParser) -> Option<Node> {
    let mut c = *cur;
    let (label, url, title) = parse_bracketed(&mut c)?;
    *cur = c;
    if is_image_file(url) {
        return Some(image_node(label, url, title));
    }
    let attrs = Attrs {
        url: Some(url.to_owned()),
        title: title.map(str::to_owned),
        ..Attrs::default()
    };
    Some(Node::container(NodeKind::Link, parser.nested(label)).with_attrs(attrs))
}

fn image_node(alt: &str, url: &str, title: Option<&str>) -> Node {
    let attrs = Attrs {
        url: Some(url.to_owned()),
        alt: Some(alt.to_owned()),
        title: title.map(str::to_owned),
        ..Attrs::default()
    };
    Node::new(NodeKind::Image).with_attrs(attrs)
}

/// Parse `[label](destination)` at the cursor.
///
/// Brackets inside the label must balance. Returns label, url and title.
/// The label and the destination are each searched at most
/// [`MAX_LINK_SCAN`] bytes ahead, so a run of unmatched `[` stays linear.
fn parse_bracketed<'a>(c: &mut Cursor<'a>) -> Option<(&'a str, &'a str, Option<&'a str>)> {
    let rest = c.remaining_str();
    if !rest.starts_with('[') {
        return None;
    }

    let mut depth = 0usize;
    let mut close = None;
    for (i, b) in rest.bytes().enumerate().take(MAX_LINK_SCAN) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close?;
    let label = &rest[1..close];
    let after = rest[close + 1..].strip_prefix('(')?;
    let dest_end = after.bytes().take(MAX_LINK_SCAN).position(|b| b == b')')?;
    let (url, title) = split_destination(&after[..dest_end]);

    c.advance(close + 1 + 1 + dest_end + 1);
    Some((label, url, title))
}

/// Split `url "title"` and unwrap `<url>`.
fn split_destination(raw: &str) -> (&str, Option<&str>) {
    let raw = raw.trim();
    let (url, title) = match raw.find(" \"") {
        Some(idx) if raw.len() >= idx + 3 && raw.ends_with('"') => {
            (raw[..idx].trim_end(), Some(&raw[idx + 2..raw.len() - 1]))
        }
        _ => (raw, None),
    };
    let url = url
        .strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(url);
    (url, title)
}

/// `<https://...>` autolink, or an inline HTML tag / comment.
pub(super) fn try_angle(cur: &mut Cursor<'_>) -> Option<Node> {
    let rest = cur.remaining_str();

    if rest.starts_with("<!--") {
        let end = rest[4..].find("-->")? + 4 + 3;
        cur.advance(end);
        return Some(Node::leaf(NodeKind::HtmlInline, &rest[..end]));
    }

    let end = rest.find('>')?;
    let inner = &rest[1..end];

    if inner.starts_with("http://") || inner.starts_with("https://") {
        if inner.contains(char::is_whitespace) {
            return None;
        }
        cur.advance(end + 1);
        return Some(Node::leaf(NodeKind::AutoLink, inner));
    }

    let first = inner.bytes().next()?;
    if !(first.is_ascii_alphabetic() || first == b'/' || first == b'!') || inner.contains('<') {
        return None;
    }
    cur.advance(end + 1);
    Some(Node::leaf(NodeKind::HtmlInline, &rest[..=end]))
}

/// A bare `http://` or `https://` URL running up to whitespace.
///
/// Trailing sentence punctuation is left out of the link.
pub(super) fn try_bare_autolink(cur: &mut Cursor<'_>) -> Option<Node> {
    if cur.peek_back().is_some_and(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let rest = cur.remaining_str();
    let scheme = if rest.starts_with("https://") {
        "https://".len()
    } else if rest.starts_with("http://") {
        "http://".len()
    } else {
        return None;
    };

    let mut end = rest
        .find(|c: char| c.is_whitespace() || c == '<')
        .unwrap_or(rest.len());
    while end > scheme && rest[..end].ends_with(['.', ',', ';', ':', '!', '?', ')']) {
        end -= 1;
    }
    if end == scheme {
        return None;
    }

    cur.advance(end);
    Some(Node::leaf(NodeKind::AutoLink, &rest[..end]))
}
