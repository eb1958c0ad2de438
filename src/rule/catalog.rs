//! Ready-made rules for common vault exports.
//!
//! Link and asset resolution belong to the host, so the rules that need them
//! take a resolver closure mapping a wiki target name to a destination.

use serde_json::Value;

use super::{Rule, RuleBuilder};
use crate::escape::slugify;
use crate::executor::ASSETS_KEY;
use crate::node::{Attrs, Node, NodeKind};

/// Remove HTML and `%%` comments.
pub fn strip_comments() -> Rule {
    strip("strip-comments", NodeKind::HtmlComment, "remove HTML and Obsidian comments")
}

/// Remove the YAML front matter block.
pub fn strip_frontmatter() -> Rule {
    strip("strip-frontmatter", NodeKind::FrontMatter, "remove front matter")
}

fn strip(name: &str, kind: NodeKind, description: &str) -> Rule {
    finish(
        RuleBuilder::new(name)
            .describe(description)
            .match_type(kind)
            .transform(|_, _| Ok(Node::new(NodeKind::Fragment))),
    )
}

/// Rewrite `[[file#heading|alias]]` into a standard link.
///
/// The URL is `resolve(file)` followed by `#slug` when a heading is given;
/// a heading-only link becomes a bare `#slug` fragment.
pub fn wikilinks_to_links<F>(resolve: F) -> Rule
where
    F: Fn(&str) -> String + 'static,
{
    finish(
        RuleBuilder::new("wikilinks-to-links")
            .describe("rewrite wiki links as standard Markdown links")
            .match_type(NodeKind::WikiLink)
            .transform(move |node, _| {
                let file = node.attrs.file.as_deref().unwrap_or("");
                let mut url = if file.is_empty() {
                    String::new()
                } else {
                    resolve(file)
                };
                if let Some(heading) = &node.attrs.heading {
                    url.push('#');
                    url.push_str(&slugify(heading));
                }
                let attrs = Attrs {
                    url: Some(url),
                    ..Attrs::default()
                };
                let label = Node::text(node.wiki_label());
                Ok(Node::container(NodeKind::Link, vec![label]).with_attrs(attrs))
            }),
    )
}

/// Rewrite `![[file]]` embeds and wiki images into standard images.
///
/// Every embedded file name is appended to the context data under
/// [`ASSETS_KEY`] so the host can copy the attachments afterwards.
pub fn embeds_to_images<F>(resolve: F) -> Rule
where
    F: Fn(&str) -> String + 'static,
{
    finish(
        RuleBuilder::new("embeds-to-images")
            .describe("rewrite wiki embeds as standard Markdown images")
            .match_types([NodeKind::Embed, NodeKind::Image])
            .match_with(|node, _| node.is(&NodeKind::Embed) || node.attrs.embed == Some(true))
            .transform(move |node, cx| {
                let a = &node.attrs;
                let file = a.file.clone().or_else(|| a.url.clone()).unwrap_or_default();
                cx.append(ASSETS_KEY, Value::from(file.as_str()));

                let alt = a.alias.clone().or_else(|| a.alt.clone()).unwrap_or_else(|| file.clone());
                let attrs = Attrs {
                    url: Some(resolve(&file)),
                    alt: Some(alt),
                    title: a.title.clone(),
                    ..Attrs::default()
                };
                Ok(Node::new(NodeKind::Image).with_attrs(attrs))
            }),
    )
}

/// Replace `==highlight==` with its plain content.
pub fn unwrap_highlight() -> Rule {
    unwrap("unwrap-highlight", NodeKind::Highlight)
}

/// Replace `~~strike~~` with its plain content.
pub fn unwrap_strike() -> Rule {
    unwrap("unwrap-strike", NodeKind::Strike)
}

fn unwrap(name: &str, kind: NodeKind) -> Rule {
    finish(
        RuleBuilder::new(name)
            .describe(format!("keep the content of {kind} nodes"))
            .match_type(kind)
            .transform_type(NodeKind::Fragment),
    )
}

/// Catalog rules always carry a condition and a transform.
fn finish(builder: RuleBuilder) -> Rule {
    match builder.build() {
        Ok(rule) => rule,
        Err(err) => unreachable!("catalog rule is incomplete: {err}"),
    }
}
