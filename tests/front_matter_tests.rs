use vaultdown::{Options, normalize, parse, parse_with_options, to_html};

fn names(doc: &vaultdown::Node) -> Vec<&str> {
    doc.children().iter().map(|n| n.kind.name()).collect()
}

#[test]
fn yaml_basic() {
    let doc = parse("---\ntitle: Hello\ntags: [a, b]\n---\n# Content");
    assert_eq!(names(&doc), ["frontmatter", "heading"]);
    assert_eq!(doc.children()[0].value(), Some("title: Hello\ntags: [a, b]"));
}

#[test]
fn hidden_in_html() {
    assert_eq!(
        to_html(&parse("---\ntitle: Hello\n---\n# Content")),
        "<h1>Content</h1>\n"
    );
}

#[test]
fn kept_in_markdown() {
    assert_eq!(
        normalize("---\ntitle: Hello\n---\nbody"),
        "---\ntitle: Hello\n---\n\nbody\n"
    );
}

#[test]
fn empty_front_matter() {
    let doc = parse("---\n---\nx");
    assert_eq!(doc.children()[0].value(), Some(""));
    assert_eq!(normalize("---\n---\nx"), "---\n---\n\nx\n");
}

#[test]
fn only_at_document_start() {
    let doc = parse("intro\n\n---\ntitle: x\n---");
    assert!(!names(&doc).contains(&"frontmatter"));
}

#[test]
fn unclosed_is_not_front_matter() {
    let doc = parse("---\ntitle");
    assert_eq!(names(&doc), ["horizontalRule", "paragraph"]);
}

#[test]
fn option_disabled() {
    let options = Options {
        front_matter: false,
        ..Options::default()
    };
    let doc = parse_with_options("---\ntitle: Hello\n---\n", &options);
    assert_eq!(names(&doc), ["horizontalRule", "heading"]);
}
