use vaultdown::{Fold, NodeKind, normalize, parse, to_html, to_markdown};

fn html(input: &str) -> String {
    to_html(&parse(input))
}

// --- Structure ---

#[test]
fn callout_with_title_and_body() {
    let doc = parse("> [!note] Title\n> body");
    let callout = &doc.children()[0];
    assert_eq!(callout.kind, NodeKind::Callout);
    assert_eq!(callout.attrs.callout_type.as_deref(), Some("note"));

    let title = &callout.children()[0];
    assert_eq!(title.kind, NodeKind::CalloutTitle);
    assert!(title.text_content().contains("Title"));
    assert!(callout.children()[1].text_content().contains("body"));
}

#[test]
fn callout_serializes_to_same_lines() {
    let input = "> [!note] Title\n> body";
    assert_eq!(to_markdown(&parse(input)), format!("{input}\n"));
}

#[test]
fn callout_without_title_has_no_title_node() {
    let doc = parse("> [!tip]\n> body");
    let callout = &doc.children()[0];
    assert_eq!(callout.children().len(), 1);
    assert_eq!(callout.children()[0].kind, NodeKind::Paragraph);
    assert_eq!(normalize("> [!tip]\n> body"), "> [!tip]\n> body\n");
}

#[test]
fn any_word_is_a_callout_type() {
    let doc = parse("> [!recipe] Pancakes\n> flour");
    assert_eq!(doc.children()[0].attrs.callout_type.as_deref(), Some("recipe"));
}

#[test]
fn invalid_marker_is_regular_blockquote() {
    let out = html("> [!not valid] text");
    assert_eq!(out, "<blockquote>\n<p>[!not valid] text</p>\n</blockquote>\n");
}

// --- Fold markers ---

#[test]
fn fold_markers() {
    let doc = parse("> [!faq]- Closed\n> answer\n\n> [!faq]+ Open\n> answer");
    assert_eq!(doc.children()[0].attrs.fold, Some(Fold::Closed));
    assert_eq!(doc.children()[1].attrs.fold, Some(Fold::Open));
}

#[test]
fn fold_marker_round_trips() {
    assert_eq!(normalize("> [!faq]- Q\n> A"), "> [!faq]- Q\n> A\n");
}

// --- Nested content ---

#[test]
fn body_is_parsed_as_blocks() {
    let doc = parse("> [!todo] Tasks\n> - [ ] write\n> - [x] test\n>\n> Done soon.");
    let callout = &doc.children()[0];
    let kinds: Vec<_> = callout.children().iter().map(|n| n.kind.clone()).collect();
    assert_eq!(
        kinds,
        [NodeKind::CalloutTitle, NodeKind::List, NodeKind::Paragraph]
    );
    let items = callout.children()[1].children();
    assert_eq!(items[0].attrs.task, Some(false));
    assert_eq!(items[1].attrs.task, Some(true));
}

#[test]
fn nested_callout() {
    let doc = parse("> [!note] Outer\n> > [!warning] Inner\n> > careful");
    let outer = &doc.children()[0];
    let inner = &outer.children()[1];
    assert_eq!(inner.kind, NodeKind::Callout);
    assert_eq!(inner.attrs.callout_type.as_deref(), Some("warning"));
    assert_eq!(inner.children()[1].text_content(), "careful");
}

#[test]
fn nested_callout_round_trips() {
    let input = "> [!note] Outer\n> > [!warning] Inner\n> > careful\n";
    assert_eq!(normalize(input), input);
}

#[test]
fn blank_quote_line_separates_paragraphs() {
    let input = "> [!note] T\n> a\n>\n> b";
    let doc = parse(input);
    assert_eq!(doc.children()[0].children().len(), 3);
    assert_eq!(normalize(input), "> [!note] T\n> a\n>\n> b\n");
}

#[test]
fn callout_ends_at_unquoted_line() {
    let doc = parse("> [!note]\n> inside\noutside");
    assert_eq!(doc.children().len(), 2);
    assert_eq!(doc.children()[1].text_content(), "outside");
}

// --- HTML ---

#[test]
fn html_default_title_from_type() {
    let out = html("> [!NOTE]\n> This is a note.");
    assert_eq!(
        out,
        "<div class=\"callout\" data-callout=\"note\">\n\
         <div class=\"callout-title\">Note</div>\n\
         <div class=\"callout-content\">\n\
         <p>This is a note.</p>\n\
         </div>\n</div>\n"
    );
}

#[test]
fn html_title_with_inline_markup() {
    let out = html("> [!tip] Use **this**\n> ok");
    assert!(out.contains("<div class=\"callout-title\">Use <strong>this</strong></div>"));
}

#[test]
fn html_fold_attribute() {
    let out = html("> [!faq]- Q\n> A");
    assert!(out.contains("data-callout-fold=\"-\""));
    assert!(!html("> [!faq] Q\n> A").contains("data-callout-fold"));
}
