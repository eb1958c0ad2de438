//! Pipe table tests.

use vaultdown::{Align, NodeKind, normalize, parse, to_html};

fn html(input: &str) -> String {
    to_html(&parse(input))
}

fn cells(row: &vaultdown::Node) -> Vec<String> {
    row.children().iter().map(|c| c.text_content()).collect()
}

// === Structure ===

#[test]
fn header_alignment_and_row() {
    let doc = parse("| a | b |\n| --- | :---: |\n| 1 | 2 |");
    let table = &doc.children()[0];
    assert_eq!(table.kind, NodeKind::Table);
    assert_eq!(table.attrs.align, Some(vec![Align::None, Align::Center]));
    assert_eq!(table.children().len(), 2);
    assert_eq!(cells(&table.children()[0]), ["a", "b"]);
    assert_eq!(cells(&table.children()[1]), ["1", "2"]);
}

#[test]
fn align_property_names() {
    let doc = parse("| a | b | c | d |\n| :-- | :-: | --: | --- |");
    let align = doc.children()[0].property("align");
    assert_eq!(
        align,
        Some(serde_json::json!(["left", "center", "right", "none"]))
    );
}

#[test]
fn rows_are_padded_and_truncated() {
    let doc = parse("| a | b |\n| - | - |\n| 1 |\n| 1 | 2 | 3 |");
    let table = &doc.children()[0];
    assert_eq!(cells(&table.children()[1]), ["1", ""]);
    assert_eq!(cells(&table.children()[2]), ["1", "2"]);
    for row in table.children() {
        assert_eq!(row.children().len(), 2);
    }
}

#[test]
fn table_interrupts_paragraph() {
    let doc = parse("intro\n| a |\n| - |\n| 1 |");
    assert_eq!(doc.children()[0].kind, NodeKind::Paragraph);
    assert_eq!(doc.children()[1].kind, NodeKind::Table);
}

#[test]
fn missing_alignment_row_is_paragraph() {
    assert_eq!(html("| a |\n| x |"), "<p>| a |\n| x |</p>\n");
}

// === HTML ===

#[test]
fn basic_table_html() {
    let input = "| foo | bar |\n| --- | --- |\n| baz | bim |\n";
    let expected = "<table>\n<thead>\n<tr>\n<th>foo</th>\n<th>bar</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>baz</td>\n<td>bim</td>\n</tr>\n</tbody>\n</table>\n";
    assert_eq!(html(input), expected);
}

#[test]
fn alignment_without_outer_pipes() {
    let input = "| abc | defghi |\n:-: | -----------:\nbar | baz\n";
    let expected = "<table>\n<thead>\n<tr>\n<th align=\"center\">abc</th>\n<th align=\"right\">defghi</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td align=\"center\">bar</td>\n<td align=\"right\">baz</td>\n</tr>\n</tbody>\n</table>\n";
    assert_eq!(html(input), expected);
}

#[test]
fn escaped_pipes_stay_in_cell() {
    let input = "| f\\|oo  |\n| ------ |\n| b **\\|** im |\n";
    let expected = "<table>\n<thead>\n<tr>\n<th>f|oo</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>b <strong>|</strong> im</td>\n</tr>\n</tbody>\n</table>\n";
    assert_eq!(html(input), expected);
}

#[test]
fn blockquote_terminates_table() {
    let input = "| abc | def |\n| --- | --- |\n| bar | baz |\n> bar\n";
    let expected = "<table>\n<thead>\n<tr>\n<th>abc</th>\n<th>def</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>bar</td>\n<td>baz</td>\n</tr>\n</tbody>\n</table>\n<blockquote>\n<p>bar</p>\n</blockquote>\n";
    assert_eq!(html(input), expected);
}

#[test]
fn header_only_has_no_tbody() {
    let expected = "<table>\n<thead>\n<tr>\n<th>a</th>\n</tr>\n</thead>\n</table>\n";
    assert_eq!(html("| a |\n| - |"), expected);
}

// === Markdown ===

#[test]
fn normalized_table() {
    assert_eq!(
        normalize("a|b\n:-|-:\n1|2"),
        "| a | b |\n| :--- | ---: |\n| 1 | 2 |\n"
    );
}

#[test]
fn inline_markup_in_cells_round_trips() {
    let input = "| **a** | [[Note]] |\n| --- | --- |\n| `x` | ==y== |\n";
    assert_eq!(normalize(input), input);
}
