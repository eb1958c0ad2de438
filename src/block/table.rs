//! Pipe tables.

use tracing::warn;

use super::parser::{BlockParser, Matched};
use crate::cursor::is_blank;
use crate::limits::MAX_TABLE_COLUMNS;
use crate::node::{Align, Attrs, Node, NodeKind};

impl BlockParser {
    /// Header row, alignment row, then every following line containing `|`.
    pub(super) fn try_table(&self, lines: &[&str], pos: usize) -> Matched {
        if !starts_table(lines, pos) {
            return None;
        }
        let header = split_row(lines[pos]);
        if header.len() > MAX_TABLE_COLUMNS {
            warn!(columns = header.len(), "table column limit reached, dropping extra cells");
        }
        let columns = header.len().min(MAX_TABLE_COLUMNS);

        let mut align = parse_align_row(lines[pos + 1])?;
        align.resize(columns, Align::None);

        let mut rows = vec![self.table_row(&header, columns)];
        let mut end = pos + 2;
        while end < lines.len() && !is_blank(lines[end]) && lines[end].contains('|') {
            rows.push(self.table_row(&split_row(lines[end]), columns));
            end += 1;
        }

        let attrs = Attrs {
            align: Some(align),
            ..Attrs::default()
        };
        Some((Node::container(NodeKind::Table, rows).with_attrs(attrs), end))
    }

    /// A row padded with empty cells or truncated to `columns`.
    fn table_row(&self, cells: &[&str], columns: usize) -> Node {
        let cells = (0..columns)
            .map(|i| {
                let text = cells.get(i).copied().unwrap_or("");
                Node::container(NodeKind::TableCell, self.inline.parse(text))
            })
            .collect();
        Node::container(NodeKind::TableRow, cells)
    }
}

/// A line containing `|` followed by an alignment row.
pub(super) fn starts_table(lines: &[&str], pos: usize) -> bool {
    lines[pos].contains('|')
        && lines
            .get(pos + 1)
            .is_some_and(|next| parse_align_row(next).is_some())
}

fn parse_align_row(line: &str) -> Option<Vec<Align>> {
    if !line.contains('|') {
        return None;
    }
    split_row(line).into_iter().map(parse_align).collect()
}

/// `:---` left, `:---:` center, `---:` right, `---` none.
fn parse_align(cell: &str) -> Option<Align> {
    let left = cell.starts_with(':');
    let right = cell.len() > 1 && cell.ends_with(':');
    let dashes = cell.trim_start_matches(':').trim_end_matches(':');
    if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Align::Center,
        (true, false) => Align::Left,
        (false, true) => Align::Right,
        (false, false) => Align::None,
    })
}

/// Split a row on unescaped `|`, dropping the optional outer pipes.
fn split_row(line: &str) -> Vec<&str> {
    let t = line.trim();
    let t = t.strip_prefix('|').unwrap_or(t);
    let t = match t.strip_suffix('|') {
        Some(inner) if !inner.ends_with('\\') => inner,
        _ => t,
    };

    let bytes = t.as_bytes();
    let mut cells = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'|' => {
                cells.push(t[start..i].trim());
                start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    cells.push(t[start..].trim());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;

    fn parse(input: &str) -> Node {
        BlockParser::new(&Options::default()).parse(input)
    }

    fn cell_texts(row: &Node) -> Vec<String> {
        row.children().iter().map(Node::text_content).collect()
    }

    #[test]
    fn test_basic_table() {
        let doc = parse("| a | b |\n| --- | :---: |\n| 1 | 2 |");
        let table = &doc.children()[0];
        assert_eq!(table.kind, NodeKind::Table);
        assert_eq!(table.attrs.align, Some(vec![Align::None, Align::Center]));
        assert_eq!(table.children().len(), 2);
        assert_eq!(cell_texts(&table.children()[0]), ["a", "b"]);
        assert_eq!(cell_texts(&table.children()[1]), ["1", "2"]);
    }

    #[test]
    fn test_rows_padded_and_truncated() {
        let doc = parse("a | b | c\n:-|-:|---\n1 |\n1 | 2 | 3 | 4");
        let table = &doc.children()[0];
        assert_eq!(
            table.attrs.align,
            Some(vec![Align::Left, Align::Right, Align::None])
        );
        assert_eq!(cell_texts(&table.children()[1]), ["1", "", ""]);
        assert_eq!(cell_texts(&table.children()[2]), ["1", "2", "3"]);
    }

    #[test]
    fn test_row_without_pipe_ends_table() {
        let doc = parse("| a |\n| - |\n| 1 |\nafter");
        assert_eq!(doc.children().len(), 2);
        assert_eq!(doc.children()[1].kind, NodeKind::Paragraph);
    }

    #[test]
    fn test_escaped_pipe_stays_in_cell() {
        let doc = parse(r"| a \| b | c |
|---|---|");
        let header = &doc.children()[0].children()[0];
        assert_eq!(cell_texts(header), ["a | b", "c"]);
    }

    #[test]
    fn test_invalid_alignment_row_is_not_table() {
        let doc = parse("| a | b |\n| x | y |");
        assert_eq!(doc.children()[0].kind, NodeKind::Paragraph);
    }

    #[test]
    fn test_split_row() {
        assert_eq!(split_row("| a | b |"), ["a", "b"]);
        assert_eq!(split_row("a|b"), ["a", "b"]);
        assert_eq!(split_row("| a |  |"), ["a", ""]);
    }
}
