//! Document flattening into tab/newline-delimited plain text.

use crate::types::{Document, Paragraph, Table};

/// Cell separator inside a table row.
const CELL_SEPARATOR: char = '\t';

/// Flatten a document body into plain text.
///
/// Paragraphs end with a newline. Each table cell paragraph is followed by a
/// tab, each table row by a newline, and the table itself by a blank line.
/// The result is trimmed.
pub fn extract_text(document: &Document) -> String {
    let mut text = String::new();

    for element in &document.body.content {
        if let Some(paragraph) = &element.paragraph {
            push_paragraph(&mut text, paragraph);
            text.push('\n');
        }

        if let Some(table) = &element.table {
            push_table(&mut text, table);
            text.push('\n');
        }
    }

    text.trim().to_string()
}

fn push_paragraph(out: &mut String, paragraph: &Paragraph) {
    for run in paragraph.elements.iter().filter_map(|e| e.text_run.as_ref()) {
        if let Some(content) = &run.content {
            out.push_str(content);
        }
    }
}

fn push_table(out: &mut String, table: &Table) {
    for row in &table.table_rows {
        for cell in &row.table_cells {
            // Nested tables inside cells are not flattened.
            for paragraph in cell.content.iter().filter_map(|c| c.paragraph.as_ref()) {
                push_paragraph(out, paragraph);
                out.push(CELL_SEPARATOR);
            }
        }
        out.push('\n');
    }
}
