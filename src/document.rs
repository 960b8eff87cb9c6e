// 🌳 Labeled Document Tree
// Flattens registry markup into rows of cells (text + first hyperlink target).
// Every extractor works on this model, never on raw HTML.

use scraper::{ElementRef, Html};
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One `<td>` - trimmed text content plus its first hyperlink, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub href: Option<String>,
    pub link_text: Option<String>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Cell {
            text: text.into(),
            ..Cell::default()
        }
    }

    /// Builder: attach a hyperlink
    pub fn with_link(mut self, href: impl Into<String>, link_text: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self.link_text = Some(link_text.into());
        self
    }
}

/// One `<tr>` - its own `<td>` cells in document order and its full text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub text: String,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        let text = cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Row { cells, text }
    }

    pub fn cell(&self, idx: usize) -> Option<&Cell> {
        self.cells.get(idx)
    }

    /// Trimmed text of the cell at `idx`, empty when missing
    pub fn cell_text(&self, idx: usize) -> &str {
        self.cells.get(idx).map(|c| c.text.as_str()).unwrap_or("")
    }
}

/// A `<table>` element: indices of every row it contains (nested ones included)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<usize>,
    /// True when the table sits inside another table
    pub nested: bool,
}

/// The whole page as rows + tables, both in document order
#[derive(Debug, Clone, Default)]
pub struct Document {
    rows: Vec<Row>,
    tables: Vec<Table>,
}

impl Document {
    /// Assemble a document from pre-built parts (rows referenced by index)
    pub fn from_parts(rows: Vec<Row>, tables: Vec<Table>) -> Self {
        Document { rows, tables }
    }

    /// Best-effort parse; malformed markup still yields a (possibly empty) tree
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let root = html.root_element();

        let mut rows = Vec::new();
        let mut row_index = HashMap::new();

        for el in root.descendants().filter_map(ElementRef::wrap) {
            if el.value().name() == "tr" {
                row_index.insert(el.id(), rows.len());
                rows.push(read_row(el));
            }
        }

        let mut tables = Vec::new();
        for el in root.descendants().filter_map(ElementRef::wrap) {
            if el.value().name() != "table" {
                continue;
            }
            let nested = el
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| a.value().name() == "table");
            let table_rows = el
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|d| d.value().name() == "tr")
                .filter_map(|d| row_index.get(&d.id()).copied())
                .collect();
            tables.push(Table {
                rows: table_rows,
                nested,
            });
        }

        debug!(rows = rows.len(), tables = tables.len(), "parsed document");
        Document { rows, tables }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    /// Rows belonging to `table`, in document order
    pub fn table_rows<'a>(&'a self, table: &'a Table) -> impl Iterator<Item = &'a Row> + 'a {
        table.rows.iter().filter_map(move |&i| self.rows.get(i))
    }

    /// Index of the first row holding a cell whose text equals `text` exactly
    pub fn find_cell_text(&self, text: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.cells.iter().any(|c| c.text == text))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// HTML HELPERS
// ============================================================================

/// Cells are the row's own `<td>`s; cells of tables nested inside belong to
/// the nested rows
fn read_row(tr: ElementRef<'_>) -> Row {
    let cells = tr
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td" && owned_by(*el, tr))
        .map(read_cell)
        .collect();
    Row {
        cells,
        text: tr.text().collect::<String>(),
    }
}

fn owned_by(td: ElementRef<'_>, tr: ElementRef<'_>) -> bool {
    td.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "tr")
        .is_some_and(|a| a.id() == tr.id())
}

fn read_cell(td: ElementRef<'_>) -> Cell {
    let anchor = td
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a");

    Cell {
        text: td.text().collect::<String>().trim().to_string(),
        href: anchor.and_then(|a| a.value().attr("href")).map(str::to_string),
        link_text: anchor.map(|a| a.text().collect::<String>().trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_value_rows() {
        let doc = Document::parse(
            r#"<table>
                <tr><td> Gender </td><td>female</td></tr>
                <tr><td>Father</td><td><a href="/view_dog?id=87626">UNION</a></td></tr>
            </table>"#,
        );

        assert_eq!(doc.rows().len(), 2);
        assert_eq!(doc.rows()[0].cell_text(0), "Gender");
        assert_eq!(doc.rows()[1].cells[1].href.as_deref(), Some("/view_dog?id=87626"));
        assert_eq!(doc.rows()[1].cells[1].link_text.as_deref(), Some("UNION"));
        assert_eq!(doc.tables().len(), 1);
        assert!(!doc.tables()[0].nested);
    }

    #[test]
    fn test_nested_tables_are_flagged() {
        let doc = Document::parse(
            r#"<table>
                <tr><td>children</td></tr>
                <tr><td><table>
                    <tr><th>Name</th><th>Ped#</th></tr>
                    <tr><td>A</td><td>B</td></tr>
                </table></td></tr>
            </table>"#,
        );

        assert_eq!(doc.tables().len(), 2);
        let inner = &doc.tables()[1];
        assert!(inner.nested);
        let header = doc.table_rows(inner).next().unwrap();
        assert!(header.text.contains("Ped#"));
        assert!(header.cells.is_empty());
        assert_eq!(doc.find_cell_text("children"), Some(0));
    }

    #[test]
    fn test_wrapper_row_does_not_own_nested_cells() {
        let doc = Document::parse(
            r#"<table><tr><td><table>
                <tr><td>children</td></tr>
                <tr><td>Gender</td><td>male</td></tr>
            </table></td></tr></table>"#,
        );

        assert_eq!(doc.rows().len(), 3);
        let wrapper = &doc.rows()[0];
        assert_eq!(wrapper.cells.len(), 1);
        assert!(wrapper.text.contains("Gender"));
        assert_eq!(doc.rows()[2].cells.len(), 2);
        assert_eq!(doc.find_cell_text("children"), Some(1));
    }

    #[test]
    fn test_garbage_markup_yields_empty_tree() {
        let doc = Document::parse("<<< not really html");
        assert!(doc.is_empty());
        assert!(doc.tables().is_empty());
        assert_eq!(doc.find_cell_text("children"), None);
    }

    #[test]
    fn test_entities_decoded_in_text() {
        let doc = Document::parse("<table><tr><td>A&amp;B</td><td>x&nbsp;y</td></tr></table>");
        assert_eq!(doc.rows()[0].cell_text(0), "A&B");
        assert_eq!(doc.rows()[0].cell_text(1), "x\u{a0}y");
    }
}
