// 👪 Relative-List Extractor - children and siblings sub-tables

use crate::document::{Document, Row, Table};
use crate::extract::extract_link_id;
use crate::record::RelativeSummary;
use tracing::debug;

pub const CHILDREN_SECTION: &str = "children";
pub const SIBLINGS_SECTION: &str = "Brothers and sisters";

const SECTIONS: [&str; 2] = [CHILDREN_SECTION, SIBLINGS_SECTION];

/// Header markers that together identify a relatives listing
pub const HEADER_MARKERS: [&str; 3] = ["Name", "Ped#", "HD"];

/// Data rows shorter than this are separators or notes
pub const MIN_RELATIVE_CELLS: usize = 7;

/// Heuristic, not a guarantee: a nested table is taken as a relatives listing
/// when its header row mentions the name, pedigree-number and hip-score
/// columns. Incidental nested tables on the page rarely carry all three.
pub fn is_relatives_header(header_text: &str) -> bool {
    HEADER_MARKERS.iter().all(|m| header_text.contains(m))
}

/// Relatives listed under `section_label`, in document order.
///
/// Empty when the label does not appear or no qualifying sub-table sits
/// between it and the next section label. Entries pointing back at `own_id`
/// are dropped; other duplicates stay.
pub fn extract_relatives(doc: &Document, section_label: &str, own_id: &str) -> Vec<RelativeSummary> {
    let Some(label_row) = doc.find_cell_text(section_label) else {
        debug!(section_label, "section not present");
        return Vec::new();
    };

    let section_end = next_section_row(doc, label_row).unwrap_or(usize::MAX);
    let Some(table) = find_relatives_table(doc, label_row, section_end) else {
        debug!(section_label, "section present but no relatives table follows");
        return Vec::new();
    };

    let relatives: Vec<RelativeSummary> = doc
        .table_rows(table)
        .skip(1)
        .filter(|row| row.cells.len() >= MIN_RELATIVE_CELLS)
        .map(summarize)
        .filter(|r| r.external_id.as_deref() != Some(own_id))
        .collect();

    debug!(section_label, count = relatives.len(), "relatives extracted");
    relatives
}

/// Row of the next section label after `label_row`, if any
fn next_section_row(doc: &Document, label_row: usize) -> Option<usize> {
    doc.rows()
        .iter()
        .enumerate()
        .skip(label_row + 1)
        .find(|(_, row)| row.cells.iter().any(|c| SECTIONS.contains(&c.text.as_str())))
        .map(|(i, _)| i)
}

/// First nested table starting in `[from_row, until_row)` whose header qualifies
fn find_relatives_table(doc: &Document, from_row: usize, until_row: usize) -> Option<&Table> {
    doc.tables()
        .iter()
        .filter(|t| t.nested)
        .filter(|t| {
            t.rows
                .first()
                .is_some_and(|&first| first >= from_row && first < until_row)
        })
        .find(|t| {
            doc.table_rows(t)
                .next()
                .is_some_and(|header| is_relatives_header(&header.text))
        })
}

fn summarize(row: &Row) -> RelativeSummary {
    let first = &row.cells[0];
    RelativeSummary {
        name: first
            .link_text
            .clone()
            .unwrap_or_else(|| first.text.clone()),
        external_id: first.href.as_deref().and_then(extract_link_id),
        pedigree_number: row.cell_text(1).to_string(),
        titles: row.cell_text(2).to_string(),
        date_of_birth: row.cell_text(3).to_string(),
        color: row.cell_text(4).to_string(),
        hip_score: row.cell_text(5).to_string(),
        elbow_score: row.cell_text(6).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{SAMPLE_PROFILE, SAMPLE_PROFILE_ID};

    #[test]
    fn test_children_from_sample() {
        let doc = Document::parse(SAMPLE_PROFILE);
        let children = extract_relatives(&doc, CHILDREN_SECTION, SAMPLE_PROFILE_ID);

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "PHOENIX BEAUTY ALFA");
        assert_eq!(children[0].external_id.as_deref(), Some("120001"));
        assert_eq!(children[0].pedigree_number, "LV-50001/21");
        assert_eq!(children[0].hip_score, "HD A");
        assert_eq!(children[1].titles, "JCH");
        assert_eq!(children[1].elbow_score, "ED 1");
    }

    #[test]
    fn test_siblings_exclude_self() {
        let doc = Document::parse(SAMPLE_PROFILE);
        let siblings = extract_relatives(&doc, SIBLINGS_SECTION, SAMPLE_PROFILE_ID);

        assert_eq!(siblings.len(), 1);
        assert_eq!(siblings[0].name, "HEART SKIPS PHOENIX BOLD");
        assert!(siblings
            .iter()
            .all(|s| s.external_id.as_deref() != Some(SAMPLE_PROFILE_ID)));
    }

    #[test]
    fn test_missing_section_is_empty() {
        let doc = Document::parse("<table><tr><td>Name</td><td>X</td></tr></table>");
        assert!(extract_relatives(&doc, CHILDREN_SECTION, "1").is_empty());
        assert!(extract_relatives(&doc, SIBLINGS_SECTION, "1").is_empty());
    }

    #[test]
    fn test_section_label_is_exact() {
        let doc = Document::parse(SAMPLE_PROFILE);
        assert!(extract_relatives(&doc, "Children", SAMPLE_PROFILE_ID).is_empty());
    }

    #[test]
    fn test_unrelated_nested_table_ignored() {
        let doc = Document::parse(
            r#"<table>
                <tr><td>children</td></tr>
                <tr><td><table>
                    <tr><td>Name</td><td>Owner</td></tr>
                    <tr><td>a</td><td>b</td><td>c</td><td>d</td><td>e</td><td>f</td><td>g</td></tr>
                </table></td></tr>
            </table>"#,
        );
        assert!(extract_relatives(&doc, CHILDREN_SECTION, "1").is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let row = r#"<tr><td><a href="/view_dog?id=7">DUP</a></td><td>P</td><td></td><td>D</td><td>C</td><td>HD A</td><td>ED 0</td></tr>"#;
        let doc = Document::parse(&format!(
            "<table><tr><td>children</td></tr><tr><td><table><tr><th>Name</th><th>Ped#</th><th>HD</th></tr>{row}{row}</table></td></tr></table>"
        ));
        let children = extract_relatives(&doc, CHILDREN_SECTION, "1");
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], children[1]);
    }

    const HEADER: &str = "<tr><th>Name</th><th>Ped#</th><th>Titles</th><th>DOB</th><th>Colour</th><th>HD</th><th>ED</th></tr>";

    fn dog_row(id: &str, name: &str) -> String {
        format!(
            r#"<tr><td><a href="/view_dog?id={id}">{name}</a></td><td>P-{id}</td><td></td><td>2020/01/01</td><td>Black</td><td>HD A</td><td>ED 0</td></tr>"#
        )
    }

    fn names(relatives: &[RelativeSummary]) -> Vec<&str> {
        relatives.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_profile_inside_layout_table() {
        let doc = Document::parse(&format!(
            r#"<table><tr><td>
                <table>
                    <tr><td>Name</td><td>REX</td></tr>
                    <tr><td>children</td></tr>
                    <tr><td><table>{HEADER}{child}</table></td></tr>
                    <tr><td>Brothers and sisters</td></tr>
                    <tr><td><table>{HEADER}{sib}</table></td></tr>
                </table>
            </td></tr></table>"#,
            child = dog_row("20", "CHILD"),
            sib = dog_row("30", "SIB"),
        ));

        assert_eq!(names(&extract_relatives(&doc, CHILDREN_SECTION, "1")), vec!["CHILD"]);
        assert_eq!(names(&extract_relatives(&doc, SIBLINGS_SECTION, "1")), vec!["SIB"]);
    }

    #[test]
    fn test_section_without_listing_does_not_borrow_next() {
        let doc = Document::parse(&format!(
            r#"<table>
                <tr><td>children</td></tr>
                <tr><td>none registered</td></tr>
                <tr><td>Brothers and sisters</td></tr>
                <tr><td><table>{HEADER}{sib}</table></td></tr>
            </table>"#,
            sib = dog_row("30", "SIB"),
        ));

        assert!(extract_relatives(&doc, CHILDREN_SECTION, "1").is_empty());
        assert_eq!(names(&extract_relatives(&doc, SIBLINGS_SECTION, "1")), vec!["SIB"]);
    }

    #[test]
    fn test_header_heuristic() {
        assert!(is_relatives_header("Name Ped# Titles DOB Colour HD ED"));
        assert!(!is_relatives_header("Name Titles HD"));
        assert!(!is_relatives_header("name ped# hd"));
    }
}
