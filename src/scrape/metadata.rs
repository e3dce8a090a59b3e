//! Metadata table extraction from the `trm` frame.

use scraper::{ElementRef, Html, Selector};

use super::ParseError;
use crate::models::{TransientMetadata, METADATA_CELL_COUNT};

/// Parse the metadata frame into the fixed field schema.
///
/// The table is anchored by the unique cell whose `title` attribute names
/// the processing id; its text is the detection datetime. The 20 sibling
/// cells that follow are assigned positionally, so a changed column order on
/// the server would misassign values silently; a changed column count is
/// caught and rejected.
pub fn extract_metadata(html: &str, id: &str) -> Result<TransientMetadata, ParseError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"td[title*="proc_id"]"#).unwrap();

    let anchor = document
        .select(&selector)
        .next()
        .ok_or(ParseError::MissingAnchor)?;
    let datetime = cell_text(&anchor);

    let cells: Vec<String> = anchor
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .take(METADATA_CELL_COUNT)
        .map(|el| cell_text(&el))
        .collect();

    TransientMetadata::from_cells(id.to_string(), datetime, cells)
}

/// Full text content of a cell, whitespace preserved verbatim.
fn cell_text(element: &ElementRef) -> String {
    element.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_frame(extra_cells: usize) -> String {
        let mut cells = vec![
            "22h 08m 40.35s  -57d 26m 26.0s ",
            "16.26",
            "W",
            "19.12",
            "16752.9",
            "76.4",
            "779.6",
            "3255.99",
            "7.5",
            "1.4",
            "1.1",
            "10.52",
            "",
            "1",
            "   | NGC7205 ",
            "48.8E",
            "7.3N",
            "  0.0  ",
            "FRT",
            "    pogrosheva ",
        ];
        cells.truncate(METADATA_CELL_COUNT - extra_cells);

        let tds: String = cells
            .iter()
            .map(|c| format!("<td>{}</td>", c))
            .collect();
        format!(
            r#"<html><body><table><tr>
                <td>garbage before</td>
                <td title="proc_id 12345">2020-06-20 04:09:35.189</td>
                {}
            </tr></table></body></html>"#,
            tds
        )
    }

    #[test]
    fn test_extracts_full_schema() {
        let meta = extract_metadata(&metadata_frame(0), "30215426").unwrap();
        assert_eq!(meta.id, "30215426");
        assert_eq!(meta.datetime, "2020-06-20 04:09:35.189");
        assert_eq!(meta.coord2000, "22h 08m 40.35s  -57d 26m 26.0s ");
        assert_eq!(meta.mag, "16.26");
        assert_eq!(meta.band, "W");
        assert_eq!(meta.gal, "   | NGC7205 ");
        // Whitespace survives verbatim.
        assert_eq!(meta.dmag, "  0.0  ");
        assert_eq!(meta.user, "    pogrosheva ");
    }

    #[test]
    fn test_instrument_field_never_surfaces() {
        let meta = extract_metadata(&metadata_frame(0), "30215426").unwrap();
        let row = meta.sidecar_row();
        assert_eq!(row.len(), 21);
        assert!(!row.contains(&"FRT"));
    }

    #[test]
    fn test_short_table_is_schema_mismatch() {
        let err = extract_metadata(&metadata_frame(5), "30215426").unwrap_err();
        assert!(matches!(
            err,
            ParseError::SchemaMismatch {
                expected: METADATA_CELL_COUNT,
                found: 15
            }
        ));
    }

    #[test]
    fn test_missing_anchor() {
        let err = extract_metadata("<table><tr><td>no anchor</td></tr></table>", "1").unwrap_err();
        assert!(matches!(err, ParseError::MissingAnchor));
    }

    #[test]
    fn test_cells_in_other_rows_are_ignored() {
        // find_next_siblings semantics: only cells sharing the anchor's row
        // count toward the schema.
        let html = r#"<table>
            <tr><td title="proc_id 1">2020-06-20 04:09:35.189</td><td>only-one</td></tr>
            <tr><td>next-row</td></tr>
        </table>"#;
        let err = extract_metadata(html, "1").unwrap_err();
        assert!(matches!(err, ParseError::SchemaMismatch { found: 1, .. }));
    }
}
