//! Workbook reader for xlsx, xlsm, xlsb, xls and ods documents
//!
//! Only the first worksheet is loaded. Cell types are mapped onto the
//! dataset's `Cell` model: integers and floats become numbers, dates
//! become ISO-8601 text and error cells keep their display text.
//!
//! Positions are anchored at A1: calamine's range begins at the first
//! used cell, so leading empty rows and columns are restored as empty
//! cells. Column B is always column 2 and row 1 is always the header.

use crate::{Cell, Dataset, Error, Result, Row};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;
use tracing::debug;

/// Load the first worksheet of a workbook into a dataset
pub fn read_workbook(path: &Path) -> Result<Dataset> {
    debug!("Opening workbook: {:?}", path);

    let mut workbook = open_workbook_auto(path).map_err(|e| Error::format(path, e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::format(path, "workbook has no worksheets"))?
        .map_err(|e| Error::format(path, e.to_string()))?;

    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Row> = vec![Row::new(); first_row as usize];
    rows.extend(range.rows().map(|row| {
        let mut cells: Row = vec![Cell::Empty; first_col as usize];
        cells.extend(row.iter().map(cell_from_data));
        cells
    }));

    debug!("Read {} rows from first worksheet of {:?}", rows.len(), path);
    Ok(Dataset::from_rows(rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) => match data.as_datetime() {
            Some(dt) => Cell::Text(dt.to_string()),
            None => Cell::Text(data.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn zip_file(suffix: &str, entries: &[(&str, String)]) -> NamedTempFile {
        let mut temp_file = Builder::new().suffix(suffix).tempfile().unwrap();
        {
            let mut zip = ZipWriter::new(temp_file.as_file_mut());
            let options = FileOptions::default().compression_method(CompressionMethod::Stored);
            for (name, contents) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(contents.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        temp_file
    }

    /// Minimal xlsx with one worksheet per `<sheetData>` body
    fn xlsx_file(sheets: &[&str]) -> NamedTempFile {
        let mut sheet_entries = String::new();
        let mut relationships = String::new();
        let mut entries = Vec::new();

        for (i, sheet_data) in sheets.iter().enumerate() {
            let n = i + 1;
            sheet_entries.push_str(&format!(
                r#"<sheet name="Sheet{n}" sheetId="{n}" r:id="rId{n}"/>"#
            ));
            relationships.push_str(&format!(
                r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
            ));
            entries.push((
                format!("xl/worksheets/sheet{n}.xml"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_data}</sheetData></worksheet>"#
                ),
            ));
        }

        let workbook = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
        );
        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
        );

        let mut all: Vec<(&str, String)> = vec![
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", rels),
        ];
        all.extend(entries.iter().map(|(name, xml)| (name.as_str(), xml.clone())));
        zip_file(".xlsx", &all)
    }

    fn text_cell(reference: &str, text: &str) -> String {
        format!(r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#)
    }

    fn number_cell(reference: &str, value: &str) -> String {
        format!(r#"<c r="{reference}"><v>{value}</v></c>"#)
    }

    #[test]
    fn test_cell_mapping() {
        assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
        assert_eq!(cell_from_data(&Data::String(String::new())), Cell::Empty);
        assert_eq!(cell_from_data(&Data::String("abc".into())), Cell::Text("abc".into()));
        assert_eq!(cell_from_data(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(cell_from_data(&Data::Float(1.5)), Cell::Number(1.5));
        assert_eq!(cell_from_data(&Data::Bool(false)), Cell::Bool(false));
        assert_eq!(
            cell_from_data(&Data::DateTimeIso("2024-01-02".into())),
            Cell::Text("2024-01-02".into())
        );
        assert_eq!(
            cell_from_data(&Data::Error(CellErrorType::NA)),
            Cell::Text("#N/A".into())
        );
    }

    #[test]
    fn test_corrupt_workbook() {
        let mut temp_file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        temp_file.write_all(b"this is not a zip archive").unwrap();
        temp_file.flush().unwrap();

        let result = read_workbook(temp_file.path());
        assert!(matches!(result, Err(Error::FileFormat { .. })));
    }

    #[test]
    fn test_xlsx_values_and_first_sheet_only() {
        let first = format!(
            r#"<row r="1">{}{}{}</row><row r="2">{}{}<c r="C2" t="b"><v>1</v></c></row>"#,
            text_cell("A1", "name"),
            text_cell("B1", "qty"),
            text_cell("C1", "active"),
            text_cell("A2", "Widget"),
            number_cell("B2", "3"),
        );
        let second = format!(r#"<row r="1">{}</row>"#, text_cell("A1", "other sheet"));
        let file = xlsx_file(&[&first, &second]);

        let dataset = read_workbook(file.path()).unwrap();

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column_count(), 3);
        assert_eq!(
            dataset.rows()[1],
            vec![Cell::Text("Widget".into()), Cell::Number(3.0), Cell::Bool(true)]
        );
    }

    #[test]
    fn test_xlsx_offset_range_keeps_positions() {
        // Data starts at B1: column A and nothing else is blank
        let mut sheet = format!(
            r#"<row r="1">{}{}</row>"#,
            text_cell("B1", "name"),
            text_cell("C1", "id")
        );
        for (i, name) in ["A", "B", "A", "C"].iter().enumerate() {
            let r = i + 2;
            sheet.push_str(&format!(
                r#"<row r="{r}">{}{}</row>"#,
                text_cell(&format!("B{r}"), name),
                number_cell(&format!("C{r}"), &(i + 1).to_string())
            ));
        }
        let file = xlsx_file(&[&sheet]);

        let dataset = read_workbook(file.path()).unwrap();

        assert_eq!(dataset.row_count(), 5);
        assert_eq!(dataset.column_count(), 3);
        assert_eq!(
            dataset.header().unwrap(),
            &vec![Cell::Empty, Cell::Text("name".into()), Cell::Text("id".into())]
        );
        assert_eq!(dataset.rows()[3][1], Cell::Text("A".into()));
        assert_eq!(dataset.rows()[3][2], Cell::Number(3.0));
    }

    #[test]
    fn test_xlsx_leading_blank_row_stays_header() {
        let sheet = format!(
            r#"<row r="2">{}</row><row r="3">{}</row>"#,
            text_cell("A2", "x"),
            text_cell("A3", "y")
        );
        let file = xlsx_file(&[&sheet]);

        let dataset = read_workbook(file.path()).unwrap();

        assert_eq!(dataset.row_count(), 3);
        assert!(dataset.header().unwrap().is_empty());
        assert_eq!(dataset.data_rows()[0], vec![Cell::Text("x".into())]);
    }

    #[test]
    fn test_ods_values() {
        let content = r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2"><office:body><office:spreadsheet><table:table table:name="Sheet1"><table:table-row><table:table-cell office:value-type="string"><text:p>flag</text:p></table:table-cell><table:table-cell office:value-type="string"><text:p>amount</text:p></table:table-cell></table:table-row><table:table-row><table:table-cell office:value-type="boolean" office:boolean-value="true"><text:p>TRUE</text:p></table:table-cell><table:table-cell office:value-type="float" office:value="2.5"><text:p>2.5</text:p></table:table-cell></table:table-row></table:table></office:spreadsheet></office:body></office:document-content>"#;
        let file = zip_file(
            ".ods",
            &[
                ("mimetype", "application/vnd.oasis.opendocument.spreadsheet".to_string()),
                ("content.xml", content.to_string()),
            ],
        );

        let dataset = read_workbook(file.path()).unwrap();

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.rows()[1], vec![Cell::Bool(true), Cell::Number(2.5)]);
    }
}
