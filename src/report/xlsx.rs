//! Excel spreadsheet writer for the findings report.
//!
//! Renders the flattened report with a fixed header row and vertically
//! merged table/column cells for columns that carry multiple findings.

use super::{flatten, FlatReport, ReportDetail, REPORT_HEADERS};
use crate::error::{Result, ScanError};
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Writes the consolidated findings report to an .xlsx file.
///
/// The file is written once, at the end of a run; an existing file at
/// `path` is overwritten.
pub fn write_report(details: &[ReportDetail], path: &Path) -> Result<()> {
    let flat = flatten(details);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    let merge_format = Format::new().set_align(FormatAlign::VerticalCenter);

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(to_report_error)?;
    }

    // Rows covered by a merge span get their table/column cells written by
    // merge_range below, not here; writing them twice is an overlap error.
    let merged_rows = merged_row_set(&flat);

    for (index, row) in flat.rows.iter().enumerate() {
        let sheet_row = (index + 1) as u32;

        if !merged_rows.contains(&index) {
            worksheet
                .write_string(sheet_row, 0, row.table_name.as_str())
                .map_err(to_report_error)?;
            worksheet
                .write_string(sheet_row, 1, row.column_name.as_str())
                .map_err(to_report_error)?;
        }

        worksheet
            .write_number(sheet_row, 2, row.values_scanned as f64)
            .map_err(to_report_error)?;
        worksheet
            .write_number(sheet_row, 3, row.identified_count as f64)
            .map_err(to_report_error)?;
        worksheet
            .write_number(sheet_row, 4, row.identified_percentage)
            .map_err(to_report_error)?;
        worksheet
            .write_string(sheet_row, 5, row.pi_type.as_str())
            .map_err(to_report_error)?;
    }

    for span in &flat.merges {
        let first = (span.first_row + 1) as u32;
        let last = (span.last_row + 1) as u32;
        let row = &flat.rows[span.first_row];

        worksheet
            .merge_range(first, 0, last, 0, &row.table_name, &merge_format)
            .map_err(to_report_error)?;
        worksheet
            .merge_range(first, 1, last, 1, &row.column_name, &merge_format)
            .map_err(to_report_error)?;
    }

    workbook.save(path).map_err(to_report_error)?;

    info!(
        "Report written to {} ({} data row(s))",
        path.display(),
        flat.rows.len()
    );
    Ok(())
}

/// Indices of data rows whose table/column cells belong to a merge span.
fn merged_row_set(flat: &FlatReport) -> HashSet<usize> {
    flat.merges
        .iter()
        .flat_map(|span| span.first_row..=span.last_row)
        .collect()
}

fn to_report_error(error: rust_xlsxwriter::XlsxError) -> ScanError {
    ScanError::report(format!("Failed to write spreadsheet: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ColumnFindings, PiFinding};

    fn sample_details() -> Vec<ReportDetail> {
        vec![ReportDetail {
            object_name: vec!["public".into(), "users".into()],
            columns: vec![
                ColumnFindings {
                    column_name: "id".into(),
                    values_scanned: 50,
                    ml_identified_pi_details: vec![],
                },
                ColumnFindings {
                    column_name: "email".into(),
                    values_scanned: 50,
                    ml_identified_pi_details: vec![
                        PiFinding {
                            identified_count: 48,
                            identified_percentage: 96.0,
                            pi_type: "EMAIL".into(),
                        },
                        PiFinding {
                            identified_count: 2,
                            identified_percentage: 4.0,
                            pi_type: "NAME".into(),
                        },
                    ],
                },
            ],
        }]
    }

    #[test]
    fn test_write_report_produces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        write_report(&sample_details(), &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_write_report_empty_details() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        // Header-only report is still a valid workbook.
        write_report(&[], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_report_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        std::fs::write(&path, b"stale").unwrap();

        write_report(&sample_details(), &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert_ne!(metadata.len(), 5);
    }

    #[test]
    fn test_merged_row_set_covers_spans() {
        let flat = flatten(&sample_details());
        let merged = merged_row_set(&flat);

        // Row 0 (id) stands alone; rows 1-2 (email findings) are merged.
        assert!(!merged.contains(&0));
        assert!(merged.contains(&1));
        assert!(merged.contains(&2));
    }
}
