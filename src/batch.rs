//! Column batching and scan payload construction.
//!
//! The scanning service caps payload size, so a table's columns are split
//! into fixed-size groups and each group is submitted as its own scan.

use crate::scan::{DataSample, ScanPayload};
use crate::warehouse::Row;

/// A bounded subset of a table's columns plus the row values for just those
/// columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGroup {
    /// Column names, preserving table order.
    pub columns: Vec<String>,

    /// Row values projected onto `columns`, preserving row order.
    pub rows: Vec<Row>,
}

/// Splits columns (and the matching row values) into groups of at most
/// `chunk_size`, left to right. The last group may be smaller; an empty
/// column set yields no groups.
///
/// # Panics
///
/// Panics when `chunk_size` is zero. Callers reach this through a validated
/// [`RunConfig`](crate::config::RunConfig), which rejects a zero chunk size.
pub fn split_columns(columns: &[String], rows: &[Row], chunk_size: usize) -> Vec<ColumnGroup> {
    assert!(chunk_size > 0, "chunk_size must be at least 1");

    columns
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, chunk)| {
            let start = index * chunk_size;
            let end = start + chunk.len();
            ColumnGroup {
                columns: chunk.to_vec(),
                rows: rows.iter().map(|row| row[start..end].to_vec()).collect(),
            }
        })
        .collect()
}

/// Builds the scan payload for one column group.
///
/// The table name is split on `.` into its qualifier parts; each column gets
/// one sample per row, formatted as `"<column>: <value>"`, in row order.
pub fn build_payload(data_source_name: &str, table: &str, group: &ColumnGroup) -> ScanPayload {
    let mut data_samples: Vec<DataSample> = group
        .columns
        .iter()
        .map(|column| DataSample {
            column_name: column.clone(),
            samples: Vec::with_capacity(group.rows.len()),
        })
        .collect();

    for row in &group.rows {
        for (sample, value) in data_samples.iter_mut().zip(row) {
            sample
                .samples
                .push(format!("{}: {}", sample.column_name, value));
        }
    }

    ScanPayload {
        data_source_name: data_source_name.to_string(),
        object_name: table.split('.').map(String::from).collect(),
        data_samples,
    }
}
