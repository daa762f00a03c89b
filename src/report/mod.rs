//! Findings report model for warescan.
//!
//! `ReportDetail` mirrors the scanning service's report records; `flatten`
//! turns the accumulated details into spreadsheet rows plus the merge spans
//! the writer applies to repeated table/column cells.

mod xlsx;

pub use xlsx::write_report;

use serde::{Deserialize, Deserializer, Serialize};

/// Findings for one scanned table, as returned by the report endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDetail {
    /// Qualified table name parts.
    pub object_name: Vec<String>,

    /// Per-column findings.
    pub columns: Vec<ColumnFindings>,
}

/// Findings for one column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnFindings {
    pub column_name: String,

    /// Number of values the service inspected for this column.
    pub values_scanned: u64,

    /// PI classifications; the wire sends null when nothing was identified.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub ml_identified_pi_details: Vec<PiFinding>,
}

/// A single PI classification for a column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PiFinding {
    pub identified_count: u64,
    pub identified_percentage: f64,
    pub pi_type: String,
}

fn nullable_vec<'de, D>(deserializer: D) -> Result<Vec<PiFinding>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Vec<PiFinding>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// One spreadsheet line of the final report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub table_name: String,
    pub column_name: String,
    pub values_scanned: u64,
    pub identified_count: u64,
    pub identified_percentage: f64,

    /// Empty when the column had no PI findings.
    pub pi_type: String,
}

/// A vertical run of data rows whose table/column cells are merged.
///
/// Indices are 0-based positions into `FlatReport::rows` (the header row is
/// not counted); `last_row` is always greater than `first_row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSpan {
    pub first_row: usize,
    pub last_row: usize,
}

/// The flattened report: data rows plus the merge spans to apply.
#[derive(Debug, Clone, Default)]
pub struct FlatReport {
    pub rows: Vec<ReportRow>,
    pub merges: Vec<MergeSpan>,
}

/// Column headers of the report spreadsheet, in output order.
pub const REPORT_HEADERS: [&str; 6] = [
    "table_name",
    "column_name",
    "values_scanned",
    "identified_count",
    "identified_percentage",
    "pi_type",
];

/// Flattens report details into spreadsheet rows.
///
/// A column with one or more findings yields one row per finding; when there
/// is more than one, a merge span covers those rows so the table and column
/// cells read as a single grouping. A column with no findings yields a single
/// row with zero counts and an empty PI type.
pub fn flatten(details: &[ReportDetail]) -> FlatReport {
    let mut rows = Vec::new();
    let mut merges = Vec::new();

    for detail in details {
        let table_name = detail.object_name.join(".");

        for column in &detail.columns {
            if column.ml_identified_pi_details.is_empty() {
                rows.push(ReportRow {
                    table_name: table_name.clone(),
                    column_name: column.column_name.clone(),
                    values_scanned: column.values_scanned,
                    identified_count: 0,
                    identified_percentage: 0.0,
                    pi_type: String::new(),
                });
                continue;
            }

            let first_row = rows.len();
            for finding in &column.ml_identified_pi_details {
                rows.push(ReportRow {
                    table_name: table_name.clone(),
                    column_name: column.column_name.clone(),
                    values_scanned: column.values_scanned,
                    identified_count: finding.identified_count,
                    identified_percentage: finding.identified_percentage,
                    pi_type: finding.pi_type.clone(),
                });
            }
            let last_row = rows.len() - 1;

            if last_row > first_row {
                merges.push(MergeSpan {
                    first_row,
                    last_row,
                });
            }
        }
    }

    FlatReport { rows, merges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detail_with_findings(findings: Vec<PiFinding>) -> ReportDetail {
        ReportDetail {
            object_name: vec!["public".into(), "users".into()],
            columns: vec![ColumnFindings {
                column_name: "email".into(),
                values_scanned: 50,
                ml_identified_pi_details: findings,
            }],
        }
    }

    #[test]
    fn test_deserialize_null_pi_details() {
        let json = r#"{
            "object_name": ["public", "users"],
            "columns": [
                {"column_name": "id", "values_scanned": 50, "ml_identified_pi_details": null}
            ]
        }"#;

        let detail: ReportDetail = serde_json::from_str(json).unwrap();
        assert!(detail.columns[0].ml_identified_pi_details.is_empty());
    }

    #[test]
    fn test_deserialize_missing_pi_details() {
        let json = r#"{
            "object_name": ["public", "users"],
            "columns": [{"column_name": "id", "values_scanned": 50}]
        }"#;

        let detail: ReportDetail = serde_json::from_str(json).unwrap();
        assert!(detail.columns[0].ml_identified_pi_details.is_empty());
    }

    #[test]
    fn test_flatten_no_findings_yields_zero_row() {
        let flat = flatten(&[detail_with_findings(vec![])]);

        assert_eq!(flat.rows.len(), 1);
        assert!(flat.merges.is_empty());

        let row = &flat.rows[0];
        assert_eq!(row.table_name, "public.users");
        assert_eq!(row.column_name, "email");
        assert_eq!(row.values_scanned, 50);
        assert_eq!(row.identified_count, 0);
        assert_eq!(row.identified_percentage, 0.0);
        assert_eq!(row.pi_type, "");
    }

    #[test]
    fn test_flatten_two_findings_merges_rows() {
        let flat = flatten(&[detail_with_findings(vec![
            PiFinding {
                identified_count: 48,
                identified_percentage: 96.0,
                pi_type: "EMAIL".into(),
            },
            PiFinding {
                identified_count: 3,
                identified_percentage: 6.0,
                pi_type: "NAME".into(),
            },
        ])]);

        assert_eq!(flat.rows.len(), 2);
        assert_eq!(flat.rows[0].pi_type, "EMAIL");
        assert_eq!(flat.rows[1].pi_type, "NAME");
        assert_eq!(
            flat.merges,
            vec![MergeSpan {
                first_row: 0,
                last_row: 1
            }]
        );
    }

    #[test]
    fn test_flatten_single_finding_no_merge() {
        let flat = flatten(&[detail_with_findings(vec![PiFinding {
            identified_count: 10,
            identified_percentage: 20.0,
            pi_type: "PHONE".into(),
        }])]);

        assert_eq!(flat.rows.len(), 1);
        assert!(flat.merges.is_empty());
    }

    #[test]
    fn test_flatten_mixed_columns_spans_are_positioned() {
        let detail = ReportDetail {
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
        };

        let flat = flatten(&[detail]);

        // One zero row for id, then two finding rows for email.
        assert_eq!(flat.rows.len(), 3);
        assert_eq!(
            flat.merges,
            vec![MergeSpan {
                first_row: 1,
                last_row: 2
            }]
        );
    }

    #[test]
    fn test_flatten_accumulates_across_tables() {
        let users = detail_with_findings(vec![PiFinding {
            identified_count: 1,
            identified_percentage: 2.0,
            pi_type: "EMAIL".into(),
        }]);
        let mut orders = detail_with_findings(vec![]);
        orders.object_name = vec!["public".into(), "orders".into()];

        let flat = flatten(&[users, orders]);

        assert_eq!(flat.rows.len(), 2);
        assert_eq!(flat.rows[0].table_name, "public.users");
        assert_eq!(flat.rows[1].table_name, "public.orders");
    }
}
