//! Result table rendering

use crate::error::{ErrorCode, TripAggError};
use crate::query::{Cell, ResultTable};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Header line, then one comma-separated line per group
    #[default]
    Csv,
    /// Pretty-printed object with `query`, `columns` and `rows`
    Json,
}

/// Write `table` to `writer` in `format`
pub fn write_table<W: Write>(
    mut writer: W,
    table: &ResultTable,
    format: OutputFormat,
) -> Result<(), TripAggError> {
    match format {
        OutputFormat::Csv => write_csv(writer, table),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, table).map_err(|e| {
                TripAggError::output(
                    ErrorCode::OUTPUT_SERIALIZE_FAILED,
                    "failed to serialize result table",
                    e,
                )
            })?;
            writeln!(writer).map_err(write_failed)
        }
    }
}

fn write_csv<W: Write>(writer: W, table: &ResultTable) -> Result<(), TripAggError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&table.columns).map_err(write_failed)?;
    for row in &table.rows {
        csv.write_record(row.cells.iter().map(Cell::render))
            .map_err(write_failed)?;
    }
    csv.flush().map_err(write_failed)
}

fn write_failed(e: impl std::error::Error + Send + Sync + 'static) -> TripAggError {
    TripAggError::output(ErrorCode::OUTPUT_WRITE_FAILED, "failed to write result table", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{GroupKey, ResultRow};

    fn payment_table() -> ResultTable {
        ResultTable {
            query: "payment".to_string(),
            columns: vec![
                "payment_type".to_string(),
                "num_trips".to_string(),
                "avg_fare".to_string(),
            ],
            rows: vec![
                ResultRow {
                    key: GroupKey::Int(1),
                    cells: vec![
                        Cell::Key(GroupKey::Int(1)),
                        Cell::Count(1),
                        Cell::Decimal {
                            value: 10.0,
                            precision: 2,
                        },
                    ],
                },
                ResultRow {
                    key: GroupKey::Int(2),
                    cells: vec![
                        Cell::Key(GroupKey::Int(2)),
                        Cell::Count(3),
                        Cell::Decimal {
                            value: 20.126,
                            precision: 2,
                        },
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_csv_output() {
        let mut out = Vec::new();
        write_table(&mut out, &payment_table(), OutputFormat::Csv).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "payment_type,num_trips,avg_fare\n1,1,10.00\n2,3,20.13\n"
        );
    }

    #[test]
    fn test_json_output() {
        let mut out = Vec::new();
        write_table(&mut out, &payment_table(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["query"], "payment");
        assert_eq!(value["rows"][1]["num_trips"], 3);
        assert_eq!(value["rows"][0]["payment_type"], 1);
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let mut table = payment_table();
        table.rows.clear();
        let mut out = Vec::new();
        write_table(&mut out, &table, OutputFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "payment_type,num_trips,avg_fare\n");
    }
}
