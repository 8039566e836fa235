// 🧹 Row Normalizer - Raw grid rows → canonical cost records
// Five fixed columns below the header; messy cells absorbed, never fatal

use crate::grid::Grid;
use crate::header::is_header_marker;
use serde::{Deserialize, Serialize};

// ============================================================================
// COST RECORD
// ============================================================================

/// One normalized cost-tracking row.
///
/// Invariants: `os` and `familia` are non-empty trimmed strings; the money
/// fields are finite (unparsable cells coerce to 0, never NaN downstream).
/// Serde renames match the spreadsheet's column names so the detail export
/// round-trips with the same header line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    #[serde(rename = "OS")]
    pub os: String,

    #[serde(rename = "FAMILIA")]
    pub familia: String,

    #[serde(rename = "PREVISTO")]
    pub previsto: f64,

    #[serde(rename = "REALIZADO")]
    pub realizado: f64,

    #[serde(rename = "SALDO")]
    pub saldo: f64,
}

// ============================================================================
// NORMALIZER
// ============================================================================

/// Column positions below the header, in fixed order.
const COL_OS: usize = 0;
const COL_FAMILIA: usize = 1;
const COL_PREVISTO: usize = 2;
const COL_REALIZADO: usize = 3;
const COL_SALDO: usize = 4;

/// Normalize every row strictly below the header row.
///
/// - rows with an empty OS cell are dropped;
/// - rows whose OS cell is itself a header marker are dropped (multi-sheet
///   exports repeat the header mid-data);
/// - PREVISTO/REALIZADO/SALDO coerce to numbers, 0 on parse failure
///   (stray text in money columns is a data-quality fact, not an error);
/// - OS and FAMILIA are trimmed.
///
/// Source order is preserved. Zero surviving rows is a valid result: the
/// dashboard renders an empty state, it does not crash.
pub fn normalize_rows(grid: &Grid, header_row: usize) -> Vec<CostRecord> {
    let mut records = Vec::new();

    for row in grid.iter().skip(header_row + 1) {
        let os_cell = match row.get(COL_OS) {
            Some(cell) if !cell.is_empty() => cell,
            _ => continue,
        };

        let os = os_cell.as_text();
        if is_header_marker(&os) {
            continue;
        }

        let numeric = |col: usize| -> f64 {
            row.get(col).and_then(|c| c.to_number()).unwrap_or(0.0)
        };

        records.push(CostRecord {
            os,
            familia: row
                .get(COL_FAMILIA)
                .map(|c| c.as_text())
                .unwrap_or_default(),
            previsto: numeric(COL_PREVISTO),
            realizado: numeric(COL_REALIZADO),
            saldo: numeric(COL_SALDO),
        });
    }

    records
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;

    fn row(os: &str, familia: &str, previsto: &str, realizado: &str, saldo: &str) -> Vec<CellValue> {
        [os, familia, previsto, realizado, saldo]
            .iter()
            .map(|c| {
                if c.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(c.to_string())
                }
            })
            .collect()
    }

    fn header() -> Vec<CellValue> {
        row("OS", "FAMILIA", "PREVISTO", "REALIZADO", "SALDO")
    }

    #[test]
    fn test_basic_normalization() {
        let grid = vec![
            header(),
            row(" 100 ", " ACO ", "1000", "500", "500"),
            row("200", "TINTA", "250.5", "100", "150.5"),
        ];

        let records = normalize_rows(&grid, 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].os, "100");
        assert_eq!(records[0].familia, "ACO");
        assert_eq!(records[0].previsto, 1000.0);
        assert_eq!(records[1].saldo, 150.5);
    }

    #[test]
    fn test_rows_above_header_are_ignored() {
        let grid = vec![
            row("999", "NAO DEVE APARECER", "1", "1", "0"),
            header(),
            row("100", "ACO", "1000", "500", "500"),
        ];

        let records = normalize_rows(&grid, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].os, "100");
    }

    #[test]
    fn test_empty_os_rows_dropped() {
        let grid = vec![
            header(),
            row("", "ACO", "1000", "500", "500"),
            row("100", "TINTA", "250", "100", "150"),
        ];

        let records = normalize_rows(&grid, 0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].familia, "TINTA");
    }

    #[test]
    fn test_embedded_duplicate_header_dropped() {
        let grid = vec![
            header(),
            row("100", "ACO", "1000", "500", "500"),
            row("O.S.", "FAMILIA", "PREVISTO", "REALIZADO", "SALDO"),
            row("200", "TINTA", "250", "100", "150"),
        ];

        let records = normalize_rows(&grid, 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].os, "100");
        assert_eq!(records[1].os, "200");
    }

    #[test]
    fn test_unparsable_numeric_cells_become_zero() {
        let grid = vec![
            header(),
            row("100", "ACO", "n/d", "", "texto solto"),
        ];

        let records = normalize_rows(&grid, 0);
        assert_eq!(records[0].previsto, 0.0);
        assert_eq!(records[0].realizado, 0.0);
        assert_eq!(records[0].saldo, 0.0);
    }

    #[test]
    fn test_short_rows_tolerated() {
        let grid = vec![header(), vec![CellValue::Text("100".to_string())]];

        let records = normalize_rows(&grid, 0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].familia, "");
        assert_eq!(records[0].previsto, 0.0);
    }

    #[test]
    fn test_numeric_os_cell_kept_as_text() {
        let grid = vec![
            header(),
            vec![
                CellValue::Number(3185.0),
                CellValue::Text("ACO".to_string()),
                CellValue::Number(1000.0),
                CellValue::Number(500.0),
                CellValue::Number(500.0),
            ],
        ];

        let records = normalize_rows(&grid, 0);
        assert_eq!(records[0].os, "3185");
        assert_eq!(records[0].previsto, 1000.0);
    }

    #[test]
    fn test_zero_surviving_rows_is_valid() {
        let grid = vec![header()];
        assert!(normalize_rows(&grid, 0).is_empty());
    }

    #[test]
    fn test_source_order_preserved() {
        let grid = vec![
            header(),
            row("300", "A", "1", "0", "1"),
            row("100", "B", "1", "0", "1"),
            row("200", "C", "1", "0", "1"),
        ];

        let os: Vec<String> = normalize_rows(&grid, 0).into_iter().map(|r| r.os).collect();
        assert_eq!(os, vec!["300", "100", "200"]);
    }
}
