// 📂 Workbook Loader - Spreadsheet/CSV → raw cell grid
// First sheet only; the pipeline sees one Grid regardless of file format

use crate::grid::{CellValue, Grid};
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Load a file into a raw cell grid, dispatching on extension.
///
/// `.csv` goes through the csv crate; everything else (xlsx, xls, xlsb, ods)
/// goes through calamine. Only the first sheet of a workbook is read.
pub fn load_grid(path: &Path) -> Result<Grid> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if extension == "csv" {
        load_csv_grid(path)
    } else {
        load_workbook_grid(path)
    }
}

/// Read a CSV file into a grid.
///
/// No header inference and flexible record lengths: header detection is the
/// pipeline's job, and exported spreadsheets routinely have ragged rows.
/// Cells stay textual; numeric coercion happens per-column downstream.
pub fn load_csv_grid(path: &Path) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;

    let mut grid = Grid::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read CSV record in {:?}", path))?;
        let row: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        grid.push(row);
    }

    Ok(grid)
}

/// Read the first sheet of a workbook (xlsx, xls, xlsb, ods) into a grid.
pub fn load_workbook_grid(path: &Path) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet: {:?}", path))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first_sheet = sheet_names
        .first()
        .ok_or_else(|| anyhow!("Spreadsheet contains no sheets: {:?}", path))?;

    let range = workbook
        .worksheet_range(first_sheet)
        .with_context(|| format!("Failed to read sheet '{}' in {:?}", first_sheet, path))?;

    // Range may not begin at A1; pad so grid indices match sheet rows/cols.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Grid = vec![Vec::new(); start_row as usize];

    for row in range.rows() {
        let mut cells: Vec<CellValue> = vec![CellValue::Empty; start_col as usize];
        for cell in row {
            cells.push(convert_cell(cell));
        }
        grid.push(cells);
    }

    Ok(grid)
}

/// Map a calamine cell onto our tagged cell model.
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        // Date serials and ISO strings land in text columns if they appear at
        // all; the cost sheet has no date columns.
        Data::DateTime(dt) => CellValue::Text(format!("{}", dt.as_f64())),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_grid() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Relatório CMV,,,,").unwrap();
        writeln!(file, "OS,FAMILIA,PREVISTO,REALIZADO,SALDO").unwrap();
        writeln!(file, "100,ACO,1000,500,500").unwrap();
        file.flush().unwrap();

        let grid = load_csv_grid(file.path()).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1][0], CellValue::Text("OS".to_string()));
        assert_eq!(grid[0][1], CellValue::Empty);
        assert_eq!(grid[2][2].to_number(), Some(1000.0));
    }

    #[test]
    fn test_load_grid_dispatches_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "OS,FAMILIA,PREVISTO,REALIZADO,SALDO").unwrap();
        file.flush().unwrap();

        let grid = load_grid(file.path()).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].len(), 5);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_grid(Path::new("/nonexistent/planilha.xlsx"));
        assert!(result.is_err());
    }

    #[test]
    fn test_convert_cell_variants() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(convert_cell(&Data::Float(3185.0)), CellValue::Number(3185.0));
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            convert_cell(&Data::String("  ".to_string())),
            CellValue::Empty
        );
        assert_eq!(
            convert_cell(&Data::Bool(true)),
            CellValue::Text("TRUE".to_string())
        );
    }
}
