// 🧱 Cell Model - Tagged cell values at the ingestion boundary
// Replaces duck-typed spreadsheet cells with explicit coercion rules

use serde::{Deserialize, Serialize};

// ============================================================================
// CELL VALUE
// ============================================================================

/// A single spreadsheet cell after ingestion.
///
/// Everything the loaders produce is one of these three shapes; all
/// downstream coercion (text for OS/FAMILIA, numeric for the money columns)
/// goes through the methods below so the rules live in exactly one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Trimmed textual view of the cell.
    ///
    /// Numbers render integer-style when fractionless so an OS identifier
    /// stored as `3185.0` comes back as `"3185"`, the way the spreadsheet
    /// displays it.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }

    /// Numeric view of the cell, if it has one.
    ///
    /// Text parses leniently: trimmed, and the Brazilian `1.234,56` shape is
    /// accepted alongside plain `1234.56`. Anything else is `None` - the
    /// normalizer decides what the fallback is.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
        }
    }

    /// True for `Empty` and for whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

/// Raw 2-D grid of cells, exactly as read from the first sheet.
pub type Grid = Vec<Vec<CellValue>>;

/// Lenient numeric parse for text cells.
fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(n) = trimmed.parse::<f64>() {
        return n.is_finite().then_some(n);
    }

    // Brazilian format: "1.234,56" (thousands '.', decimal ',')
    if trimmed.contains(',') {
        let normalized = trimmed.replace('.', "").replace(',', ".");
        if let Ok(n) = normalized.parse::<f64>() {
            return n.is_finite().then_some(n);
        }
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================
