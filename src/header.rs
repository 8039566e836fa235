// 🔎 Header Locator - Finds the OS header row in a raw grid
// Exported cost sheets bury the header under a variable number of title rows

use crate::grid::Grid;

/// Accepted spellings of the work-order header marker, upper-cased.
pub const HEADER_VARIANTS: [&str; 4] = ["O_S", "OS", "O.S.", "O.S"];

/// Rows inspected before giving up.
pub const HEADER_SCAN_WINDOW: usize = 10;

/// True if the text is one of the header-marker spellings.
pub fn is_header_marker(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    HEADER_VARIANTS.contains(&upper.as_str())
}

// ============================================================================
// HEADER NOT FOUND
// ============================================================================

/// The scanned window contained no header row.
///
/// Fatal for the upload: nothing downstream runs, and there is deliberately
/// no row-0 fallback. The user re-exports a conformant sheet and retries.
#[derive(Debug, Clone)]
pub struct HeaderNotFound {
    pub rows_scanned: usize,
}

impl std::fmt::Display for HeaderNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Não foi possível identificar o cabeçalho: nenhuma das primeiras {} linhas começa com {}",
            self.rows_scanned,
            HEADER_VARIANTS.join("/")
        )
    }
}

impl std::error::Error for HeaderNotFound {}

// ============================================================================
// LOCATOR
// ============================================================================

/// Find the header row: the first row within the scan window whose first
/// cell, upper-cased and trimmed, is a header-marker spelling.
pub fn locate_header(grid: &Grid) -> Result<usize, HeaderNotFound> {
    let window = HEADER_SCAN_WINDOW.min(grid.len());

    for (idx, row) in grid.iter().take(window).enumerate() {
        if let Some(first_cell) = row.first() {
            if is_header_marker(&first_cell.as_text()) {
                return Ok(idx);
            }
        }
    }

    Err(HeaderNotFound {
        rows_scanned: window,
    })
}

// ============================================================================
// TESTS
// ============================================================================
