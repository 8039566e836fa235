// CMV Dashboard - Core Library
// Spreadsheet ingestion, risk classification, and aggregation for
// budget-execution analysis; exposed to the CLI, API server, and tests

pub mod grid;
pub mod loader;
pub mod header;
pub mod normalize;
pub mod risk;
pub mod aggregate;
pub mod filter;
pub mod format;
pub mod export;
pub mod pipeline;

// Re-export commonly used types
pub use grid::{CellValue, Grid};
pub use loader::load_grid;
pub use header::{locate_header, HeaderNotFound, HEADER_VARIANTS};
pub use normalize::{normalize_rows, CostRecord};
pub use risk::{classify, execution_pct, RiskTier};
pub use aggregate::{
    aggregate_by, count_tiers, totals, totals_from_aggregates, Aggregate, GroupBy, TierCounts,
    Totals,
};
pub use filter::{
    apply_filters, familia_options, filter_by_status, search_os_options, FilterCriteria,
};
pub use format::{formatar_moeda, formatar_moeda_compacto};
pub use export::{export_detalhado, export_resumo_os};
pub use pipeline::{processar_planilha, Dashboard};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
