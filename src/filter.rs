// 🔍 Filters - Immutable criteria applied before aggregation
// The presentation side owns the criteria; the core never mutates them

use crate::aggregate::Aggregate;
use crate::normalize::CostRecord;
use crate::risk::RiskTier;
use serde::{Deserialize, Serialize};

// ============================================================================
// FILTER CRITERIA
// ============================================================================

/// One user interaction's worth of filter state.
///
/// Empty collections mean "no constraint on that dimension". Dimensions
/// compose by conjunction. `busca_os` is not a dataset filter: it narrows the
/// OS *selection list* offered to the user (see [`search_os_options`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub status: Vec<RiskTier>,

    #[serde(default)]
    pub os: Vec<String>,

    #[serde(default)]
    pub familias: Vec<String>,

    #[serde(default)]
    pub busca_os: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
            && self.os.is_empty()
            && self.familias.is_empty()
            && self.busca_os.trim().is_empty()
    }
}

// ============================================================================
// ROW-LEVEL FILTERING
// ============================================================================

/// Keep the records matching the OS and família selections.
///
/// Runs before aggregation, never after: aggregates are always computed from
/// the filtered subset. The status dimension does not apply here - tiers are
/// a property of aggregates, so that filter runs post-aggregation.
pub fn apply_filters(records: &[CostRecord], criteria: &FilterCriteria) -> Vec<CostRecord> {
    records
        .iter()
        .filter(|record| {
            (criteria.os.is_empty() || criteria.os.iter().any(|os| *os == record.os))
                && (criteria.familias.is_empty()
                    || criteria.familias.iter().any(|f| *f == record.familia))
        })
        .cloned()
        .collect()
}

/// Keep the aggregates whose tier is in the selected set.
pub fn filter_by_status(aggregates: Vec<Aggregate>, status: &[RiskTier]) -> Vec<Aggregate> {
    if status.is_empty() {
        return aggregates;
    }

    aggregates
        .into_iter()
        .filter(|aggregate| status.contains(&aggregate.risco))
        .collect()
}

// ============================================================================
// OS SEARCH
// ============================================================================

/// Distinct sorted OS list, narrowed by a case-insensitive substring search.
///
/// Narrows the options the user can pick from; it does not filter the
/// dataset itself.
pub fn search_os_options(records: &[CostRecord], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();

    let mut options: Vec<String> = records
        .iter()
        .map(|record| record.os.clone())
        .filter(|os| needle.is_empty() || os.to_lowercase().contains(&needle))
        .collect();

    options.sort();
    options.dedup();
    options
}

/// Distinct sorted família list (no search box on this dimension).
pub fn familia_options(records: &[CostRecord]) -> Vec<String> {
    let mut options: Vec<String> = records.iter().map(|r| r.familia.clone()).collect();
    options.sort();
    options.dedup();
    options
}

// ============================================================================
// TESTS
// ============================================================================
