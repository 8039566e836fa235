// ∑ Aggregator - Group cost records by OS or família and classify the sums
// Works on any filtered subset; risk is derived from the sums alone

use crate::normalize::CostRecord;
use crate::risk::{classify, execution_pct, RiskTier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// GROUPING
// ============================================================================

/// Which column the aggregation keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Os,
    Familia,
}

impl GroupBy {
    fn key<'a>(&self, record: &'a CostRecord) -> &'a str {
        match self {
            GroupBy::Os => &record.os,
            GroupBy::Familia => &record.familia,
        }
    }
}

// ============================================================================
// AGGREGATE RECORD
// ============================================================================

/// Sums for one distinct key, with derived execution percentage and tier.
/// The key is an OS number or a família name depending on the grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregate {
    pub key: String,
    pub previsto: f64,
    pub realizado: f64,
    pub saldo: f64,
    pub execution_pct: f64,
    pub risco: RiskTier,
}

impl Aggregate {
    fn from_sums(key: String, previsto: f64, realizado: f64, saldo: f64) -> Self {
        Aggregate {
            key,
            previsto,
            realizado,
            saldo,
            execution_pct: execution_pct(previsto, realizado),
            risco: classify(previsto, realizado),
        }
    }
}

/// Aggregate records by the given key, one output per distinct key value.
///
/// Key equality is exact string equality (trimming already happened in the
/// normalizer). Output is sorted by execution percentage descending, key as
/// tie-break - the dashboard's display order, made deterministic.
pub fn aggregate_by(records: &[CostRecord], group: GroupBy) -> Vec<Aggregate> {
    let mut sums: HashMap<&str, (f64, f64, f64)> = HashMap::new();

    for record in records {
        let entry = sums.entry(group.key(record)).or_insert((0.0, 0.0, 0.0));
        entry.0 += record.previsto;
        entry.1 += record.realizado;
        entry.2 += record.saldo;
    }

    let mut aggregates: Vec<Aggregate> = sums
        .into_iter()
        .map(|(key, (previsto, realizado, saldo))| {
            Aggregate::from_sums(key.to_string(), previsto, realizado, saldo)
        })
        .collect();

    aggregates.sort_by(|a, b| {
        b.execution_pct
            .partial_cmp(&a.execution_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });

    aggregates
}

// ============================================================================
// TOTALS & TIER COUNTS
// ============================================================================

/// Grand totals over a set of records (the dashboard's headline metrics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Totals {
    pub previsto: f64,
    pub realizado: f64,
    pub saldo: f64,
    pub execution_pct: f64,
}

pub fn totals(records: &[CostRecord]) -> Totals {
    let previsto: f64 = records.iter().map(|r| r.previsto).sum();
    let realizado: f64 = records.iter().map(|r| r.realizado).sum();
    let saldo: f64 = records.iter().map(|r| r.saldo).sum();

    Totals {
        previsto,
        realizado,
        saldo,
        execution_pct: execution_pct(previsto, realizado),
    }
}

/// Totals over already-aggregated rows. The dashboard sums what it displays,
/// so a status filter narrows the headline metrics too.
pub fn totals_from_aggregates(aggregates: &[Aggregate]) -> Totals {
    let previsto: f64 = aggregates.iter().map(|a| a.previsto).sum();
    let realizado: f64 = aggregates.iter().map(|a| a.realizado).sum();
    let saldo: f64 = aggregates.iter().map(|a| a.saldo).sum();

    Totals {
        previsto,
        realizado,
        saldo,
        execution_pct: execution_pct(previsto, realizado),
    }
}

/// How many aggregates fall in each tier (the summary cards).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierCounts {
    pub estourado: usize,
    pub critico: usize,
    pub atencao: usize,
    pub ok: usize,
    pub sem_orcamento: usize,
}

impl TierCounts {
    pub fn get(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::OverBudget => self.estourado,
            RiskTier::Critical => self.critico,
            RiskTier::Warning => self.atencao,
            RiskTier::Ok => self.ok,
            RiskTier::NoBudget => self.sem_orcamento,
        }
    }
}

pub fn count_tiers(aggregates: &[Aggregate]) -> TierCounts {
    let mut counts = TierCounts::default();

    for aggregate in aggregates {
        match aggregate.risco {
            RiskTier::OverBudget => counts.estourado += 1,
            RiskTier::Critical => counts.critico += 1,
            RiskTier::Warning => counts.atencao += 1,
            RiskTier::Ok => counts.ok += 1,
            RiskTier::NoBudget => counts.sem_orcamento += 1,
        }
    }

    counts
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(os: &str, familia: &str, previsto: f64, realizado: f64, saldo: f64) -> CostRecord {
        CostRecord {
            os: os.to_string(),
            familia: familia.to_string(),
            previsto,
            realizado,
            saldo,
        }
    }

    #[test]
    fn test_aggregate_by_os_sums() {
        let records = vec![
            record("100", "ACO", 1000.0, 500.0, 500.0),
            record("100", "TINTA", 500.0, 600.0, -100.0),
            record("200", "ACO", 300.0, 100.0, 200.0),
        ];

        let aggregates = aggregate_by(&records, GroupBy::Os);
        assert_eq!(aggregates.len(), 2);

        let os100 = aggregates.iter().find(|a| a.key == "100").unwrap();
        assert_eq!(os100.previsto, 1500.0);
        assert_eq!(os100.realizado, 1100.0);
        assert_eq!(os100.saldo, 400.0);
        assert_eq!(os100.risco, RiskTier::Warning);
    }

    #[test]
    fn test_aggregate_by_familia() {
        let records = vec![
            record("100", "ACO", 1000.0, 200.0, 800.0),
            record("200", "ACO", 1000.0, 300.0, 700.0),
            record("200", "TINTA", 100.0, 150.0, -50.0),
        ];

        let aggregates = aggregate_by(&records, GroupBy::Familia);
        assert_eq!(aggregates.len(), 2);

        let aco = aggregates.iter().find(|a| a.key == "ACO").unwrap();
        assert_eq!(aco.previsto, 2000.0);
        assert_eq!(aco.realizado, 500.0);
        assert_eq!(aco.risco, RiskTier::Ok);

        let tinta = aggregates.iter().find(|a| a.key == "TINTA").unwrap();
        assert_eq!(tinta.risco, RiskTier::OverBudget);
    }

    #[test]
    fn test_order_independent_sums() {
        let mut records = vec![
            record("100", "A", 10.0, 1.0, 9.0),
            record("100", "B", 20.0, 2.0, 18.0),
            record("100", "C", 30.0, 3.0, 27.0),
        ];

        let forward = aggregate_by(&records, GroupBy::Os);
        records.reverse();
        let backward = aggregate_by(&records, GroupBy::Os);

        assert_eq!(forward[0].previsto, backward[0].previsto);
        assert_eq!(forward[0].realizado, backward[0].realizado);
        assert_eq!(forward[0].saldo, backward[0].saldo);
    }

    #[test]
    fn test_sorted_by_execution_desc() {
        let records = vec![
            record("baixo", "A", 100.0, 10.0, 90.0),
            record("alto", "A", 100.0, 95.0, 5.0),
            record("medio", "A", 100.0, 50.0, 50.0),
        ];

        let keys: Vec<String> = aggregate_by(&records, GroupBy::Os)
            .into_iter()
            .map(|a| a.key)
            .collect();
        assert_eq!(keys, vec!["alto", "medio", "baixo"]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let aggregates = aggregate_by(&[], GroupBy::Os);
        assert!(aggregates.is_empty());

        let t = totals(&[]);
        assert_eq!(t.previsto, 0.0);
        assert_eq!(t.execution_pct, 0.0);
    }

    #[test]
    fn test_zero_budget_aggregate_reports_zero_pct() {
        let records = vec![record("100", "FRETE", 0.0, 50.0, -50.0)];
        let aggregates = aggregate_by(&records, GroupBy::Os);

        assert_eq!(aggregates[0].risco, RiskTier::Critical);
        assert_eq!(aggregates[0].execution_pct, 0.0);
    }

    #[test]
    fn test_totals() {
        let records = vec![
            record("100", "A", 1000.0, 500.0, 500.0),
            record("200", "B", 500.0, 600.0, -100.0),
        ];

        let t = totals(&records);
        assert_eq!(t.previsto, 1500.0);
        assert_eq!(t.realizado, 1100.0);
        assert_eq!(t.saldo, 400.0);
        assert!((t.execution_pct - 73.333).abs() < 0.01);
    }

    #[test]
    fn test_count_tiers() {
        let records = vec![
            record("1", "A", 100.0, 120.0, -20.0), // estourado
            record("2", "A", 100.0, 95.0, 5.0),    // critico
            record("3", "A", 100.0, 75.0, 25.0),   // atencao
            record("4", "A", 100.0, 10.0, 90.0),   // ok
            record("5", "A", 0.0, 0.0, 0.0),       // sem orçamento
        ];

        let counts = count_tiers(&aggregate_by(&records, GroupBy::Os));
        assert_eq!(counts.estourado, 1);
        assert_eq!(counts.critico, 1);
        assert_eq!(counts.atencao, 1);
        assert_eq!(counts.ok, 1);
        assert_eq!(counts.sem_orcamento, 1);
    }
}
