// 🛠️ Pipeline - Grid → records → dashboard view
// One synchronous pass per upload; one full recompute per filter change

use crate::aggregate::{
    aggregate_by, count_tiers, totals_from_aggregates, Aggregate, GroupBy, TierCounts, Totals,
};
use crate::filter::{
    apply_filters, familia_options, filter_by_status, search_os_options, FilterCriteria,
};
use crate::grid::Grid;
use crate::header::locate_header;
use crate::normalize::{normalize_rows, CostRecord};
use anyhow::Result;

// ============================================================================
// UPLOAD PASS
// ============================================================================

/// Process one uploaded grid into normalized cost records.
///
/// Header location is the only fatal step: a `HeaderNotFound` halts the
/// pipeline and surfaces to the user. Everything after it absorbs bad cells
/// locally, so a sheet with zero usable data rows still succeeds with an
/// empty record set.
pub fn processar_planilha(grid: &Grid) -> Result<Vec<CostRecord>> {
    let header_row = locate_header(grid)?;
    Ok(normalize_rows(grid, header_row))
}

// ============================================================================
// DASHBOARD VIEW
// ============================================================================

/// Everything one render of the dashboard needs, derived from the session's
/// records and one immutable [`FilterCriteria`].
///
/// Rebuilt from scratch on every interaction - derived, never persisted.
/// Note the two granularities: OS/família selections filter rows before
/// aggregation, the status selection filters OS aggregates after. Tier
/// counts are computed over the unfiltered dataset so the summary cards keep
/// showing the whole portfolio.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// Detail rows after OS/família filtering (source order).
    pub registros: Vec<CostRecord>,
    /// Per-OS aggregates after the status filter, execution-descending.
    pub por_os: Vec<Aggregate>,
    /// Per-família aggregates over the filtered rows, execution-descending.
    pub por_familia: Vec<Aggregate>,
    /// Headline metrics, summed over `por_os` (what is displayed is what is
    /// totalled).
    pub totais: Totals,
    /// Tier counts over the *unfiltered* dataset's per-OS aggregates.
    pub contadores: TierCounts,
    /// Distinct OS identifiers, narrowed by the criteria's text search.
    pub os_options: Vec<String>,
    /// Distinct família names over the whole dataset.
    pub familia_options: Vec<String>,
}

impl Dashboard {
    /// Recompute the full derived view for one filter state.
    pub fn build(records: &[CostRecord], criteria: &FilterCriteria) -> Dashboard {
        let registros = apply_filters(records, criteria);

        let por_os = filter_by_status(aggregate_by(&registros, GroupBy::Os), &criteria.status);
        let por_familia = aggregate_by(&registros, GroupBy::Familia);
        let totais = totals_from_aggregates(&por_os);
        let contadores = count_tiers(&aggregate_by(records, GroupBy::Os));

        Dashboard {
            totais,
            contadores,
            os_options: search_os_options(records, &criteria.busca_os),
            familia_options: familia_options(records),
            por_os,
            por_familia,
            registros,
        }
    }

    /// Renderable empty state: the filters matched nothing. Distinct from
    /// the fatal header error - the caller relaxes filters, not the file.
    pub fn is_empty(&self) -> bool {
        self.registros.is_empty()
    }

    /// Família breakdown inside one OS card (filtered rows only).
    pub fn familias_of_os(&self, os: &str) -> Vec<Aggregate> {
        let subset: Vec<CostRecord> = self
            .registros
            .iter()
            .filter(|r| r.os == os)
            .cloned()
            .collect();
        aggregate_by(&subset, GroupBy::Familia)
    }

    /// Which OSs draw from one família (filtered rows only).
    pub fn os_of_familia(&self, familia: &str) -> Vec<Aggregate> {
        let subset: Vec<CostRecord> = self
            .registros
            .iter()
            .filter(|r| r.familia == familia)
            .cloned()
            .collect();
        aggregate_by(&subset, GroupBy::Os)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;
    use crate::header::HeaderNotFound;
    use crate::risk::RiskTier;

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells
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

    /// Header at row 2, three rows for OS "100" with famílias A/B/C.
    fn scenario_grid() -> Grid {
        vec![
            text_row(&["Relatório de CMV", "", "", "", ""]),
            text_row(&["", "", "", "", ""]),
            text_row(&["OS", "FAMILIA", "PREVISTO", "REALIZADO", "SALDO"]),
            text_row(&["100", "A", "1000", "500", "500"]),
            text_row(&["100", "B", "500", "600", "-100"]),
            text_row(&["100", "C", "0", "50", "-50"]),
        ]
    }

    #[test]
    fn test_end_to_end_scenario() {
        let records = processar_planilha(&scenario_grid()).unwrap();
        assert_eq!(records.len(), 3);

        let dashboard = Dashboard::build(&records, &FilterCriteria::default());

        assert_eq!(dashboard.por_os.len(), 1);
        let os = &dashboard.por_os[0];
        assert_eq!(os.key, "100");
        assert_eq!(os.previsto, 1500.0);
        assert_eq!(os.realizado, 1150.0);
        assert!((os.execution_pct - 76.666).abs() < 0.01);
        assert_eq!(os.risco, RiskTier::Warning);

        let familia_c = dashboard
            .por_familia
            .iter()
            .find(|a| a.key == "C")
            .unwrap();
        assert_eq!(familia_c.risco, RiskTier::Critical);
        assert_eq!(familia_c.execution_pct, 0.0);
    }

    #[test]
    fn test_header_not_found_is_fatal_and_distinct() {
        let grid = vec![text_row(&["sem cabeçalho", "", "", "", ""])];
        let err = processar_planilha(&grid).unwrap_err();
        assert!(err.downcast_ref::<HeaderNotFound>().is_some());
    }

    #[test]
    fn test_embedded_header_not_counted_in_aggregates() {
        let mut grid = scenario_grid();
        grid.insert(5, text_row(&["O.S.", "FAMILIA", "PREVISTO", "REALIZADO", "SALDO"]));

        let records = processar_planilha(&grid).unwrap();
        let dashboard = Dashboard::build(&records, &FilterCriteria::default());
        assert_eq!(dashboard.por_os[0].previsto, 1500.0);
        assert_eq!(dashboard.por_os[0].realizado, 1150.0);
    }

    #[test]
    fn test_empty_after_filter_is_renderable() {
        let records = processar_planilha(&scenario_grid()).unwrap();
        let criteria = FilterCriteria {
            os: vec!["999".to_string()],
            ..Default::default()
        };

        let dashboard = Dashboard::build(&records, &criteria);
        assert!(dashboard.is_empty());
        assert!(dashboard.por_os.is_empty());
        assert!(dashboard.por_familia.is_empty());
        assert_eq!(dashboard.totais.previsto, 0.0);
        // Counters still reflect the full dataset
        assert_eq!(dashboard.contadores.atencao, 1);
    }

    #[test]
    fn test_status_filter_narrows_aggregates_and_totals() {
        let grid = vec![
            text_row(&["OS", "FAMILIA", "PREVISTO", "REALIZADO", "SALDO"]),
            text_row(&["100", "A", "1000", "500", "500"]),
            text_row(&["200", "A", "100", "99", "1"]),
        ];
        let records = processar_planilha(&grid).unwrap();

        let criteria = FilterCriteria {
            status: vec![RiskTier::Critical],
            ..Default::default()
        };
        let dashboard = Dashboard::build(&records, &criteria);

        assert_eq!(dashboard.por_os.len(), 1);
        assert_eq!(dashboard.por_os[0].key, "200");
        assert_eq!(dashboard.totais.previsto, 100.0);
        // Detail rows are untouched by the status dimension
        assert_eq!(dashboard.registros.len(), 2);
    }

    #[test]
    fn test_busca_narrows_options_not_dataset() {
        let grid = vec![
            text_row(&["OS", "FAMILIA", "PREVISTO", "REALIZADO", "SALDO"]),
            text_row(&["3185", "A", "10", "1", "9"]),
            text_row(&["4200", "B", "10", "1", "9"]),
        ];
        let records = processar_planilha(&grid).unwrap();

        let criteria = FilterCriteria {
            busca_os: "31".to_string(),
            ..Default::default()
        };
        let dashboard = Dashboard::build(&records, &criteria);

        assert_eq!(dashboard.os_options, vec!["3185"]);
        assert_eq!(dashboard.registros.len(), 2);
        assert_eq!(dashboard.por_os.len(), 2);
    }

    #[test]
    fn test_drill_downs() {
        let records = processar_planilha(&scenario_grid()).unwrap();
        let dashboard = Dashboard::build(&records, &FilterCriteria::default());

        let familias = dashboard.familias_of_os("100");
        assert_eq!(familias.len(), 3);

        let oss = dashboard.os_of_familia("B");
        assert_eq!(oss.len(), 1);
        assert_eq!(oss[0].risco, RiskTier::OverBudget);
    }
}
