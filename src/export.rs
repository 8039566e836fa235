// 📥 CSV Exports - Detail and per-OS summary downloads
// UTF-8 with BOM so desktop spreadsheet apps pick the right encoding

use crate::aggregate::Aggregate;
use crate::normalize::CostRecord;
use anyhow::{anyhow, Context, Result};

/// Byte-order marker expected by common spreadsheet consumers.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Full filtered detail dataset: OS, FAMILIA, PREVISTO, REALIZADO, SALDO.
/// The header line is present even when zero rows survive the filters.
pub fn export_detalhado(records: &[CostRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::from(UTF8_BOM));

    writer
        .write_record(["OS", "FAMILIA", "PREVISTO", "REALIZADO", "SALDO"])
        .context("Failed to write detail header")?;

    for record in records {
        writer
            .serialize(record)
            .context("Failed to serialize cost record")?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finish detail export: {}", e))
}

/// Per-OS summary: OS, PREVISTO, REALIZADO, SALDO, EXECUCAO_%, RISCO.
pub fn export_resumo_os(aggregates: &[Aggregate]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::from(UTF8_BOM));

    writer
        .write_record(["OS", "PREVISTO", "REALIZADO", "SALDO", "EXECUCAO_%", "RISCO"])
        .context("Failed to write summary header")?;

    for aggregate in aggregates {
        writer
            .write_record(&[
                aggregate.key.clone(),
                aggregate.previsto.to_string(),
                aggregate.realizado.to_string(),
                aggregate.saldo.to_string(),
                aggregate.execution_pct.to_string(),
                aggregate.risco.label().to_string(),
            ])
            .context("Failed to write summary record")?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finish summary export: {}", e))
}

// ============================================================================
// TESTS
// ============================================================================
