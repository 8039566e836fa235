// 🚦 Risk Classifier - Budget-execution tiers
// Pure function of (previsto, realizado); thresholds are contractual

use serde::{Deserialize, Serialize};

// ============================================================================
// RISK TIER
// ============================================================================

/// Closed set of budget-execution tiers.
///
/// Serde carries the display labels so JSON responses and CSV exports show
/// the same text the dashboard does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "ESTOURADO")]
    OverBudget,
    #[serde(rename = "CRÍTICO")]
    Critical,
    #[serde(rename = "ATENÇÃO")]
    Warning,
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "SEM ORÇAMENTO")]
    NoBudget,
}

impl RiskTier {
    /// All tiers, severity order first.
    pub const ALL: [RiskTier; 5] = [
        RiskTier::OverBudget,
        RiskTier::Critical,
        RiskTier::Warning,
        RiskTier::Ok,
        RiskTier::NoBudget,
    ];

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            RiskTier::OverBudget => "ESTOURADO",
            RiskTier::Critical => "CRÍTICO",
            RiskTier::Warning => "ATENÇÃO",
            RiskTier::Ok => "OK",
            RiskTier::NoBudget => "SEM ORÇAMENTO",
        }
    }

    /// Display color (hex).
    pub fn color(&self) -> &str {
        match self {
            RiskTier::OverBudget => "#e74c3c",
            RiskTier::Critical => "#e67e22",
            RiskTier::Warning => "#f1c40f",
            RiskTier::Ok => "#27ae60",
            RiskTier::NoBudget => "#95a5a6",
        }
    }

    /// Status emoji for terminal/report output.
    pub fn emoji(&self) -> &str {
        match self {
            RiskTier::OverBudget => "🔴",
            RiskTier::Critical => "🟠",
            RiskTier::Warning => "🟡",
            RiskTier::Ok => "🟢",
            RiskTier::NoBudget => "⚪",
        }
    }

    /// Ordering weight: higher = more severe. NoBudget sits below Ok - it is
    /// an "undefined" tier, ordered only for display purposes.
    pub fn severity(&self) -> u8 {
        match self {
            RiskTier::OverBudget => 4,
            RiskTier::Critical => 3,
            RiskTier::Warning => 2,
            RiskTier::Ok => 1,
            RiskTier::NoBudget => 0,
        }
    }

    /// Parse a display label back into a tier (filter inputs arrive as text).
    pub fn from_label(label: &str) -> Option<RiskTier> {
        let upper = label.trim().to_uppercase();
        RiskTier::ALL
            .iter()
            .copied()
            .find(|tier| tier.label() == upper)
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classify a (previsto, realizado) pair.
///
/// Boundary policy, kept bit-for-bit: >100% is over budget, >=90% critical,
/// >=70% warning. With no budget, any spend at all is critical.
pub fn classify(previsto: f64, realizado: f64) -> RiskTier {
    if previsto == 0.0 {
        if realizado > 0.0 {
            return RiskTier::Critical;
        }
        return RiskTier::NoBudget;
    }

    let exec_pct = (realizado / previsto) * 100.0;

    if exec_pct > 100.0 {
        RiskTier::OverBudget
    } else if exec_pct >= 90.0 {
        RiskTier::Critical
    } else if exec_pct >= 70.0 {
        RiskTier::Warning
    } else {
        RiskTier::Ok
    }
}

/// Execution percentage. Reported as 0 whenever there is no budget, even when
/// realizado is non-zero and the tier is critical: the percentage metric is
/// meaningless without a budget, and the zero is the signal of that.
pub fn execution_pct(previsto: f64, realizado: f64) -> f64 {
    if previsto > 0.0 {
        (realizado / previsto) * 100.0
    } else {
        0.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
