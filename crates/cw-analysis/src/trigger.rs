//! Deterministic wash-requirement check used for the fleet comparison.

use crate::rule::rf_trend_to_critical;
use crate::stats::WindowStats;
use cw_project::UnitConfig;
use cw_results::AugmentedSample;
use serde::{Deserialize, Serialize};

/// Days-to-critical at or below which the trend alone requires a wash.
pub const TREND_TRIGGER_DAYS: f64 = 14.0;
/// Mean criticality at or above which a wash is required.
pub const CRITICALITY_TRIGGER: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WashTrigger {
    pub required: bool,
    /// Fired conditions joined by `" | "`, or a fixed message when none fired.
    pub reason: String,
}

pub fn requires_wash(rows: &[&AugmentedSample], config: &UnitConfig, lookback_days: u32) -> WashTrigger {
    let Some(stats) = WindowStats::compute(rows, config) else {
        return WashTrigger {
            required: false,
            reason: "No data.".to_string(),
        };
    };

    let mut reasons = Vec::new();
    if stats.t_out_p95.is_some_and(|t| t >= config.t_acid_out_limit_c) {
        reasons.push("P95 T exceeds limit");
    }
    if stats.rf_p95.is_some_and(|rf| rf >= config.rf_critical_x1e4()) {
        reasons.push("P95 Rf ≥ critical");
    }
    let trend = rf_trend_to_critical(rows, config, lookback_days);
    if trend.days_to_critical.is_some_and(|d| d <= TREND_TRIGGER_DAYS) {
        reasons.push("Rf trend < 14d");
    }
    if stats.crit_mean.is_some_and(|c| c >= CRITICALITY_TRIGGER) {
        reasons.push("Criticality ≥ 80");
    }

    if reasons.is_empty() {
        WashTrigger {
            required: false,
            reason: "No critical triggers.".to_string(),
        }
    } else {
        WashTrigger {
            required: true,
            reason: reasons.join(" | "),
        }
    }
}
