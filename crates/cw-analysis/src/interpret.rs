//! Operator-facing readings of a window's statistics.

use crate::rule::fmt_opt;
use crate::stats::WindowStats;
use cw_project::UnitConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Normal,
    Attention,
    Warning,
    Critical,
    Unknown,
    Error,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Attention => "attention",
            Status::Warning => "warning",
            Status::Critical => "critical",
            Status::Unknown => "unknown",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub status: Status,
    /// Findings, in display order.
    pub items: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Interpretation {
    fn new(status: Status, items: Vec<String>) -> Self {
        Self {
            status,
            items,
            recommendations: Vec::new(),
        }
    }

    fn no_data() -> Self {
        Self::new(Status::Error, vec!["No operating data.".to_string()])
    }
}

/// Outlet temperature against the alarm limit, plus duty against design.
pub fn thermal(stats: Option<&WindowStats>, config: &UnitConfig) -> Interpretation {
    let Some(s) = stats else {
        return Interpretation::no_data();
    };
    let limit = config.t_acid_out_limit_c;
    let mut status = Status::Normal;
    let mut items = Vec::new();

    if let Some(p95) = s.t_out_p95 {
        if p95 >= limit {
            items.push(format!("ALERT: outlet T P95 = {p95:.1}°C exceeds limit {limit:.0}°C."));
            items.push("Action: prioritise inspection and evaluate cleaning.".to_string());
            status = Status::Critical;
        } else if p95 >= 0.97 * limit {
            items.push(format!("Outlet T P95 = {p95:.1}°C is close to the limit."));
            status = Status::Warning;
        } else {
            items.push(format!(
                "Mean outlet T = {}°C, P95 = {p95:.1}°C (OK).",
                fmt_opt(s.t_out_mean, 1, "N/A")
            ));
        }
    }

    if let (Some(q), Some(pct)) = (s.q_mean_mw, s.q_mean_pct) {
        let what = if pct > 120.0 {
            "High heat load"
        } else if pct < 50.0 {
            "Low heat load"
        } else {
            "Heat load"
        };
        items.push(format!("{what}: {q:.2} MW ({pct:.0}% of design)."));
    }

    Interpretation::new(status, items)
}

/// Fouling against multiples of the design value, plus U against clean U.
pub fn fouling(stats: Option<&WindowStats>, config: &UnitConfig) -> Interpretation {
    let Some(s) = stats else {
        return Interpretation::no_data();
    };
    let design = config.rf_design_x1e4();
    let mut status = Status::Normal;
    let mut items = Vec::new();

    if let Some(p95) = s.rf_p95 {
        if p95 >= 5.0 * design {
            items.push(format!("CRITICAL: Rf P95 = {p95:.2}×10⁻⁴ ≥ 5x design."));
            items.push("Action: priority cleaning.".to_string());
            status = Status::Critical;
        } else if p95 >= 3.0 * design {
            items.push(format!("HIGH: Rf P95 = {p95:.2}×10⁻⁴ ≥ 3x design."));
            items.push("Action: schedule cleaning.".to_string());
            status = Status::Warning;
        } else {
            items.push(format!(
                "Mean Rf = {}×10⁻⁴, P95 = {p95:.2}×10⁻⁴ (OK).",
                fmt_opt(s.rf_mean, 2, "N/A")
            ));
        }
    }

    if let (Some(u), Some(pct)) = (s.u_mean, s.u_mean_pct) {
        let what = if pct < 60.0 {
            "U very low"
        } else if pct < 80.0 {
            "U reduced"
        } else {
            "Mean U"
        };
        items.push(format!("{what}: {u:.0} W/m²K ({pct:.0}% of clean)."));
    }

    Interpretation::new(status, items)
}

/// Mean criticality banded into a status with recommended actions.
pub fn criticality(stats: Option<&WindowStats>) -> Interpretation {
    let Some(s) = stats else {
        return Interpretation::new(Status::Error, vec!["No data.".to_string()]);
    };

    let (status, mut items, recs): (Status, Vec<String>, Vec<&str>) = match s.crit_mean {
        Some(c) if c >= 80.0 => (
            Status::Critical,
            vec![format!("HIGH CRITICALITY: {c:.0}/100.")],
            vec![
                "Chemical cleaning within 48-72h",
                "Check bypass/heat load",
                "Increase water flow",
            ],
        ),
        Some(c) if c >= 60.0 => (
            Status::Warning,
            vec![format!("MEDIUM-HIGH CRITICALITY: {c:.0}/100.")],
            vec!["Plan cleaning (1-2 weeks)", "Monitor daily trend"],
        ),
        Some(c) if c >= 30.0 => (
            Status::Attention,
            vec![format!("MEDIUM CRITICALITY: {c:.0}/100.")],
            vec!["Include in scheduled maintenance"],
        ),
        Some(c) => (
            Status::Normal,
            vec![format!("LOW CRITICALITY: {c:.0}/100.")],
            vec!["Routine monitoring"],
        ),
        None => (Status::Unknown, vec!["Not enough data.".to_string()], Vec::new()),
    };
    items.push(format!(
        "Days since wash: {}",
        fmt_opt(s.days_since_wash_last, 0, "No record")
    ));

    Interpretation {
        status,
        items,
        recommendations: recs.iter().map(|r| r.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::design;

    fn stats() -> WindowStats {
        WindowStats {
            t_out_mean: Some(54.0),
            t_out_p95: Some(56.0),
            u_mean: Some(1500.0),
            u_mean_pct: Some(87.3),
            rf_mean: Some(0.5),
            rf_p95: Some(0.8),
            q_mean_mw: Some(12.0),
            q_mean_pct: Some(78.0),
            crit_mean: Some(25.0),
            ..WindowStats::default()
        }
    }

    #[test]
    fn empty_window_is_an_error() {
        assert_eq!(thermal(None, &design()).status, Status::Error);
        assert_eq!(fouling(None, &design()).status, Status::Error);
        assert_eq!(criticality(None).status, Status::Error);
    }

    #[test]
    fn thermal_bands() {
        let cfg = design();
        let mut s = stats();
        let i = thermal(Some(&s), &cfg);
        assert_eq!(i.status, Status::Normal);
        assert_eq!(i.items[1], "Heat load: 12.00 MW (78% of design).");

        s.t_out_p95 = Some(58.5);
        assert_eq!(thermal(Some(&s), &cfg).status, Status::Warning);
        s.t_out_p95 = Some(60.0);
        let i = thermal(Some(&s), &cfg);
        assert_eq!(i.status, Status::Critical);
        assert_eq!(i.items.len(), 3);

        s.q_mean_pct = Some(130.0);
        assert!(thermal(Some(&s), &cfg).items[2].starts_with("High heat load"));
    }

    #[test]
    fn fouling_bands() {
        let cfg = design();
        let mut s = stats();
        assert_eq!(fouling(Some(&s), &cfg).status, Status::Normal);
        s.rf_p95 = Some(3.0 * cfg.rf_design_x1e4());
        assert_eq!(fouling(Some(&s), &cfg).status, Status::Warning);
        s.rf_p95 = Some(5.0 * cfg.rf_design_x1e4());
        assert_eq!(fouling(Some(&s), &cfg).status, Status::Critical);

        s.u_mean_pct = Some(55.0);
        let i = fouling(Some(&s), &cfg);
        assert!(i.items.last().is_some_and(|l| l.starts_with("U very low")));
    }

    #[test]
    fn criticality_bands_and_recommendations() {
        let mut s = stats();
        let i = criticality(Some(&s));
        assert_eq!(i.status, Status::Normal);
        assert_eq!(i.recommendations, vec!["Routine monitoring".to_string()]);
        assert_eq!(i.items[1], "Days since wash: No record");

        s.crit_mean = Some(85.0);
        s.days_since_wash_last = Some(42.4);
        let i = criticality(Some(&s));
        assert_eq!(i.status, Status::Critical);
        assert_eq!(i.recommendations.len(), 3);
        assert_eq!(i.items[1], "Days since wash: 42");

        s.crit_mean = None;
        let i = criticality(Some(&s));
        assert_eq!(i.status, Status::Unknown);
        assert!(i.recommendations.is_empty());
    }
}
