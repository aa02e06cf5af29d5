//! Composite criticality index.

use cw_core::numeric::clamp_opt;
use cw_project::UnitConfig;
use cw_results::{CriticalityFields, CriticalityLevel};

const W_TEMP: f64 = 0.30;
const W_FOULING: f64 = 0.35;
const W_EFF: f64 = 0.25;
const W_WASH: f64 = 0.10;

/// Wash sub-score when no wash precedes the sample.
pub const UNKNOWN_WASH_SCORE: f64 = 0.5;

/// Days after which the wash sub-score saturates at 1.
const WASH_DAYS_SCALE: f64 = 180.0;

pub const CRITICALITY_MAX: f64 = 120.0;

/// What the index needs from one operating sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CriticalityInputs {
    pub t_acid_out_c: Option<f64>,
    pub rf_x1e4: Option<f64>,
    pub eff_u_pct: Option<f64>,
    pub days_since_wash: Option<f64>,
}

/// Sub-scores, composite and level for an operating sample.
///
/// A missing sub-score counts as 0 in the composite.
pub fn score_criticality(inputs: &CriticalityInputs, config: &UnitConfig) -> CriticalityFields {
    let crit_temp = clamp_opt(
        inputs.t_acid_out_c.map(|t| t / config.t_acid_out_limit_c),
        0.0,
        1.5,
    );
    let crit_fouling = clamp_opt(
        inputs.rf_x1e4.map(|rf| rf / config.rf_critical_x1e4()),
        0.0,
        1.5,
    );
    let crit_eff = clamp_opt(inputs.eff_u_pct.map(|e| 1.0 - e / 100.0), 0.0, 1.0);
    let crit_wash = Some(
        inputs
            .days_since_wash
            .map_or(UNKNOWN_WASH_SCORE, |d| (d / WASH_DAYS_SCALE).clamp(0.0, 1.5)),
    );

    let weighted = W_TEMP * crit_temp.unwrap_or(0.0)
        + W_FOULING * crit_fouling.unwrap_or(0.0)
        + W_EFF * crit_eff.unwrap_or(0.0)
        + W_WASH * crit_wash.unwrap_or(0.0);
    let criticality = Some((100.0 * weighted).clamp(0.0, CRITICALITY_MAX)).filter(|c| c.is_finite());

    CriticalityFields {
        crit_temp,
        crit_fouling,
        crit_eff,
        crit_wash,
        criticality,
        level: CriticalityLevel::from_index(criticality),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::design;
    use proptest::prelude::*;

    #[test]
    fn composite_weights() {
        let cfg = design();
        let c = score_criticality(
            &CriticalityInputs {
                t_acid_out_c: Some(60.0),
                rf_x1e4: Some(cfg.rf_critical_x1e4()),
                eff_u_pct: Some(50.0),
                days_since_wash: Some(90.0),
            },
            &cfg,
        );
        // 100 × (0.30·1 + 0.35·1 + 0.25·0.5 + 0.10·0.5)
        assert!((c.criticality.unwrap() - 82.5).abs() < 1e-9);
        assert_eq!(c.level, CriticalityLevel::Critical);
    }

    #[test]
    fn missing_subscores_count_as_zero() {
        let cfg = design();
        let c = score_criticality(
            &CriticalityInputs {
                t_acid_out_c: Some(30.0),
                ..CriticalityInputs::default()
            },
            &cfg,
        );
        assert_eq!(c.crit_fouling, None);
        assert_eq!(c.crit_eff, None);
        assert_eq!(c.crit_wash, Some(UNKNOWN_WASH_SCORE));
        // 100 × (0.30·0.5 + 0.10·0.5)
        assert!((c.criticality.unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(c.level, CriticalityLevel::Low);
    }

    #[test]
    fn level_bands() {
        assert_eq!(CriticalityLevel::from_index(Some(29.9)), CriticalityLevel::Low);
        assert_eq!(CriticalityLevel::from_index(Some(30.0)), CriticalityLevel::Medium);
        assert_eq!(CriticalityLevel::from_index(Some(60.0)), CriticalityLevel::High);
        assert_eq!(CriticalityLevel::from_index(Some(80.0)), CriticalityLevel::Critical);
        assert_eq!(CriticalityLevel::from_index(None), CriticalityLevel::NotAvailable);
    }

    proptest! {
        #[test]
        fn monotone_in_outlet_temperature(
            t1 in 0.0f64..120.0,
            dt in 0.0f64..30.0,
            rf in prop::option::of(-0.5f64..20.0),
            eff in prop::option::of(0.0f64..150.0),
            days in prop::option::of(0.0f64..400.0),
        ) {
            let cfg = design();
            let base = CriticalityInputs { t_acid_out_c: Some(t1), rf_x1e4: rf, eff_u_pct: eff, days_since_wash: days };
            let hotter = CriticalityInputs { t_acid_out_c: Some(t1 + dt), ..base };
            let a = score_criticality(&base, &cfg).criticality.unwrap();
            let b = score_criticality(&hotter, &cfg).criticality.unwrap();
            prop_assert!(b >= a - 1e-12);
            prop_assert!((0.0..=CRITICALITY_MAX).contains(&b));
        }
    }
}
