mod common;

use common::{at_hour, cap3, sample_with_u, ts_unit};
use cw_analysis::*;
use cw_results::{AugmentedSample, UnitSeries};

fn run(samples: Vec<cw_results::Sample>, washes: &[chrono::NaiveDateTime]) -> UnitAnalysis {
    let unit = ts_unit();
    let series = UnitSeries::from_samples(&unit.key, samples);
    analyze_unit(&series, &unit, washes, &cap3().analysis).unwrap()
}

#[test]
fn abrupt_fouling_drives_rule_score_and_trigger() {
    let unit = ts_unit();
    let u_clean = unit.design.u_clean_w_m2k;
    let samples = (0..400)
        .map(|h| {
            let u = if h < 300 { 0.9 * u_clean } else { 600.0 };
            sample_with_u(&unit, h, u)
        })
        .collect();
    let analysis = run(samples, &[]);
    assert_eq!(analysis.operating_count(), 400);

    let after: Vec<&AugmentedSample> = analysis.operating_since(Some(at_hour(300)));
    assert_eq!(after.len(), 100);
    let rf_crit = unit.design.rf_critical_x1e4();
    assert!(after.iter().all(|r| r.thermal.rf_x1e4.unwrap() >= rf_crit));

    let rule = rule_score(&after, &unit.design, 30);
    assert_eq!(rule.foul_s, 1.0);

    let trigger = requires_wash(&after, &unit.design, 30);
    assert!(trigger.required);
    assert!(trigger.reason.contains("P95 Rf ≥ critical"));

    // The whole 400-hour history falls in the fallback window.
    let window = analysis.window_rows(30);
    assert_eq!(window.len(), 400);
    assert!(requires_wash(&window, &unit.design, 30).required);
}

#[test]
fn flat_fouling_has_no_days_to_critical() {
    let unit = ts_unit();
    let samples = (0..400)
        .map(|h| sample_with_u(&unit, h, 0.85 * unit.design.u_clean_w_m2k))
        .collect();
    let analysis = run(samples, &[]);

    for r in analysis.operating() {
        assert_eq!(r.trend.rf_days_to_crit, None);
    }
    let rows = analysis.operating();
    let trend = rf_trend_to_critical(&rows, &unit.design, 30);
    assert_eq!(trend.state, TrendState::Stable);
    assert_eq!(trend.days_to_critical, None);
    assert_eq!(rule_score(&rows, &unit.design, 30).trend_s, 0.0);
}

#[test]
fn window_statistics_skip_idle_rows() {
    let unit = ts_unit();
    let mut samples: Vec<cw_results::Sample> = (0..100)
        .map(|h| sample_with_u(&unit, h, 0.9 * unit.design.u_clean_w_m2k))
        .collect();
    // Blower below the threshold: not operating.
    for s in samples.iter_mut().skip(50) {
        s.blower_speed_pct = Some(10.0);
        s.acid_out_c = Some(70.0);
    }
    let analysis = run(samples, &[]);
    assert_eq!(analysis.operating_count(), 50);
    let rows = analysis.window_rows(30);
    let stats = WindowStats::compute(&rows, &unit.design).unwrap();
    assert_eq!(stats.t_out_max, Some(55.0));
    assert!((stats.u_mean_pct.unwrap() - 90.0).abs() < 1e-6);

    let idle = &analysis.rows[75];
    assert!(!idle.operating);
    assert_eq!(idle.thermal.rf_x1e4, None);
    assert_eq!(idle.crit.criticality, None);
}

#[test]
fn interpretations_follow_window_state() {
    let unit = ts_unit();
    let samples = (0..200)
        .map(|h| sample_with_u(&unit, h, 650.0))
        .collect();
    let analysis = run(samples, &[at_hour(-24 * 90)]);
    let rows = analysis.window_rows(30);
    let stats = WindowStats::compute(&rows, &unit.design);

    let fouling = interpret::fouling(stats.as_ref(), &unit.design);
    assert_eq!(fouling.status, Status::Critical);
    let crit = interpret::criticality(stats.as_ref());
    assert!(crit.items.last().unwrap().starts_with("Days since wash: 9"));
    assert_eq!(interpret::thermal(None, &unit.design).status, Status::Error);
}
