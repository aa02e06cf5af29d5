//! Heat balance, LMTD, overall coefficient and fouling resistance per sample.

use cw_core::numeric::{checked_div, finite};
use cw_fluids::{
    acid_properties, fouling_resistance, lmtd_counter_current, overall_coefficient, water_duty_w,
    water_mass_flow_kgps,
};
use cw_project::UnitConfig;
use cw_results::{Sample, ThermalFields};

/// Lower clamp on the scaled fouling resistance; small negative noise survives.
pub const RF_X1E4_FLOOR: f64 = -0.5;

fn both(a: Option<f64>, b: Option<f64>) -> Option<(f64, f64)> {
    Some((a?, b?))
}

/// Thermal fields of one operating sample.
///
/// Every undefined intermediate (zero acid drop, temperature cross, U out of
/// range) leaves its dependants missing rather than zero.
pub fn thermal_fields(sample: &Sample, config: &UnitConfig) -> ThermalFields {
    let mut out = ThermalFields::default();

    out.water_mass_flow_kgps = sample
        .water_flow_m3h
        .and_then(|f| finite(water_mass_flow_kgps(f)));

    let props = acid_properties(sample.acid_conc_pct);
    out.acid_cp_j_kgk = props.map(|p| p.cp_j_kgk);
    out.acid_rho_kg_m3 = props.map(|p| p.rho_kg_m3);

    out.q_water_w = match (out.water_mass_flow_kgps, both(sample.water_in_c, sample.water_out_c)) {
        (Some(m), Some((tin, tout))) => finite(water_duty_w(m, tin, tout)),
        _ => None,
    };

    // An exactly zero drop leaves the acid side undefined.
    out.dt_acid_k = both(sample.acid_in_c, sample.acid_out_c)
        .map(|(a, b)| a - b)
        .filter(|d| *d != 0.0 && d.is_finite());

    out.acid_mass_flow_kgps = match (out.q_water_w, out.acid_cp_j_kgk, out.dt_acid_k) {
        (Some(q), Some(cp), Some(dt)) => checked_div(q, cp * dt),
        _ => None,
    };
    out.q_acid_w = match (out.acid_mass_flow_kgps, out.acid_cp_j_kgk, out.dt_acid_k) {
        (Some(m), Some(cp), Some(dt)) => finite(m * cp * dt),
        _ => None,
    };
    out.q_used_w = both(out.q_water_w, out.q_acid_w).map(|(w, a)| w.abs().min(a.abs()));

    out.lmtd_k = match (
        sample.acid_in_c,
        sample.acid_out_c,
        sample.water_in_c,
        sample.water_out_c,
    ) {
        (Some(ai), Some(ao), Some(wi), Some(wo)) => lmtd_counter_current(ai, ao, wi, wo),
        _ => None,
    };

    out.ua_w_k = both(out.q_used_w, out.lmtd_k).and_then(|(q, l)| checked_div(q, l));
    out.u_w_m2k = both(out.q_used_w, out.lmtd_k)
        .and_then(|(q, l)| overall_coefficient(q, l, config.area_m2));

    out.rf_m2k_w = out
        .u_w_m2k
        .and_then(|u| fouling_resistance(u, config.u_clean_w_m2k));
    out.rf_x1e4 = out.rf_m2k_w.map(|rf| (rf * 1e4).max(RF_X1E4_FLOOR));

    out.eff_q_pct = out
        .q_used_w
        .and_then(|q| checked_div(q, config.q_design_w))
        .map(|r| r * 100.0);
    out.eff_u_pct = out
        .u_w_m2k
        .and_then(|u| checked_div(u, config.u_clean_w_m2k))
        .map(|r| r * 100.0);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{design, operating_sample, sample_with_u};

    #[test]
    fn design_point_recovers_target_u() {
        let cfg = design();
        let t = thermal_fields(&sample_with_u(0, 1500.0), &cfg);
        assert!((t.u_w_m2k.unwrap() - 1500.0).abs() < 1e-6);
        assert!((t.q_used_w.unwrap() - t.q_water_w.unwrap()).abs() < 1e-3);
        assert!(t.rf_x1e4.unwrap() > 0.0);
        assert!((t.eff_u_pct.unwrap() - 1500.0 / 1718.0 * 100.0).abs() < 1e-6);
    }

    #[test]
    fn clean_u_gives_zero_fouling() {
        let cfg = design();
        let t = thermal_fields(&sample_with_u(0, cfg.u_clean_w_m2k), &cfg);
        assert!(t.rf_x1e4.unwrap().abs() < 1e-9);
    }

    #[test]
    fn zero_acid_drop_leaves_acid_side_missing() {
        let mut s = operating_sample(0);
        s.acid_out_c = s.acid_in_c;
        let t = thermal_fields(&s, &design());
        assert!(t.q_water_w.is_some());
        assert_eq!(t.dt_acid_k, None);
        assert_eq!(t.acid_mass_flow_kgps, None);
        assert_eq!(t.q_used_w, None);
        assert_eq!(t.u_w_m2k, None);
        assert_eq!(t.rf_x1e4, None);
    }

    #[test]
    fn temperature_cross_leaves_lmtd_missing() {
        let mut s = operating_sample(0);
        s.water_out_c = Some(80.0);
        let t = thermal_fields(&s, &design());
        assert_eq!(t.lmtd_k, None);
        assert_eq!(t.u_w_m2k, None);
        assert_eq!(t.eff_u_pct, None);
        assert!(t.eff_q_pct.is_some());
    }

    #[test]
    fn implausibly_high_u_has_no_fouling_value() {
        let cfg = design();
        let t = thermal_fields(&sample_with_u(0, 1.6 * cfg.u_clean_w_m2k), &cfg);
        assert!(t.u_w_m2k.is_some());
        assert_eq!(t.rf_x1e4, None);
    }

    #[test]
    fn scaled_fouling_is_floor_clamped() {
        let cfg = design();
        // 1/1.4Uc - 1/Uc ≈ -1.66e-4 → ×1e4 ≈ -1.66, clamped to -0.5.
        let t = thermal_fields(&sample_with_u(0, 1.4 * cfg.u_clean_w_m2k), &cfg);
        assert!(t.rf_m2k_w.unwrap() < 0.0);
        assert_eq!(t.rf_x1e4, Some(RF_X1E4_FLOOR));
    }
}
