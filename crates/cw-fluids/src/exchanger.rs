//! Counter-current exchanger relations (hot = acid, cold = water).

use cw_core::numeric::finite;

/// Log-mean of two terminal temperature differences.
///
/// Missing when either difference is non-positive (temperature cross);
/// returns `delta1` when the two are equal to within 1e-6.
pub fn log_mean(delta1: f64, delta2: f64) -> Option<f64> {
    if !delta1.is_finite() || !delta2.is_finite() || delta1 <= 0.0 || delta2 <= 0.0 {
        return None;
    }
    if (delta1 - delta2).abs() < 1e-6 {
        return Some(delta1);
    }
    finite((delta1 - delta2) / (delta1 / delta2).ln())
}

/// LMTD with ΔT1 = acid_in − water_out and ΔT2 = acid_out − water_in.
pub fn lmtd_counter_current(
    acid_in_c: f64,
    acid_out_c: f64,
    water_in_c: f64,
    water_out_c: f64,
) -> Option<f64> {
    log_mean(acid_in_c - water_out_c, acid_out_c - water_in_c)
}

/// U = Q / (LMTD · A) [W/m²K].
pub fn overall_coefficient(duty_w: f64, lmtd_k: f64, area_m2: f64) -> Option<f64> {
    if lmtd_k <= 0.0 || area_m2 <= 0.0 {
        return None;
    }
    finite(duty_w / (lmtd_k * area_m2))
}

/// Rf = 1/U − 1/U_clean [m²K/W], accepted only for 0 < U < 1.5·U_clean.
pub fn fouling_resistance(u: f64, u_clean: f64) -> Option<f64> {
    if !(u > 0.0 && u < 1.5 * u_clean) {
        return None;
    }
    finite(1.0 / u - 1.0 / u_clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_differences_take_the_limit() {
        assert_eq!(log_mean(10.0, 10.0), Some(10.0));
    }

    #[test]
    fn textbook_lmtd() {
        let v = log_mean(50.0, 10.0).unwrap();
        assert!((v - 40.0 / 5.0_f64.ln()).abs() < 1e-12);
        assert!((v - 24.85).abs() < 0.01);
    }

    #[test]
    fn temperature_cross_is_missing() {
        assert_eq!(log_mean(0.0, 10.0), None);
        assert_eq!(log_mean(10.0, -1.0), None);
        assert_eq!(lmtd_counter_current(40.0, 35.0, 32.0, 45.0), None);
    }

    #[test]
    fn clean_exchanger_has_zero_fouling() {
        let rf = fouling_resistance(1718.0, 1718.0).unwrap();
        assert!(rf.abs() < 1e-15);
    }

    #[test]
    fn implausible_u_is_rejected() {
        assert_eq!(fouling_resistance(0.0, 1700.0), None);
        assert_eq!(fouling_resistance(-5.0, 1700.0), None);
        assert_eq!(fouling_resistance(2600.0, 1700.0), None);
        assert_eq!(overall_coefficient(1e6, 0.0, 100.0), None);
    }
}
