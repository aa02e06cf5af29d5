//! Sulphuric acid properties from concentration.

/// Anchor points: concentration (wt %) → (Cp J/kg·K, density kg/m³).
const ACID_TABLE: [(f64, f64, f64); 10] = [
    (0.0, 4186.0, 998.0),
    (50.0, 3180.0, 1395.0),
    (70.0, 2470.0, 1610.0),
    (80.0, 2100.0, 1727.0),
    (90.0, 1760.0, 1814.0),
    (93.0, 1680.0, 1830.0),
    (96.0, 1560.0, 1836.0),
    (98.0, 1430.0, 1836.0),
    (98.5, 1400.0, 1835.0),
    (100.0, 1340.0, 1830.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcidProperties {
    /// Specific heat [J/(kg·K)]
    pub cp_j_kgk: f64,
    /// Density [kg/m³]
    pub rho_kg_m3: f64,
}

/// Piecewise-linear interpolation over the anchor table, clamped at both ends.
///
/// Missing concentration gives missing properties.
pub fn acid_properties(conc_pct: Option<f64>) -> Option<AcidProperties> {
    let c = conc_pct.filter(|c| c.is_finite())?;
    Some(AcidProperties {
        cp_j_kgk: interp(c, |row| row.1),
        rho_kg_m3: interp(c, |row| row.2),
    })
}

fn interp(c: f64, col: impl Fn(&(f64, f64, f64)) -> f64) -> f64 {
    let first = &ACID_TABLE[0];
    let last = &ACID_TABLE[ACID_TABLE.len() - 1];
    if c <= first.0 {
        return col(first);
    }
    if c >= last.0 {
        return col(last);
    }
    for pair in ACID_TABLE.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if c <= b.0 {
            let t = (c - a.0) / (b.0 - a.0);
            return col(a) + t * (col(b) - col(a));
        }
    }
    col(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_points_are_exact() {
        let p = acid_properties(Some(96.0)).unwrap();
        assert_eq!(p.cp_j_kgk, 1560.0);
        assert_eq!(p.rho_kg_m3, 1836.0);
    }

    #[test]
    fn interpolates_between_anchors() {
        let p = acid_properties(Some(97.0)).unwrap();
        assert!((p.cp_j_kgk - 1495.0).abs() < 1e-9);
    }

    #[test]
    fn clamps_outside_table() {
        assert_eq!(acid_properties(Some(-5.0)).unwrap().cp_j_kgk, 4186.0);
        assert_eq!(acid_properties(Some(105.0)).unwrap().cp_j_kgk, 1340.0);
    }

    #[test]
    fn missing_concentration() {
        assert!(acid_properties(None).is_none());
        assert!(acid_properties(Some(f64::NAN)).is_none());
    }
}
