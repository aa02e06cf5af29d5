//! Cooling water side.

use cw_core::units::{in_kgps, kg_m3, m3ph, mass_rate};

pub const WATER_RHO_KG_M3: f64 = 1000.0;
pub const WATER_CP_J_KGK: f64 = 4186.0;

/// Water mass flow [kg/s] from a volumetric reading in m³/h.
pub fn water_mass_flow_kgps(flow_m3h: f64) -> f64 {
    in_kgps(mass_rate(m3ph(flow_m3h), kg_m3(WATER_RHO_KG_M3)))
}

/// Heat picked up by the water [W]; sign follows (out − in).
pub fn water_duty_w(mass_flow_kgps: f64, t_in_c: f64, t_out_c: f64) -> f64 {
    mass_flow_kgps * WATER_CP_J_KGK * (t_out_c - t_in_c)
}
