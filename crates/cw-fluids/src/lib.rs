//! Physical property and heat-exchanger relations for acid coolers.
//!
//! Provides:
//! - sulphuric acid Cp and density versus concentration
//! - cooling water constants and water-side duty
//! - counter-current LMTD, overall coefficient and fouling resistance

pub mod acid;
pub mod exchanger;
pub mod water;

pub use acid::{AcidProperties, acid_properties};
pub use exchanger::{fouling_resistance, lmtd_counter_current, log_mean, overall_coefficient};
pub use water::{WATER_CP_J_KGK, WATER_RHO_KG_M3, water_duty_w, water_mass_flow_kgps};
