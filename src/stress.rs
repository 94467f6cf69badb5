//! Elastic stress state of an oceanic plate derived from its motion.

use serde::Serialize;

use crate::error::{InvalidParameterError, require_finite};

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StressState {
    pub maximum_stress: f64,
    /// 1/s
    pub strain_rate: f64,
    pub normal_stress_x: f64,
    pub normal_stress_y: f64,
    pub shear_stress: f64,
}

impl StressState {
    /// Thin-plate estimate: stress scales with velocity times the ratio of
    /// crustal to elastic thickness; Poisson's ratio splits normal and shear parts.
    pub fn from_plate(
        plate_velocity_cm_yr: f64,
        crustal_thickness_km: f64,
        elastic_thickness_km: f64,
        poissons_ratio: f64,
    ) -> Result<Self, InvalidParameterError> {
        let v_cm_yr = require_finite("plate_velocity", plate_velocity_cm_yr)?;
        if require_finite("crustal_thickness", crustal_thickness_km)? <= 0.0 {
            return Err(InvalidParameterError::new(
                "crustal_thickness",
                format!("must be > 0, got {crustal_thickness_km}"),
            ));
        }
        if require_finite("elastic_thickness", elastic_thickness_km)? <= 0.0 {
            return Err(InvalidParameterError::new(
                "elastic_thickness",
                format!("must be > 0, got {elastic_thickness_km}"),
            ));
        }
        let nu = require_finite("poissons_ratio", poissons_ratio)?;
        if !(0.0..0.5).contains(&nu) {
            return Err(InvalidParameterError::new(
                "poissons_ratio",
                format!("must be in [0, 0.5), got {nu}"),
            ));
        }

        let v_m_s = v_cm_yr * 1e-2 / SECONDS_PER_YEAR;
        let crust_m = crustal_thickness_km * 1000.0;
        let elastic_m = elastic_thickness_km * 1000.0;
        let stress = v_m_s * crust_m / elastic_m;

        Ok(Self {
            maximum_stress: stress,
            strain_rate: v_m_s / elastic_m,
            normal_stress_x: stress * (1.0 - nu),
            normal_stress_y: stress * (1.0 - nu),
            shear_stress: stress * nu,
        })
    }
}
