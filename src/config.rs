use serde::{Deserialize, Serialize};

use crate::error::{InvalidParameterError, require_finite};
use crate::plate::PlateParameters;
use crate::seismic::SeismicEvent;

/// Tunable coefficients of the rifting model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Number of samples along the canyon axis. Odd, so one sample sits on the rift centre.
    pub samples: usize,
    /// Gaussian falloff sigma as a fraction of plate length.
    pub rift_width_fraction: f64,
    /// Metres of opening per (MPa * cm/yr * yr) at the rift centre.
    pub displacement_coefficient: f64,
    /// Depth of the flat t=0 profile (m).
    pub initial_depth_m: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            samples: 101,
            rift_width_fraction: 0.15,
            displacement_coefficient: 1.0e-4,
            initial_depth_m: 0.0,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        if self.samples < 3 || self.samples % 2 == 0 {
            return Err(InvalidParameterError::new(
                "samples",
                format!("must be odd and >= 3, got {}", self.samples),
            ));
        }
        if require_finite("rift_width_fraction", self.rift_width_fraction)? <= 0.0 {
            return Err(InvalidParameterError::new(
                "rift_width_fraction",
                format!("must be > 0, got {}", self.rift_width_fraction),
            ));
        }
        if require_finite("displacement_coefficient", self.displacement_coefficient)? < 0.0 {
            return Err(InvalidParameterError::new(
                "displacement_coefficient",
                format!("must be >= 0, got {}", self.displacement_coefficient),
            ));
        }
        if require_finite("initial_depth_m", self.initial_depth_m)? < 0.0 {
            return Err(InvalidParameterError::new(
                "initial_depth_m",
                format!("must be >= 0, got {}", self.initial_depth_m),
            ));
        }
        Ok(())
    }
}

/// Tunable coefficients of the magnitude/depth risk mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskConfig {
    /// log10 growth of an event's score per unit magnitude.
    pub energy_exponent: f64,
    /// Magnitude whose shallow-event score is 1.0.
    pub reference_magnitude: f64,
    /// e-folding depth of the score (km).
    pub depth_scale_km: f64,
    /// Summed score that maps to tanh(1) of full probability.
    pub saturation: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            energy_exponent: 0.5,
            reference_magnitude: 6.0,
            depth_scale_km: 30.0,
            saturation: 5.0,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        if require_finite("energy_exponent", self.energy_exponent)? <= 0.0 {
            return Err(InvalidParameterError::new(
                "energy_exponent",
                format!("must be > 0, got {}", self.energy_exponent),
            ));
        }
        require_finite("reference_magnitude", self.reference_magnitude)?;
        if require_finite("depth_scale_km", self.depth_scale_km)? <= 0.0 {
            return Err(InvalidParameterError::new(
                "depth_scale_km",
                format!("must be > 0, got {}", self.depth_scale_km),
            ));
        }
        if require_finite("saturation", self.saturation)? <= 0.0 {
            return Err(InvalidParameterError::new(
                "saturation",
                format!("must be > 0, got {}", self.saturation),
            ));
        }
        Ok(())
    }
}

/// A complete analysis request, as read from JSON by the CLI and server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub plate: PlateParameters,
    pub steps: usize,
    pub step_duration_years: f64,
    #[serde(default)]
    pub events: Vec<SeismicEvent>,
    #[serde(default)]
    pub simulation: SimConfig,
    #[serde(default)]
    pub risk: RiskConfig,
}
