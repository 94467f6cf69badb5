use serde::{Deserialize, Serialize};

use crate::error::{InvalidParameterError, require_finite};

/// Static plate geometry and kinematics driving one simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlateParameters {
    /// Along-axis length of the modelled section (km).
    #[serde(rename = "length")]
    pub length_km: f64,
    /// Depth ceiling the canyon floor may reach (m).
    #[serde(rename = "depth")]
    pub max_depth_m: f64,
    #[serde(rename = "tectonic_stress")]
    pub tectonic_stress_mpa: f64,
    /// Negative values point the motion towards convergence.
    #[serde(rename = "plate_velocity")]
    pub plate_velocity_cm_yr: f64,
}

impl PlateParameters {
    pub fn new(
        length_km: f64,
        max_depth_m: f64,
        tectonic_stress_mpa: f64,
        plate_velocity_cm_yr: f64,
    ) -> Self {
        Self {
            length_km,
            max_depth_m,
            tectonic_stress_mpa,
            plate_velocity_cm_yr,
        }
    }

    /// Field names in errors match the JSON keys.
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        if require_finite("length", self.length_km)? <= 0.0 {
            return Err(InvalidParameterError::new(
                "length",
                format!("must be > 0, got {}", self.length_km),
            ));
        }
        if require_finite("depth", self.max_depth_m)? <= 0.0 {
            return Err(InvalidParameterError::new(
                "depth",
                format!("must be > 0, got {}", self.max_depth_m),
            ));
        }
        if require_finite("tectonic_stress", self.tectonic_stress_mpa)? < 0.0 {
            return Err(InvalidParameterError::new(
                "tectonic_stress",
                format!("must be >= 0, got {}", self.tectonic_stress_mpa),
            ));
        }
        require_finite("plate_velocity", self.plate_velocity_cm_yr)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keys() {
        let p: PlateParameters = serde_json::from_str(
            r#"{"length": 500, "depth": 4000, "tectonic_stress": 8.5, "plate_velocity": -3.2}"#,
        )
        .unwrap();
        assert_eq!(p, PlateParameters::new(500.0, 4000.0, 8.5, -3.2));
        p.validate().unwrap();
    }

    #[test]
    fn missing_and_unknown_keys_rejected() {
        assert!(serde_json::from_str::<PlateParameters>(r#"{"length": 500, "depth": 4000}"#).is_err());
        assert!(
            serde_json::from_str::<PlateParameters>(
                r#"{"length": 1, "depth": 1, "tectonic_stress": 1, "plate_velocity": 1, "age": 3}"#
            )
            .is_err()
        );
    }

    #[test]
    fn each_range_names_its_field() {
        let ok = PlateParameters::new(500.0, 4000.0, 8.5, 3.2);
        let cases = [
            (PlateParameters { length_km: -1.0, ..ok }, "length"),
            (PlateParameters { length_km: 0.0, ..ok }, "length"),
            (PlateParameters { max_depth_m: 0.0, ..ok }, "depth"),
            (PlateParameters { tectonic_stress_mpa: -0.1, ..ok }, "tectonic_stress"),
            (PlateParameters { plate_velocity_cm_yr: f64::NAN, ..ok }, "plate_velocity"),
        ];
        for (p, field) in cases {
            assert_eq!(p.validate().unwrap_err().field, field);
        }
    }
}
