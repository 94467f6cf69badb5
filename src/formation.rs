use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::SimConfig;
use crate::error::{InvalidParameterError, require_finite};
use crate::plate::PlateParameters;
use crate::profile::{CanyonProfile, SimulationResult};

/// One independent run for [`FormationSimulator::simulate_batch`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationRequest {
    pub plate: PlateParameters,
    pub steps: usize,
    pub step_duration_years: f64,
}

/// Evolves a 1-D canyon profile under rifting.
///
/// Each step deepens every sample by the rift rate, weighted by a Gaussian
/// falloff centred on the axis midpoint and by the remaining headroom to the
/// plate's depth ceiling. A step depends only on the previous profile and the
/// static parameters, so identical inputs give identical outputs.
#[derive(Clone, Debug)]
pub struct FormationSimulator {
    config: SimConfig,
}

impl FormationSimulator {
    pub fn new(config: SimConfig) -> Result<Self, InvalidParameterError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn simulate(
        &self,
        plate: &PlateParameters,
        steps: usize,
        step_duration_years: f64,
    ) -> Result<SimulationResult, InvalidParameterError> {
        plate.validate()?;
        if steps == 0 {
            return Err(InvalidParameterError::new("steps", "must be > 0, got 0"));
        }
        if require_finite("step_duration_years", step_duration_years)? <= 0.0 {
            return Err(InvalidParameterError::new(
                "step_duration_years",
                format!("must be > 0, got {step_duration_years}"),
            ));
        }
        let max_depth = plate.max_depth_m;
        if self.config.initial_depth_m > max_depth {
            return Err(InvalidParameterError::new(
                "initial_depth_m",
                format!("{} exceeds plate depth {max_depth}", self.config.initial_depth_m),
            ));
        }

        let distance = sample_distances(plate.length_km, self.config.samples);
        if !distance.windows(2).all(|w| w[0] < w[1]) {
            return Err(InvalidParameterError::new(
                "length",
                format!(
                    "{} km is too small to place {} distinct samples",
                    plate.length_km, self.config.samples
                ),
            ));
        }
        let weights = rift_weights(&distance, plate.length_km, self.config.rift_width_fraction);
        let rate = rift_rate(plate, self.config.displacement_coefficient, step_duration_years);
        debug!(
            samples = distance.len(),
            steps,
            rate_m_per_step = rate,
            "simulating canyon formation"
        );

        let mut profiles = Vec::with_capacity(steps);
        profiles.push(CanyonProfile::flat(distance, self.config.initial_depth_m));
        for t in 1..steps {
            let prev = &profiles[t - 1];
            let next = CanyonProfile::from_parts(
                prev.distance_km().to_vec(),
                deepen(prev.depth_m(), &weights, rate, max_depth),
            );
            trace!(step = t, midpoint_depth_m = next.midpoint_depth(), "rift step");
            profiles.push(next);
        }

        Ok(SimulationResult::new(*plate, step_duration_years, profiles))
    }

    /// Runs independent simulations on the rayon pool. Results keep input order.
    pub fn simulate_batch(
        &self,
        requests: &[SimulationRequest],
    ) -> Vec<Result<SimulationResult, InvalidParameterError>> {
        requests
            .par_iter()
            .map(|r| self.simulate(&r.plate, r.steps, r.step_duration_years))
            .collect()
    }
}

/// Evenly spaced positions from 0 to `length_km` inclusive. The fraction is
/// formed first so the product never exceeds `length_km`.
fn sample_distances(length_km: f64, n: usize) -> Vec<f64> {
    let last = (n - 1) as f64;
    (0..n).map(|i| length_km * (i as f64 / last)).collect()
}

/// Gaussian falloff, 1.0 at the midpoint and symmetric about it. Offsets are
/// taken as a fraction of the axis so no intermediate leaves `[-0.5, 0.5]`.
fn rift_weights(distance_km: &[f64], length_km: f64, width_fraction: f64) -> Vec<f64> {
    let centre = length_km * 0.5;
    distance_km
        .iter()
        .map(|&d| {
            let u = (d - centre) / length_km;
            (-0.5 * (u / width_fraction).powi(2)).exp()
        })
        .collect()
}

/// Opening at the rift centre per step (m). The velocity sign only encodes
/// direction, so its magnitude drives opening.
fn rift_rate(plate: &PlateParameters, coefficient: f64, dt_years: f64) -> f64 {
    let rate = coefficient
        * plate.tectonic_stress_mpa
        * plate.plate_velocity_cm_yr.abs()
        * dt_years;
    // overflow of the product must not leak inf into 0 * inf
    rate.min(f64::MAX)
}

fn deepen(prev: &[f64], weights: &[f64], rate: f64, max_depth: f64) -> Vec<f64> {
    prev.iter()
        .zip(weights)
        .map(|(&d, &w)| {
            let headroom = (1.0 - d / max_depth).max(0.0);
            (d + rate * w * headroom).clamp(0.0, max_depth)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> FormationSimulator {
        FormationSimulator::new(SimConfig::default()).unwrap()
    }

    fn reference_plate() -> PlateParameters {
        PlateParameters::new(500.0, 4000.0, 8.5, 3.2)
    }

    #[test]
    fn reference_scenario_deepens_within_ceiling() {
        let r = sim().simulate(&reference_plate(), 10, 100_000.0).unwrap();
        assert_eq!(r.steps(), 10);
        let first = r.initial().unwrap().midpoint_depth();
        let last = r.final_midpoint_depth();
        assert!(last > first, "{last} <= {first}");
        assert!(last <= 4000.0);
        for p in r.profiles() {
            assert!(p.is_well_formed(4000.0));
        }
    }

    #[test]
    fn zero_stress_stays_flat() {
        let plate = PlateParameters {
            tectonic_stress_mpa: 0.0,
            ..reference_plate()
        };
        let r = sim().simulate(&plate, 25, 50_000.0).unwrap();
        let baseline = r.initial().unwrap().clone();
        assert!(baseline.depth_m().iter().all(|&d| d == 0.0));
        for p in r.profiles() {
            assert_eq!(p, &baseline);
        }
    }

    #[test]
    fn single_step_is_baseline() {
        let cfg = SimConfig {
            initial_depth_m: 120.0,
            ..Default::default()
        };
        let r = FormationSimulator::new(cfg)
            .unwrap()
            .simulate(&reference_plate(), 1, 1.0e6)
            .unwrap();
        assert_eq!(r.steps(), 1);
        assert!(r.profiles()[0].depth_m().iter().all(|&d| d == 120.0));
    }

    #[test]
    fn midpoint_monotonic_and_bounded() {
        let plates = [
            reference_plate(),
            PlateParameters::new(50.0, 800.0, 40.0, -7.5),
            PlateParameters::new(2000.0, 11_000.0, 0.3, 0.1),
            PlateParameters::new(10.0, 1.0, 1.0e6, 1.0e6),
        ];
        for plate in plates {
            let r = sim().simulate(&plate, 40, 250_000.0).unwrap();
            let series = r.midpoint_series();
            for w in series.windows(2) {
                assert!(w[1] >= w[0], "{plate:?}: {} < {}", w[1], w[0]);
            }
            assert!(series.iter().all(|&d| d <= plate.max_depth_m));
        }
    }

    #[test]
    fn deepest_point_is_midpoint() {
        let r = sim().simulate(&reference_plate(), 5, 100_000.0).unwrap();
        let last = r.final_profile().unwrap();
        assert_eq!(last.deepest(), last.midpoint_depth());
        let n = last.len();
        for i in 0..n / 2 {
            assert!((last.depth_m()[i] - last.depth_m()[n - 1 - i]).abs() < 1e-9);
        }
    }

    #[test]
    fn deterministic() {
        let a = sim().simulate(&reference_plate(), 12, 75_000.0).unwrap();
        let b = sim().simulate(&reference_plate(), 12, 75_000.0).unwrap();
        for (pa, pb) in a.profiles().iter().zip(b.profiles()) {
            for (x, y) in pa.depth_m().iter().zip(pb.depth_m()) {
                assert!((x - y).abs() <= 1e-9);
            }
        }
        assert_eq!(a, b);
    }

    #[test]
    fn extreme_rates_stay_finite() {
        let plate = PlateParameters::new(1.0, 10.0, 1.0e300, 1.0e300);
        let r = sim().simulate(&plate, 3, 1.0e300).unwrap();
        for p in r.profiles() {
            assert!(p.depth_m().iter().all(|d| d.is_finite()));
            assert!(p.is_well_formed(10.0));
        }
        assert_eq!(r.final_midpoint_depth(), 10.0);
    }

    #[test]
    fn extreme_lengths_stay_finite() {
        for length in [1.0e-170, 1.0e200, 1.0e308] {
            let plate = PlateParameters::new(length, 4000.0, 8.5, 3.2);
            let r = sim().simulate(&plate, 5, 100_000.0).unwrap();
            for p in r.profiles() {
                assert!(p.distance_km().iter().all(|d| d.is_finite()), "{length}");
                assert!(p.depth_m().iter().all(|d| d.is_finite()), "{length}");
                assert!(p.is_well_formed(4000.0), "{length}");
            }
            let last = r.final_profile().unwrap();
            assert_eq!(last.distance_km()[last.len() - 1], length);
            assert_eq!(last.deepest(), last.midpoint_depth());
            assert!(r.final_midpoint_depth() > 0.0, "{length}");
        }
    }

    #[test]
    fn unresolvable_length_rejected() {
        let plate = PlateParameters::new(5.0e-324, 4000.0, 8.5, 3.2);
        let err = sim().simulate(&plate, 3, 1.0).unwrap_err();
        assert_eq!(err.field, "length");
    }

    #[test]
    fn weights_peak_at_midpoint() {
        let d = sample_distances(10.0, 5);
        assert_eq!(d, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        let w = rift_weights(&d, 10.0, 0.15);
        assert_eq!(w[2], 1.0);
        assert_eq!(w[1], w[3]);
        assert!(w[0] < w[1] && w[1] < 1.0);
    }

    #[test]
    fn invalid_inputs_name_field() {
        let s = sim();
        let bad_len = PlateParameters {
            length_km: -1.0,
            ..reference_plate()
        };
        assert_eq!(s.simulate(&bad_len, 10, 1.0).unwrap_err().field, "length");
        assert_eq!(s.simulate(&reference_plate(), 0, 1.0).unwrap_err().field, "steps");
        assert_eq!(
            s.simulate(&reference_plate(), 3, 0.0).unwrap_err().field,
            "step_duration_years"
        );
        assert_eq!(
            s.simulate(&reference_plate(), 3, f64::NAN).unwrap_err().field,
            "step_duration_years"
        );
    }

    #[test]
    fn initial_depth_above_ceiling_rejected() {
        let cfg = SimConfig {
            initial_depth_m: 5000.0,
            ..Default::default()
        };
        let err = FormationSimulator::new(cfg)
            .unwrap()
            .simulate(&reference_plate(), 2, 1.0)
            .unwrap_err();
        assert_eq!(err.field, "initial_depth_m");
    }

    #[test]
    fn batch_matches_sequential() {
        let s = sim();
        let reqs = vec![
            SimulationRequest {
                plate: reference_plate(),
                steps: 6,
                step_duration_years: 10_000.0,
            },
            SimulationRequest {
                plate: PlateParameters {
                    length_km: -1.0,
                    ..reference_plate()
                },
                steps: 6,
                step_duration_years: 10_000.0,
            },
        ];
        let out = s.simulate_batch(&reqs);
        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0].as_ref().unwrap(),
            &s.simulate(&reference_plate(), 6, 10_000.0).unwrap()
        );
        assert_eq!(out[1].as_ref().unwrap_err().field, "length");
    }
}
