use serde::Serialize;

use crate::plate::PlateParameters;

/// Canyon cross-section at one time step: depth samples at fixed distances
/// along the rift axis. Both vectors have the same length.
/// Built only inside the crate; callers read it through the accessors.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CanyonProfile {
    distance_km: Vec<f64>,
    depth_m: Vec<f64>,
}

impl CanyonProfile {
    pub(crate) fn from_parts(distance_km: Vec<f64>, depth_m: Vec<f64>) -> Self {
        debug_assert_eq!(distance_km.len(), depth_m.len());
        Self {
            distance_km,
            depth_m,
        }
    }

    /// Flat profile at `depth_m` over the given sample positions.
    pub(crate) fn flat(distance_km: Vec<f64>, depth_m: f64) -> Self {
        let n = distance_km.len();
        Self {
            distance_km,
            depth_m: vec![depth_m; n],
        }
    }

    pub fn distance_km(&self) -> &[f64] {
        &self.distance_km
    }

    pub fn depth_m(&self) -> &[f64] {
        &self.depth_m
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.depth_m.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depth_m.is_empty()
    }

    #[inline]
    pub fn midpoint_index(&self) -> usize {
        self.len() / 2
    }

    pub fn midpoint_depth(&self) -> f64 {
        self.depth_m.get(self.midpoint_index()).copied().unwrap_or(0.0)
    }

    pub fn deepest(&self) -> f64 {
        self.depth_m.iter().copied().fold(0.0, f64::max)
    }

    /// `(distance_km, depth_m)` pairs in axis order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.distance_km.iter().copied().zip(self.depth_m.iter().copied())
    }

    /// Distances strictly increasing, every depth within `[0, max_depth_m]`.
    pub fn is_well_formed(&self, max_depth_m: f64) -> bool {
        self.distance_km.len() == self.depth_m.len()
            && self.distance_km.windows(2).all(|w| w[0] < w[1])
            && self.depth_m.iter().all(|&d| (0.0..=max_depth_m).contains(&d))
    }
}

/// Profiles in chronological order; index 0 is the t=0 baseline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResult {
    plate: PlateParameters,
    step_duration_years: f64,
    profiles: Vec<CanyonProfile>,
}

impl SimulationResult {
    pub(crate) fn new(
        plate: PlateParameters,
        step_duration_years: f64,
        profiles: Vec<CanyonProfile>,
    ) -> Self {
        Self {
            plate,
            step_duration_years,
            profiles,
        }
    }

    pub fn plate(&self) -> &PlateParameters {
        &self.plate
    }

    pub fn step_duration_years(&self) -> f64 {
        self.step_duration_years
    }

    pub fn profiles(&self) -> &[CanyonProfile] {
        &self.profiles
    }

    pub fn steps(&self) -> usize {
        self.profiles.len()
    }

    pub fn initial(&self) -> Option<&CanyonProfile> {
        self.profiles.first()
    }

    pub fn final_profile(&self) -> Option<&CanyonProfile> {
        self.profiles.last()
    }

    /// Midpoint depth of every step, oldest first.
    pub fn midpoint_series(&self) -> Vec<f64> {
        self.profiles.iter().map(CanyonProfile::midpoint_depth).collect()
    }

    pub fn final_midpoint_depth(&self) -> f64 {
        self.final_profile().map_or(0.0, CanyonProfile::midpoint_depth)
    }

    /// Model time covered by the run, baseline excluded.
    pub fn elapsed_years(&self) -> f64 {
        self.steps().saturating_sub(1) as f64 * self.step_duration_years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CanyonProfile {
        CanyonProfile::from_parts(vec![0.0, 5.0, 10.0], vec![10.0, 80.0, 10.0])
    }

    #[test]
    fn accessors_expose_read_only_slices() {
        let p = sample();
        assert_eq!(p.distance_km(), &[0.0, 5.0, 10.0]);
        assert_eq!(p.depth_m(), &[10.0, 80.0, 10.0]);
        assert_eq!(p.len(), 3);
        assert!(!p.is_empty());
    }

    #[test]
    fn midpoint_and_deepest() {
        let p = sample();
        assert_eq!(p.midpoint_index(), 1);
        assert_eq!(p.midpoint_depth(), 80.0);
        assert_eq!(p.deepest(), 80.0);
        assert_eq!(p.samples().nth(2), Some((10.0, 10.0)));
    }

    #[test]
    fn well_formed_checks() {
        let p = sample();
        assert!(p.is_well_formed(100.0));
        assert!(!p.is_well_formed(50.0));

        let mut bad = sample();
        bad.distance_km[2] = 5.0;
        assert!(!bad.is_well_formed(100.0));

        let mut neg = sample();
        neg.depth_m[0] = -1.0;
        assert!(!neg.is_well_formed(100.0));
    }

    #[test]
    fn elapsed_excludes_baseline() {
        let plate = PlateParameters::new(10.0, 100.0, 1.0, 1.0);
        let r = SimulationResult::new(plate, 1000.0, vec![sample(), sample(), sample()]);
        assert_eq!(r.plate(), &plate);
        assert_eq!(r.step_duration_years(), 1000.0);
        assert_eq!(r.profiles().len(), 3);
        assert_eq!(r.elapsed_years(), 2000.0);
        assert_eq!(r.midpoint_series(), vec![80.0; 3]);
    }
}
