//! Plain-text geological report assembled from model outputs.

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::profile::SimulationResult;
use crate::seismic::{DEFAULT_FORMATION_THRESHOLD, RiskAssessment, SeismicSummary};

/// Static description of the canyon under study.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportMetadata {
    pub canyon_name: String,
    pub formation_age: String,
    pub location: String,
    /// Free text stamped into the header, supplied by the caller.
    #[serde(default)]
    pub generated_at: String,
}

impl ReportMetadata {
    fn validate(&self) -> Result<(), ReportError> {
        for (field, value) in [
            ("canyon_name", &self.canyon_name),
            ("formation_age", &self.formation_age),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(ReportError::EmptyField(field));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ReportGenerator {
    /// Percent probability at which new formation is flagged.
    pub formation_threshold: f64,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            formation_threshold: DEFAULT_FORMATION_THRESHOLD,
        }
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(
        &self,
        meta: &ReportMetadata,
        simulation: Option<&SimulationResult>,
        risk: Option<&RiskAssessment>,
        seismic: Option<&SeismicSummary>,
    ) -> Result<String, ReportError> {
        meta.validate()?;

        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        let mut data = Vec::new();
        let mut params = Vec::new();

        if let Some(sim) = simulation {
            let start = sim.initial().map_or(0.0, |p| p.midpoint_depth());
            let end = sim.final_midpoint_depth();
            let ceiling = sim.plate().max_depth_m;
            findings.push(format!(
                "Rift axis deepened from {start:.1} m to {end:.1} m over {:.0} years",
                sim.elapsed_years()
            ));
            if end >= ceiling {
                findings.push(format!("Canyon floor reached the {ceiling:.0} m depth ceiling"));
            } else if end <= start {
                findings.push("No rifting occurred; the profile stayed flat".to_string());
                recommendations.push("Revisit the tectonic stress estimate for this plate".to_string());
            }
            data.push(format!(
                "{} profile(s) of {} samples each",
                sim.steps(),
                sim.initial().map_or(0, |p| p.len())
            ));
            params.push(format!("length: {} km", sim.plate().length_km));
            params.push(format!("max_depth: {} m", ceiling));
            params.push(format!("tectonic_stress: {} MPa", sim.plate().tectonic_stress_mpa));
            params.push(format!("plate_velocity: {} cm/yr", sim.plate().plate_velocity_cm_yr));
            params.push(format!("step_duration: {} years", sim.step_duration_years()));
        }

        if let Some(r) = risk {
            findings.push(format!(
                "Formation probability {:.1}% ({})",
                r.probability,
                r.level().label()
            ));
            if let Some(top) = r.dominant() {
                findings.push(format!(
                    "Largest contribution from {} ({:.0}% of score)",
                    top.location,
                    top.share * 100.0
                ));
            }
            if r.predicts_formation(self.formation_threshold) {
                recommendations.push(format!(
                    "Prioritise bathymetric survey near {}",
                    meta.location
                ));
            } else {
                recommendations.push("Continue routine seismic monitoring".to_string());
            }
            params.push(format!("formation_threshold: {}%", self.formation_threshold));
        }

        if let Some(s) = seismic {
            data.push(format!(
                "{} seismic event(s), mean magnitude {:.2}, max {:.2}, depth range {:.1} km",
                s.total_events, s.mean_magnitude, s.max_magnitude, s.depth_range_km
            ));
            if let Some(c) = s.magnitude_depth_correlation {
                data.push(format!("magnitude/depth correlation {c:.3}"));
            }
        }

        let summary = format!(
            "{} ({}), formation age {}.",
            meta.canyon_name, meta.location, meta.formation_age
        );

        Ok(format!(
            "GEOLOGICAL ANALYSIS REPORT\n\
             ==========================\n\n\
             Canyon: {}\n\
             Generated: {}\n\n\
             SUMMARY\n-------\n{}\n\n\
             KEY FINDINGS\n------------\n{}\n\n\
             DATA SUMMARY\n------------\n{}\n\n\
             RECOMMENDATIONS\n---------------\n{}\n\n\
             ANALYSIS PARAMETERS\n-------------------\n{}\n",
            meta.canyon_name,
            meta.generated_at,
            summary,
            bullets(&findings),
            lines(&data),
            bullets(&recommendations),
            lines(&params),
        ))
    }
}

fn bullets(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items.iter().map(|s| format!("* {s}")).collect::<Vec<_>>().join("\n")
}

fn lines(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items.join("\n")
}
