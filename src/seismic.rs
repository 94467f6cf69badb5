use std::f64::consts::LN_10;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RiskConfig;
use crate::error::{InvalidEventError, InvalidParameterError};

/// Default probability (percent) above which new formation is predicted.
pub const DEFAULT_FORMATION_THRESHOLD: f64 = 60.0;

/// One observed earthquake.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeismicEvent {
    pub location: String,
    /// Richter-like magnitude, typically 0-10.
    pub magnitude: f64,
    /// Hypocentre depth (km).
    pub depth: f64,
}

impl SeismicEvent {
    pub fn new(location: impl Into<String>, magnitude: f64, depth: f64) -> Self {
        Self {
            location: location.into(),
            magnitude,
            depth,
        }
    }

    fn validate(&self, index: usize) -> Result<(), InvalidEventError> {
        let check = |field: &'static str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(InvalidEventError {
                    index,
                    location: self.location.clone(),
                    field,
                    reason: format!("must be finite and >= 0, got {v}"),
                })
            }
        };
        check("magnitude", self.magnitude)?;
        check("depth", self.depth)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Bucket a probability in percent.
    pub fn from_probability(p: f64) -> Self {
        let score = p / 100.0;
        if score >= 0.8 {
            RiskLevel::VeryHigh
        } else if score >= 0.6 {
            RiskLevel::High
        } else if score >= 0.4 {
            RiskLevel::Moderate
        } else if score >= 0.2 {
            RiskLevel::Low
        } else {
            RiskLevel::VeryLow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Very Low",
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

/// How much one event added to the summed score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventContribution {
    pub index: usize,
    pub location: String,
    pub score: f64,
    /// Fraction of the summed score, 0 when the sum is 0.
    pub share: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Formation probability in percent, always within [0, 100].
    pub probability: f64,
    pub contributions: Vec<EventContribution>,
}

impl RiskAssessment {
    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.probability)
    }

    pub fn predicts_formation(&self, threshold: f64) -> bool {
        self.probability >= threshold
    }

    /// Largest single contributor, if any event was scored.
    pub fn dominant(&self) -> Option<&EventContribution> {
        self.contributions
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

/// Maps a seismic catalogue to a bounded formation probability.
///
/// Event score grows exponentially with magnitude (energy release) and
/// decays exponentially with depth. The summed score is squashed with tanh,
/// so the probability is 0 for no events and never leaves [0, 100].
#[derive(Clone, Debug)]
pub struct SeismicRiskAssessor {
    config: RiskConfig,
}

impl SeismicRiskAssessor {
    pub fn new(config: RiskConfig) -> Result<Self, InvalidParameterError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn assess(&self, events: &[SeismicEvent]) -> Result<RiskAssessment, InvalidEventError> {
        // all records checked before any scoring
        for (i, e) in events.iter().enumerate() {
            e.validate(i)?;
        }

        let scores: Vec<f64> = events.iter().map(|e| self.event_score(e)).collect();

        // sorted summation makes the total independent of input order
        let mut sorted = scores.clone();
        sorted.sort_by(f64::total_cmp);
        let total: f64 = sorted.iter().sum();

        let probability = (100.0 * (total / self.config.saturation).tanh()).clamp(0.0, 100.0);
        debug!(events = events.len(), total_score = total, probability, "seismic risk assessed");

        let contributions = events
            .iter()
            .zip(scores)
            .enumerate()
            .map(|(index, (e, score))| EventContribution {
                index,
                location: e.location.clone(),
                score,
                share: if total > 0.0 && total.is_finite() {
                    score / total
                } else {
                    0.0
                },
            })
            .collect();

        Ok(RiskAssessment {
            probability,
            contributions,
        })
    }

    /// Assesses independent catalogues on the rayon pool. Results keep input order.
    pub fn assess_batch(
        &self,
        catalogues: &[Vec<SeismicEvent>],
    ) -> Vec<Result<RiskAssessment, InvalidEventError>> {
        catalogues.par_iter().map(|c| self.assess(c)).collect()
    }

    /// Computed in log space; with finite inputs this is never NaN.
    fn event_score(&self, e: &SeismicEvent) -> f64 {
        let c = &self.config;
        let ln_score = LN_10 * c.energy_exponent * (e.magnitude - c.reference_magnitude)
            - e.depth / c.depth_scale_km;
        ln_score.exp()
    }
}

/// Descriptive statistics of a catalogue.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeismicSummary {
    pub total_events: usize,
    pub mean_magnitude: f64,
    pub max_magnitude: f64,
    pub depth_range_km: f64,
    /// Pearson correlation of magnitude and depth; None when either has zero variance.
    pub magnitude_depth_correlation: Option<f64>,
}

pub fn summarize(events: &[SeismicEvent]) -> Option<SeismicSummary> {
    if events.is_empty() {
        return None;
    }
    let mags: Vec<f64> = events.iter().map(|e| e.magnitude).collect();
    let depths: Vec<f64> = events.iter().map(|e| e.depth).collect();
    let max_mag = mags.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_depth = depths.iter().copied().fold(f64::INFINITY, f64::min);
    let max_depth = depths.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(SeismicSummary {
        total_events: events.len(),
        mean_magnitude: running_mean(&mags),
        max_magnitude: max_mag,
        depth_range_km: max_depth - min_depth,
        magnitude_depth_correlation: correlation(&mags, &depths),
    })
}

/// Incremental mean; stays finite for any finite input.
fn running_mean(values: &[f64]) -> f64 {
    values
        .iter()
        .enumerate()
        .fold(0.0, |mean, (i, &x)| mean + (x - mean) / (i + 1) as f64)
}

/// Divides by the largest magnitude so squared deviations stay within `[0, 4]`.
fn normalized(values: &[f64]) -> Vec<f64> {
    let scale = values.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    if scale == 0.0 {
        return values.to_vec();
    }
    values.iter().map(|x| x / scale).collect()
}

/// Pearson correlation, or None when either series has zero variance or the
/// result is not finite.
fn correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let xs = normalized(xs);
    let ys = normalized(ys);
    let (mx, my) = (running_mean(&xs), running_mean(&ys));

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if !(sxx > 0.0 && syy > 0.0) {
        return None;
    }
    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
