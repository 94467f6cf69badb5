pub mod config;
pub mod error;
pub mod formation;
pub mod logging;
pub mod plate;
pub mod profile;
pub mod render;
pub mod report;
pub mod seismic;
pub mod stress;

use std::time::Instant;

use serde::Serialize;
use tracing::info;

pub use config::{RiskConfig, Scenario, SimConfig};
pub use error::{Error, InvalidEventError, InvalidParameterError, ReportError};
pub use formation::{FormationSimulator, SimulationRequest};
pub use plate::PlateParameters;
pub use profile::{CanyonProfile, SimulationResult};
pub use seismic::{RiskAssessment, RiskLevel, SeismicEvent, SeismicRiskAssessor, SeismicSummary};

/// Outputs of one scenario run.
#[derive(Clone, Debug, Serialize)]
pub struct Analysis {
    pub simulation: SimulationResult,
    pub risk: RiskAssessment,
    pub seismic: Option<SeismicSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Run both models on a scenario, timing each stage.
pub fn analyze(scenario: &Scenario) -> Result<(Analysis, Vec<Timing>), Error> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Build models (validates coefficient configs)
    let t = Instant::now();
    let simulator = FormationSimulator::new(scenario.simulation.clone())?;
    let assessor = SeismicRiskAssessor::new(scenario.risk.clone())?;
    timings.push(Timing {
        name: "setup",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Rifting simulation
    let t = Instant::now();
    let simulation = simulator.simulate(
        &scenario.plate,
        scenario.steps,
        scenario.step_duration_years,
    )?;
    timings.push(Timing {
        name: "formation",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 3. Seismic risk
    let t = Instant::now();
    let risk = assessor.assess(&scenario.events)?;
    let seismic = seismic::summarize(&scenario.events);
    timings.push(Timing {
        name: "seismic_risk",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });

    info!(
        steps = simulation.steps(),
        final_midpoint_depth_m = simulation.final_midpoint_depth(),
        probability = risk.probability,
        total_ms,
        "analysis complete"
    );

    Ok((
        Analysis {
            simulation,
            risk,
            seismic,
        },
        timings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        Scenario {
            plate: PlateParameters::new(500.0, 4000.0, 8.5, 3.2),
            steps: 10,
            step_duration_years: 100_000.0,
            events: vec![
                SeismicEvent::new("Portugal", 7.2, 15.0),
                SeismicEvent::new("Mid-Atlantic Ridge", 6.8, 25.0),
            ],
            simulation: SimConfig::default(),
            risk: RiskConfig::default(),
        }
    }

    #[test]
    fn runs_both_models() {
        let (a, timings) = analyze(&scenario()).unwrap();
        assert_eq!(a.simulation.steps(), 10);
        assert!(a.risk.probability > 0.0);
        assert_eq!(a.seismic.unwrap().total_events, 2);
        let names: Vec<_> = timings.iter().map(|t| t.name).collect();
        assert_eq!(names, ["setup", "formation", "seismic_risk", "TOTAL"]);
    }

    #[test]
    fn errors_are_classified() {
        let mut s = scenario();
        s.plate.length_km = -1.0;
        match analyze(&s) {
            Err(Error::Parameter(e)) => assert_eq!(e.field, "length"),
            other => panic!("unexpected {other:?}"),
        }

        let mut s = scenario();
        s.events[1].magnitude = -2.0;
        match analyze(&s) {
            Err(Error::Event(e)) => assert_eq!(e.index, 1),
            other => panic!("unexpected {other:?}"),
        }

        let mut s = scenario();
        s.simulation.samples = 4;
        assert!(matches!(analyze(&s), Err(Error::Parameter(e)) if e.field == "samples"));
    }
}
