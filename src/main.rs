//! canyonsim CLI - canyon formation and seismic risk modelling.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use tracing::{error, info};

use canyonsim::logging::{self, LogFormat};
use canyonsim::render;
use canyonsim::report::{ReportGenerator, ReportMetadata};
use canyonsim::{
    Error, FormationSimulator, PlateParameters, RiskConfig, Scenario, SeismicEvent,
    SeismicRiskAssessor, SimConfig, SimulationResult,
};

#[derive(Parser)]
#[command(name = "canyonsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log output format (stderr).
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate canyon deepening for one plate.
    Simulate {
        /// Plate length (km).
        #[arg(long)]
        length: f64,

        /// Depth ceiling (m).
        #[arg(long)]
        depth: f64,

        /// Tectonic stress (MPa).
        #[arg(long)]
        tectonic_stress: f64,

        /// Plate velocity (cm/yr); negative for convergence.
        #[arg(long, allow_hyphen_values = true)]
        plate_velocity: f64,

        /// Number of profiles to produce, baseline included.
        #[arg(long, default_value = "10")]
        steps: usize,

        /// Model years per step.
        #[arg(long, default_value = "100000")]
        step_years: f64,

        /// JSON file with rifting coefficients.
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Score a JSON list of seismic events and print the assessment.
    Assess {
        /// JSON array of {location, magnitude, depth}.
        events: PathBuf,

        /// JSON file with risk coefficients.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a full scenario file and write images, results and a report.
    Analyze {
        /// Scenario JSON.
        scenario: PathBuf,

        #[arg(long, default_value = "Unnamed canyon")]
        canyon_name: String,

        #[arg(long, default_value = "unknown")]
        formation_age: String,

        #[arg(long, default_value = "unspecified")]
        location: String,

        #[command(flatten)]
        out: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output directory.
    #[arg(short, long, default_value = "artifacts")]
    output: PathBuf,

    /// Image width in pixels.
    #[arg(long, default_value = "800")]
    width: usize,

    /// Image height in pixels.
    #[arg(long, default_value = "400")]
    height: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format, "info");

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Error> {
    match command {
        Commands::Simulate {
            length,
            depth,
            tectonic_stress,
            plate_velocity,
            steps,
            step_years,
            config,
            out,
        } => {
            let cfg: SimConfig = read_optional_json(config.as_deref())?;
            let plate = PlateParameters::new(length, depth, tectonic_stress, plate_velocity);
            let result = FormationSimulator::new(cfg)?.simulate(&plate, steps, step_years)?;
            info!(
                steps = result.steps(),
                final_midpoint_depth_m = result.final_midpoint_depth(),
                "simulation finished"
            );
            std::fs::create_dir_all(&out.output)?;
            write_simulation(&result, &out)?;
            write_json(&out.output.join("result.json"), &result)?;
        }
        Commands::Assess { events, config } => {
            let cfg: RiskConfig = read_optional_json(config.as_deref())?;
            let events: Vec<SeismicEvent> = read_json(&events)?;
            let assessment = SeismicRiskAssessor::new(cfg)?.assess(&events)?;
            info!(
                probability = assessment.probability,
                level = assessment.level().label(),
                "assessment finished"
            );
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
        Commands::Analyze {
            scenario,
            canyon_name,
            formation_age,
            location,
            out,
        } => {
            let scenario: Scenario = read_json(&scenario)?;
            let (analysis, timings) = canyonsim::analyze(&scenario)?;

            info!("timings:");
            for t in &timings {
                info!("  {:20} {:8.3} ms", t.name, t.ms);
            }

            std::fs::create_dir_all(&out.output)?;
            write_simulation(&analysis.simulation, &out)?;
            write_json(&out.output.join("result.json"), &analysis)?;

            let meta = ReportMetadata {
                canyon_name,
                formation_age,
                location,
                generated_at: format!(
                    "unix:{}",
                    SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0)
                ),
            };
            let report = ReportGenerator::new().generate(
                &meta,
                Some(&analysis.simulation),
                Some(&analysis.risk),
                analysis.seismic.as_ref(),
            )?;
            let path = out.output.join("report.txt");
            std::fs::write(&path, report)?;
            info!("saved {}", path.display());
        }
    }
    Ok(())
}

fn write_simulation(result: &SimulationResult, out: &OutputArgs) -> Result<(), Error> {
    let (w, h) = (out.width, out.height);
    if let Some(last) = result.final_profile() {
        let path = out.output.join("profile.png");
        let rgba = render::render_profile(last, result.plate().max_depth_m, w, h);
        render::save_png(&path, &rgba, w, h)?;
        info!("saved {}", path.display());
    }
    let path = out.output.join("heatmap.png");
    render::save_png(&path, &render::render_heatmap(result, w, h), w, h)?;
    info!("saved {}", path.display());
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn read_optional_json<T: serde::de::DeserializeOwned + Default>(
    path: Option<&Path>,
) -> Result<T, Error> {
    match path {
        Some(p) => read_json(p),
        None => Ok(T::default()),
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    info!("saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_velocity_parses() {
        let cli = Cli::try_parse_from([
            "canyonsim",
            "simulate",
            "--length",
            "500",
            "--depth",
            "4000",
            "--tectonic-stress",
            "8.5",
            "--plate-velocity",
            "-3.2",
        ])
        .unwrap();
        let Commands::Simulate {
            plate_velocity,
            steps,
            step_years,
            out,
            ..
        } = cli.command
        else {
            panic!("expected simulate");
        };
        assert_eq!(plate_velocity, -3.2);
        assert_eq!(steps, 10);
        assert_eq!(step_years, 100_000.0);
        assert_eq!(out.output, PathBuf::from("artifacts"));
    }

    #[test]
    fn missing_plate_field_is_rejected() {
        let err = Cli::try_parse_from(["canyonsim", "simulate", "--length", "500"]);
        assert!(err.is_err());
    }

    #[test]
    fn assess_and_analyze_parse() {
        let cli = Cli::try_parse_from(["canyonsim", "assess", "events.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Assess { ref events, config: None } if events == Path::new("events.json")
        ));

        let cli = Cli::try_parse_from([
            "canyonsim",
            "--log-format",
            "json",
            "analyze",
            "scenario.json",
            "-o",
            "out",
            "--canyon-name",
            "Nazaré",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::Analyze {
            canyon_name, out, ..
        } = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(canyon_name, "Nazaré");
        assert_eq!(out.output, PathBuf::from("out"));
        assert_eq!((out.width, out.height), (800, 400));
    }
}
