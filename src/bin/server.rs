use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::post};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use canyonsim::logging::{self, LogFormat};
use canyonsim::render;
use canyonsim::{
    Error, FormationSimulator, PlateParameters, RiskAssessment, RiskConfig, RiskLevel, Scenario,
    SeismicEvent, SeismicRiskAssessor, SeismicSummary, SimConfig, SimulationResult,
};

const DEFAULT_WIDTH: usize = 800;
const DEFAULT_HEIGHT: usize = 400;
const MAX_PIXELS: usize = 4096 * 4096;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SimulateRequest {
    plate: PlateParameters,
    steps: usize,
    step_duration_years: f64,
    #[serde(default)]
    simulation: SimConfig,
    width: Option<usize>,
    height: Option<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AssessRequest {
    events: Vec<SeismicEvent>,
    #[serde(default)]
    risk: RiskConfig,
}

#[derive(Serialize)]
struct SimulateResponse {
    result: SimulationResult,
    layers: Vec<Layer>,
    width: usize,
    height: usize,
}

#[derive(Serialize)]
struct AssessResponse {
    assessment: RiskAssessment,
    level: RiskLevel,
    summary: Option<SeismicSummary>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    simulation: SimulationResult,
    assessment: RiskAssessment,
    level: RiskLevel,
    summary: Option<SeismicSummary>,
    layers: Vec<Layer>,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

/// Validation failures become 422, everything else 500.
struct ApiError(StatusCode, String);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match e {
            Error::Parameter(_) | Error::Event(_) | Error::Report(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.0, "{}", self.1);
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

fn image_size(width: Option<usize>, height: Option<usize>) -> Result<(usize, usize), ApiError> {
    let w = width.unwrap_or(DEFAULT_WIDTH);
    let h = height.unwrap_or(DEFAULT_HEIGHT);
    if w == 0 || h == 0 || w.saturating_mul(h) > MAX_PIXELS {
        return Err(ApiError(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("image size {w}x{h} out of range"),
        ));
    }
    Ok((w, h))
}

fn data_url(rgba: &[u8], w: usize, h: usize) -> Result<String, Error> {
    let png = render::encode_png(rgba, w, h)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn layers(result: &SimulationResult, w: usize, h: usize) -> Result<Vec<Layer>, Error> {
    let mut out = Vec::with_capacity(2);
    if let Some(last) = result.final_profile() {
        out.push(Layer {
            name: "profile".into(),
            data_url: data_url(
                &render::render_profile(last, result.plate().max_depth_m, w, h),
                w,
                h,
            )?,
        });
    }
    out.push(Layer {
        name: "heatmap".into(),
        data_url: data_url(&render::render_heatmap(result, w, h), w, h)?,
    });
    Ok(out)
}

async fn simulate_handler(
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let (width, height) = image_size(req.width, req.height)?;

    let response = tokio::task::spawn_blocking(move || -> Result<SimulateResponse, Error> {
        let result = FormationSimulator::new(req.simulation)?.simulate(
            &req.plate,
            req.steps,
            req.step_duration_years,
        )?;
        let layers = layers(&result, width, height)?;
        Ok(SimulateResponse {
            result,
            layers,
            width,
            height,
        })
    })
    .await??;

    Ok(Json(response))
}

async fn assess_handler(Json(req): Json<AssessRequest>) -> Result<Json<AssessResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || -> Result<AssessResponse, Error> {
        let assessment = SeismicRiskAssessor::new(req.risk)?.assess(&req.events)?;
        Ok(AssessResponse {
            level: assessment.level(),
            summary: canyonsim::seismic::summarize(&req.events),
            assessment,
        })
    })
    .await??;

    Ok(Json(response))
}

async fn analyze_handler(Json(scenario): Json<Scenario>) -> Result<Json<AnalyzeResponse>, ApiError> {
    let (width, height) = image_size(None, None)?;

    let response = tokio::task::spawn_blocking(move || -> Result<AnalyzeResponse, Error> {
        let (analysis, timings) = canyonsim::analyze(&scenario)?;
        let layers = layers(&analysis.simulation, width, height)?;
        Ok(AnalyzeResponse {
            level: analysis.risk.level(),
            simulation: analysis.simulation,
            assessment: analysis.risk,
            summary: analysis.seismic,
            layers,
            timings: timings
                .iter()
                .map(|t| TimingEntry {
                    name: t.name.to_string(),
                    ms: t.ms,
                })
                .collect(),
        })
    })
    .await??;

    Ok(Json(response))
}

fn app() -> Router {
    Router::new()
        .route("/api/simulate", post(simulate_handler))
        .route("/api/assess", post(assess_handler))
        .route("/api/analyze", post(analyze_handler))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    logging::init(LogFormat::Compact, "info");

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("canyonsim server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app()).await
}
