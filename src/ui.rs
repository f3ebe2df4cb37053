// src/ui.rs
use crate::config::GravityPreset; // Named surface-gravity presets
use crate::error::SimError; // Error taxonomy mapped onto HTTP statuses below
use crate::logic::Simulation; // The single owner of all simulation state
use crate::pendulum::PendulumPatch; // Partial field edits
use crate::render::{png_data_url, render_png, scene}; // Server-side frame rendering
use actix_web::http::StatusCode; // Status codes for error responses
use actix_web::{web, HttpResponse, ResponseError}; // Actix-web types for request handling and HTTP responses
use log::error; // Structured logging
use serde::de::DeserializeOwned; // Bound for JSON overlays
use serde::{Deserialize, Serialize}; // Serde traits for JSON (de)serialization
use std::sync::{Mutex, MutexGuard}; // One writer at a time: frame driver or request handler
use std::time::Duration; // Frame pacing period
use tokio::time::{interval, Instant, MissedTickBehavior}; // Frame pacing timer

/// Shared handle to the simulation, registered as app data.
pub type SharedSimulation = web::Data<Mutex<Simulation>>;

type HandlerResult = Result<HttpResponse, SimError>;

#[derive(Serialize)]
struct ErrorBody {
    success: bool, // Always false
    error: String, // Human-readable cause
}

impl ResponseError for SimError {
    fn status_code(&self) -> StatusCode {
        match self {
            SimError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
            SimError::InvalidParameter(_) | SimError::Json(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: self.to_string(),
        })
    }
}

#[derive(Serialize)]
struct Ack {
    success: bool, // Whether the command was applied
}

#[derive(Serialize)]
struct Spawned {
    success: bool,
    index: usize, // Index of the new pendulum (valid until a deletion at or before it)
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    remaining: usize, // Pendulums left after the deletion
}

#[derive(Serialize)]
struct Stepped {
    success: bool,
    substeps: usize,      // Fixed sub-steps the clock took
    elapsed_seconds: f64, // Total simulated time so far
}

#[derive(Serialize)]
struct FrameResponse {
    success: bool,
    image: String, // Base64-encoded PNG data URL
}

#[derive(Serialize)]
struct PresetInfo {
    name: GravityPreset,
    gravity: f64, // m/s²
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrozenRequest {
    frozen: bool,
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ParamsUpdate {
    gravity: Option<f64>,           // Explicit gravity wins over a preset
    damping: Option<f64>,           // Linear damping coefficient
    preset: Option<GravityPreset>,  // Applied first when present
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepRequest {
    seconds: f64, // Wall time to consume through the clock
}

#[derive(Deserialize)]
pub struct FrameQuery {
    width: Option<u32>,  // Defaults to 800
    height: Option<u32>, // Defaults to 600
}

fn lock(state: &SharedSimulation) -> Result<MutexGuard<'_, Simulation>, SimError> {
    state.lock().map_err(|_| SimError::LockPoisoned)
}

/// Overlays the fields of a JSON object body onto `base`; an empty body yields `base` unchanged.
fn overlay<T: Serialize + DeserializeOwned + Clone>(base: &T, body: &[u8]) -> Result<T, SimError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(base.clone());
    }
    let mut merged = serde_json::to_value(base)?; // Start from the configured defaults
    let fields: serde_json::Value = serde_json::from_slice(body)?; // Caller overrides
    match (merged.as_object_mut(), fields) {
        (Some(target), serde_json::Value::Object(fields)) => target.extend(fields),
        _ => {
            return Err(SimError::InvalidParameter(
                "request body must be a JSON object".to_string(),
            ))
        }
    }
    Ok(serde_json::from_value(merged)?) // Unknown keys are rejected here
}

async fn get_state(state: SharedSimulation) -> HandlerResult {
    let sim = lock(&state)?;
    Ok(HttpResponse::Ok().json(sim.snapshot()))
}

async fn spawn_single(state: SharedSimulation, body: web::Bytes) -> HandlerResult {
    let mut sim = lock(&state)?;
    let spawn = overlay(&sim.single_defaults, &body)?;
    let index = sim.pendulums.spawn_single(&spawn)?;
    Ok(HttpResponse::Ok().json(Spawned { success: true, index }))
}

async fn spawn_double(state: SharedSimulation, body: web::Bytes) -> HandlerResult {
    let mut sim = lock(&state)?;
    let spawn = overlay(&sim.double_defaults, &body)?;
    let index = sim.pendulums.spawn_double(&spawn)?;
    Ok(HttpResponse::Ok().json(Spawned { success: true, index }))
}

async fn delete_all(state: SharedSimulation) -> HandlerResult {
    lock(&state)?.pendulums.delete_all();
    Ok(HttpResponse::Ok().json(Deleted { success: true, remaining: 0 }))
}

async fn delete_at(state: SharedSimulation, index: web::Path<usize>) -> HandlerResult {
    let mut sim = lock(&state)?;
    sim.pendulums.delete_at(index.into_inner())?;
    Ok(HttpResponse::Ok().json(Deleted {
        success: true,
        remaining: sim.pendulums.len(),
    }))
}

async fn reset_at(state: SharedSimulation, index: web::Path<usize>) -> HandlerResult {
    lock(&state)?.pendulums.reset_at(index.into_inner())?;
    Ok(HttpResponse::Ok().json(Ack { success: true }))
}

async fn set_frozen(
    state: SharedSimulation,
    index: web::Path<usize>,
    body: web::Json<FrozenRequest>,
) -> HandlerResult {
    lock(&state)?
        .pendulums
        .set_frozen(index.into_inner(), body.frozen)?;
    Ok(HttpResponse::Ok().json(Ack { success: true }))
}

async fn patch_pendulum(
    state: SharedSimulation,
    index: web::Path<usize>,
    patch: web::Json<PendulumPatch>,
) -> HandlerResult {
    lock(&state)?
        .pendulums
        .get_mut(index.into_inner())?
        .apply(&patch)?;
    Ok(HttpResponse::Ok().json(Ack { success: true }))
}

async fn update_params(state: SharedSimulation, update: web::Json<ParamsUpdate>) -> HandlerResult {
    let params = lock(&state)?.update_params(update.preset, update.gravity, update.damping)?;
    Ok(HttpResponse::Ok().json(params))
}

async fn list_presets() -> HttpResponse {
    let presets: Vec<PresetInfo> = GravityPreset::ALL
        .iter()
        .map(|&name| PresetInfo {
            name,
            gravity: name.gravity(),
        })
        .collect();
    HttpResponse::Ok().json(presets)
}

async fn step(state: SharedSimulation, request: web::Json<StepRequest>) -> HandlerResult {
    let mut sim = lock(&state)?;
    let substeps = sim.advance(request.seconds);
    Ok(HttpResponse::Ok().json(Stepped {
        success: true,
        substeps,
        elapsed_seconds: sim.elapsed_seconds(),
    }))
}

async fn frame(state: SharedSimulation, query: web::Query<FrameQuery>) -> HandlerResult {
    // Copy the draw list out so rasterisation runs without holding the lock.
    let primitives = scene(&lock(&state)?.pendulums);
    let png = render_png(
        &primitives,
        query.width.unwrap_or(800),
        query.height.unwrap_or(600),
    )?;
    Ok(HttpResponse::Ok().json(FrameResponse {
        success: true,
        image: png_data_url(&png),
    }))
}

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/state", web::get().to(get_state))
            .route("/presets", web::get().to(list_presets))
            .route("/params", web::put().to(update_params))
            .route("/step", web::post().to(step))
            .route("/frame", web::get().to(frame))
            .route("/pendulums", web::delete().to(delete_all))
            .route("/pendulums/single", web::post().to(spawn_single))
            .route("/pendulums/double", web::post().to(spawn_double))
            .service(
                web::resource("/pendulums/{index}")
                    .route(web::delete().to(delete_at))
                    .route(web::patch().to(patch_pendulum)),
            )
            .route("/pendulums/{index}/reset", web::post().to(reset_at))
            .route("/pendulums/{index}/frozen", web::put().to(set_frozen)),
    );
}

/// Frame pacing: feeds the measured wall time between ticks into the simulation clock.
/// Every request handler takes the same lock, so edits and deletions land between frames.
pub async fn drive_frames(state: SharedSimulation, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay); // A stalled tick shows up as a long frame
    let mut last = Instant::now();
    loop {
        ticker.tick().await;
        let now = Instant::now();
        let frame_seconds = now.duration_since(last).as_secs_f64();
        last = now;
        match state.lock() {
            Ok(mut sim) => {
                sim.advance(frame_seconds);
            }
            Err(_) => {
                error!("simulation lock poisoned; frame driver stopping");
                break;
            }
        }
    }
}
