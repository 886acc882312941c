// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP surface over the queue producers.
//!
//! Write requests are queued and then waited on with the sync poll. The
//! response says whether the change is already visible; a change that is
//! not stays queued and is applied by the worker later.

use axum::{
    Json, Router,
    extract::{FromRef, Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kampcomp_api::{
    Aanvrager, ApiError, DeelnameActie, DeelnameRequest, FaseResponse, LimietRequest,
    MutationStatus, PollSchedule, ProcessedResponse, RequestOutcome, Rol, fase_overzicht,
    mutation_status, request_cut_change, request_deelname_change,
};
use kampcomp_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Date, OffsetDateTime};
use tokio::sync::{Mutex, broadcast};
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::events::{QueueEvent, QueueEvents, queue_events_handler, wait_for_processed};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The persistence layer, shared with the in-process worker.
    pub persistence: Arc<Mutex<Persistence>>,
    /// Queue notifications.
    pub events: Arc<QueueEvents>,
    /// How long write requests wait for the worker.
    pub poll: PollSchedule,
}

impl FromRef<AppState> for Arc<QueueEvents> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.events)
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::WrongPhase { .. } => StatusCode::CONFLICT,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn parse_aanvrager(door: &str, rol: &str) -> Result<Aanvrager, ApiError> {
    let rol: Rol = rol.parse()?;
    Ok(Aanvrager::new(door, rol)?)
}

/// Announces a queued mutation and waits for the worker to apply it.
///
/// Each poll interval ends early when the worker announces the mutation;
/// the queue row is checked either way.
async fn wacht_op_verwerking(
    app_state: &AppState,
    rx: &mut broadcast::Receiver<QueueEvent>,
    outcome: RequestOutcome,
) -> Result<ProcessedResponse, HttpError> {
    let RequestOutcome::Queued { mutatie_id } = outcome else {
        return Ok(ProcessedResponse {
            mutatie_id: None,
            processed: true,
        });
    };

    app_state
        .events
        .broadcast(&QueueEvent::Queued { mutatie_id });

    for interval in app_state.poll.intervals() {
        let gemeld: bool = timeout(interval, wait_for_processed(rx, mutatie_id))
            .await
            .is_ok();
        let processed: bool = app_state
            .persistence
            .lock()
            .await
            .is_processed(mutatie_id)
            .map_err(ApiError::from)?;
        if processed {
            debug!(mutatie_id, gemeld, "Mutation processed while waiting");
            return Ok(ProcessedResponse {
                mutatie_id: Some(mutatie_id),
                processed: true,
            });
        }
    }

    info!(mutatie_id, "Mutation still queued after waiting");
    Ok(ProcessedResponse {
        mutatie_id: Some(mutatie_id),
        processed: false,
    })
}

async fn handle_deelname(
    app_state: AppState,
    deelnemer_id: i64,
    req: DeelnameRequest,
    actie: DeelnameActie,
) -> Result<Json<ProcessedResponse>, HttpError> {
    info!(
        door = %req.door,
        rol = %req.rol,
        deelnemer_id,
        ?actie,
        "Handling deelname request"
    );

    let aanvrager: Aanvrager = parse_aanvrager(&req.door, &req.rol)?;
    let mut rx: broadcast::Receiver<QueueEvent> = app_state.events.subscribe();

    let mut persistence = app_state.persistence.lock().await;
    let outcome: RequestOutcome =
        request_deelname_change(&mut persistence, &aanvrager, deelnemer_id, actie, today())?;
    drop(persistence);

    Ok(Json(wacht_op_verwerking(&app_state, &mut rx, outcome).await?))
}

/// Handler for POST `/deelnemer/{id}/afmelden`.
async fn handle_afmelden(
    AxumState(app_state): AxumState<AppState>,
    Path(deelnemer_id): Path<i64>,
    Json(req): Json<DeelnameRequest>,
) -> Result<Json<ProcessedResponse>, HttpError> {
    handle_deelname(app_state, deelnemer_id, req, DeelnameActie::Afmelden).await
}

/// Handler for POST `/deelnemer/{id}/aanmelden`.
async fn handle_aanmelden(
    AxumState(app_state): AxumState<AppState>,
    Path(deelnemer_id): Path<i64>,
    Json(req): Json<DeelnameRequest>,
) -> Result<Json<ProcessedResponse>, HttpError> {
    handle_deelname(app_state, deelnemer_id, req, DeelnameActie::Bevestigen).await
}

/// Handler for POST `/kampioenschap/{id}/limiet`.
async fn handle_limiet(
    AxumState(app_state): AxumState<AppState>,
    Path(kampioenschap_id): Path<i64>,
    Json(req): Json<LimietRequest>,
) -> Result<Json<ProcessedResponse>, HttpError> {
    info!(
        door = %req.door,
        rol = %req.rol,
        kampioenschap_id,
        indiv_klasse_id = req.indiv_klasse_id,
        limiet = %req.limiet,
        "Handling limiet request"
    );

    let aanvrager: Aanvrager = parse_aanvrager(&req.door, &req.rol)?;
    let mut rx: broadcast::Receiver<QueueEvent> = app_state.events.subscribe();

    let mut persistence = app_state.persistence.lock().await;
    let outcome: RequestOutcome = request_cut_change(
        &mut persistence,
        &aanvrager,
        kampioenschap_id,
        req.indiv_klasse_id,
        &req.limiet,
        today(),
    )?;
    drop(persistence);

    Ok(Json(wacht_op_verwerking(&app_state, &mut rx, outcome).await?))
}

/// Handler for GET `/competitie/{id}/fase`.
async fn handle_get_fase(
    AxumState(app_state): AxumState<AppState>,
    Path(competitie_id): Path<i64>,
) -> Result<Json<FaseResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: FaseResponse = fase_overzicht(&mut persistence, competitie_id, today())?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for GET `/mutatie/{id}`.
async fn handle_get_mutatie(
    AxumState(app_state): AxumState<AppState>,
    Path(mutatie_id): Path<i64>,
) -> Result<Json<MutationStatus>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let status: MutationStatus = mutation_status(&mut persistence, mutatie_id)?;
    drop(persistence);
    Ok(Json(status))
}

/// Builds the application router with all endpoints.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/competitie/{id}/fase", get(handle_get_fase))
        .route("/deelnemer/{id}/afmelden", post(handle_afmelden))
        .route("/deelnemer/{id}/aanmelden", post(handle_aanmelden))
        .route("/kampioenschap/{id}/limiet", post(handle_limiet))
        .route("/mutatie/{id}", get(handle_get_mutatie))
        .route("/events", get(queue_events_handler))
        .with_state(app_state)
}
