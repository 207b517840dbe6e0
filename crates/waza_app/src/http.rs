//! HTTP surface: axum router and handlers over the application services.

use axum::debug_handler;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{MacroAggregator, MacroTotals};
use crate::profile::{ProfileResolver, Resolution};
use crate::session::SessionContext;
use crate::trainers::{TrainerCard, TrainerMarketplace};
use crate::users::{NewUserRequest, UserDirectory};
use crate::workouts::{ExerciseDraft, WorkoutLog};
use crate::{AppError, AppResult};
use waza_client::{Exercise, NutrientLookup, UserAccount, UserType, WazaApiClient};

pub struct AppState {
    pub aggregator: MacroAggregator,
    pub resolver: ProfileResolver,
    pub directory: UserDirectory,
    pub workouts: WorkoutLog,
    pub marketplace: TrainerMarketplace,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        client: Arc<dyn WazaApiClient>,
        nutrients: Arc<dyn NutrientLookup>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            aggregator: MacroAggregator::new(client.clone(), nutrients),
            resolver: ProfileResolver::new(client.clone()),
            directory: UserDirectory::new(client.clone()),
            workouts: WorkoutLog::new(client.clone()),
            marketplace: TrainerMarketplace::new(client),
            metrics,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/profile", get(get_profile))
        .route("/api/dashboard/macros", get(get_macros))
        .route("/api/users", post(create_user))
        .route("/api/warrior/exercise", post(create_exercise))
        .route("/api/trainers", get(list_trainers))
        .layer(tower_http::timeout::TimeoutLayer::new(Duration::from_secs(30)))
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .with_state(state)
}

#[debug_handler]
async fn health() -> impl IntoResponse {
    let readiness = waza_client::observability::Health::readiness();
    if readiness.ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [("content-type", "text/plain; version=0.0.4")],
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Resolve the session described by the query parameters into a profile.
/// An absent profile answers 404 with the completion route (first
/// resolution only), mirroring the resolver's at-most-one-redirect rule.
#[debug_handler]
async fn get_profile(
    State(state): State<Arc<AppState>>,
    axum::extract::Query(params): axum::extract::Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let user_id = require_param(&params, "user_id")?;
    let user_type = parse_user_type(require_param(&params, "user_type")?).map_err(map_err)?;
    let session_id = params
        .get("session_id")
        .cloned()
        .unwrap_or_else(|| user_id.to_string());
    let session = SessionContext::new(session_id, user_id, user_type, false);

    match state.resolver.resolve(&session).await.map_err(map_err)? {
        Resolution::Warrior(p) => Ok(Json(serde_json::json!({
            "user_type": UserType::WazaWarrior.as_str(),
            "warrior": p,
        }))),
        Resolution::Trainer(p) => Ok(Json(serde_json::json!({
            "user_type": UserType::WazaTrainer.as_str(),
            "trainer": p,
        }))),
        Resolution::Incomplete { redirect } => {
            let body = serde_json::json!({ "redirect": redirect });
            Err((StatusCode::NOT_FOUND, body.to_string()))
        }
    }
}

#[debug_handler]
async fn get_macros(
    State(state): State<Arc<AppState>>,
    axum::extract::Query(params): axum::extract::Query<HashMap<String, String>>,
) -> Result<Json<MacroTotals>, (StatusCode, String)> {
    let warrior_id = require_param(&params, "warrior_id")?;
    let date = parse_day(require_param(&params, "date")?).map_err(map_err)?;
    let totals = state
        .aggregator
        .compute_macro_totals(warrior_id, date)
        .await
        .map_err(map_err)?;
    Ok(Json(totals))
}

#[debug_handler]
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<UserAccount>), (StatusCode, String)> {
    let account = state.directory.provision_user(req).await.map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[debug_handler]
async fn create_exercise(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ExerciseDraft>,
) -> Result<(StatusCode, Json<Exercise>), (StatusCode, String)> {
    let exercise = state.workouts.log_exercise(draft).await.map_err(map_err)?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

#[debug_handler]
async fn list_trainers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TrainerCard>>, (StatusCode, String)> {
    let cards = state
        .marketplace
        .list_trainer_cards()
        .await
        .map_err(map_err)?;
    Ok(Json(cards))
}

fn require_param<'a>(
    params: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, (StatusCode, String)> {
    params
        .get(name)
        .map(|s| s.as_str())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("missing {name} parameter")))
}

fn parse_user_type(s: &str) -> AppResult<UserType> {
    match s {
        "Waza Warrior" => Ok(UserType::WazaWarrior),
        "Waza Trainer" | "Waza Master" => Ok(UserType::WazaTrainer),
        other => Err(AppError::Validation(format!(
            "Invalid user_type: {other}. User type must be Waza Warrior or Waza Trainer"
        ))),
    }
}

/// Normalize a date parameter to a calendar day. Accepts `YYYY-MM-DD`,
/// RFC3339, or a naive `YYYY-MM-DDTHH:MM:SS`; time of day is ignored.
pub fn parse_day(s: &str) -> AppResult<chrono::NaiveDate> {
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ndt.date());
    }
    Err(AppError::Validation(format!("invalid date: {s}")))
}

fn map_err(e: AppError) -> (StatusCode, String) {
    let status = match &e {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::Api(inner) => match inner {
            waza_client::ClientError::NotFound(_) => StatusCode::NOT_FOUND,
            waza_client::ClientError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        },
        AppError::Serialization(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
