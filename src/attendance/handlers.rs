use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    attendance::{repo_types::AttendanceRecord, services},
    auth::extractors::{AuthUser, ClientMeta},
    error::AppResult,
    state::AppState,
};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/attendance/my", get(my_attendance))
        .route("/attendance/login", post(mark_login))
        .route("/attendance/logout", post(mark_logout))
}

#[instrument(skip(state))]
pub async fn my_attendance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<AttendanceRecord>>> {
    let rows = services::my_attendance(&state, user_id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, meta))]
pub async fn mark_login(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    meta: ClientMeta,
) -> AppResult<(StatusCode, Json<AttendanceRecord>)> {
    let rec = services::open_record(&state, user_id, meta).await?;
    Ok((StatusCode::CREATED, Json(rec)))
}

#[instrument(skip(state))]
pub async fn mark_logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<AttendanceRecord>> {
    let rec = services::mark_logout(&state, user_id).await?;
    Ok(Json(rec))
}
