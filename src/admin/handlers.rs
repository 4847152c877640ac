use axum::{
    extract::State,
    middleware::from_extractor_with_state,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    admin::{
        dto::{AdminAttendanceItem, UpdateAttendanceRequest, UpdateUserRequest},
        services,
    },
    attendance::repo_types::AttendanceRecord,
    auth::{
        extractors::{AdminUser, PathId, Payload},
        repo_types::User,
    },
    dto::MessageResponse,
    error::AppResult,
    state::AppState,
};

/// Every route here sits behind the [`AdminUser`] check.
pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", put(update_user).delete(delete_user))
        .route("/admin/attendance", get(list_attendance))
        .route(
            "/admin/attendance/:id",
            put(update_attendance).delete(delete_attendance),
        )
        .route_layer(from_extractor_with_state::<AdminUser, _>(state))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(services::list_users(&state).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    PathId(id): PathId,
    Payload(payload): Payload<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    Ok(Json(services::update_user(&state, id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(services::delete_user(&state, id).await?))
}

#[instrument(skip(state))]
pub async fn list_attendance(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AdminAttendanceItem>>> {
    Ok(Json(services::list_all_attendance(&state).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_attendance(
    State(state): State<AppState>,
    PathId(id): PathId,
    Payload(payload): Payload<UpdateAttendanceRequest>,
) -> AppResult<Json<AttendanceRecord>> {
    Ok(Json(services::update_attendance(&state, id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_attendance(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<MessageResponse>> {
    Ok(Json(services::delete_attendance(&state, id).await?))
}
