use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    attendance::repo_types::{AttendanceRecord, NewAttendance},
    auth::extractors::ClientMeta,
    error::{AppError, AppResult},
    state::AppState,
};

/// Opens a new record stamped now. Earlier open records are left alone.
pub async fn open_record(
    st: &AppState,
    user_id: Uuid,
    meta: ClientMeta,
) -> AppResult<AttendanceRecord> {
    let rec = st
        .attendance
        .insert(NewAttendance {
            user_id,
            login_at: OffsetDateTime::now_utc(),
            user_agent: meta.user_agent,
            ip: meta.ip,
        })
        .await?;
    info!(user_id = %user_id, attendance_id = %rec.id, "attendance opened");
    Ok(rec)
}

/// Closes the user's most recent open record, if any.
pub async fn close_latest(st: &AppState, user_id: Uuid) -> AppResult<Option<AttendanceRecord>> {
    let closed = st
        .attendance
        .close_latest_open(user_id, OffsetDateTime::now_utc())
        .await?;
    match &closed {
        Some(rec) => info!(user_id = %user_id, attendance_id = %rec.id, "attendance closed"),
        None => debug!(user_id = %user_id, "no open attendance to close"),
    }
    Ok(closed)
}

pub async fn my_attendance(st: &AppState, user_id: Uuid) -> AppResult<Vec<AttendanceRecord>> {
    Ok(st.attendance.list_for_user(user_id).await?)
}

pub async fn mark_logout(st: &AppState, user_id: Uuid) -> AppResult<AttendanceRecord> {
    close_latest(st, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No open attendance record".into()))
}
