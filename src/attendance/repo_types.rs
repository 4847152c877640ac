use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One login/logout pair. `logout_at` is `None` while the session is open.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub login_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub logout_at: Option<OffsetDateTime>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.logout_at.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub user_id: Uuid,
    pub login_at: OffsetDateTime,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

/// Attendance row joined with its owner; the user columns are `NULL`
/// once the owner has been deleted.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceWithUser {
    #[sqlx(flatten)]
    pub record: AttendanceRecord,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}
