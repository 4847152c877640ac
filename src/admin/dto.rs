use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::attendance::repo_types::{AttendanceRecord, AttendanceWithUser};
use crate::auth::repo_types::Role;
use crate::dto::nullable_timestamp;

/// `PUT /admin/users/:id`; provided fields are applied as given.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// `PUT /admin/attendance/:id`; `logoutAt: null` reopens the record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendanceRequest {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub login_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "nullable_timestamp")]
    pub logout_at: Option<Option<OffsetDateTime>>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Attendance row as shown in the admin panel; `user` is null for
/// records whose owner was deleted.
#[derive(Debug, Serialize)]
pub struct AdminAttendanceItem {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub user: Option<UserSummary>,
}

impl From<AttendanceWithUser> for AdminAttendanceItem {
    fn from(row: AttendanceWithUser) -> Self {
        let user = match (row.user_name, row.user_email) {
            (Some(name), Some(email)) => Some(UserSummary {
                id: row.record.user_id,
                name,
                email,
            }),
            _ => None,
        };
        Self {
            record: row.record,
            user,
        }
    }
}
