use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    admin::dto::{AdminAttendanceItem, UpdateAttendanceRequest, UpdateUserRequest},
    attendance::repo_types::AttendanceRecord,
    auth::{
        repo_types::{User, UserChanges},
        services::{checked_email, non_blank, present},
    },
    dto::MessageResponse,
    error::{AppError, AppResult},
    state::AppState,
};

pub async fn list_users(st: &AppState) -> AppResult<Vec<User>> {
    Ok(st.users.list().await?)
}

pub async fn update_user(st: &AppState, id: Uuid, req: UpdateUserRequest) -> AppResult<User> {
    let email = match present(req.email) {
        Some(raw) => Some(checked_email(&raw)?),
        None => None,
    };
    if let Some(email) = email.as_deref() {
        if let Some(other) = st.users.find_by_email(email).await? {
            if other.id != id {
                warn!(user_id = %id, email = %email, "admin edit email already in use");
                return Err(AppError::Conflict("Email already in use".into()));
            }
        }
    }

    let changes = UserChanges {
        name: non_blank(req.name, "Name")?,
        email,
        password_hash: None,
        role: req.role,
    };
    let user = st
        .users
        .update(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!(user_id = %id, role = ?user.role, "user updated by admin");
    Ok(user)
}

/// Attendance and task rows of the user are kept.
pub async fn delete_user(st: &AppState, id: Uuid) -> AppResult<MessageResponse> {
    if !st.users.delete(id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(user_id = %id, "user deleted by admin");
    Ok(MessageResponse::new("User deleted"))
}

pub async fn list_all_attendance(st: &AppState) -> AppResult<Vec<AdminAttendanceItem>> {
    let rows = st.attendance.list_with_users().await?;
    Ok(rows.into_iter().map(AdminAttendanceItem::from).collect())
}

pub async fn update_attendance(
    st: &AppState,
    id: Uuid,
    req: UpdateAttendanceRequest,
) -> AppResult<AttendanceRecord> {
    let current = st
        .attendance
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;

    let login_at = req.login_at.unwrap_or(current.login_at);
    let logout_at = req.logout_at.unwrap_or(current.logout_at);
    if logout_at.is_some_and(|out| out < login_at) {
        return Err(AppError::Validation(
            "logoutAt must not be earlier than loginAt".into(),
        ));
    }

    let rec = st
        .attendance
        .set_times(id, login_at, logout_at)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;
    info!(attendance_id = %id, "attendance updated by admin");
    Ok(rec)
}

pub async fn delete_attendance(st: &AppState, id: Uuid) -> AppResult<MessageResponse> {
    if !st.attendance.delete(id).await? {
        return Err(AppError::NotFound("Attendance record not found".into()));
    }
    info!(attendance_id = %id, "attendance deleted by admin");
    Ok(MessageResponse::new("Attendance record deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::services::open_record;
    use crate::auth::{extractors::ClientMeta, repo_types::{NewUser, Role}};
    use time::{macros::datetime, Duration};

    async fn seed_user(st: &AppState, name: &str, email: &str) -> User {
        st.users
            .create(NewUser {
                name: name.into(),
                email: email.into(),
                password_hash: "$argon2id$placeholder".into(),
                role: Role::User,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn update_user_applies_role_and_name() {
        let st = AppState::fake();
        let ann = seed_user(&st, "Ann", "ann@x.com").await;

        let updated = update_user(
            &st,
            ann.id,
            UpdateUserRequest {
                name: Some("Ann B".into()),
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Ann B");
        assert_eq!(updated.email, "ann@x.com");
        assert!(updated.is_admin());
    }

    #[tokio::test]
    async fn update_user_enforces_email_uniqueness() {
        let st = AppState::fake();
        seed_user(&st, "Ann", "ann@x.com").await;
        let bob = seed_user(&st, "Bob", "bob@x.com").await;

        let err = update_user(
            &st,
            bob.id,
            UpdateUserRequest {
                email: Some("ann@x.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_user_rejects_blank_name() {
        let st = AppState::fake();
        let ann = seed_user(&st, "Ann", "ann@x.com").await;

        let err = update_user(
            &st,
            ann.id,
            UpdateUserRequest {
                name: Some("   ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let kept = st.users.find_by_id(ann.id).await.unwrap().unwrap();
        assert_eq!(kept.name, "Ann");
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let st = AppState::fake();
        let err = update_user(&st, Uuid::new_v4(), UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_user_keeps_attendance() {
        let st = AppState::fake();
        let ann = seed_user(&st, "Ann", "ann@x.com").await;
        open_record(&st, ann.id, ClientMeta::default()).await.unwrap();

        delete_user(&st, ann.id).await.unwrap();

        assert!(list_users(&st).await.unwrap().iter().all(|u| u.id != ann.id));
        let rows = list_all_attendance(&st).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.user_id, ann.id);
        assert!(rows[0].user.is_none());

        let err = delete_user(&st, ann.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_all_attendance_embeds_user_summary() {
        let st = AppState::fake();
        let ann = seed_user(&st, "Ann", "ann@x.com").await;
        open_record(&st, ann.id, ClientMeta::default()).await.unwrap();

        let rows = list_all_attendance(&st).await.unwrap();
        let user = rows[0].user.as_ref().unwrap();
        assert_eq!(user.name, "Ann");
        assert_eq!(user.email, "ann@x.com");

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert!(json.get("loginAt").is_some());
        assert_eq!(json["user"]["email"], "ann@x.com");
    }

    #[tokio::test]
    async fn update_attendance_sets_and_clears_logout() {
        let st = AppState::fake();
        let rec = open_record(&st, Uuid::new_v4(), ClientMeta::default())
            .await
            .unwrap();

        let login = datetime!(2024-03-01 09:00:00 UTC);
        let logout = login + Duration::hours(8);
        let closed = update_attendance(
            &st,
            rec.id,
            UpdateAttendanceRequest {
                login_at: Some(login),
                logout_at: Some(Some(logout)),
            },
        )
        .await
        .unwrap();
        assert_eq!(closed.login_at, login);
        assert_eq!(closed.logout_at, Some(logout));

        let reopened = update_attendance(
            &st,
            rec.id,
            UpdateAttendanceRequest {
                login_at: None,
                logout_at: Some(None),
            },
        )
        .await
        .unwrap();
        assert_eq!(reopened.login_at, login);
        assert!(reopened.is_open());
    }

    #[tokio::test]
    async fn update_attendance_rejects_logout_before_login() {
        let st = AppState::fake();
        let rec = open_record(&st, Uuid::new_v4(), ClientMeta::default())
            .await
            .unwrap();
        let err = update_attendance(
            &st,
            rec.id,
            UpdateAttendanceRequest {
                login_at: None,
                logout_at: Some(Some(rec.login_at - Duration::minutes(5))),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_attendance_then_not_found() {
        let st = AppState::fake();
        let rec = open_record(&st, Uuid::new_v4(), ClientMeta::default())
            .await
            .unwrap();
        delete_attendance(&st, rec.id).await.unwrap();
        let err = delete_attendance(&st, rec.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = update_attendance(&st, rec.id, UpdateAttendanceRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
