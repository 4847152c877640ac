use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::attendance::repo_types::{AttendanceRecord, AttendanceWithUser, NewAttendance};

#[async_trait]
pub trait AttendanceRepo: Send + Sync {
    async fn insert(&self, new: NewAttendance) -> anyhow::Result<AttendanceRecord>;
    /// Sets `logout_at` on the user's open record with the latest `login_at`.
    async fn close_latest_open(
        &self,
        user_id: Uuid,
        logout_at: OffsetDateTime,
    ) -> anyhow::Result<Option<AttendanceRecord>>;
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<AttendanceRecord>>;
    async fn list_with_users(&self) -> anyhow::Result<Vec<AttendanceWithUser>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<AttendanceRecord>>;
    async fn set_times(
        &self,
        id: Uuid,
        login_at: OffsetDateTime,
        logout_at: Option<OffsetDateTime>,
    ) -> anyhow::Result<Option<AttendanceRecord>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgAttendanceRepo {
    db: PgPool,
}

impl PgAttendanceRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AttendanceRepo for PgAttendanceRepo {
    async fn insert(&self, new: NewAttendance) -> anyhow::Result<AttendanceRecord> {
        let rec = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance (user_id, login_at, user_agent, ip)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, login_at, logout_at, user_agent, ip
            "#,
        )
        .bind(new.user_id)
        .bind(new.login_at)
        .bind(new.user_agent)
        .bind(new.ip)
        .fetch_one(&self.db)
        .await
        .context("insert attendance")?;
        Ok(rec)
    }

    async fn close_latest_open(
        &self,
        user_id: Uuid,
        logout_at: OffsetDateTime,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        let rec = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance
               SET logout_at = $2
             WHERE id = (
                   SELECT id FROM attendance
                    WHERE user_id = $1 AND logout_at IS NULL
                    ORDER BY login_at DESC
                    LIMIT 1
                   )
            RETURNING id, user_id, login_at, logout_at, user_agent, ip
            "#,
        )
        .bind(user_id)
        .bind(logout_at)
        .fetch_optional(&self.db)
        .await
        .context("close open attendance")?;
        Ok(rec)
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, user_id, login_at, logout_at, user_agent, ip
              FROM attendance
             WHERE user_id = $1
             ORDER BY login_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list attendance for user")?;
        Ok(rows)
    }

    async fn list_with_users(&self) -> anyhow::Result<Vec<AttendanceWithUser>> {
        let rows = sqlx::query_as::<_, AttendanceWithUser>(
            r#"
            SELECT a.id, a.user_id, a.login_at, a.logout_at, a.user_agent, a.ip,
                   u.name AS user_name, u.email AS user_email
              FROM attendance a
              LEFT JOIN users u ON u.id = a.user_id
             ORDER BY a.login_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list all attendance")?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<AttendanceRecord>> {
        let rec = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, user_id, login_at, logout_at, user_agent, ip
              FROM attendance
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find attendance")?;
        Ok(rec)
    }

    async fn set_times(
        &self,
        id: Uuid,
        login_at: OffsetDateTime,
        logout_at: Option<OffsetDateTime>,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        let rec = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance
               SET login_at = $2, logout_at = $3
             WHERE id = $1
            RETURNING id, user_id, login_at, logout_at, user_agent, ip
            "#,
        )
        .bind(id)
        .bind(login_at)
        .bind(logout_at)
        .fetch_optional(&self.db)
        .await
        .context("update attendance")?;
        Ok(rec)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete attendance")?;
        Ok(res.rows_affected() > 0)
    }
}
