use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::tasks::repo_types::{NewTask, Task};

/// Every lookup is scoped by owner: another user's task reads as absent.
#[async_trait]
pub trait TaskRepo: Send + Sync {
    async fn list_for_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Task>>;
    async fn find_for_owner(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Task>>;
    async fn create(&self, new: NewTask) -> anyhow::Result<Task>;
    /// Writes the mutable fields of `task` back; `None` if it vanished meanwhile.
    async fn save(&self, task: &Task) -> anyhow::Result<Option<Task>>;
    async fn delete_for_owner(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgTaskRepo {
    db: PgPool,
}

impl PgTaskRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepo for PgTaskRepo {
    async fn list_for_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, completed, deadline, created_at, updated_at
              FROM tasks
             WHERE user_id = $1
             ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list tasks")?;
        Ok(rows)
    }

    async fn find_for_owner(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, completed, deadline, created_at, updated_at
              FROM tasks
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find task")?;
        Ok(task)
    }

    async fn create(&self, new: NewTask) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, deadline)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, description, completed, deadline, created_at, updated_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.deadline)
        .fetch_one(&self.db)
        .await
        .context("insert task")?;
        Ok(task)
    }

    async fn save(&self, task: &Task) -> anyhow::Result<Option<Task>> {
        let saved = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
               SET title = $3, description = $4, completed = $5, deadline = $6,
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, completed, deadline, created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.deadline)
        .fetch_optional(&self.db)
        .await
        .context("update task")?;
        Ok(saved)
    }

    async fn delete_for_owner(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete task")?;
        Ok(res.rows_affected() > 0)
    }
}
