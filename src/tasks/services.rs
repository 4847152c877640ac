use tracing::info;
use uuid::Uuid;

use crate::{
    auth::services::present,
    dto::MessageResponse,
    error::{AppError, AppResult},
    state::AppState,
    tasks::{
        dto::{CreateTaskRequest, UpdateTaskRequest},
        repo_types::{NewTask, Task},
    },
};

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub async fn list_tasks(st: &AppState, user_id: Uuid) -> AppResult<Vec<Task>> {
    Ok(st.tasks.list_for_owner(user_id).await?)
}

pub async fn create_task(st: &AppState, user_id: Uuid, req: CreateTaskRequest) -> AppResult<Task> {
    let title = present(req.title).ok_or_else(|| AppError::Validation("Title is required".into()))?;
    let task = st
        .tasks
        .create(NewTask {
            user_id,
            title,
            description: present(req.description),
            deadline: req.deadline,
        })
        .await?;
    info!(user_id = %user_id, task_id = %task.id, "task created");
    Ok(task)
}

pub async fn update_task(
    st: &AppState,
    user_id: Uuid,
    id: Uuid,
    req: UpdateTaskRequest,
) -> AppResult<Task> {
    let mut task = st
        .tasks
        .find_for_owner(user_id, id)
        .await?
        .ok_or_else(not_found)?;

    if let Some(title) = req.title {
        task.title = present(Some(title))
            .ok_or_else(|| AppError::Validation("Title must not be blank".into()))?;
    }
    if let Some(description) = req.description {
        task.description = present(description);
    }
    if let Some(completed) = req.completed {
        task.completed = completed;
    }
    if let Some(deadline) = req.deadline {
        task.deadline = deadline;
    }

    let saved = st.tasks.save(&task).await?.ok_or_else(not_found)?;
    info!(user_id = %user_id, task_id = %id, "task updated");
    Ok(saved)
}

pub async fn delete_task(st: &AppState, user_id: Uuid, id: Uuid) -> AppResult<MessageResponse> {
    if !st.tasks.delete_for_owner(user_id, id).await? {
        return Err(not_found());
    }
    info!(user_id = %user_id, task_id = %id, "task deleted");
    Ok(MessageResponse::new("Task deleted"))
}
