use serde::Deserialize;
use time::OffsetDateTime;

use crate::dto::{nullable, nullable_timestamp};

#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
}

/// `null` clears `description`/`deadline`; absent fields are kept.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "nullable_timestamp")]
    pub deadline: Option<Option<OffsetDateTime>>,
}
