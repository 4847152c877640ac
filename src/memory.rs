//! In-process store used by tests in place of Postgres.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::attendance::repo::AttendanceRepo;
use crate::attendance::repo_types::{AttendanceRecord, AttendanceWithUser, NewAttendance};
use crate::auth::repo::UserRepo;
use crate::auth::repo_types::{NewUser, User, UserChanges};
use crate::error::EmailTaken;
use crate::tasks::repo::TaskRepo;
use crate::tasks::repo_types::{NewTask, Task};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    attendance: Vec<AttendanceRecord>,
    tasks: Vec<Task>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut guard)
    }
}

/// Newest first; among equal keys the later insert wins, like a
/// monotonically assigned timestamp would.
fn newest_first<T>(mut rows: Vec<T>, key: impl Fn(&T) -> OffsetDateTime) -> Vec<T> {
    rows.reverse();
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.with(|s| s.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.with(|s| s.users.iter().find(|u| u.email == email).cloned()))
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        self.with(|s| {
            if s.users.iter().any(|u| u.email == new.email) {
                return Err(anyhow::Error::new(EmailTaken));
            }
            let now = OffsetDateTime::now_utc();
            let user = User {
                id: Uuid::new_v4(),
                name: new.name,
                email: new.email,
                password_hash: new.password_hash,
                role: new.role,
                created_at: now,
                updated_at: now,
            };
            s.users.push(user.clone());
            Ok(user)
        })
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> anyhow::Result<Option<User>> {
        self.with(|s| {
            if let Some(email) = &changes.email {
                if s.users.iter().any(|u| u.id != id && &u.email == email) {
                    return Err(anyhow::Error::new(EmailTaken));
                }
            }
            let Some(user) = s.users.iter_mut().find(|u| u.id == id) else {
                return Ok(None);
            };
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(email) = changes.email {
                user.email = email;
            }
            if let Some(hash) = changes.password_hash {
                user.password_hash = hash;
            }
            if let Some(role) = changes.role {
                user.role = role;
            }
            user.updated_at = OffsetDateTime::now_utc();
            Ok(Some(user.clone()))
        })
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.with(|s| {
            let before = s.users.len();
            s.users.retain(|u| u.id != id);
            s.users.len() != before
        }))
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let users = self.with(|s| s.users.clone());
        Ok(newest_first(users, |u| u.created_at))
    }
}

#[async_trait]
impl AttendanceRepo for MemoryStore {
    async fn insert(&self, new: NewAttendance) -> anyhow::Result<AttendanceRecord> {
        Ok(self.with(|s| {
            let rec = AttendanceRecord {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                login_at: new.login_at,
                logout_at: None,
                user_agent: new.user_agent,
                ip: new.ip,
            };
            s.attendance.push(rec.clone());
            rec
        }))
    }

    async fn close_latest_open(
        &self,
        user_id: Uuid,
        logout_at: OffsetDateTime,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        Ok(self.with(|s| {
            // max_by_key keeps the last maximum, i.e. the latest insert on ties
            let rec = s
                .attendance
                .iter_mut()
                .filter(|r| r.user_id == user_id && r.is_open())
                .max_by_key(|r| r.login_at)?;
            rec.logout_at = Some(logout_at);
            Some(rec.clone())
        }))
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<AttendanceRecord>> {
        let rows = self.with(|s| {
            s.attendance
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect()
        });
        Ok(newest_first(rows, |r| r.login_at))
    }

    async fn list_with_users(&self) -> anyhow::Result<Vec<AttendanceWithUser>> {
        let rows = self.with(|s| {
            s.attendance
                .iter()
                .map(|r| {
                    let owner = s.users.iter().find(|u| u.id == r.user_id);
                    AttendanceWithUser {
                        record: r.clone(),
                        user_name: owner.map(|u| u.name.clone()),
                        user_email: owner.map(|u| u.email.clone()),
                    }
                })
                .collect()
        });
        Ok(newest_first(rows, |r| r.record.login_at))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<AttendanceRecord>> {
        Ok(self.with(|s| s.attendance.iter().find(|r| r.id == id).cloned()))
    }

    async fn set_times(
        &self,
        id: Uuid,
        login_at: OffsetDateTime,
        logout_at: Option<OffsetDateTime>,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        Ok(self.with(|s| {
            let rec = s.attendance.iter_mut().find(|r| r.id == id)?;
            rec.login_at = login_at;
            rec.logout_at = logout_at;
            Some(rec.clone())
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.with(|s| {
            let before = s.attendance.len();
            s.attendance.retain(|r| r.id != id);
            s.attendance.len() != before
        }))
    }
}

#[async_trait]
impl TaskRepo for MemoryStore {
    async fn list_for_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Task>> {
        let rows = self.with(|s| {
            s.tasks
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect()
        });
        Ok(newest_first(rows, |t| t.created_at))
    }

    async fn find_for_owner(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Task>> {
        Ok(self.with(|s| {
            s.tasks
                .iter()
                .find(|t| t.id == id && t.user_id == user_id)
                .cloned()
        }))
    }

    async fn create(&self, new: NewTask) -> anyhow::Result<Task> {
        Ok(self.with(|s| {
            let now = OffsetDateTime::now_utc();
            let task = Task {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                title: new.title,
                description: new.description,
                completed: false,
                deadline: new.deadline,
                created_at: now,
                updated_at: now,
            };
            s.tasks.push(task.clone());
            task
        }))
    }

    async fn save(&self, task: &Task) -> anyhow::Result<Option<Task>> {
        Ok(self.with(|s| {
            let stored = s
                .tasks
                .iter_mut()
                .find(|t| t.id == task.id && t.user_id == task.user_id)?;
            *stored = Task {
                updated_at: OffsetDateTime::now_utc(),
                ..task.clone()
            };
            Some(stored.clone())
        }))
    }

    async fn delete_for_owner(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.with(|s| {
            let before = s.tasks.len();
            s.tasks.retain(|t| !(t.id == id && t.user_id == user_id));
            s.tasks.len() != before
        }))
    }
}
