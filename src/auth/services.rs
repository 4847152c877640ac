use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    attendance::services::{close_latest, open_record},
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest},
        extractors::ClientMeta,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{NewUser, Role, User, UserChanges},
    },
    dto::MessageResponse,
    error::{AppError, AppResult},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalizes and validates a caller-supplied email.
pub(crate) fn checked_email(raw: &str) -> AppResult<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(email)
}

/// Trimmed value, with blanks treated as missing.
pub(crate) fn present(field: Option<String>) -> Option<String> {
    field
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// A supplied field must not be blank; an absent one stays `None`.
pub(crate) fn non_blank(field: Option<String>, label: &str) -> AppResult<Option<String>> {
    match field {
        None => Ok(None),
        Some(raw) => present(Some(raw))
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("{label} must not be blank"))),
    }
}

fn issue_for(st: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = JwtKeys::from_ref(st).issue(user.id)?;
    Ok(AuthResponse::new(user, token))
}

pub async fn register(st: &AppState, req: RegisterRequest) -> AppResult<AuthResponse> {
    let (Some(name), Some(email), Some(password)) = (
        present(req.name),
        present(req.email),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Name, email, and password are required".into(),
        ));
    };
    let email = checked_email(&email)?;

    if st.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let role = if st.config.admin_email.as_deref() == Some(email.as_str()) {
        Role::Admin
    } else {
        Role::User
    };

    let user = st
        .users
        .create(NewUser {
            name,
            email,
            password_hash: hash_password(&password)?,
            role,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, role = ?user.role, "user registered");
    issue_for(st, user)
}

pub async fn login(st: &AppState, req: LoginRequest, meta: ClientMeta) -> AppResult<AuthResponse> {
    let (Some(email), Some(password)) = (present(req.email), req.password) else {
        return Err(AppError::Validation("Email and password are required".into()));
    };
    let email = normalize_email(&email);

    let Some(user) = st.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    open_record(st, user.id, meta).await?;

    info!(user_id = %user.id, "user logged in");
    issue_for(st, user)
}

pub async fn get_profile(st: &AppState, user_id: Uuid) -> AppResult<User> {
    st.users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn update_profile(
    st: &AppState,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> AppResult<AuthResponse> {
    let current = get_profile(st, user_id).await?;

    let email = match present(req.email) {
        Some(raw) => Some(checked_email(&raw)?),
        None => None,
    };
    if let Some(email) = email.as_deref().filter(|e| *e != current.email) {
        if st.users.find_by_email(email).await?.is_some() {
            warn!(user_id = %user_id, email = %email, "profile email already in use");
            return Err(AppError::Conflict("Email already in use".into()));
        }
    }

    let password_hash = match req.password.filter(|p| !p.is_empty()) {
        Some(p) => Some(hash_password(&p)?),
        None => None,
    };

    let changes = UserChanges {
        name: non_blank(req.name, "Name")?,
        email,
        password_hash,
        role: None,
    };
    let updated = st
        .users
        .update(user_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!(user_id = %user_id, "profile updated");
    issue_for(st, updated)
}

/// Closes the caller's open attendance. The bearer token stays valid until it expires.
pub async fn logout(st: &AppState, user_id: Uuid) -> AppResult<MessageResponse> {
    close_latest(st, user_id).await?;
    info!(user_id = %user_id, "user logged out");
    Ok(MessageResponse::new("Logged out"))
}
