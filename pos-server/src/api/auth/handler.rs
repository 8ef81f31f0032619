//! Authentication Handlers
//!
//! Login, registration and token introspection

use std::str::FromStr;
use std::time::Duration;

use axum::{Extension, Json, extract::State, http::HeaderMap, http::StatusCode, http::Uri};
use shared::error::ErrorCode;
use shared::models::{LoginRequest, LoginResponse, RegisterRequest, Role, UserInfo};

use crate::AppError;
use crate::api::AppJson;
use crate::auth::permissions::USERS_MANAGE;
use crate::auth::{CurrentUser, authenticate_headers, hash_password, verify_login};
use crate::core::ServerState;
use crate::security_log;
use crate::storage::{NewUser, StorageError};
use crate::utils::validation::{MAX_PASSWORD_LEN, MAX_USERNAME_LEN, validate_required_text};

/// Login handler
///
/// Checks the credentials and returns a signed JWT. Unknown users still run
/// one Argon2 verification, so both failure paths cost the same before the
/// fixed delay and the shared error message.
pub async fn login(
    State(state): State<ServerState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state.storage().find_user_by_username(&req.username).await?;

    let password = req.password.clone();
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let password_valid =
        tokio::task::spawn_blocking(move || verify_login(&password, stored_hash.as_deref()))
            .await
            .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(state.config.login_delay_ms)).await;

    let user = match user {
        Some(u) if password_valid => u,
        Some(_) => {
            security_log!(
                "WARN",
                "login_failed",
                username = req.username.clone(),
                reason = "invalid_password"
            );
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!(
                "WARN",
                "login_failed",
                username = req.username.clone(),
                reason = "user_not_found"
            );
            return Err(AppError::invalid_credentials());
        }
    };

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(user.id, &user.username, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        role: user.role,
        token,
        expires_in: jwt_service.expires_in_seconds(),
    }))
}

/// Callers allowed to create accounts must hold `users:manage`
fn require_user_manager(
    state: &ServerState,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<CurrentUser, AppError> {
    let caller = authenticate_headers(headers, &state.get_jwt_service(), uri)?;
    if !caller.has_permission(USERS_MANAGE) {
        security_log!(
            "WARN",
            "permission_denied",
            user_id = caller.id,
            username = caller.username.clone(),
            role = caller.role.as_str(),
            required_permission = USERS_MANAGE
        );
        return Err(AppError::permission_denied(format!(
            "Permission denied: {}",
            USERS_MANAGE
        )));
    }
    Ok(caller)
}

/// Register handler
///
/// Open registration lets anyone create a receptionist. An anonymous owner is
/// only accepted while the store has no owner yet; after that a new owner needs
/// an owner token. Closed registration needs an owner token for every account.
pub async fn register(
    State(state): State<ServerState>,
    headers: HeaderMap,
    uri: Uri,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserInfo>), AppError> {
    let closed = !state.config.allow_open_registration;
    if closed {
        require_user_manager(&state, &headers, &uri)?;
    }

    validate_required_text(&req.username, "username", MAX_USERNAME_LEN)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;
    let role = Role::from_str(&req.role).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRole, e.to_string()).with_detail("field", "role")
    })?;

    if !closed && role == Role::Owner && state.storage().owner_exists().await? {
        require_user_manager(&state, &headers, &uri)?;
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let username = req.username;
    let record = match state
        .storage()
        .create_user(NewUser {
            username: username.clone(),
            password_hash,
            role,
        })
        .await
    {
        Ok(record) => record,
        Err(StorageError::Duplicate(_)) => return Err(AppError::username_exists(username)),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        user_id = record.id,
        username = %record.username,
        role = %record.role,
        "User registered"
    );

    Ok((StatusCode::CREATED, Json(record.info())))
}

/// Identity carried by the bearer token
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "id": user.id,
        "username": user.username,
        "role": user.role,
        "permissions": user.permissions,
    }))
}
