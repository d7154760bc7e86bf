use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use tracing::{error, info, warn};

use sealnote_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;
use crate::state::{AppState, with_store};
use crate::token::issue_token;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 6;

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let username = validate_credentials(&req.username, &req.password)?;

    // Check if username is taken
    let lookup = username.clone();
    if with_store(&state, move |store| store.get_user_by_username(&lookup))
        .await?
        .is_some()
    {
        return Err(ApiError::UsernameTaken);
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal
        })?
        .to_string();

    info!("Registering user: {}", username);
    let name = username.clone();
    // A concurrent registration can still win the insert.
    let user_id = with_store(&state, move |store| store.create_user(&name, &password_hash))
        .await?
        .ok_or_else(|| {
            warn!("Registration lost race for username {}", username);
            ApiError::UsernameTaken
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user_id,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = validate_credentials(&req.username, &req.password)?;

    let lookup = username.clone();
    let user = with_store(&state, move |store| store.get_user_by_username(&lookup))
        .await?
        .ok_or_else(|| {
            warn!("Login failed: unknown user {}", username);
            ApiError::InvalidCredentials
        })?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|_| {
        warn!("Login failed: stored hash for user {} is unusable", user.id);
        ApiError::InvalidCredentials
    })?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| {
            warn!("Login failed: wrong password for user {}", user.id);
            ApiError::InvalidCredentials
        })?;

    let token = issue_token(&state.jwt_secret, user.id, state.token_ttl).map_err(|e| {
        error!("Token signing failed: {:#}", e);
        ApiError::Internal
    })?;

    info!("User {} logged in", user.id);
    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        token,
    }))
}

/// Length rules shared by register and login. Returns the trimmed username.
fn validate_credentials(username: &str, password: &str) -> Result<String, ApiError> {
    let username = username.trim();
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(ApiError::Validation(format!(
            "Username must be {}-{} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if password.chars().count() < PASSWORD_MIN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN
        )));
    }
    Ok(username.to_string())
}
