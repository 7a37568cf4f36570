//! Account endpoints.
//!
//! Registration, login, email confirmation, and the password reset flow.
//! Everything here is public except `GET /api/users/profile`, which sits
//! behind the JWT layer.
//!
//! # Endpoints
//!
//! - `POST /api/users` - Register a new account
//! - `POST /api/users/login` - Login and get a session token
//! - `GET  /api/users/confirm/:token` - Confirm an account
//! - `POST /api/users/forgot-password` - Request a password reset
//! - `GET  /api/users/reset-password/:token` - Check a reset token
//! - `POST /api/users/reset-password/:token` - Set the new password
//! - `GET  /api/users/profile` - Current user's profile (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskhive_shared::{
    auth::{jwt, middleware::AuthContext, password, token},
    models::user::{CreateUser, User, UserProfile},
};
use tracing::info;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The authenticated user's profile
    pub user: UserProfile,

    /// Signed session token, valid for 30 days
    pub token: String,
}

/// Forgot-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Email address of the account to reset
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Reset-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Register a new account
///
/// The account starts unconfirmed; a one-time token is mailed out and
/// must be redeemed at the confirm endpoint before login works.
///
/// # Endpoint
///
/// ```text
/// POST /api/users
/// Content-Type: application/json
///
/// {
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;
    let one_time_token = token::generate_one_time_token();

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            one_time_token: one_time_token.clone(),
        },
    )
    .await?;

    state
        .mailer
        .send_confirmation(&user.email, &user.name, &one_time_token);

    info!(user_id = %user.id, "User registered");

    Ok(Json(MessageResponse::new(
        "Account created, check your email to confirm it",
    )))
}

/// Login and obtain a session token
///
/// Rejections are distinct: an unknown email is 404, an unconfirmed
/// account is 403 (and a fresh confirmation email goes out), a wrong
/// password is 401.
///
/// # Endpoint
///
/// ```text
/// POST /api/users/login
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "user": { "id": "uuid", "name": "Ada Lovelace", "email": "ada@example.com" },
///   "token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Wrong password
/// - `403 Forbidden`: Account not confirmed yet
/// - `404 Not Found`: No account with that email
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account with that email".to_string()))?;

    if !user.confirmed {
        // Re-arm the confirmation flow so the user can get unstuck
        let fresh_token = token::generate_one_time_token();
        User::set_one_time_token(&state.db, user.id, &fresh_token).await?;
        state
            .mailer
            .send_confirmation(&user.email, &user.name, &fresh_token);

        return Err(ApiError::Forbidden(
            "Account not confirmed, a new confirmation email has been sent".to_string(),
        ));
    }

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }

    let claims = jwt::Claims::new(user.id);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        user: user.profile(),
        token,
    }))
}

/// Confirm an account with the emailed one-time token
///
/// Consuming the token clears it, so a second visit with the same link
/// returns 404.
///
/// # Errors
///
/// - `404 Not Found`: Unknown or already-used token
pub async fn confirm_account(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let user = User::confirm_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid token".to_string()))?;

    info!(user_id = %user.id, "Account confirmed");

    Ok(Json(MessageResponse::new("Account confirmed, you can log in now")))
}

/// Request a password reset email
///
/// # Errors
///
/// - `404 Not Found`: No account with that email
/// - `422 Unprocessable Entity`: Validation failed
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account with that email".to_string()))?;

    let reset_token = token::generate_one_time_token();
    User::set_one_time_token(&state.db, user.id, &reset_token).await?;

    state
        .mailer
        .send_password_reset(&user.email, &user.name, &reset_token);

    info!(user_id = %user.id, "Password reset requested");

    Ok(Json(MessageResponse::new(
        "Check your email for reset instructions",
    )))
}

/// Check that a reset token is still valid
///
/// Pre-flight for the reset form: lets the frontend show the password
/// fields only when the link is usable.
///
/// # Errors
///
/// - `404 Not Found`: Unknown or already-used token
pub async fn check_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !User::token_exists(&state.db, &token).await? {
        return Err(ApiError::NotFound("Invalid token".to_string()));
    }

    Ok(Json(MessageResponse::new(
        "Token is valid, set your new password",
    )))
}

/// Set a new password using a reset token
///
/// The token is consumed atomically with the password change.
///
/// # Errors
///
/// - `404 Not Found`: Unknown or already-used token
/// - `422 Unprocessable Entity`: Validation failed
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::reset_password_by_token(&state.db, &token, &password_hash)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid token".to_string()))?;

    info!(user_id = %user.id, "Password reset");

    Ok(Json(MessageResponse::new("Password updated, you can log in now")))
}

/// Current user's profile
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid session token
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.profile()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "long-enough-password".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "long-enough-password".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_login_response_shape() {
        let response = LoginResponse {
            user: UserProfile {
                id: uuid::Uuid::new_v4(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            token: "signed".to_string(),
        };

        let json = serde_json::to_value(&response).expect("Should serialize");
        assert_eq!(json["user"]["name"], "Ada");
        assert_eq!(json["token"], "signed");
        assert!(json["user"].get("password_hash").is_none());
    }
}
