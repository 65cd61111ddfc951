//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use quill_core::domain::User;
use quill_core::ports::{PasswordService, TokenService};
use quill_shared::MsgBody;
use quill_shared::dto::{
    ChangePasswordRequest, ProfileResponse, SigninRequest, SignupRequest, TokenResponse,
    UpdateProfileRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn profile_response(user: User) -> ProfileResponse {
    ProfileResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role.as_str().to_string(),
        created_at: user.created_at,
    }
}

/// POST /api/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Check if user already exists
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    // Hash password
    let password_hash = password_service.hash(&req.password)?;

    // Create user; duplicate usernames surface as 409 via the unique index
    let user = User::new(req.username, req.email, password_hash);
    let saved = state.users.insert(user).await?;

    // Issue token
    let token = token_service.generate_token(saved.id)?;

    Ok(HttpResponse::Created().json(TokenResponse { token }))
}

/// POST /api/auth/signin
pub async fn signin(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<SigninRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Find user by email
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Verify password
    let valid = password_service.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    // Issue token
    let token = token_service.generate_token(user.id)?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// GET /api/auth/profile - own user, password hash excluded
pub async fn profile(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(profile_response(user)))
}

/// PUT /api/auth/profile - partial update of username and email
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Absent or empty fields leave the current value untouched
    if let Some(username) = req.username.filter(|u| !u.trim().is_empty()) {
        user.username = username;
    }
    if let Some(email) = req.email.filter(|e| !e.trim().is_empty()) {
        if !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        user.email = email;
    }
    user.updated_at = chrono::Utc::now();

    let saved = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(profile_response(saved)))
}

/// PUT /api/auth/change-password - authenticated by email + old password
pub async fn change_password(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.new_password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let mut user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service.verify(&req.old_password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    user.password_hash = password_service.hash(&req.new_password)?;
    user.updated_at = chrono::Utc::now();
    state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(MsgBody::new(
        "Password changed successfully. Please sign in with your new password.",
    )))
}
