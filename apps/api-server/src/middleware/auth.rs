//! Authentication extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::sync::Arc;

use quill_core::domain::Role;
use quill_core::ports::{AuthError, TokenService};

use super::error::AppError;
use crate::state::AppState;

/// Authenticated caller identity extractor.
///
/// Use this in handlers to require a valid bearer token:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: uuid::Uuid,
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AppError> {
    let token_service = req
        .app_data::<web::Data<Arc<dyn TokenService>>>()
        .ok_or_else(|| {
            tracing::error!("TokenService not found in app data");
            AppError::Internal("server configuration error".to_string())
        })?;

    // Extract "Bearer <token>" from the Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::from(AuthError::MissingAuth))?;

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::from(AuthError::InvalidToken("expected Bearer token".into())))?;

    let claims = token_service.validate_token(token)?;

    Ok(Identity {
        user_id: claims.user_id,
    })
}

/// Optional identity extractor - an absent or invalid token makes the
/// request anonymous instead of failing it.
pub struct MaybeIdentity(pub Option<Identity>);

impl FromRequest for MaybeIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeIdentity(authenticate(req).ok())))
    }
}

/// Admin gate: load the caller and require the admin role.
///
/// The role is read from the store rather than the token so that
/// demotions take effect without waiting out token expiry.
pub async fn require_admin(state: &AppState, identity: Identity) -> Result<(), AppError> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if user.role != Role::Admin {
        return Err(AppError::Forbidden);
    }

    Ok(())
}
