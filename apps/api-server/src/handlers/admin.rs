//! Moderation handlers. Every route requires the admin role and bypasses
//! ownership checks.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::MsgBody;
use quill_shared::dto::{AdminUserResponse, PostResponse};

use super::posts::{author_usernames, post_response};
use crate::middleware::auth::{Identity, require_admin};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/admin/posts - all posts, any status
pub async fn list_posts(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    require_admin(&state, identity).await?;

    let posts = state.posts.find_all().await?;
    let usernames = author_usernames(&state, posts.iter().map(|p| p.user_id)).await?;

    let out: Vec<PostResponse> = posts
        .into_iter()
        .map(|p| post_response(p, &usernames))
        .collect();

    Ok(HttpResponse::Ok().json(out))
}

/// GET /api/admin/users - all accounts, public fields only
pub async fn list_users(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    require_admin(&state, identity).await?;

    let users = state.users.find_all().await?;

    let out: Vec<AdminUserResponse> = users
        .into_iter()
        .map(|u| AdminUserResponse {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role.as_str().to_string(),
            created_at: u.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(out))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    require_admin(&state, identity).await?;

    let post = state
        .posts
        .find_by_id(*path)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    state.posts.delete(post.id).await?;

    Ok(HttpResponse::Ok().json(MsgBody::new("Post deleted")))
}

/// DELETE /api/admin/comments/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    require_admin(&state, identity).await?;

    let comment = state
        .comments
        .find_by_id(*path)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    state.comments.delete(comment.id).await?;

    Ok(HttpResponse::Ok().json(MsgBody::new("Comment deleted")))
}
