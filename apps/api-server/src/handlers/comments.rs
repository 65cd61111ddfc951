//! Comment handlers.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Comment;
use quill_shared::dto::{AuthorRef, CommentResponse, CreateCommentRequest};

use super::posts::author_usernames;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub(super) fn comment_response(
    comment: Comment,
    usernames: &HashMap<Uuid, String>,
) -> CommentResponse {
    let username = usernames.get(&comment.user_id).cloned().unwrap_or_default();
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        body: comment.body,
        user: AuthorRef {
            id: comment.user_id,
            username,
        },
        created_at: comment.created_at,
    }
}

/// POST /api/comments/{post_id} - comment on a post
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.body.trim().is_empty() {
        return Err(AppError::BadRequest("Comment body is required".to_string()));
    }

    // Commenting on a missing post is 404, not a constraint error
    let post = state
        .posts
        .find_by_id(*path)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comment = Comment::new(post.id, identity.user_id, req.body);
    let saved = state.comments.insert(comment).await?;

    let usernames = author_usernames(&state, std::iter::once(saved.user_id)).await?;
    Ok(HttpResponse::Created().json(comment_response(saved, &usernames)))
}

/// GET /api/comments/{post_id} - public, newest first
pub async fn list(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let comments = state.comments.find_by_post_id(*path).await?;
    let usernames = author_usernames(&state, comments.iter().map(|c| c.user_id)).await?;

    let out: Vec<CommentResponse> = comments
        .into_iter()
        .map(|c| comment_response(c, &usernames))
        .collect();

    Ok(HttpResponse::Ok().json(out))
}
