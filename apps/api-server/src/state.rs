//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{CommentRepository, PostRepository, UserRepository};
use quill_infra::{DbConn, PgCommentRepository, PgPostRepository, PgUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl AppState {
    /// Build the application state on top of one connection pool.
    pub fn new(db: DbConn) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db.clone())),
            posts: Arc::new(PgPostRepository::new(db.clone())),
            comments: Arc::new(PgCommentRepository::new(db)),
        }
    }
}
