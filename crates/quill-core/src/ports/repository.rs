use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::error::RepoError;
use crate::visibility::VisibilityQuery;

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// All users, oldest first. Admin view.
    async fn find_all(&self) -> Result<Vec<User>, RepoError>;

    /// Usernames keyed by user id, for annotating posts and comments.
    async fn find_usernames(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError>;

    async fn insert(&self, user: User) -> Result<User, RepoError>;

    async fn update(&self, user: User) -> Result<User, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Published posts, newest first.
    async fn find_published(&self) -> Result<Vec<Post>, RepoError>;

    /// One user's posts in any status, most recently updated first.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// All posts in any status, newest first. Admin view.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts matching a resolved visibility query, newest first.
    async fn find_visible(&self, query: &VisibilityQuery) -> Result<Vec<Post>, RepoError>;

    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError>;

    /// Comments on a post, newest first.
    async fn find_by_post_id(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Comment counts keyed by post id, computed in a single grouped
    /// aggregate. Posts without comments are absent from the map.
    async fn count_by_post_ids(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, RepoError>;

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}
