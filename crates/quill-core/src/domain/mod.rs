//! Domain entities - the core business objects.

mod comment;
mod post;
mod user;

pub use comment::Comment;
pub use post::{Post, PostStatus, slugify};
pub use user::{Role, User};
