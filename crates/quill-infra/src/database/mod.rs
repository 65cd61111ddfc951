//! SeaORM persistence layer.

mod connections;
pub mod entity;
mod repos;

pub use connections::{DatabaseConfig, connect};
pub use repos::{PgCommentRepository, PgPostRepository, PgUserRepository};
pub use sea_orm::DbConn;
