//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! SeaORM PostgreSQL repositories plus the JWT token and Argon2 password
//! services.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, DbConn, PgCommentRepository, PgPostRepository, PgUserRepository, connect,
};
