//! # Quill Core
//!
//! The domain layer of the Quill blogging backend.
//! This crate contains pure business logic with zero infrastructure
//! dependencies: entities, repository and auth ports, and the post
//! visibility resolver.

pub mod domain;
pub mod error;
pub mod ports;
pub mod visibility;

pub use error::RepoError;
