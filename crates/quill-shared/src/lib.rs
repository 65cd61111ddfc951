//! # Quill Shared
//!
//! Request/response types shared between the API server and its clients.
//! Field names are camelCase on the wire to match the JSON the frontend
//! sends and expects.

pub mod dto;
pub mod response;

pub use response::MsgBody;
