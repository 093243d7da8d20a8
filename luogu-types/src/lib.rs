//! Core type definitions for the Luogu client.
//!
//! This crate defines the plain-data types shared by every entity:
//! - Typed identifiers for users, problems and pastes
//! - The scalar [`Identifier`] used for display and lookups
//! - [`RawPayload`], the undecoded JSON object an entity was built from
//!
//! Nothing here performs I/O; the HTTP layer lives in `luogu-client`.

mod ids;

pub use ids::{Identifier, PasteId, Pid, Uid};

/// An ordered mapping of string keys to arbitrary JSON values.
///
/// Key order follows the server response (`serde_json` is built with
/// `preserve_order`).
pub type RawPayload = serde_json::Map<String, serde_json::Value>;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidId { kind: &'static str, value: String },
}
