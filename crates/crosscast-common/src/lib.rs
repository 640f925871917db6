//! Crosscast-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across crosscast:
//!
//! - **Typed IDs**: A type-safe UUID wrapper for episodes
//! - **Core Types**: Enums for languages, platforms, pipeline stages, and
//!   the status vocabularies of episodes, steps, and distributions
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use crosscast_common::{EpisodeId, Language, Stage, Error, Result};
//!
//! // Create typed IDs
//! let episode_id = EpisodeId::new();
//!
//! // Work with pipeline stages
//! assert_eq!(Stage::Transcribe.to_string(), "transcribe");
//!
//! // Parse language tags
//! let lang: Language = "es".parse().unwrap();
//! assert_eq!(lang, Language::Es);
//!
//! // Use common error types
//! fn example() -> Result<()> {
//!     Err(Error::not_found("episode"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
