//! Common types and utilities shared by every section decoder.
//!
//! This module provides the big-endian byte cursor and section framer, the
//! four-character tag type used for signatures and record keys, and the
//! unified error type.

// Submodule declarations
pub mod binary;
pub mod error;
pub mod tag;

// Re-exports for convenience
pub use binary::Cursor;
pub use error::{ErrorKind, PsdError, Result};
pub use tag::Tag;
