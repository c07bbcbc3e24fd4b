//! Unified error types for psdkit.
//!
//! Every fatal decode failure surfaces as a single [`PsdError`] carrying the
//! failure kind and the absolute byte offset where it was detected.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{ErrorKind, PsdError, Result};
