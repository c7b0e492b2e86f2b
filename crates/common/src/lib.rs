//! BCC Common Library
//!
//! Shared entity types and errors for the BCC provider.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
