#![doc = include_str!("../README.md")]

pub mod env;
pub mod error;

// Re-exports for convenience
pub use error::{PolyauthError, Result};
