//! # Stratum Core
//!
//! Core types, traits, and error handling for Stratum.
//!
//! This crate provides the foundational building blocks used throughout
//! the Stratum workspace, including:
//!
//! - **Types**: Type identifiers, field data types, delete semantics, providers
//! - **Traits**: `Validatable` for records that check their own consistency
//! - **Errors**: Unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult, ResultExt};
pub use traits::Validatable;
pub use types::{DataType, DatabaseProvider, DeleteType, TypeId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
