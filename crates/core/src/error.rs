//! Error types for Stratum
//!
//! This module provides unified error handling across the engine: settings
//! problems, schema-integrity violations found while analysing a domain,
//! traversal and alias-assignment failures, and serialization errors.

use thiserror::Error;

/// The main error type for Stratum
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Contradictory or undefaultable settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ========================================================================
    // Schema Integrity Errors
    // ========================================================================
    /// A type-level integrity violation (identity field count, kind mismatch)
    #[error("Schema integrity violation in type '{type_name}': {message}")]
    TypeIntegrity { type_name: String, message: String },

    /// An application type declares no identity field; analysis cannot proceed
    #[error("Schema integrity violation in type '{type_name}': no identity field declared")]
    MissingIdentity { type_name: String },

    /// A field-level integrity violation (broken reference pair, bad name)
    #[error("Schema integrity violation in '{type_name}.{field}': {message}")]
    FieldIntegrity {
        type_name: String,
        field: String,
        message: String,
    },

    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    // ========================================================================
    // Analysis Errors
    // ========================================================================
    /// Ownership resolution ran past the hop cap
    #[error(
        "Ownership chain for '{type_name}' exceeded {max_hops} hops (partial chain: {partial:?})"
    )]
    GraphTraversal {
        type_name: String,
        max_hops: usize,
        partial: Vec<String>,
    },

    /// No alias candidate fits within the configured bounds
    #[error("Alias space exhausted for type '{type_name}' (max length {max_length})")]
    AliasExhaustion {
        type_name: String,
        max_length: usize,
    },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Type not found
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    /// Field not found
    #[error("Field '{field}' not found in type '{type_name}'")]
    FieldNotFound { type_name: String, field: String },

    // ========================================================================
    // Duplicate Errors
    // ========================================================================
    /// Duplicate type within a namespace
    #[error("Duplicate type: '{namespace}.{name}' already exists")]
    DuplicateType { namespace: String, name: String },

    /// Duplicate field name
    #[error("Duplicate field name: '{field}' already exists in type '{type_name}'")]
    DuplicateField { type_name: String, field: String },

    /// Duplicate operation name
    #[error("Duplicate operation: '{0}' already exists")]
    DuplicateOperation(String),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Snapshot schema version mismatch
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        EngineError::Configuration(msg.into())
    }

    /// Create a type-level integrity error
    pub fn type_integrity(type_name: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::TypeIntegrity {
            type_name: type_name.into(),
            message: msg.into(),
        }
    }

    /// Create a field-level integrity error
    pub fn field_integrity(
        type_name: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        EngineError::FieldIntegrity {
            type_name: type_name.into(),
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a schema-integrity violation
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            EngineError::TypeIntegrity { .. }
                | EngineError::FieldIntegrity { .. }
                | EngineError::MissingIdentity { .. }
        )
    }

    /// Check if this error must abort the run rather than skip one type
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::MissingIdentity { .. })
    }

    /// Check if this error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::TypeNotFound(_) | EngineError::FieldNotFound { .. }
        )
    }

    /// The type name this error refers to, if any
    pub fn type_name(&self) -> Option<&str> {
        match self {
            EngineError::TypeIntegrity { type_name, .. }
            | EngineError::MissingIdentity { type_name }
            | EngineError::FieldIntegrity { type_name, .. }
            | EngineError::GraphTraversal { type_name, .. }
            | EngineError::AliasExhaustion { type_name, .. }
            | EngineError::FieldNotFound { type_name, .. }
            | EngineError::DuplicateField { type_name, .. } => Some(type_name),
            EngineError::TypeNotFound(name) => Some(name),
            _ => None,
        }
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T> {
        self.map_err(|e| {
            let err: EngineError = e.into();
            EngineError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
