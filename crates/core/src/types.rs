//! Core types used throughout Stratum
//!
//! This module contains the primitive types shared by the IR and the
//! analysis engine: type identifiers, field data types, delete semantics
//! and the database providers a run can target.

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Index of a type in its domain's type table.
///
/// Types and fields refer to other types only through this key; the domain
/// owns every type and resolves the key on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub usize);

impl TypeId {
    /// Position of the type in the domain table
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Data Types
// ============================================================================

/// Semantic data types for fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params")]
pub enum DataType {
    /// Variable-length string
    #[default]
    String,
    /// Long-form text content
    Text,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// Fixed-point decimal (precision/scale live on the field)
    Decimal,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Boolean true/false
    Bool,
    /// UUID
    Uuid,
    /// Date and time with timezone
    DateTime,
    /// Date without time
    Date,
    /// Time without date
    Time,
    /// Binary data
    Bytes,
    /// JSON document
    Json,
    /// Value of an enum type declared in the domain
    Enum { name: String },
}

impl DataType {
    /// Check if the type holds free text
    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::String | DataType::Text)
    }

    /// Check if the type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::Decimal
                | DataType::Float32
                | DataType::Float64
        )
    }

    /// Check if the type is a point in time
    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::DateTime | DataType::Date | DataType::Time)
    }

    /// Get a human-readable name for the type
    pub fn display_name(&self) -> String {
        match self {
            DataType::String => "String".to_string(),
            DataType::Text => "Text".to_string(),
            DataType::Int16 => "Int16".to_string(),
            DataType::Int32 => "Int32".to_string(),
            DataType::Int64 => "Int64".to_string(),
            DataType::Decimal => "Decimal".to_string(),
            DataType::Float32 => "Float32".to_string(),
            DataType::Float64 => "Float64".to_string(),
            DataType::Bool => "Bool".to_string(),
            DataType::Uuid => "UUID".to_string(),
            DataType::DateTime => "DateTime".to_string(),
            DataType::Date => "Date".to_string(),
            DataType::Time => "Time".to_string(),
            DataType::Bytes => "Bytes".to_string(),
            DataType::Json => "JSON".to_string(),
            DataType::Enum { name } => format!("Enum<{}>", name),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Delete Semantics
// ============================================================================

/// How rows of a type are removed.
///
/// Variants are ordered by precedence: a soft-delete marker wins over a
/// hard-delete override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteType {
    /// No delete operation is generated
    #[default]
    None,
    /// Rows are physically deleted
    Hard,
    /// Rows are flagged through a delete-marker field
    Soft,
}

impl DeleteType {
    /// Check whether any delete operation exists
    pub fn is_deletable(&self) -> bool {
        !matches!(self, DeleteType::None)
    }
}

impl std::fmt::Display for DeleteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteType::None => write!(f, "none"),
            DeleteType::Hard => write!(f, "hard"),
            DeleteType::Soft => write!(f, "soft"),
        }
    }
}

// ============================================================================
// Database Providers
// ============================================================================

/// Database providers a run can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    PostgreSql,
    SqlServer,
    MySql,
    Sqlite,
}

impl DatabaseProvider {
    /// Get the display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseProvider::PostgreSql => "PostgreSQL",
            DatabaseProvider::SqlServer => "SQL Server",
            DatabaseProvider::MySql => "MySQL",
            DatabaseProvider::Sqlite => "SQLite",
        }
    }

    /// Whether the provider's customary identifiers are PascalCase
    pub fn prefers_pascal_case(&self) -> bool {
        matches!(self, DatabaseProvider::SqlServer)
    }
}

impl std::fmt::Display for DatabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================
