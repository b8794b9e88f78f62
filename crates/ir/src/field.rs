//! Field definitions for type members
//!
//! This module contains the `Field` struct: a named, ordered member of a
//! type carrying its data type, role flags and the optional foreign-key
//! reference pair used by ownership resolution and rank.

use heck::ToTitleCase;
use serde::{Deserialize, Serialize};
use stratum_core::{DataType, EngineError, EngineResult, TypeId, Validatable};

// ============================================================================
// Field
// ============================================================================

/// Represents a field within a type (maps to a column or member)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Field {
    /// Field name as declared in the schema
    pub name: String,

    /// Semantic data type
    pub data_type: DataType,

    /// Whether the column accepts NULL
    pub nullable: bool,

    /// Maximum length for strings and binary values
    pub size: Option<u32>,

    /// Total digits for decimals
    pub precision: Option<u32>,

    /// Digits after the decimal point
    pub scale: Option<u32>,

    /// Identity (primary key) field
    pub is_key: bool,

    /// A value must be supplied by the caller
    pub is_required: bool,

    /// Value is produced by the database (defaults, computed columns)
    pub is_computed: bool,

    /// Soft-delete flag
    pub is_delete_marker: bool,

    /// Holds file content
    pub is_file: bool,

    /// Included in free-text search
    pub is_searchable: bool,

    /// Records the user who created the row
    pub is_created_by: bool,

    /// Records when the row was created
    pub is_created_at: bool,

    /// Records the user who last modified the row
    pub is_modified_by: bool,

    /// Records when the row was last modified
    pub is_modified_at: bool,

    /// Attachment thumbnail content
    pub is_thumbnail: bool,

    /// Attachment MIME type
    pub is_content_type: bool,

    /// Type referenced by this field (foreign key target)
    pub referenced_type: Option<TypeId>,

    /// Identity field of the referenced type
    pub referenced_field: Option<String>,
}

impl Field {
    /// Create a new nullable field with the given name and data type
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            size: None,
            precision: None,
            scale: None,
            is_key: false,
            is_required: false,
            is_computed: false,
            is_delete_marker: false,
            is_file: false,
            is_searchable: false,
            is_created_by: false,
            is_created_at: false,
            is_modified_by: false,
            is_modified_at: false,
            is_thumbnail: false,
            is_content_type: false,
            referenced_type: None,
            referenced_field: None,
        }
    }

    /// Create a database-generated identity field
    pub fn key(name: impl Into<String>) -> Self {
        let mut field = Self::new(name, DataType::Int64);
        field.is_key = true;
        field.is_computed = true;
        field.nullable = false;
        field
    }

    /// Create a required reference field pointing at another type's identity
    pub fn reference(
        name: impl Into<String>,
        target: TypeId,
        target_field: impl Into<String>,
    ) -> Self {
        Self::new(name, DataType::Int64)
            .required()
            .references(target, target_field)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as required (caller-supplied, NOT NULL)
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self.nullable = false;
        self
    }

    /// Mark the field as database-computed
    pub fn computed(mut self) -> Self {
        self.is_computed = true;
        self
    }

    /// Set the maximum size
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set precision and scale
    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Point the field at another type's identity field
    pub fn references(mut self, target: TypeId, target_field: impl Into<String>) -> Self {
        self.referenced_type = Some(target);
        self.referenced_field = Some(target_field.into());
        self
    }

    /// Mark the field as the soft-delete flag
    pub fn delete_marker(mut self) -> Self {
        self.is_delete_marker = true;
        self
    }

    /// Mark the field as holding file content
    pub fn file(mut self) -> Self {
        self.is_file = true;
        self
    }

    /// Mark the field as searchable
    pub fn searchable(mut self) -> Self {
        self.is_searchable = true;
        self
    }

    /// Mark the field as the created-by tracking field
    pub fn created_by(mut self) -> Self {
        self.is_created_by = true;
        self
    }

    /// Mark the field as the created-at tracking field
    pub fn created_at(mut self) -> Self {
        self.is_created_at = true;
        self
    }

    /// Mark the field as the modified-by tracking field
    pub fn modified_by(mut self) -> Self {
        self.is_modified_by = true;
        self
    }

    /// Mark the field as the modified-at tracking field
    pub fn modified_at(mut self) -> Self {
        self.is_modified_at = true;
        self
    }

    /// Mark the field as an attachment thumbnail
    pub fn thumbnail(mut self) -> Self {
        self.is_thumbnail = true;
        self
    }

    /// Mark the field as an attachment content type
    pub fn content_type(mut self) -> Self {
        self.is_content_type = true;
        self
    }

    // ========================================================================
    // Role queries
    // ========================================================================

    /// Check if the field carries a foreign-key reference
    pub fn is_reference(&self) -> bool {
        self.referenced_type.is_some()
    }

    /// Check if the field tracks creation or modification
    pub fn is_tracking(&self) -> bool {
        self.is_created_by || self.is_created_at || self.is_modified_by || self.is_modified_at
    }

    /// Check if the field records the acting user
    pub fn is_tracking_user(&self) -> bool {
        self.is_created_by || self.is_modified_by
    }

    /// Check if the caller supplies this field's value on insert
    pub fn is_caller_provided(&self) -> bool {
        !self.is_key && !self.is_computed && !self.is_tracking() && !self.is_delete_marker
    }

    /// Check if this reference points back at its own type
    pub fn is_self_reference(&self, owner: TypeId) -> bool {
        self.referenced_type == Some(owner)
    }

    /// Get the display label derived from the field name
    pub fn display_label(&self) -> String {
        self.name.to_title_case()
    }
}

impl Validatable for Field {
    fn validate(&self) -> EngineResult<()> {
        if self.name.is_empty() {
            return Err(EngineError::validation("Field name cannot be empty"));
        }

        if !is_valid_identifier(&self.name) {
            return Err(EngineError::validation(format!(
                "Field name '{}' is not a valid identifier",
                self.name
            )));
        }

        match (&self.referenced_type, &self.referenced_field) {
            (Some(_), None) => Err(EngineError::validation(
                "Reference field is missing its referenced identity field",
            )),
            (None, Some(target)) => Err(EngineError::validation(format!(
                "Referenced field '{}' has no referenced type",
                target
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new("field", DataType::String)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check if a string is a valid identifier
pub(crate) fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !first.is_alphabetic() && first != '_' {
        return false;
    }

    chars.all(|c| c.is_alphanumeric() || c == '_')
}

// ============================================================================
// Tests
// ============================================================================
