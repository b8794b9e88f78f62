//! Type definitions
//!
//! A `TypeDef` is the shared base record (name, namespace, ordered fields,
//! overrides) tagged with a closed `TypeKind`: application entities, result
//! shapes returned by operations, and enums.

use crate::field::{Field, is_valid_identifier};
use serde::{Deserialize, Serialize};
use stratum_core::{EngineError, EngineResult, TypeId, Validatable};

// ============================================================================
// TypeDef
// ============================================================================

/// A named container of ordered fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Key of this type in its domain; assigned when the type is registered
    pub id: TypeId,

    /// Type name as declared in the schema
    pub name: String,

    /// Namespace (schema) the type lives in
    pub namespace: String,

    /// Fields in declaration order
    pub fields: Vec<Field>,

    /// Per-type configuration overrides
    #[serde(default)]
    pub overrides: TypeOverrides,

    /// Variant tag
    pub kind: TypeKind,
}

impl TypeDef {
    /// Create a type of the given kind in the default namespace
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            id: TypeId(0),
            name: name.into(),
            namespace: String::new(),
            fields: Vec::new(),
            overrides: TypeOverrides::default(),
            kind,
        }
    }

    /// Create an application (persisted entity) type
    pub fn application(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Application)
    }

    /// Create a result type, optionally derived from an application type
    pub fn result(name: impl Into<String>, source: Option<TypeId>) -> Self {
        Self::new(name, TypeKind::Result { source })
    }

    /// Create an enum type
    pub fn enumeration(name: impl Into<String>, values: Vec<EnumValue>) -> Self {
        Self::new(name, TypeKind::Enum { values })
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the namespace
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Append a field
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Replace the overrides record
    pub fn with_overrides(mut self, overrides: TypeOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    // ========================================================================
    // Field access
    // ========================================================================

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a field by name, failing with `FieldNotFound`
    pub fn require_field(&self, name: &str) -> EngineResult<&Field> {
        self.field(name).ok_or_else(|| EngineError::FieldNotFound {
            type_name: self.name.clone(),
            field: name.to_string(),
        })
    }

    /// Check if the type has a field with the given name
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// All identity fields (well-formed application types have exactly one)
    pub fn key_fields(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.is_key).collect()
    }

    /// The single identity field.
    ///
    /// Fails with a type-integrity error when the type declares zero or
    /// several identity fields.
    pub fn identity_field(&self) -> EngineResult<&Field> {
        let keys = self.key_fields();
        match keys.as_slice() {
            [key] => Ok(*key),
            [] => Err(EngineError::MissingIdentity {
                type_name: self.name.clone(),
            }),
            many => Err(EngineError::type_integrity(
                &self.name,
                format!(
                    "multiple identity fields declared: {}",
                    many.iter()
                        .map(|f| f.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }

    /// Reference fields in declaration order
    pub fn reference_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_reference())
    }

    /// Fields the caller supplies on insert
    pub fn caller_provided_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_caller_provided())
    }

    /// First tracking-user field, preferring created-by over modified-by
    pub fn tracking_user_field(&self) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.is_created_by)
            .or_else(|| self.fields.iter().find(|f| f.is_modified_by))
    }

    /// First field flagged as holding file content
    pub fn file_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_file)
    }

    /// Searchable fields in declaration order
    pub fn searchable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_searchable)
    }

    /// Qualified `namespace.name` (or just `name` without a namespace)
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    // ========================================================================
    // Kind queries
    // ========================================================================

    /// Check if this is an application type
    pub fn is_application(&self) -> bool {
        matches!(self.kind, TypeKind::Application)
    }

    /// Check if this is a result type
    pub fn is_result(&self) -> bool {
        matches!(self.kind, TypeKind::Result { .. })
    }

    /// Check if this is an enum type
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }
}

impl Validatable for TypeDef {
    fn validate(&self) -> EngineResult<()> {
        if !is_valid_identifier(&self.name) {
            return Err(EngineError::type_integrity(
                &self.name,
                format!("'{}' is not a valid type name", self.name),
            ));
        }

        match &self.kind {
            TypeKind::Application => {
                self.identity_field()?;
            }
            TypeKind::Result { .. } => {}
            TypeKind::Enum { values } => {
                if values.is_empty() {
                    return Err(EngineError::type_integrity(
                        &self.name,
                        "enum declares no values",
                    ));
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            field.validate().map_err(|e| {
                EngineError::field_integrity(&self.name, &field.name, e.to_string())
            })?;
            if !seen.insert(field.name.as_str()) {
                return Err(EngineError::DuplicateField {
                    type_name: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        Ok(())
    }
}

// ============================================================================
// TypeKind
// ============================================================================

/// The closed set of type variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum TypeKind {
    /// Persisted entity with exactly one identity field
    Application,
    /// Shape returned by an operation
    Result { source: Option<TypeId> },
    /// Named constant set
    Enum { values: Vec<EnumValue> },
}

/// A single enum member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

impl EnumValue {
    /// Create a new enum value
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

// ============================================================================
// TypeOverrides
// ============================================================================

/// Explicit per-type configuration overrides.
///
/// Every entry is optional; `None` means "derive from the schema".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeOverrides {
    /// Exclude the type from every generated artifact
    pub ignore: Option<bool>,
    /// Generate API surface
    pub api: Option<bool>,
    /// Generate UI screens
    pub ui: Option<bool>,
    /// Physically delete rows
    pub hard_delete: Option<bool>,
    /// Treat as an attachment holder
    pub is_attachment: Option<bool>,
    /// Treat as a security principal
    pub is_security_principal: Option<bool>,
    /// Treat as help content
    pub is_help: Option<bool>,
    /// Holds UI field labels
    pub is_field_labels: Option<bool>,
    /// Surface prominently in generated navigation
    pub important: Option<bool>,
    /// Page list queries
    pub paged: Option<bool>,
    /// Explicit application classification
    pub application_type: Option<ApplicationType>,
}

impl TypeOverrides {
    /// Create an empty overrides record
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude the type from generation
    pub fn ignored(mut self) -> Self {
        self.ignore = Some(true);
        self
    }

    /// Mark as a security principal
    pub fn security_principal(mut self) -> Self {
        self.is_security_principal = Some(true);
        self
    }

    /// Mark as an attachment holder
    pub fn attachment(mut self) -> Self {
        self.is_attachment = Some(true);
        self
    }

    /// Mark as reference data
    pub fn reference_data(mut self) -> Self {
        self.application_type = Some(ApplicationType::ReferenceData);
        self
    }

    /// Enable hard delete
    pub fn hard_delete(mut self) -> Self {
        self.hard_delete = Some(true);
        self
    }

    /// Disable API generation
    pub fn without_api(mut self) -> Self {
        self.api = Some(false);
        self
    }

    /// Disable UI generation
    pub fn without_ui(mut self) -> Self {
        self.ui = Some(false);
        self
    }

    /// Enable or disable paging
    pub fn with_paging(mut self, paged: bool) -> Self {
        self.paged = Some(paged);
        self
    }
}

/// Explicit classification of an application type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    /// Ordinary transactional entity
    Standard,
    /// Static lookup data
    ReferenceData,
}

// ============================================================================
// Tests
// ============================================================================
