//! Derived operations
//!
//! Operations are the database functions and API actions emitters render for
//! each application type. They are derived from the analysed schema and
//! owned by the domain alongside the types.

use serde::{Deserialize, Serialize};
use stratum_core::{DataType, TypeId};

// ============================================================================
// Operation
// ============================================================================

/// A derived operation over one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation name, rendered through the run's naming convention
    pub name: String,

    /// Namespace of the target type
    pub namespace: String,

    /// What the operation does
    pub kind: OperationKind,

    /// Type the operation acts on
    pub target: TypeId,

    /// Parameters in call order
    pub parameters: Vec<Parameter>,

    /// Shape of the returned data
    pub returns: OperationReturn,

    /// Rows are filtered through the type's ownership chain
    pub secured: bool,

    /// Ownership chain field names joined to authorize the caller
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ownership_chain: Vec<String>,
}

impl Operation {
    /// Create an operation without parameters
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        kind: OperationKind,
        target: TypeId,
        returns: OperationReturn,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind,
            target,
            parameters: Vec::new(),
            returns,
            secured: false,
            ownership_chain: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Get a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Parameter names in call order
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Check if the operation changes data
    pub fn is_mutation(&self) -> bool {
        self.kind.is_mutation()
    }
}

// ============================================================================
// OperationKind
// ============================================================================

/// Operation kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    Insert,
    Update,
    Delete,
    SelectById,
    SelectAll,
    /// Rows whose reference field equals the argument
    SelectByReference { field: String },
    /// Free-text search over searchable fields
    Search,
}

impl OperationKind {
    /// Lexical parts appended to the type name to form the operation name
    pub fn name_parts(&self) -> Vec<String> {
        let words: &[&str] = match self {
            OperationKind::Insert => &["insert"],
            OperationKind::Update => &["update"],
            OperationKind::Delete => &["delete"],
            OperationKind::SelectById => &["select", "by", "id"],
            OperationKind::SelectAll => &["select", "all"],
            OperationKind::SelectByReference { .. } => &["select", "by"],
            OperationKind::Search => &["search"],
        };
        words.iter().map(|w| w.to_string()).collect()
    }

    /// Check if the operation changes data
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            OperationKind::Insert | OperationKind::Update | OperationKind::Delete
        )
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Insert => write!(f, "insert"),
            OperationKind::Update => write!(f, "update"),
            OperationKind::Delete => write!(f, "delete"),
            OperationKind::SelectById => write!(f, "select by id"),
            OperationKind::SelectAll => write!(f, "select all"),
            OperationKind::SelectByReference { field } => write!(f, "select by {}", field),
            OperationKind::Search => write!(f, "search"),
        }
    }
}

// ============================================================================
// Parameter / OperationReturn
// ============================================================================

/// An operation parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, derived through the naming convention
    pub name: String,

    /// Source field, when the parameter maps to one
    pub field: Option<String>,

    pub data_type: DataType,

    pub nullable: bool,
}

impl Parameter {
    /// Parameter bound to a field
    pub fn for_field(
        name: impl Into<String>,
        field: impl Into<String>,
        data_type: DataType,
        nullable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            field: Some(field.into()),
            data_type,
            nullable,
        }
    }

    /// Parameter with no backing field (security user, paging, search text)
    pub fn synthetic(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            field: None,
            data_type,
            nullable: false,
        }
    }
}

/// What an operation returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "type", rename_all = "snake_case")]
pub enum OperationReturn {
    Nothing,
    One(TypeId),
    Many(TypeId),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_builder() {
        let op = Operation::new(
            "order_select_by_id",
            "sales",
            OperationKind::SelectById,
            TypeId(2),
            OperationReturn::One(TypeId(2)),
        )
        .with_parameter(Parameter::for_field("id_param", "id", DataType::Int64, false));

        assert_eq!(op.parameter_names(), vec!["id_param"]);
        assert_eq!(op.parameter("id_param").unwrap().field.as_deref(), Some("id"));
        assert!(!op.is_mutation());
    }

    #[test]
    fn test_kind_name_parts() {
        assert_eq!(OperationKind::SelectById.name_parts(), vec!["select", "by", "id"]);
        assert_eq!(
            OperationKind::SelectByReference {
                field: "customer_id".to_string()
            }
            .name_parts(),
            vec!["select", "by"]
        );
        assert!(OperationKind::Delete.is_mutation());
    }

    #[test]
    fn test_return_serde_shape() {
        let json = serde_json::to_string(&OperationReturn::Many(TypeId(4))).unwrap();
        assert_eq!(json, r#"{"shape":"many","type":4}"#);
        let nothing = serde_json::to_string(&OperationReturn::Nothing).unwrap();
        assert_eq!(nothing, r#"{"shape":"nothing"}"#);
    }
}
