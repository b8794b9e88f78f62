//! Schema-integrity validation for a domain
//!
//! Validation collects every integrity issue in one pass instead of failing
//! on the first. Each error names the type (and field, when relevant) it was
//! found on so callers can skip just the affected types.

use crate::domain::Domain;
use crate::field::{Field, is_valid_identifier};
use crate::type_def::{TypeDef, TypeKind};
use std::collections::HashSet;
use stratum_core::{DataType, EngineError, TypeId};

// ============================================================================
// ValidationResult
// ============================================================================

/// Every issue found in one validation pass
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Check if no errors were found; warnings do not count
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    fn absorb(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Errors recorded against one type
    pub fn errors_for(&self, id: TypeId) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.type_id == Some(id))
    }

    /// First error that must abort the run
    pub fn fatal_error(&self) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.code.is_fatal())
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// A validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error code for programmatic handling
    pub code: ValidationErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Type the error was found on
    pub type_id: Option<TypeId>,

    /// Name of that type
    pub type_name: Option<String>,

    /// Field the error was found on
    pub field: Option<String>,

    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            type_id: None,
            type_name: None,
            field: None,
            suggestion: None,
        }
    }

    /// Attach the type the error was found on
    pub fn on_type(mut self, ty: &TypeDef) -> Self {
        self.type_id = Some(ty.id);
        self.type_name = Some(ty.name.clone());
        self
    }

    /// Attach the field the error was found on
    pub fn on_field(mut self, field: &Field) -> Self {
        self.field = Some(field.name.clone());
        self
    }

    /// Add a suggestion to the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Dotted path to the problematic element (e.g. `order.customer_id`)
    pub fn path(&self) -> Option<String> {
        match (&self.type_name, &self.field) {
            (Some(ty), Some(field)) => Some(format!("{}.{}", ty, field)),
            (Some(ty), None) => Some(ty.clone()),
            _ => None,
        }
    }

    /// Convert into the matching engine error
    pub fn to_engine_error(&self) -> EngineError {
        let type_name = self.type_name.clone().unwrap_or_default();
        match (&self.code, &self.field) {
            (ValidationErrorCode::MissingIdentity, _) => EngineError::MissingIdentity { type_name },
            (_, Some(field)) => EngineError::field_integrity(type_name, field, &self.message),
            (_, None) if self.type_name.is_some() => {
                EngineError::type_integrity(type_name, &self.message)
            }
            _ => EngineError::validation(&self.message),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = self.path() {
            write!(f, "[{}] {}", path, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

// ============================================================================
// ValidationErrorCode
// ============================================================================

/// Error codes for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    // Type errors
    InvalidTypeName,
    MissingIdentity,
    MultipleIdentity,
    EmptyEnum,

    // Field errors
    InvalidFieldName,
    DuplicateFieldName,

    // Reference errors
    IncompleteReference,
    UnknownReferencedType,
    ReferenceNotIdentity,
}

impl ValidationErrorCode {
    /// Check if the error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, ValidationErrorCode::MissingIdentity)
    }
}

// ============================================================================
// ValidationWarning
// ============================================================================

/// A validation warning (non-fatal issue)
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Warning code
    pub code: ValidationWarningCode,

    /// Human-readable warning message
    pub message: String,

    /// Path to the element
    pub path: Option<String>,
}

impl ValidationWarning {
    /// Create a new warning
    pub fn new(code: ValidationWarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Add a path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] Warning: {}", path, self.message)
        } else {
            write!(f, "Warning: {}", self.message)
        }
    }
}

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationWarningCode {
    NoFields,
    UnknownEnumType,
    CaseInsensitiveFieldClash,
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait for validation rules
pub trait ValidationRule {
    /// Get the rule name
    fn name(&self) -> &'static str;

    /// Validate a domain and return the result
    fn validate(&self, domain: &Domain) -> ValidationResult;
}

// ============================================================================
// Validator
// ============================================================================

/// Runs the integrity rules over a domain
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Validator running every built-in rule
    pub fn with_default_rules() -> Self {
        Self {
            rules: vec![
                Box::new(TypeNamesRule),
                Box::new(IdentityRule),
                Box::new(FieldsRule),
                Box::new(ReferencesRule),
            ],
        }
    }

    /// Validate a domain with all rules
    pub fn validate(&self, domain: &Domain) -> ValidationResult {
        let mut result = ValidationResult::default();

        for rule in &self.rules {
            let rule_result = rule.validate(domain);
            if !rule_result.is_valid() {
                tracing::debug!(
                    "Rule '{}' reported {} error(s)",
                    rule.name(),
                    rule_result.errors.len()
                );
            }
            result.absorb(rule_result);
        }

        result
    }
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

/// Rule: type names are identifiers and enums declare values
pub struct TypeNamesRule;

impl ValidationRule for TypeNamesRule {
    fn name(&self) -> &'static str {
        "type_names"
    }

    fn validate(&self, domain: &Domain) -> ValidationResult {
        let mut result = ValidationResult::default();

        for ty in domain.types() {
            if !is_valid_identifier(&ty.name) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::InvalidTypeName,
                        format!("'{}' is not a valid type name", ty.name),
                    )
                    .on_type(ty)
                    .with_suggestion("Use letters, digits and underscores only"),
                );
            }

            if let TypeKind::Enum { values } = &ty.kind {
                if values.is_empty() {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::EmptyEnum,
                            "enum declares no values",
                        )
                        .on_type(ty),
                    );
                }
            }
        }

        result
    }
}

/// Rule: application types declare exactly one identity field
pub struct IdentityRule;

impl ValidationRule for IdentityRule {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn validate(&self, domain: &Domain) -> ValidationResult {
        let mut result = ValidationResult::default();

        for ty in domain.application_types() {
            let keys = ty.key_fields();
            match keys.len() {
                1 => {}
                0 => result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::MissingIdentity,
                        "no identity field declared",
                    )
                    .on_type(ty)
                    .with_suggestion("Mark one field with is_key = true"),
                ),
                _ => result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::MultipleIdentity,
                        format!(
                            "multiple identity fields declared: {}",
                            keys.iter()
                                .map(|f| f.name.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    )
                    .on_type(ty),
                ),
            }
        }

        result
    }
}

/// Rule: field names are valid and unique within their type
pub struct FieldsRule;

impl ValidationRule for FieldsRule {
    fn name(&self) -> &'static str {
        "fields"
    }

    fn validate(&self, domain: &Domain) -> ValidationResult {
        let mut result = ValidationResult::default();
        let enum_names: HashSet<&str> = domain.enum_types().map(|t| t.name.as_str()).collect();

        for ty in domain.types() {
            if ty.fields.is_empty() && !ty.is_enum() {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::NoFields,
                        format!("Type '{}' has no fields", ty.name),
                    )
                    .with_path(&ty.name),
                );
            }

            let mut seen: HashSet<&str> = HashSet::new();
            let mut seen_lower: HashSet<String> = HashSet::new();
            for field in &ty.fields {
                let path = format!("{}.{}", ty.name, field.name);

                if !is_valid_identifier(&field.name) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::InvalidFieldName,
                            format!("'{}' is not a valid field name", field.name),
                        )
                        .on_type(ty)
                        .on_field(field),
                    );
                }

                if !seen.insert(field.name.as_str()) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::DuplicateFieldName,
                            format!("duplicate field name '{}'", field.name),
                        )
                        .on_type(ty)
                        .on_field(field),
                    );
                } else if !seen_lower.insert(field.name.to_lowercase()) {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::CaseInsensitiveFieldClash,
                            format!("'{}' differs from another field only by case", field.name),
                        )
                        .with_path(&path),
                    );
                }

                if let DataType::Enum { name } = &field.data_type {
                    if !enum_names.contains(name.as_str()) {
                        result.add_warning(
                            ValidationWarning::new(
                                ValidationWarningCode::UnknownEnumType,
                                format!("enum type '{}' is not registered", name),
                            )
                            .with_path(&path),
                        );
                    }
                }
            }
        }

        result
    }
}

/// Rule: reference pairs are complete and point at an identity field
pub struct ReferencesRule;

impl ValidationRule for ReferencesRule {
    fn name(&self) -> &'static str {
        "references"
    }

    fn validate(&self, domain: &Domain) -> ValidationResult {
        let mut result = ValidationResult::default();

        for ty in domain.types() {
            for field in &ty.fields {
                let (target_id, target_field) =
                    match (field.referenced_type, field.referenced_field.as_deref()) {
                        (None, None) => continue,
                        (Some(id), Some(name)) => (id, name),
                        _ => {
                            result.add_error(
                                ValidationError::new(
                                    ValidationErrorCode::IncompleteReference,
                                    "referenced type and referenced field must be set together",
                                )
                                .on_type(ty)
                                .on_field(field),
                            );
                            continue;
                        }
                    };

                let Some(target) = domain.get(target_id) else {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::UnknownReferencedType,
                            format!("references unknown type {}", target_id),
                        )
                        .on_type(ty)
                        .on_field(field),
                    );
                    continue;
                };

                let is_identity = target
                    .field(target_field)
                    .map(|f| f.is_key)
                    .unwrap_or(false);
                if !is_identity {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::ReferenceNotIdentity,
                            format!(
                                "referenced field '{}.{}' is not the identity field",
                                target.name, target_field
                            ),
                        )
                        .on_type(ty)
                        .on_field(field),
                    );
                }
            }
        }

        result
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::type_def::EnumValue;
    use stratum_core::DatabaseProvider;

    fn domain() -> Domain {
        Domain::new(Settings::new().with_provider(DatabaseProvider::PostgreSql)).unwrap()
    }

    #[test]
    fn test_warnings_keep_result_valid() {
        let mut result = ValidationResult::default();
        result.add_warning(ValidationWarning::new(ValidationWarningCode::NoFields, "empty"));
        assert!(result.is_valid());

        let ty = TypeDef::application("order");
        result.add_error(
            ValidationError::new(ValidationErrorCode::MissingIdentity, "no identity").on_type(&ty),
        );
        assert!(!result.is_valid());
        assert!(result.fatal_error().is_some());
    }

    #[test]
    fn test_validation_error_display() {
        let ty = TypeDef::application("order");
        let field = Field::new("customer_id", DataType::Int64);
        let error = ValidationError::new(ValidationErrorCode::IncompleteReference, "broken")
            .on_type(&ty)
            .on_field(&field);

        assert_eq!(error.to_string(), "[order.customer_id] broken");
        assert!(error.to_engine_error().is_integrity());

        let hinted = error.with_suggestion("point it at customer.id");
        assert_eq!(hinted.to_string(), "[order.customer_id] broken (point it at customer.id)");
    }

    #[test]
    fn test_valid_domain() {
        let mut d = domain();
        let customer = d
            .add_type(TypeDef::application("customer").with_field(Field::key("id")))
            .unwrap();
        d.add_type(
            TypeDef::application("order")
                .with_field(Field::key("id"))
                .with_field(Field::reference("customer_id", customer, "id")),
        )
        .unwrap();

        let result = Validator::with_default_rules().validate(&d);
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn test_missing_identity_is_fatal() {
        let mut d = domain();
        d.add_type(TypeDef::application("order").with_field(Field::new("name", DataType::String)))
            .unwrap();

        let result = Validator::with_default_rules().validate(&d);
        let err = result.fatal_error().unwrap().to_engine_error();
        assert!(err.is_fatal());
        assert_eq!(err.type_name(), Some("order"));
    }

    #[test]
    fn test_reference_errors_name_type_and_field() {
        let mut d = domain();
        let customer = d
            .add_type(
                TypeDef::application("customer")
                    .with_field(Field::key("id"))
                    .with_field(Field::new("code", DataType::String)),
            )
            .unwrap();
        let order = d
            .add_type(
                TypeDef::application("order")
                    .with_field(Field::key("id"))
                    .with_field(Field::reference("customer_id", customer, "code"))
                    .with_field(Field::reference("ghost_id", TypeId(42), "id")),
            )
            .unwrap();

        let result = ReferencesRule.validate(&d);
        let codes: Vec<_> = result.errors_for(order).map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                ValidationErrorCode::ReferenceNotIdentity,
                ValidationErrorCode::UnknownReferencedType
            ]
        );
        assert_eq!(result.errors[0].path().as_deref(), Some("order.customer_id"));
        assert!(result.errors_for(customer).next().is_none());
        assert!(result.fatal_error().is_none());
        assert!(!result.errors[0].to_engine_error().is_fatal());
    }

    #[test]
    fn test_incomplete_reference() {
        let mut d = domain();
        let mut field = Field::new("customer_id", DataType::Int64);
        field.referenced_field = Some("id".to_string());
        d.add_type(
            TypeDef::application("order")
                .with_field(Field::key("id"))
                .with_field(field),
        )
        .unwrap();

        let result = ReferencesRule.validate(&d);
        assert_eq!(result.errors[0].code, ValidationErrorCode::IncompleteReference);
    }

    #[test]
    fn test_fields_rule() {
        let mut d = domain();
        d.add_type(TypeDef::enumeration("status", vec![EnumValue::new("open", 1)]))
            .unwrap();
        let mut ty = TypeDef::application("order")
            .with_field(Field::key("id"))
            .with_field(Field::new("Name", DataType::String))
            .with_field(Field::new("name", DataType::String))
            .with_field(Field::new("state", DataType::Enum { name: "state".into() }))
            .with_field(Field::new("status", DataType::Enum { name: "status".into() }));
        ty.fields.push(Field::new("name", DataType::String));
        d.add_type(ty).unwrap();

        let result = FieldsRule.validate(&d);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ValidationErrorCode::DuplicateFieldName);

        let warnings: Vec<_> = result.warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            warnings,
            vec![
                ValidationWarningCode::CaseInsensitiveFieldClash,
                ValidationWarningCode::UnknownEnumType
            ]
        );
    }

    #[test]
    fn test_empty_enum() {
        let mut d = domain();
        d.add_type(TypeDef::enumeration("status", vec![])).unwrap();
        let result = TypeNamesRule.validate(&d);
        assert_eq!(result.errors[0].code, ValidationErrorCode::EmptyEnum);
    }
}
