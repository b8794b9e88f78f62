//! The domain registry
//!
//! A `Domain` owns every type of a run (application, result and enum types),
//! the operations derived from them, the run settings and the active naming
//! convention. It is populated once during ingestion, extended by derived
//! operation generation, and read-only to emitters afterwards.
//!
//! Types refer to each other only through [`TypeId`] keys into the domain's
//! type table, so the graph carries no ownership cycles.

use crate::field::Field;
use crate::naming::{Convention, NamingConvention};
use crate::operation::Operation;
use crate::settings::{FieldRole, Settings};
use crate::type_def::{TypeDef, TypeOverrides};
use std::collections::HashMap;
use stratum_core::{EngineError, EngineResult, TypeId, Validatable};

// ============================================================================
// Domain
// ============================================================================

/// Registry of the types, operations and settings for one run
#[derive(Debug, Clone)]
pub struct Domain {
    settings: Settings,
    naming: Convention,
    types: Vec<TypeDef>,
    /// Lookup: (namespace, name) → type
    index: HashMap<(String, String), TypeId>,
    operations: Vec<Operation>,
}

impl Domain {
    /// Create an empty domain.
    ///
    /// Fails with a configuration error when the settings are contradictory
    /// or the naming convention cannot be resolved.
    pub fn new(settings: Settings) -> EngineResult<Self> {
        settings.validate()?;
        let naming = Convention::from_settings(&settings)?;
        Ok(Self {
            settings,
            naming,
            types: Vec::new(),
            index: HashMap::new(),
            operations: Vec::new(),
        })
    }

    /// Run settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Active naming convention
    pub fn naming(&self) -> &Convention {
        &self.naming
    }

    // ========================================================================
    // Type Management
    // ========================================================================

    /// Register a type and return its key.
    ///
    /// Types without a namespace land in the default namespace. A second
    /// type with the same namespace and name is rejected.
    pub fn add_type(&mut self, mut ty: TypeDef) -> EngineResult<TypeId> {
        if ty.namespace.is_empty() {
            ty.namespace = self.settings.default_namespace.clone();
        }

        let key = (ty.namespace.clone(), ty.name.clone());
        if self.index.contains_key(&key) {
            return Err(EngineError::DuplicateType {
                namespace: ty.namespace,
                name: ty.name,
            });
        }

        let id = TypeId(self.types.len());
        ty.id = id;
        tracing::debug!("Registered type '{}' as {}", ty.qualified_name(), id);
        self.index.insert(key, id);
        self.types.push(ty);
        Ok(id)
    }

    /// Append a field to a registered type
    pub fn add_field(&mut self, id: TypeId, field: Field) -> EngineResult<()> {
        let ty = self.require_mut(id)?;
        if ty.has_field(&field.name) {
            return Err(EngineError::DuplicateField {
                type_name: ty.name.clone(),
                field: field.name,
            });
        }
        ty.fields.push(field);
        Ok(())
    }

    /// Get a type by key
    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.index())
    }

    /// Mutable overrides of a registered type.
    ///
    /// Name, namespace and key stay fixed once registered.
    pub fn overrides_mut(&mut self, id: TypeId) -> Option<&mut TypeOverrides> {
        self.types.get_mut(id.index()).map(|ty| &mut ty.overrides)
    }

    /// Get a type by key, failing with `TypeNotFound`
    pub fn require(&self, id: TypeId) -> EngineResult<&TypeDef> {
        self.get(id)
            .ok_or_else(|| EngineError::TypeNotFound(id.to_string()))
    }

    fn require_mut(&mut self, id: TypeId) -> EngineResult<&mut TypeDef> {
        self.types
            .get_mut(id.index())
            .ok_or_else(|| EngineError::TypeNotFound(id.to_string()))
    }

    /// Find a type by namespace and name
    pub fn find(&self, namespace: &str, name: &str) -> Option<&TypeDef> {
        self.index
            .get(&(namespace.to_string(), name.to_string()))
            .and_then(|&id| self.get(id))
    }

    /// Find the first type with the given name in any namespace
    pub fn find_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// All types in registration order
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter()
    }

    /// Application types in registration order
    pub fn application_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter().filter(|t| t.is_application())
    }

    /// Result types in registration order
    pub fn result_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter().filter(|t| t.is_result())
    }

    /// Enum types in registration order
    pub fn enum_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter().filter(|t| t.is_enum())
    }

    /// Number of registered types
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ========================================================================
    // Reference Navigation
    // ========================================================================

    /// The type a reference field points at
    pub fn referenced_type(&self, field: &Field) -> Option<&TypeDef> {
        field.referenced_type.and_then(|id| self.get(id))
    }

    /// Every (type, field) pair referencing `target`
    pub fn referencing_fields(&self, target: TypeId) -> Vec<(&TypeDef, &Field)> {
        self.types
            .iter()
            .flat_map(|ty| {
                ty.fields
                    .iter()
                    .filter(move |f| f.referenced_type == Some(target))
                    .map(move |f| (ty, f))
            })
            .collect()
    }

    // ========================================================================
    // Ingestion Helpers
    // ========================================================================

    /// Set tracking and attachment role flags from field names.
    ///
    /// Each field is tested against the active convention's role names; a
    /// match sets the corresponding flag. Returns the number of flags set.
    pub fn infer_field_roles(&mut self) -> usize {
        let naming = &self.naming;
        let mut inferred = 0;

        for ty in &mut self.types {
            for field in &mut ty.fields {
                let Some(role) = naming.field_role(&field.name) else {
                    continue;
                };
                let flag = match role {
                    FieldRole::CreatedBy => &mut field.is_created_by,
                    FieldRole::CreatedAt => &mut field.is_created_at,
                    FieldRole::ModifiedBy => &mut field.is_modified_by,
                    FieldRole::ModifiedAt => &mut field.is_modified_at,
                    FieldRole::Thumbnail => &mut field.is_thumbnail,
                    FieldRole::ContentType => &mut field.is_content_type,
                };
                if !*flag {
                    *flag = true;
                    inferred += 1;
                    tracing::debug!("Inferred {:?} for '{}.{}'", role, ty.name, field.name);
                }
            }
        }

        inferred
    }

    // ========================================================================
    // Operation Management
    // ========================================================================

    /// Derived operations in generation order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Operations targeting a type
    pub fn operations_for(&self, id: TypeId) -> Vec<&Operation> {
        self.operations.iter().filter(|op| op.target == id).collect()
    }

    /// Get an operation by name
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Add an operation; names are unique across the domain
    pub fn add_operation(&mut self, operation: Operation) -> EngineResult<()> {
        if self.operation(&operation.name).is_some() {
            return Err(EngineError::DuplicateOperation(operation.name));
        }
        self.operations.push(operation);
        Ok(())
    }

    /// Remove every derived operation
    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    // ========================================================================
    // Snapshot Support
    // ========================================================================

    /// Rebuild a domain from previously registered parts.
    ///
    /// Every type's key must match its position in `types`.
    pub fn from_parts(
        settings: Settings,
        types: Vec<TypeDef>,
        operations: Vec<Operation>,
    ) -> EngineResult<Self> {
        let mut domain = Self::new(settings)?;
        for (position, ty) in types.into_iter().enumerate() {
            if ty.id.index() != position {
                return Err(EngineError::validation(format!(
                    "type '{}' has key {} but is stored at position {}",
                    ty.name, ty.id, position
                )));
            }
            domain.add_type(ty)?;
        }
        for operation in operations {
            domain.add_operation(operation)?;
        }
        Ok(domain)
    }

    /// Decompose into settings, types and operations
    pub fn into_parts(self) -> (Settings, Vec<TypeDef>, Vec<Operation>) {
        (self.settings, self.types, self.operations)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{OperationKind, OperationReturn};
    use crate::settings::{DbNamingConvention, NamingConventionSettings};
    use stratum_core::{DataType, DatabaseProvider};

    fn domain() -> Domain {
        Domain::new(Settings::new().with_provider(DatabaseProvider::PostgreSql)).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_settings() {
        assert!(Domain::new(Settings::default()).unwrap_err().is_configuration());
    }

    #[test]
    fn test_add_type_assigns_ids() {
        let mut d = domain();
        let a = d.add_type(TypeDef::application("customer")).unwrap();
        let b = d.add_type(TypeDef::application("order")).unwrap();
        assert_eq!(a, TypeId(0));
        assert_eq!(b, TypeId(1));
        assert_eq!(d.get(b).unwrap().id, b);
        assert_eq!(d.type_count(), 2);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut d = domain();
        d.add_type(TypeDef::application("order").in_namespace("sales"))
            .unwrap();
        let err = d
            .add_type(TypeDef::application("order").in_namespace("sales"))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateType { .. }));

        // same name in another namespace is fine
        assert!(
            d.add_type(TypeDef::application("order").in_namespace("archive"))
                .is_ok()
        );
        assert!(d.find("archive", "order").is_some());
    }

    #[test]
    fn test_overrides_mut_keeps_index() {
        let mut d = domain();
        let id = d
            .add_type(TypeDef::application("order").in_namespace("sales"))
            .unwrap();

        *d.overrides_mut(id).unwrap() = TypeOverrides::new().ignored();
        assert_eq!(d.get(id).unwrap().overrides.ignore, Some(true));
        assert_eq!(d.find("sales", "order").unwrap().id, id);
        assert!(d.overrides_mut(TypeId(9)).is_none());
    }

    #[test]
    fn test_default_namespace_applied() {
        let mut settings = Settings::new().with_provider(DatabaseProvider::PostgreSql);
        settings.default_namespace = "public".to_string();
        let mut d = Domain::new(settings).unwrap();
        let id = d.add_type(TypeDef::application("order")).unwrap();
        assert_eq!(d.get(id).unwrap().namespace, "public");
        assert!(d.find("public", "order").is_some());
    }

    #[test]
    fn test_add_field() {
        let mut d = domain();
        let id = d.add_type(TypeDef::application("order")).unwrap();
        d.add_field(id, Field::key("id")).unwrap();
        assert!(d.add_field(id, Field::key("id")).is_err());
        assert!(d.add_field(TypeId(9), Field::key("id")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_referencing_fields() {
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

        let incoming = d.referencing_fields(customer);
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].0.name, "order");
        assert_eq!(incoming[0].1.name, "customer_id");
        assert_eq!(d.referenced_type(incoming[0].1).unwrap().name, "customer");
    }

    #[test]
    fn test_kind_filters() {
        let mut d = domain();
        d.add_type(TypeDef::application("order")).unwrap();
        d.add_type(TypeDef::result("order_summary", None)).unwrap();
        d.add_type(TypeDef::enumeration("status", vec![])).unwrap();
        assert_eq!(d.application_types().count(), 1);
        assert_eq!(d.result_types().count(), 1);
        assert_eq!(d.enum_types().count(), 1);
    }

    #[test]
    fn test_infer_field_roles_snake() {
        let mut d = domain();
        let id = d
            .add_type(
                TypeDef::application("document")
                    .with_field(Field::key("id"))
                    .with_field(Field::new("created_by", DataType::Int64))
                    .with_field(Field::new("modified_at", DataType::DateTime))
                    .with_field(Field::new("content_type", DataType::String))
                    .with_field(Field::new("title", DataType::String)),
            )
            .unwrap();

        assert_eq!(d.infer_field_roles(), 3);
        let ty = d.get(id).unwrap();
        assert!(ty.field("created_by").unwrap().is_created_by);
        assert!(ty.field("modified_at").unwrap().is_modified_at);
        assert!(ty.field("content_type").unwrap().is_content_type);
        assert!(!ty.field("title").unwrap().is_tracking());

        // idempotent
        assert_eq!(d.infer_field_roles(), 0);
    }

    #[test]
    fn test_infer_field_roles_pascal_is_exact() {
        let settings = Settings::new().with_naming(
            NamingConventionSettings::new().with_convention(DbNamingConvention::PascalCase),
        );
        let mut d = Domain::new(settings).unwrap();
        let id = d
            .add_type(
                TypeDef::application("Document")
                    .with_field(Field::key("Id"))
                    .with_field(Field::new("CreatedBy", DataType::Int64))
                    .with_field(Field::new("modifiedBy", DataType::Int64)),
            )
            .unwrap();

        assert_eq!(d.infer_field_roles(), 1);
        let ty = d.get(id).unwrap();
        assert!(ty.field("CreatedBy").unwrap().is_created_by);
        assert!(!ty.field("modifiedBy").unwrap().is_modified_by);
    }

    #[test]
    fn test_operations() {
        let mut d = domain();
        let id = d.add_type(TypeDef::application("order")).unwrap();
        let op = Operation::new(
            "order_select_all",
            "",
            OperationKind::SelectAll,
            id,
            OperationReturn::Many(id),
        );
        d.add_operation(op.clone()).unwrap();
        assert!(matches!(
            d.add_operation(op),
            Err(EngineError::DuplicateOperation(_))
        ));
        assert_eq!(d.operations_for(id).len(), 1);

        d.clear_operations();
        assert!(d.operations().is_empty());
    }

    #[test]
    fn test_from_parts_checks_positions() {
        let mut ty = TypeDef::application("order");
        ty.id = TypeId(3);
        let err = Domain::from_parts(
            Settings::new().with_provider(DatabaseProvider::PostgreSql),
            vec![ty],
            vec![],
        )
        .unwrap_err();
        assert!(err.to_string().contains("position 0"));
    }
}
