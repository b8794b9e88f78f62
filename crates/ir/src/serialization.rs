//! Domain snapshots
//!
//! A snapshot is the JSON form of a populated domain: settings, types and
//! any derived operations, wrapped with a schema version. This module only
//! converts between text and domains; reading and writing files is left to
//! the caller.

use crate::SCHEMA_VERSION;
use crate::domain::Domain;
use crate::operation::Operation;
use crate::settings::Settings;
use crate::type_def::TypeDef;
use serde::{Deserialize, Serialize};
use stratum_core::{EngineError, EngineResult};

// ============================================================================
// Domain File Wrapper
// ============================================================================

/// Wrapper for snapshots that includes version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainFile {
    /// Schema version for migration purposes
    pub schema_version: u32,

    /// Run settings
    #[serde(default)]
    pub settings: Settings,

    /// Types in key order
    #[serde(default)]
    pub types: Vec<TypeDef>,

    /// Derived operations
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl DomainFile {
    /// Snapshot a domain
    pub fn from_domain(domain: &Domain) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            settings: domain.settings().clone(),
            types: domain.types().cloned().collect(),
            operations: domain.operations().to_vec(),
        }
    }

    /// Check if migration is needed
    pub fn needs_migration(&self) -> bool {
        self.schema_version < SCHEMA_VERSION
    }

    /// Migrate to the latest schema version.
    ///
    /// Snapshots written by a newer engine are rejected.
    pub fn migrate(&mut self) -> EngineResult<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(EngineError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found: self.schema_version,
            });
        }
        while self.schema_version < SCHEMA_VERSION {
            self.migrate_one_version()?;
        }
        Ok(())
    }

    fn migrate_one_version(&mut self) -> EngineResult<()> {
        match self.schema_version {
            // Version 0 snapshots predate derived operations
            0 => {
                self.operations.clear();
                self.schema_version = 1;
            }
            _ => self.schema_version = SCHEMA_VERSION,
        }
        Ok(())
    }

    /// Rebuild the domain, migrating first when needed
    pub fn into_domain(mut self) -> EngineResult<Domain> {
        if self.schema_version != SCHEMA_VERSION {
            self.migrate()?;
        }
        Domain::from_parts(self.settings, self.types, self.operations)
    }
}

// ============================================================================
// Save Functions
// ============================================================================

/// Save a domain to a pretty-printed JSON string
pub fn save_domain_to_string(domain: &Domain) -> EngineResult<String> {
    let file = DomainFile::from_domain(domain);
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Save a domain to a compact JSON string (no pretty printing)
pub fn save_domain_to_compact_string(domain: &Domain) -> EngineResult<String> {
    let file = DomainFile::from_domain(domain);
    Ok(serde_json::to_string(&file)?)
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load a domain from a JSON string
///
/// # Example
///
/// ```rust,ignore
/// use stratum_ir::load_domain_from_string;
///
/// let json = std::fs::read_to_string("shop.json")?;
/// let domain = load_domain_from_string(&json)?;
/// println!("Loaded {} types", domain.type_count());
/// ```
pub fn load_domain_from_string(json: &str) -> EngineResult<Domain> {
    let file: DomainFile = serde_json::from_str(json)?;
    tracing::debug!(
        "Loaded snapshot v{} with {} type(s)",
        file.schema_version,
        file.types.len()
    );
    file.into_domain()
}

/// Load a domain from bytes
pub fn load_domain_from_bytes(bytes: &[u8]) -> EngineResult<Domain> {
    let json = std::str::from_utf8(bytes)
        .map_err(|e| EngineError::validation(format!("Invalid UTF-8: {}", e)))?;
    load_domain_from_string(json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::naming::NamingConvention;
    use crate::operation::{OperationKind, OperationReturn};
    use crate::type_def::TypeOverrides;
    use stratum_core::{DatabaseProvider, TypeId};

    fn sample() -> Domain {
        let mut d =
            Domain::new(Settings::new().with_provider(DatabaseProvider::PostgreSql)).unwrap();
        let customer = d
            .add_type(TypeDef::application("customer").with_field(Field::key("id")))
            .unwrap();
        let order = d
            .add_type(
                TypeDef::application("order")
                    .in_namespace("sales")
                    .with_field(Field::key("id"))
                    .with_field(Field::reference("customer_id", customer, "id"))
                    .with_overrides(TypeOverrides::new().hard_delete()),
            )
            .unwrap();
        d.add_operation(Operation::new(
            "order_select_all",
            "sales",
            OperationKind::SelectAll,
            order,
            OperationReturn::Many(order),
        ))
        .unwrap();
        d
    }

    #[test]
    fn test_save_and_load_string() {
        let domain = sample();
        let json = save_domain_to_string(&domain).unwrap();
        let loaded = load_domain_from_string(&json).unwrap();

        assert_eq!(loaded.type_count(), 2);
        assert_eq!(loaded.settings(), domain.settings());
        let order = loaded.find("sales", "order").unwrap();
        assert_eq!(order.id, TypeId(1));
        assert_eq!(order.overrides.hard_delete, Some(true));
        assert_eq!(order.field("customer_id").unwrap().referenced_type, Some(TypeId(0)));
        assert_eq!(loaded.operations().len(), 1);
    }

    #[test]
    fn test_minimal_hand_written_snapshot() {
        let json = r#"{
            "schema_version": 1,
            "settings": { "provider": "sqlserver" },
            "types": [
                {
                    "id": 0,
                    "name": "Customer",
                    "namespace": "dbo",
                    "fields": [
                        { "name": "Id", "data_type": { "kind": "Int64" }, "is_key": true }
                    ],
                    "kind": { "variant": "application" }
                }
            ]
        }"#;
        let domain = load_domain_from_string(json).unwrap();
        let customer = domain.find("dbo", "Customer").unwrap();
        assert!(customer.identity_field().is_ok());
        assert!(customer.field("Id").unwrap().nullable);
        assert_eq!(
            domain.naming().security_user_id_param(),
            "SecurityUserIdParam"
        );
    }

    #[test]
    fn test_newer_schema_rejected() {
        let json = r#"{ "schema_version": 99 }"#;
        let err = load_domain_from_string(json).unwrap_err();
        assert!(matches!(err, EngineError::SchemaVersionMismatch { found: 99, .. }));
    }

    #[test]
    fn test_version_zero_drops_operations() {
        let mut file = DomainFile::from_domain(&sample());
        file.schema_version = 0;
        assert!(file.needs_migration());
        let domain = file.into_domain().unwrap();
        assert!(domain.operations().is_empty());
        assert_eq!(domain.type_count(), 2);
    }

    #[test]
    fn test_invalid_json() {
        let err = load_domain_from_string("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::JsonSerialization(_)));
    }

    #[test]
    fn test_compact_string() {
        let json = save_domain_to_compact_string(&sample()).unwrap();
        assert!(!json.contains('\n'));
        assert!(load_domain_from_bytes(json.as_bytes()).is_ok());
    }
}
