//! # Stratum IR (Intermediate Representation)
//!
//! This crate provides the schema model the analysis engine works on.
//! It contains the data structures describing an application's types,
//! their fields and the operations derived from them, together with the
//! run settings and naming conventions.
//!
//! ## Core Concepts
//!
//! - **TypeDef**: A named container of ordered fields, tagged as an
//!   application entity, a result shape or an enum
//! - **Field**: A member of a type, optionally referencing another type's identity
//! - **Domain**: The registry owning every type and operation of a run
//! - **NamingConvention**: Casing-independent split / join / role services
//! - **Operation**: A derived database function or API action
//!

// Module declarations
pub mod domain;
pub mod field;
pub mod naming;
pub mod operation;
pub mod serialization;
pub mod settings;
pub mod type_def;
pub mod validation;

// Re-export commonly used types at crate root
pub use domain::Domain;
pub use field::Field;
pub use naming::{Convention, NamingConvention, PascalCase, SnakeCase, singularize};
pub use operation::{Operation, OperationKind, OperationReturn, Parameter};
pub use serialization::{DomainFile, load_domain_from_string, save_domain_to_string};
pub use settings::{
    DbNamingConvention, FieldRole, NamingConventionSettings, NamingStyle, Settings,
};
pub use type_def::{ApplicationType, EnumValue, TypeDef, TypeKind, TypeOverrides};
pub use validation::{ValidationError, ValidationResult, ValidationRule, Validator};

// Re-export core types that are commonly used with IR
pub use stratum_core::{
    DataType, DatabaseProvider, DeleteType, EngineError, EngineResult, TypeId, Validatable,
};

/// Current schema version for domain snapshots
pub const SCHEMA_VERSION: u32 = 1;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        // Re-exported from core
        DataType,
        DeleteType,
        // Model
        Domain,
        EngineError,
        EngineResult,
        Field,
        NamingConvention,
        // Operations
        Operation,
        OperationKind,
        Settings,
        TypeDef,
        TypeId,
        TypeKind,
        TypeOverrides,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        assert_eq!(SCHEMA_VERSION, 1);
    }
}
