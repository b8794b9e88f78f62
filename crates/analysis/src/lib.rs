//! # Stratum Analysis
//!
//! Schema analysis engine for Stratum.
//!
//! This crate derives the metadata platform emitters consume from a
//! populated [`Domain`](stratum_ir::Domain).
//!
//! ## Features
//!
//! - **Classification**: link, attachment, reference-data, security-principal,
//!   delete semantics, rank and platform toggles
//! - **Ownership Chains**: reference paths from a type to its owning user
//! - **Aliases**: collision-free short aliases per generated artifact
//! - **Derived Operations**: standard database operations per type
//! - **Analysis Context**: validated per-run view answering fact queries
//!

// ============================================================================
// Modules
// ============================================================================

pub mod alias;
pub mod classify;
pub mod context;
pub mod operations;
pub mod ownership;

// ============================================================================
// Re-exports
// ============================================================================

pub use alias::AliasAssigner;
pub use context::{AnalysisContext, TypeFacts};
pub use operations::{derive_operations, plan_operations};
pub use ownership::{ChainLink, OwnershipChain, OwnershipChainResolver};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Test Fixtures
// ============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use stratum_core::{DataType, DatabaseProvider, TypeId};
    use stratum_ir::{Domain, Field, Settings, TypeDef};

    /// Namespace holding reference data in fixture domains
    pub const LOOKUP: &str = "lookup";

    pub fn settings() -> Settings {
        Settings::new()
            .with_provider(DatabaseProvider::PostgreSql)
            .with_reference_data_namespace(LOOKUP)
    }

    pub fn domain() -> Domain {
        Domain::new(settings()).unwrap()
    }

    pub fn domain_with(configure: impl FnOnce(Settings) -> Settings) -> Domain {
        Domain::new(configure(settings())).unwrap()
    }

    /// Application type with an `id` identity field
    pub fn entity(name: &str) -> TypeDef {
        TypeDef::application(name).with_field(Field::key("id"))
    }

    /// A small order-management schema
    ///
    /// ```text
    /// user
    /// lookup.country
    /// customer
    /// order ──customer_id──► customer, ──country_id──► country
    /// order_line ──order_id──► order
    /// tag
    /// order_tag ──order_id──► order, ──tag_id──► tag
    /// order_attachment ──order_id──► order
    /// ```
    pub struct Shop {
        pub domain: Domain,
        pub user: TypeId,
        pub country: TypeId,
        pub customer: TypeId,
        pub order: TypeId,
        pub order_line: TypeId,
        pub tag: TypeId,
        pub order_tag: TypeId,
        pub order_attachment: TypeId,
    }

    impl Shop {
        pub fn new() -> Self {
            let mut domain = domain();
            let named = |name: &str| entity(name).with_field(Field::new("name", DataType::String));

            let user = domain.add_type(named("user")).unwrap();
            let country = domain
                .add_type(named("country").in_namespace(LOOKUP))
                .unwrap();
            let customer = domain.add_type(named("customer")).unwrap();
            let order = domain
                .add_type(
                    entity("order")
                        .with_field(Field::new("number", DataType::String).required().searchable())
                        .with_field(Field::reference("customer_id", customer, "id"))
                        .with_field(Field::reference("country_id", country, "id"))
                        .with_field(Field::new("created_by", DataType::Int64))
                        .with_field(Field::new("is_deleted", DataType::Bool).delete_marker()),
                )
                .unwrap();
            let order_line = domain
                .add_type(
                    entity("order_line")
                        .with_field(Field::reference("order_id", order, "id"))
                        .with_field(Field::new("quantity", DataType::Int32).required()),
                )
                .unwrap();
            let tag = domain.add_type(named("tag")).unwrap();
            let order_tag = domain
                .add_type(
                    entity("order_tag")
                        .with_field(Field::reference("order_id", order, "id"))
                        .with_field(Field::reference("tag_id", tag, "id")),
                )
                .unwrap();
            let order_attachment = domain
                .add_type(
                    entity("order_attachment")
                        .with_field(Field::reference("order_id", order, "id"))
                        .with_field(Field::new("file_name", DataType::String))
                        .with_field(Field::new("content", DataType::Bytes).file())
                        .with_field(Field::new("content_type", DataType::String)),
                )
                .unwrap();

            Self {
                domain,
                user,
                country,
                customer,
                order,
                order_line,
                tag,
                order_tag,
                order_attachment,
            }
        }
    }
}
