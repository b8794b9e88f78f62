//! Derived operation generation
//!
//! Derives the standard database operations of every application type from
//! its classification:
//!
//! | Class          | Operations                                                     |
//! |----------------|----------------------------------------------------------------|
//! | Reference data | select by id, select all                                       |
//! | Link           | insert, delete, select by each reference                       |
//! | Other          | insert, update, delete, select by id, select all,              |
//! |                | select by each business reference, search                      |
//!
//! Operations on owned types are secured: they carry the ownership chain and
//! take the current security user as an extra parameter.

use crate::classify;
use crate::context::AnalysisContext;
use crate::ownership::OwnershipChain;
use stratum_core::{DataType, EngineResult};
use stratum_ir::{
    Domain, Field, NamingConvention, Operation, OperationKind, OperationReturn, Parameter,
    TypeDef,
};

// ============================================================================
// Entry Points
// ============================================================================

/// Replace the domain's operations with freshly derived ones.
///
/// Returns the number of operations added. Types that fail integrity checks
/// or ownership resolution are skipped with a warning.
pub fn derive_operations(domain: &mut Domain) -> EngineResult<usize> {
    let operations = plan_operations(domain)?;

    domain.clear_operations();
    let mut added = 0;
    for operation in operations {
        let name = operation.name.clone();
        match domain.add_operation(operation) {
            Ok(()) => added += 1,
            Err(e) => tracing::warn!("Skipping operation '{}': {}", name, e),
        }
    }

    tracing::info!(
        "Derived {} operation(s) for {} type(s)",
        added,
        domain.application_types().count()
    );
    Ok(added)
}

/// Derive operations without touching the domain
pub fn plan_operations(domain: &Domain) -> EngineResult<Vec<Operation>> {
    let ctx = AnalysisContext::new(domain)?;
    let mut operations = Vec::new();

    for ty in domain.application_types() {
        if classify::is_ignored(ty) {
            tracing::debug!("Skipping ignored type '{}'", ty.name);
            continue;
        }
        if let Err(e) = ctx.sound_type(ty.id) {
            tracing::warn!("Skipping type '{}': {}", ty.name, e);
            continue;
        }
        let chain = match ctx.ownership_chain(ty.id) {
            Ok(chain) => chain,
            Err(e) => {
                tracing::warn!("Skipping type '{}': {}", ty.name, e);
                continue;
            }
        };

        let builder = OperationBuilder::new(domain, ty, chain)?;
        operations.extend(builder.build());
    }

    Ok(operations)
}

// ============================================================================
// OperationBuilder
// ============================================================================

/// Builds the operations of one type
struct OperationBuilder<'a> {
    domain: &'a Domain,
    ty: &'a TypeDef,
    identity: &'a Field,
    chain: OwnershipChain,
    /// Data type of the value compared against the security user
    security: Option<DataType>,
}

impl<'a> OperationBuilder<'a> {
    fn new(domain: &'a Domain, ty: &'a TypeDef, chain: OwnershipChain) -> EngineResult<Self> {
        let identity = ty.identity_field()?;
        let security = if classify::is_reference_data(domain, ty) {
            None
        } else {
            security_data_type(domain, ty, &chain)
        };
        Ok(Self {
            domain,
            ty,
            identity,
            chain,
            security,
        })
    }

    fn build(&self) -> Vec<Operation> {
        self.unsecured()
            .into_iter()
            .map(|op| self.secure(op))
            .collect()
    }

    fn unsecured(&self) -> Vec<Operation> {
        if classify::is_reference_data(self.domain, self.ty) {
            return vec![self.select_by_id(), self.select_all()];
        }

        if classify::is_link(self.domain, self.ty) {
            let references: Vec<&Field> = self
                .ty
                .reference_fields()
                .filter(|f| classify::is_caller_provided(self.domain, f))
                .collect();
            let mut delete = self.operation(OperationKind::Delete, OperationReturn::Nothing);
            for field in &references {
                delete = delete.with_parameter(self.field_parameter(field));
            }
            let mut operations = vec![self.insert(), delete];
            operations.extend(references.iter().map(|f| self.select_by_reference(f)));
            return operations;
        }

        let mut operations = vec![self.insert(), self.update()];
        if classify::delete_type(self.ty).is_deletable() {
            operations.push(
                self.operation(OperationKind::Delete, OperationReturn::Nothing)
                    .with_parameter(self.field_parameter(self.identity)),
            );
        }
        operations.push(self.select_by_id());
        operations.push(self.select_all());
        for field in classify::meaningful_references(self.domain, self.ty) {
            operations.push(self.select_by_reference(field));
        }
        if self.ty.searchable_fields().next().is_some() {
            let text = self.synthetic(&["search", "text"], DataType::String);
            operations.push(
                self.operation(OperationKind::Search, OperationReturn::Many(self.ty.id))
                    .with_parameter(text),
            );
        }

        operations
    }

    // ====================================================================
    // Individual operations
    // ====================================================================

    fn insert(&self) -> Operation {
        self.caller_provided()
            .fold(
                self.operation(OperationKind::Insert, OperationReturn::One(self.ty.id)),
                |op, field| op.with_parameter(self.field_parameter(field)),
            )
    }

    fn update(&self) -> Operation {
        let op = self
            .operation(OperationKind::Update, OperationReturn::One(self.ty.id))
            .with_parameter(self.field_parameter(self.identity));
        self.caller_provided()
            .fold(op, |op, field| op.with_parameter(self.field_parameter(field)))
    }

    fn select_by_id(&self) -> Operation {
        self.operation(OperationKind::SelectById, OperationReturn::One(self.ty.id))
            .with_parameter(self.field_parameter(self.identity))
    }

    fn select_all(&self) -> Operation {
        let op = self.operation(OperationKind::SelectAll, OperationReturn::Many(self.ty.id));
        if !classify::is_paged(self.domain, self.ty) {
            return op;
        }
        op.with_parameter(self.synthetic(&["page", "number"], DataType::Int32))
            .with_parameter(self.synthetic(&["page", "size"], DataType::Int32))
    }

    fn select_by_reference(&self, field: &Field) -> Operation {
        let kind = OperationKind::SelectByReference {
            field: field.name.clone(),
        };
        self.operation(kind, OperationReturn::Many(self.ty.id))
            .with_parameter(self.field_parameter(field))
    }

    // ====================================================================
    // Helpers
    // ====================================================================

    /// Bare operation named `<type><verb>[<field>]`
    fn operation(&self, kind: OperationKind, returns: OperationReturn) -> Operation {
        let naming = self.domain.naming();
        let mut parts = naming.split(&self.ty.name);
        parts.extend(kind.name_parts());
        if let OperationKind::SelectByReference { field } = &kind {
            parts.extend(naming.split(field));
        }
        let name = naming.join(&parts);
        Operation::new(name, &self.ty.namespace, kind, self.ty.id, returns)
    }

    fn caller_provided(&self) -> impl Iterator<Item = &'a Field> + '_ {
        self.ty
            .fields
            .iter()
            .filter(|f| classify::is_caller_provided(self.domain, f))
    }

    fn field_parameter(&self, field: &Field) -> Parameter {
        Parameter::for_field(
            self.domain.naming().parameter_name(&field.name),
            &field.name,
            field.data_type.clone(),
            field.nullable && !field.is_required,
        )
    }

    fn synthetic(&self, words: &[&str], data_type: DataType) -> Parameter {
        let naming = self.domain.naming();
        let parts: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        Parameter::synthetic(naming.parameter_name(&naming.join(&parts)), data_type)
    }

    /// Attach the ownership chain and security parameter when the type is owned
    fn secure(&self, mut op: Operation) -> Operation {
        let Some(data_type) = &self.security else {
            return op;
        };
        op.secured = true;
        op.ownership_chain = self.chain.field_names();
        op.with_parameter(Parameter::synthetic(
            self.domain.naming().security_user_id_param(),
            data_type.clone(),
        ))
    }
}

/// Data type of the chain's terminal field, or of the type's own
/// tracking-user field when the chain is empty
fn security_data_type(domain: &Domain, ty: &TypeDef, chain: &OwnershipChain) -> Option<DataType> {
    let terminal = match chain.terminal() {
        Some(link) => domain.get(link.owner)?.field(&link.field)?,
        None => classify::tracking_user_field(domain, ty)?,
    };
    Some(terminal.data_type.clone())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Shop};
    use pretty_assertions::assert_eq;
    use stratum_core::TypeId;
    use stratum_ir::{DbNamingConvention, NamingConventionSettings, TypeOverrides};

    fn names_for(domain: &Domain, id: TypeId) -> Vec<String> {
        domain
            .operations_for(id)
            .iter()
            .map(|op| op.name.clone())
            .collect()
    }

    #[test]
    fn test_standard_type_operations() {
        let mut shop = Shop::new();
        derive_operations(&mut shop.domain).unwrap();

        assert_eq!(
            names_for(&shop.domain, shop.order),
            vec![
                "order_insert",
                "order_update",
                "order_delete",
                "order_select_by_id",
                "order_select_all",
                "order_select_by_customer_id",
                "order_search",
            ]
        );
    }

    #[test]
    fn test_reference_data_operations() {
        let mut shop = Shop::new();
        derive_operations(&mut shop.domain).unwrap();

        assert_eq!(
            names_for(&shop.domain, shop.country),
            vec!["country_select_by_id", "country_select_all"]
        );
        assert!(shop.domain.operations_for(shop.country).iter().all(|op| !op.secured));
    }

    #[test]
    fn test_link_operations() {
        let mut shop = Shop::new();
        derive_operations(&mut shop.domain).unwrap();

        assert_eq!(
            names_for(&shop.domain, shop.order_tag),
            vec![
                "order_tag_insert",
                "order_tag_delete",
                "order_tag_select_by_order_id",
                "order_tag_select_by_tag_id",
            ]
        );
        let delete = shop.domain.operation("order_tag_delete").unwrap();
        assert_eq!(
            delete.parameter_names(),
            vec!["order_id_param", "tag_id_param", "security_user_id_param"]
        );
        assert_eq!(delete.ownership_chain, vec!["order_id", "customer_id", "created_by"]);
    }

    #[test]
    fn test_link_ignores_tracking_references() {
        let mut d = fixtures::domain();
        let user = d.add_type(fixtures::entity("user")).unwrap();
        let a = d.add_type(fixtures::entity("a")).unwrap();
        let b = d.add_type(fixtures::entity("b")).unwrap();
        let a_b = d
            .add_type(
                fixtures::entity("a_b")
                    .with_field(Field::reference("a_id", a, "id"))
                    .with_field(Field::reference("b_id", b, "id"))
                    .with_field(Field::reference("created_by", user, "id")),
            )
            .unwrap();

        derive_operations(&mut d).unwrap();
        assert_eq!(
            names_for(&d, a_b),
            vec!["a_b_insert", "a_b_delete", "a_b_select_by_a_id", "a_b_select_by_b_id"]
        );
        assert_eq!(
            d.operation("a_b_delete").unwrap().parameter_names(),
            vec!["a_id_param", "b_id_param", "security_user_id_param"]
        );
        assert_eq!(
            d.operation("a_b_insert").unwrap().parameter_names(),
            vec!["a_id_param", "b_id_param", "security_user_id_param"]
        );
    }

    #[test]
    fn test_unowned_type_is_not_secured() {
        let mut d = fixtures::domain();
        let customer = d
            .add_type(fixtures::entity("customer").with_field(Field::new("name", DataType::String)))
            .unwrap();
        let invoice = d
            .add_type(
                fixtures::entity("invoice")
                    .with_field(Field::reference("customer_id", customer, "id")),
            )
            .unwrap();

        derive_operations(&mut d).unwrap();
        let select = d.operation("invoice_select_by_id").unwrap();
        assert!(!select.secured);
        assert!(select.ownership_chain.is_empty());
        assert_eq!(select.parameter_names(), vec!["id_param"]);
        assert!(d.operations_for(invoice).iter().all(|op| !op.secured));
    }

    #[test]
    fn test_no_delete_without_delete_type() {
        let mut shop = Shop::new();
        derive_operations(&mut shop.domain).unwrap();
        assert!(shop.domain.operation("customer_delete").is_none());
        assert!(shop.domain.operation("customer_search").is_none());
    }

    #[test]
    fn test_secured_operations_carry_chain() {
        let mut shop = Shop::new();
        derive_operations(&mut shop.domain).unwrap();

        let select = shop.domain.operation("order_line_select_by_id").unwrap();
        assert!(select.secured);
        assert_eq!(select.ownership_chain, vec!["order_id", "customer_id", "created_by"]);
        assert_eq!(
            select.parameter_names(),
            vec!["id_param", "security_user_id_param"]
        );

        // no chain and no tracking field
        let customer = shop.domain.operation("customer_select_all").unwrap();
        assert!(!customer.secured);
        assert!(customer.ownership_chain.is_empty());
    }

    #[test]
    fn test_insert_takes_caller_provided_fields() {
        let mut shop = Shop::new();
        derive_operations(&mut shop.domain).unwrap();

        let insert = shop.domain.operation("order_insert").unwrap();
        assert_eq!(
            insert.parameter_names(),
            vec![
                "number_param",
                "customer_id_param",
                "country_id_param",
                "security_user_id_param"
            ]
        );
        assert_eq!(insert.returns, OperationReturn::One(shop.order));
    }

    #[test]
    fn test_paged_select_all() {
        let mut shop = Shop::new();
        *shop.domain.overrides_mut(shop.customer).unwrap() =
            TypeOverrides::new().with_paging(true);
        derive_operations(&mut shop.domain).unwrap();

        let select = shop.domain.operation("customer_select_all").unwrap();
        assert_eq!(
            select.parameter_names(),
            vec!["page_number_param", "page_size_param"]
        );
    }

    #[test]
    fn test_ignored_and_broken_types_are_skipped() {
        let mut shop = Shop::new();
        *shop.domain.overrides_mut(shop.tag).unwrap() = TypeOverrides::new().ignored();
        let broken = shop
            .domain
            .add_type(
                fixtures::entity("broken")
                    .with_field(Field::reference("customer_id", shop.customer, "name")),
            )
            .unwrap();

        derive_operations(&mut shop.domain).unwrap();
        assert!(shop.domain.operations_for(shop.tag).is_empty());
        assert!(shop.domain.operations_for(broken).is_empty());
        assert!(!shop.domain.operations_for(shop.order).is_empty());
    }

    #[test]
    fn test_regeneration_replaces_operations() {
        let mut shop = Shop::new();
        let first = derive_operations(&mut shop.domain).unwrap();
        let second = derive_operations(&mut shop.domain).unwrap();
        assert_eq!(first, second);
        assert_eq!(shop.domain.operations().len(), second);
    }

    #[test]
    fn test_missing_identity_aborts_derivation() {
        let mut d = fixtures::domain();
        d.add_type(TypeDef::application("orphan")).unwrap();
        assert!(derive_operations(&mut d).unwrap_err().is_fatal());
    }

    #[test]
    fn test_pascal_names() {
        let settings = stratum_ir::Settings::new().with_naming(
            NamingConventionSettings::new().with_convention(DbNamingConvention::PascalCase),
        );
        let mut d = Domain::new(settings).unwrap();
        let customer = d
            .add_type(
                TypeDef::application("Customer")
                    .with_field(Field::key("Id"))
                    .with_field(Field::new("Name", DataType::String))
                    .with_field(Field::new("CreatedBy", DataType::Int64)),
            )
            .unwrap();
        d.add_type(
            TypeDef::application("OrderLine")
                .with_field(Field::key("Id"))
                .with_field(Field::reference("CustomerId", customer, "Id")),
        )
        .unwrap();

        derive_operations(&mut d).unwrap();
        let select = d.operation("OrderLineSelectByCustomerId").unwrap();
        assert_eq!(
            select.parameter_names(),
            vec!["CustomerIdParam", "SecurityUserIdParam"]
        );
        assert_eq!(select.ownership_chain, vec!["CustomerId", "CreatedBy"]);
        assert!(d.operation("CustomerSelectById").unwrap().secured);
    }
}
