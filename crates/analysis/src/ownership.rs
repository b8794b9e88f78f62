//! Ownership chain resolution
//!
//! An ownership chain is the ordered list of reference fields that leads
//! from a type to the user who owns its rows. Generated queries join along
//! the chain and compare its terminal field to the current security user.
//!
//! ```text
//! order_line ──order_id──► order ──customer_id──► customer
//!                            │
//!                            └── created_by   (terminal)
//!
//! chain(order_line) = [order_id, customer_id, created_by]
//! ```
//!
//! Resolution walks greedily. At each type the reference fields that can
//! lead to an owner are scored by a bounded look-ahead, the best one is
//! followed, and the deepest tracking-user field seen along the way closes
//! the chain. A reference to a security principal ends the walk at that
//! reference. A walk that finds neither a principal nor a tracking-user field
//! yields an empty chain. The number of hops is capped, so cyclic schemas
//! fail with a traversal error instead of looping.

use crate::classify::{self, reference_target};
use serde::Serialize;
use std::collections::HashSet;
use stratum_core::{EngineError, EngineResult, TypeId};
use stratum_ir::{Domain, Field, TypeDef};

// ============================================================================
// OwnershipChain
// ============================================================================

/// One step of an ownership chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainLink {
    /// Type declaring the field
    pub owner: TypeId,

    /// Field name on the owner
    pub field: String,

    /// Type the field references, if it is a reference
    pub target: Option<TypeId>,
}

/// Ordered reference path from a type to its owning user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnershipChain {
    pub links: Vec<ChainLink>,
}

impl OwnershipChain {
    /// Field names in chain order
    pub fn field_names(&self) -> Vec<String> {
        self.links.iter().map(|l| l.field.clone()).collect()
    }

    /// Check if the type has no owner path
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Number of links
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Last link: the field compared against the current user
    pub fn terminal(&self) -> Option<&ChainLink> {
        self.links.last()
    }
}

// ============================================================================
// OwnershipChainResolver
// ============================================================================

/// Resolves ownership chains over one domain
#[derive(Debug, Clone)]
pub struct OwnershipChainResolver<'a> {
    domain: &'a Domain,
    max_hops: usize,
}

/// Look-ahead score of a candidate hop
const SCORE_PRINCIPAL: u8 = 2;
const SCORE_REACHES_OWNER: u8 = 1;
const SCORE_NONE: u8 = 0;

impl<'a> OwnershipChainResolver<'a> {
    /// Create a resolver using the domain's hop cap
    pub fn new(domain: &'a Domain) -> Self {
        Self {
            domain,
            max_hops: domain.settings().max_ownership_hops,
        }
    }

    /// Override the hop cap
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Resolve the ownership chain of a type.
    ///
    /// Security principals own themselves and get an empty chain. A type
    /// with no path to an owner also gets an empty chain.
    pub fn resolve(&self, id: TypeId) -> EngineResult<OwnershipChain> {
        let origin = self.domain.require(id)?;
        if classify::is_security_principal(self.domain, origin) {
            tracing::debug!("'{}' is a security principal; empty chain", origin.name);
            return Ok(OwnershipChain::default());
        }

        let mut path: Vec<ChainLink> = Vec::new();
        let mut terminal: Option<ChainLink> = None;
        let mut current = origin;

        loop {
            if let Some(field) = classify::tracking_user_field(self.domain, current) {
                terminal = Some(ChainLink {
                    owner: current.id,
                    field: field.name.clone(),
                    target: field.referenced_type,
                });
            }

            let Some((field, target)) = self.best_hop(current) else {
                break;
            };

            if path.len() == self.max_hops {
                return Err(EngineError::GraphTraversal {
                    type_name: origin.name.clone(),
                    max_hops: self.max_hops,
                    partial: path.iter().map(|l| l.field.clone()).collect(),
                });
            }

            tracing::debug!(
                "Ownership of '{}': {}.{} -> {}",
                origin.name,
                current.name,
                field.name,
                target.name
            );
            path.push(ChainLink {
                owner: current.id,
                field: field.name.clone(),
                target: Some(target.id),
            });

            if classify::is_security_principal(self.domain, target) {
                return Ok(OwnershipChain { links: path });
            }
            current = target;
        }

        // Without a principal or tracking field behind it the path owns nothing
        let Some(terminal) = terminal else {
            tracing::debug!("'{}' has no owner; empty chain", origin.name);
            return Ok(OwnershipChain::default());
        };
        path.push(terminal);
        Ok(OwnershipChain { links: path })
    }

    /// The highest-scoring hop out of a type; ties go to the earlier field
    fn best_hop(&self, ty: &'a TypeDef) -> Option<(&'a Field, &'a TypeDef)> {
        let mut best: Option<(u8, &'a Field, &'a TypeDef)> = None;

        for (field, target) in self.candidates(ty) {
            let score = self.score(target);
            if best.is_none_or(|(top, _, _)| score > top) {
                best = Some((score, field, target));
            }
        }

        best.map(|(_, field, target)| (field, target))
    }

    /// Reference fields that may lead to an owner
    fn candidates(&self, ty: &'a TypeDef) -> impl Iterator<Item = (&'a Field, &'a TypeDef)> + '_ {
        let domain = self.domain;
        ty.reference_fields().filter_map(move |field| {
            if classify::is_tracking_field(domain, field) || field.is_self_reference(ty.id) {
                return None;
            }
            let (_, target) = reference_target(domain, field)?;
            if classify::is_ignored(target) || classify::is_reference_data(domain, target) {
                return None;
            }
            Some((field, target))
        })
    }

    /// Score a hop by what lies behind its target
    fn score(&self, target: &'a TypeDef) -> u8 {
        if classify::is_security_principal(self.domain, target) {
            return SCORE_PRINCIPAL;
        }

        let mut visited: HashSet<TypeId> = HashSet::new();
        let mut stack = vec![target];
        visited.insert(target.id);

        while let Some(ty) = stack.pop() {
            if classify::tracking_user_field(self.domain, ty).is_some() {
                return SCORE_REACHES_OWNER;
            }
            for (_, next) in self.candidates(ty) {
                if classify::is_security_principal(self.domain, next) {
                    return SCORE_REACHES_OWNER;
                }
                if visited.insert(next.id) {
                    stack.push(next);
                }
            }
        }

        SCORE_NONE
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Shop};
    use pretty_assertions::assert_eq;
    use stratum_core::DataType;

    fn chain(domain: &Domain, id: TypeId) -> Vec<String> {
        OwnershipChainResolver::new(domain)
            .resolve(id)
            .unwrap()
            .field_names()
    }

    #[test]
    fn test_direct_owner_through_parent() {
        let shop = Shop::new();
        assert_eq!(chain(&shop.domain, shop.order), vec!["customer_id", "created_by"]);
    }

    #[test]
    fn test_two_hop_chain() {
        let shop = Shop::new();
        assert_eq!(
            chain(&shop.domain, shop.order_line),
            vec!["order_id", "customer_id", "created_by"]
        );
    }

    #[test]
    fn test_deepest_tracking_field_wins() {
        let mut d = fixtures::domain();
        let customer = d
            .add_type(
                fixtures::entity("customer")
                    .with_field(Field::new("name", DataType::String))
                    .with_field(Field::new("created_by", DataType::Int64)),
            )
            .unwrap();
        let order = d
            .add_type(
                fixtures::entity("order")
                    .with_field(Field::new("created_by", DataType::Int64))
                    .with_field(Field::reference("customer_id", customer, "id")),
            )
            .unwrap();

        let resolved = OwnershipChainResolver::new(&d).resolve(order).unwrap();
        assert_eq!(resolved.field_names(), vec!["customer_id", "created_by"]);
        assert_eq!(resolved.terminal().unwrap().owner, customer);
    }

    #[test]
    fn test_principal_reference_ends_chain() {
        let mut d = fixtures::domain();
        let user = d.add_type(fixtures::entity("user")).unwrap();
        let note = d
            .add_type(
                fixtures::entity("note")
                    .with_field(Field::new("created_by", DataType::Int64))
                    .with_field(Field::reference("author_id", user, "id")),
            )
            .unwrap();

        let resolved = OwnershipChainResolver::new(&d).resolve(note).unwrap();
        assert_eq!(resolved.field_names(), vec!["author_id"]);
        assert_eq!(resolved.terminal().unwrap().target, Some(user));
    }

    #[test]
    fn test_principal_has_empty_chain() {
        let shop = Shop::new();
        assert!(chain(&shop.domain, shop.user).is_empty());
    }

    #[test]
    fn test_no_owner_path_is_empty() {
        let shop = Shop::new();
        assert!(chain(&shop.domain, shop.country).is_empty());
        assert!(chain(&shop.domain, shop.tag).is_empty());
    }

    #[test]
    fn test_dead_end_path_is_empty() {
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

        assert!(chain(&d, invoice).is_empty());
    }

    #[test]
    fn test_lookahead_prefers_path_to_owner() {
        let mut d = fixtures::domain();
        let user = d.add_type(fixtures::entity("user")).unwrap();
        let warehouse = d.add_type(fixtures::entity("warehouse")).unwrap();
        let account = d
            .add_type(
                fixtures::entity("account").with_field(Field::reference("user_id", user, "id")),
            )
            .unwrap();
        let shipment = d
            .add_type(
                fixtures::entity("shipment")
                    .with_field(Field::reference("warehouse_id", warehouse, "id"))
                    .with_field(Field::reference("account_id", account, "id")),
            )
            .unwrap();

        assert_eq!(chain(&d, shipment), vec!["account_id", "user_id"]);
    }

    #[test]
    fn test_ties_break_by_declaration_order() {
        let mut d = fixtures::domain();
        let user = d.add_type(fixtures::entity("user")).unwrap();
        let invoice = d
            .add_type(
                fixtures::entity("invoice")
                    .with_field(Field::reference("issuer_id", user, "id"))
                    .with_field(Field::reference("payer_id", user, "id")),
            )
            .unwrap();

        assert_eq!(chain(&d, invoice), vec!["issuer_id"]);
    }

    #[test]
    fn test_skips_reference_data_and_self_references() {
        let shop = Shop::new();
        let mut d = shop.domain.clone();
        let category = d.add_type(fixtures::entity("category")).unwrap();
        d.add_field(category, Field::reference("parent_id", category, "id"))
            .unwrap();

        assert!(chain(&d, category).is_empty());
        // country_id on order points at reference data and is never followed
        assert!(!chain(&d, shop.order).contains(&"country_id".to_string()));
    }

    #[test]
    fn test_cycle_fails_with_traversal_error() {
        let mut d = fixtures::domain_with(|s| s.with_max_ownership_hops(4));
        let a = d.add_type(fixtures::entity("a")).unwrap();
        let b = d
            .add_type(fixtures::entity("b").with_field(Field::reference("a_id", a, "id")))
            .unwrap();
        d.add_field(a, Field::reference("b_id", b, "id")).unwrap();

        let err = OwnershipChainResolver::new(&d).resolve(a).unwrap_err();
        match err {
            EngineError::GraphTraversal {
                type_name,
                max_hops,
                partial,
            } => {
                assert_eq!(type_name, "a");
                assert_eq!(max_hops, 4);
                assert_eq!(partial, vec!["b_id", "a_id", "b_id", "a_id"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_hop_cap_override() {
        let shop = Shop::new();
        let err = OwnershipChainResolver::new(&shop.domain)
            .with_max_hops(1)
            .resolve(shop.order_line)
            .unwrap_err();
        assert!(matches!(err, EngineError::GraphTraversal { max_hops: 1, .. }));
    }

    #[test]
    fn test_unknown_type() {
        let shop = Shop::new();
        let err = OwnershipChainResolver::new(&shop.domain)
            .resolve(TypeId(99))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
