//! # Analysis Context
//!
//! The `AnalysisContext` is built once per run from a populated `Domain`.
//! It validates the domain up front and then answers fact queries for
//! emitters:
//!
//! - Per-type classification facts ([`TypeFacts`])
//! - Ownership chains
//! - Fresh alias scopes, one per generated artifact
//! - The active naming convention
//!
//! A type with no identity field aborts construction. Any other integrity
//! issue is recorded against its type; queries for that type return the
//! recorded error while every other type stays usable.

use crate::alias::AliasAssigner;
use crate::classify;
use crate::ownership::{OwnershipChain, OwnershipChainResolver};
use serde::Serialize;
use std::collections::HashMap;
use stratum_core::{DeleteType, EngineResult, TypeId};
use stratum_ir::{
    Convention, Domain, TypeDef, TypeKind, ValidationError, ValidationResult, Validator,
};

// ============================================================================
// TypeFacts
// ============================================================================

/// Every derived classification fact of one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeFacts {
    pub id: TypeId,
    pub name: String,
    pub namespace: String,
    /// `application`, `result` or `enum`
    pub kind: &'static str,
    pub is_link: bool,
    pub is_attachment: bool,
    pub is_reference_data: bool,
    pub is_security_principal: bool,
    pub is_help: bool,
    pub is_field_labels: bool,
    pub is_important: bool,
    pub is_paged: bool,
    pub is_ignored: bool,
    pub delete_type: DeleteType,
    pub rank: usize,
    pub api_enabled: bool,
    pub ui_enabled: bool,
    /// Field shown when a row is rendered as a single value
    pub display_field: Option<String>,
}

impl TypeFacts {
    /// Compute the facts of a type
    pub fn compute(domain: &Domain, ty: &TypeDef) -> Self {
        Self {
            id: ty.id,
            name: ty.name.clone(),
            namespace: ty.namespace.clone(),
            kind: kind_name(&ty.kind),
            is_link: classify::is_link(domain, ty),
            is_attachment: classify::is_attachment(ty),
            is_reference_data: classify::is_reference_data(domain, ty),
            is_security_principal: classify::is_security_principal(domain, ty),
            is_help: classify::is_help(domain, ty),
            is_field_labels: classify::is_field_labels(ty),
            is_important: classify::is_important(ty),
            is_paged: classify::is_paged(domain, ty),
            is_ignored: classify::is_ignored(ty),
            delete_type: classify::delete_type(ty),
            rank: classify::rank(domain, ty),
            api_enabled: classify::api_enabled(domain, ty),
            ui_enabled: classify::ui_enabled(domain, ty),
            display_field: classify::display_field(ty).map(|f| f.name.clone()),
        }
    }
}

fn kind_name(kind: &TypeKind) -> &'static str {
    match kind {
        TypeKind::Application => "application",
        TypeKind::Result { .. } => "result",
        TypeKind::Enum { .. } => "enum",
    }
}

// ============================================================================
// AnalysisContext
// ============================================================================

/// Validated, read-only view of a domain for one run
#[derive(Debug, Clone)]
pub struct AnalysisContext<'a> {
    domain: &'a Domain,

    /// Full validation outcome, warnings included
    validation: ValidationResult,

    /// Lookup: type → integrity errors recorded against it
    issues: HashMap<TypeId, Vec<ValidationError>>,
}

impl<'a> AnalysisContext<'a> {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Validate a domain and build the context.
    ///
    /// Fails only when a type has no identity field.
    pub fn new(domain: &'a Domain) -> EngineResult<Self> {
        let validation = Validator::with_default_rules().validate(domain);

        if let Some(fatal) = validation.fatal_error() {
            return Err(fatal.to_engine_error());
        }

        let mut issues: HashMap<TypeId, Vec<ValidationError>> = HashMap::new();
        for error in &validation.errors {
            tracing::warn!("Integrity issue: {}", error);
            if let Some(id) = error.type_id {
                issues.entry(id).or_default().push(error.clone());
            }
        }
        for warning in &validation.warnings {
            tracing::debug!("{}", warning);
        }

        Ok(Self {
            domain,
            validation,
            issues,
        })
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    /// The analysed domain
    pub fn domain(&self) -> &'a Domain {
        self.domain
    }

    /// Active naming convention
    pub fn naming(&self) -> &'a Convention {
        self.domain.naming()
    }

    /// Validation outcome from construction
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Integrity errors recorded against a type
    pub fn issues(&self, id: TypeId) -> &[ValidationError] {
        self.issues.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if the type passed every integrity check
    pub fn is_sound(&self, id: TypeId) -> bool {
        self.issues(id).is_empty()
    }

    /// Get a type that passed integrity checks
    pub fn sound_type(&self, id: TypeId) -> EngineResult<&'a TypeDef> {
        let ty = self.domain.require(id)?;
        match self.issues(id).first() {
            Some(issue) => Err(issue.to_engine_error()),
            None => Ok(ty),
        }
    }

    // ====================================================================
    // Queries
    // ====================================================================

    /// Classification facts of a type
    pub fn facts(&self, id: TypeId) -> EngineResult<TypeFacts> {
        let ty = self.sound_type(id)?;
        Ok(TypeFacts::compute(self.domain, ty))
    }

    /// Ownership chain of a type
    pub fn ownership_chain(&self, id: TypeId) -> EngineResult<OwnershipChain> {
        self.sound_type(id)?;
        OwnershipChainResolver::new(self.domain).resolve(id)
    }

    /// A fresh alias scope for one generated artifact
    pub fn alias_scope(&self) -> AliasAssigner {
        AliasAssigner::new(self.domain.settings().max_alias_length)
    }
}

// ============================================================================
// Tests
// ============================================================================
