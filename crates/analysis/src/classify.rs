//! Classification predicates
//!
//! Facts derived from a type's shape, its overrides and the run settings.
//! Nothing here is cached: every call recomputes from the domain, so the
//! answers always reflect the domain's current state.
//!
//! Role checks treat a field as a tracking field when its flag is set or
//! when its name matches a tracking role of the active naming convention,
//! so classification works whether or not `Domain::infer_field_roles` ran.

use stratum_core::{DeleteType, TypeId};
use stratum_ir::{ApplicationType, Domain, Field, NamingConvention, TypeDef, TypeKind};

// ============================================================================
// Field Roles
// ============================================================================

/// Check if a field records who or when a row was created or modified
pub fn is_tracking_field(domain: &Domain, field: &Field) -> bool {
    field.is_tracking()
        || domain
            .naming()
            .field_role(&field.name)
            .is_some_and(|role| role.is_tracking())
}

/// Check if the caller supplies the field's value on insert
pub fn is_caller_provided(domain: &Domain, field: &Field) -> bool {
    field.is_caller_provided() && !is_tracking_field(domain, field)
}

/// The type's tracking-user field, preferring created-by over modified-by
pub fn tracking_user_field<'a>(domain: &Domain, ty: &'a TypeDef) -> Option<&'a Field> {
    let naming = domain.naming();
    ty.fields
        .iter()
        .find(|f| f.is_created_by || naming.is_created_by(&f.name))
        .or_else(|| {
            ty.fields
                .iter()
                .find(|f| f.is_modified_by || naming.is_modified_by(&f.name))
        })
}

// ============================================================================
// Type Classification
// ============================================================================

/// Excluded from every generated artifact
pub fn is_ignored(ty: &TypeDef) -> bool {
    ty.overrides.ignore == Some(true)
}

/// A pure association between two other types.
///
/// An application type is a link when its caller-provided fields are
/// exactly two reference fields and nothing else.
pub fn is_link(domain: &Domain, ty: &TypeDef) -> bool {
    if !matches!(ty.kind, TypeKind::Application) {
        return false;
    }

    let mut references = 0;
    for field in ty.fields.iter().filter(|f| is_caller_provided(domain, f)) {
        if !field.is_reference() {
            return false;
        }
        references += 1;
    }
    references == 2
}

/// Holds uploaded files
pub fn is_attachment(ty: &TypeDef) -> bool {
    ty.overrides.is_attachment.unwrap_or_else(|| {
        ty.name.to_lowercase().contains("attachment") && ty.file_field().is_some()
    })
}

/// Static lookup data
pub fn is_reference_data(domain: &Domain, ty: &TypeDef) -> bool {
    match ty.overrides.application_type {
        Some(application_type) => application_type == ApplicationType::ReferenceData,
        None => domain
            .settings()
            .reference_data_namespaces
            .iter()
            .any(|ns| ns == &ty.namespace),
    }
}

/// Represents the users that own rows
pub fn is_security_principal(domain: &Domain, ty: &TypeDef) -> bool {
    if let Some(principal) = ty.overrides.is_security_principal {
        return principal;
    }

    let naming = domain.naming();
    let name = naming.normalize(&ty.name);
    !name.is_empty()
        && domain
            .settings()
            .security_principal_names
            .iter()
            .any(|candidate| naming.normalize(candidate) == name)
}

/// Holds help content
pub fn is_help(domain: &Domain, ty: &TypeDef) -> bool {
    ty.overrides.is_help.unwrap_or_else(|| {
        domain
            .naming()
            .split(&ty.name)
            .last()
            .is_some_and(|part| part.eq_ignore_ascii_case("help"))
    })
}

/// Holds UI field labels
pub fn is_field_labels(ty: &TypeDef) -> bool {
    ty.overrides.is_field_labels == Some(true)
}

/// Surfaced prominently in generated navigation
pub fn is_important(ty: &TypeDef) -> bool {
    ty.overrides.important == Some(true)
}

/// List queries are paged
pub fn is_paged(domain: &Domain, ty: &TypeDef) -> bool {
    ty.overrides
        .paged
        .unwrap_or(domain.settings().paged_by_default)
}

/// How rows are deleted.
///
/// A delete-marker field wins over a hard-delete override.
pub fn delete_type(ty: &TypeDef) -> DeleteType {
    if ty.fields.iter().any(|f| f.is_delete_marker) {
        DeleteType::Soft
    } else if ty.overrides.hard_delete == Some(true) {
        DeleteType::Hard
    } else {
        DeleteType::None
    }
}

/// Reference fields whose target is an ordinary business type
pub fn meaningful_references<'a>(domain: &Domain, ty: &'a TypeDef) -> Vec<&'a Field> {
    ty.reference_fields()
        .filter(|field| {
            field
                .referenced_type
                .and_then(|id| domain.get(id))
                .is_some_and(|target| is_meaningful_target(domain, target))
        })
        .collect()
}

fn is_meaningful_target(domain: &Domain, target: &TypeDef) -> bool {
    !(is_reference_data(domain, target)
        || is_security_principal(domain, target)
        || is_link(domain, target)
        || is_ignored(target)
        || is_attachment(target))
}

/// Number of references to ordinary business types
pub fn rank(domain: &Domain, ty: &TypeDef) -> usize {
    meaningful_references(domain, ty).len()
}

/// API surface is generated for the type
pub fn api_enabled(domain: &Domain, ty: &TypeDef) -> bool {
    !is_ignored(ty) && ty.overrides.api != Some(false) && domain.settings().generate_api
}

/// UI screens are generated for the type
pub fn ui_enabled(domain: &Domain, ty: &TypeDef) -> bool {
    !is_ignored(ty)
        && ty.overrides.ui != Some(false)
        && domain.settings().generate_ui
        && !is_link(domain, ty)
}

/// Field shown when a row is rendered as a single value.
///
/// The first non-key textual field, else the identity field.
pub fn display_field(ty: &TypeDef) -> Option<&Field> {
    ty.fields
        .iter()
        .find(|f| !f.is_key && f.data_type.is_textual())
        .or_else(|| ty.identity_field().ok())
}

/// Resolve a reference field's target type
pub(crate) fn reference_target<'a>(
    domain: &'a Domain,
    field: &Field,
) -> Option<(TypeId, &'a TypeDef)> {
    let id = field.referenced_type?;
    domain.get(id).map(|ty| (id, ty))
}

// ============================================================================
// Tests
// ============================================================================
