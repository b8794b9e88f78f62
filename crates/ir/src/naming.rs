//! Naming conventions
//!
//! A naming convention splits names into lexical parts, recombines parts,
//! derives parameter names and recognises field-name roles, independent of
//! the casing style. Two conventions exist:
//!
//! - [`SnakeCase`]: `order_line`, parameters `order_id_param`
//! - [`PascalCase`]: `OrderLine`, parameters `OrderIdParam`
//!
//! [`Convention`] is the closed wrapper the domain stores; it dispatches to
//! the active variant.

use crate::settings::{FieldRole, NamingConventionSettings, NamingStyle, Settings};
use stratum_core::{EngineResult, Validatable};

// ============================================================================
// NamingConvention Trait
// ============================================================================

/// Casing-independent naming services
pub trait NamingConvention {
    /// Style implemented by this convention
    fn style(&self) -> NamingStyle;

    /// Role-name configuration
    fn settings(&self) -> &NamingConventionSettings;

    /// Split a name into ordered lexical parts. Empty input yields no parts.
    fn split(&self, name: &str) -> Vec<String>;

    /// Recombine parts into a name
    fn join(&self, parts: &[String]) -> String;

    /// Derive the parameter name for a field
    fn parameter_name(&self, field_name: &str) -> String;

    /// Parameter name carrying the current security user's id
    fn security_user_id_param(&self) -> &'static str;

    /// Candidate names for a role, or the documented default when none are configured
    fn role_names(&self, role: FieldRole) -> Vec<String> {
        let configured = self.settings().names_for(role);
        if configured.is_empty() {
            let parts: Vec<String> = role.default_parts().iter().map(|p| p.to_string()).collect();
            vec![self.join(&parts)]
        } else {
            configured.to_vec()
        }
    }

    /// Case- and separator-insensitive role match on the normalized parts
    fn matches_role(&self, name: &str, role: FieldRole) -> bool {
        let normalized = self.normalize(name);
        if normalized.is_empty() {
            return false;
        }
        self.role_names(role)
            .iter()
            .any(|candidate| self.normalize(candidate) == normalized)
    }

    /// Lowercased concatenation of a name's parts
    fn normalize(&self, name: &str) -> String {
        self.split(name)
            .iter()
            .map(|part| part.to_lowercase())
            .collect::<String>()
    }

    /// First role the name matches
    fn field_role(&self, name: &str) -> Option<FieldRole> {
        FieldRole::all()
            .iter()
            .copied()
            .find(|&role| self.matches_role(name, role))
    }

    fn is_created_by(&self, name: &str) -> bool {
        self.matches_role(name, FieldRole::CreatedBy)
    }

    fn is_created_at(&self, name: &str) -> bool {
        self.matches_role(name, FieldRole::CreatedAt)
    }

    fn is_modified_by(&self, name: &str) -> bool {
        self.matches_role(name, FieldRole::ModifiedBy)
    }

    fn is_modified_at(&self, name: &str) -> bool {
        self.matches_role(name, FieldRole::ModifiedAt)
    }

    fn is_thumbnail(&self, name: &str) -> bool {
        self.matches_role(name, FieldRole::Thumbnail)
    }

    fn is_content_type(&self, name: &str) -> bool {
        self.matches_role(name, FieldRole::ContentType)
    }

    /// True when the name records the acting user
    fn is_tracking_user(&self, name: &str) -> bool {
        self.is_created_by(name) || self.is_modified_by(name)
    }

    /// Type name as emitted, singularizing the last part when configured
    fn type_name(&self, raw: &str) -> String {
        if !self.settings().singularize_type_names {
            return raw.to_string();
        }
        let mut parts = self.split(raw);
        match parts.last_mut() {
            Some(last) => {
                *last = singularize(last);
                self.join(&parts)
            }
            None => String::new(),
        }
    }
}

// ============================================================================
// SnakeCase
// ============================================================================

/// `snake_case` names split on `_`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeCase {
    settings: NamingConventionSettings,
}

impl SnakeCase {
    pub const DELIMITER: char = '_';

    pub fn new(settings: NamingConventionSettings) -> Self {
        Self { settings }
    }
}

impl NamingConvention for SnakeCase {
    fn style(&self) -> NamingStyle {
        NamingStyle::Snake
    }

    fn settings(&self) -> &NamingConventionSettings {
        &self.settings
    }

    fn split(&self, name: &str) -> Vec<String> {
        name.split(Self::DELIMITER)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn join(&self, parts: &[String]) -> String {
        parts
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.to_lowercase())
            .collect::<Vec<_>>()
            .join("_")
    }

    fn parameter_name(&self, field_name: &str) -> String {
        format!("{}_param", field_name)
    }

    fn security_user_id_param(&self) -> &'static str {
        "security_user_id_param"
    }
}

// ============================================================================
// PascalCase
// ============================================================================

/// `PascalCase` names split at case boundaries and acronym runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PascalCase {
    settings: NamingConventionSettings,
}

impl PascalCase {
    pub fn new(settings: NamingConventionSettings) -> Self {
        Self { settings }
    }
}

impl NamingConvention for PascalCase {
    fn style(&self) -> NamingStyle {
        NamingStyle::Pascal
    }

    fn settings(&self) -> &NamingConventionSettings {
        &self.settings
    }

    /// Scans from the end of the name backward, collecting one segment per
    /// word (`Line`) or acronym run (`HTTP`), then restores left-to-right order.
    fn split(&self, name: &str) -> Vec<String> {
        let chars: Vec<char> = name.chars().collect();
        let mut segments = Vec::new();
        let mut end = chars.len();

        while end > 0 {
            let last = chars[end - 1];
            if !last.is_alphanumeric() {
                end -= 1;
                continue;
            }

            let mut start = end - 1;
            if last.is_uppercase() {
                while start > 0 && chars[start - 1].is_uppercase() {
                    start -= 1;
                }
            } else {
                while start > 0 && is_lower_like(chars[start - 1]) {
                    start -= 1;
                }
                if start > 0 && chars[start - 1].is_uppercase() {
                    start -= 1;
                }
            }

            segments.push(chars[start..end].iter().collect::<String>());
            end = start;
        }

        segments.reverse();
        segments
    }

    fn join(&self, parts: &[String]) -> String {
        parts.iter().map(|part| capitalize(part)).collect()
    }

    fn parameter_name(&self, field_name: &str) -> String {
        format!("{}Param", field_name)
    }

    fn security_user_id_param(&self) -> &'static str {
        "SecurityUserIdParam"
    }

    // Exact, case-sensitive match: `createdBy` is not a created-by field
    // here, while snake case accepts `Created_By`.
    fn matches_role(&self, name: &str, role: FieldRole) -> bool {
        !name.is_empty() && self.role_names(role).iter().any(|candidate| candidate == name)
    }
}

// ============================================================================
// Convention
// ============================================================================

/// The active naming convention of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Convention {
    Snake(SnakeCase),
    Pascal(PascalCase),
}

impl Convention {
    /// Build the convention selected by the run settings.
    ///
    /// Fails with a configuration error when the naming settings are
    /// contradictory or the style cannot be resolved.
    pub fn from_settings(settings: &Settings) -> EngineResult<Self> {
        settings.naming.validate()?;
        let naming = settings.naming.clone();
        Ok(match settings.resolved_naming_style()? {
            NamingStyle::Snake => Convention::Snake(SnakeCase::new(naming)),
            NamingStyle::Pascal => Convention::Pascal(PascalCase::new(naming)),
        })
    }

    /// Borrow the active variant as a trait object
    pub fn as_dyn(&self) -> &dyn NamingConvention {
        match self {
            Convention::Snake(c) => c,
            Convention::Pascal(c) => c,
        }
    }
}

impl NamingConvention for Convention {
    fn style(&self) -> NamingStyle {
        self.as_dyn().style()
    }

    fn settings(&self) -> &NamingConventionSettings {
        self.as_dyn().settings()
    }

    fn split(&self, name: &str) -> Vec<String> {
        self.as_dyn().split(name)
    }

    fn join(&self, parts: &[String]) -> String {
        self.as_dyn().join(parts)
    }

    fn parameter_name(&self, field_name: &str) -> String {
        self.as_dyn().parameter_name(field_name)
    }

    fn security_user_id_param(&self) -> &'static str {
        self.as_dyn().security_user_id_param()
    }

    fn matches_role(&self, name: &str, role: FieldRole) -> bool {
        self.as_dyn().matches_role(name, role)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn is_lower_like(c: char) -> bool {
    c.is_alphanumeric() && !c.is_uppercase()
}

/// Uppercase the first character, leaving the rest untouched
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Simple English singularization, preserving the word's casing
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.len() <= 2 || lower.ends_with("ss") || lower.ends_with("us") {
        return word.to_string();
    }
    if lower.ends_with("ies") {
        let stem = &word[..word.len() - 3];
        let y = if word.ends_with("IES") { "Y" } else { "y" };
        return format!("{}{}", stem, y);
    }
    if lower.ends_with("ses")
        || lower.ends_with("xes")
        || lower.ends_with("ches")
        || lower.ends_with("shes")
    {
        return word[..word.len() - 2].to_string();
    }
    if lower.ends_with('s') {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

// ============================================================================
// Tests
// ============================================================================
