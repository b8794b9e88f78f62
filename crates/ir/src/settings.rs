//! Per-run settings
//!
//! `Settings` is built once per run and passed explicitly to every component.
//! `NamingConventionSettings` carries the field-name patterns recognised for
//! tracking and attachment roles plus the database naming style.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use stratum_core::{DatabaseProvider, EngineError, EngineResult, Validatable};

// ============================================================================
// Settings
// ============================================================================

/// Default hop cap for ownership resolution
pub const DEFAULT_MAX_OWNERSHIP_HOPS: usize = 8;

/// Default upper bound on alias length
pub const DEFAULT_MAX_ALIAS_LENGTH: usize = 8;

/// Run-wide configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Naming convention configuration
    pub naming: NamingConventionSettings,

    /// Target database provider (resolves `ProviderDefault` naming)
    pub provider: Option<DatabaseProvider>,

    /// Platform opt-out: API controllers
    pub generate_api: bool,

    /// Platform opt-out: UI and mobile screens
    pub generate_ui: bool,

    /// Page list queries unless a type overrides it
    pub paged_by_default: bool,

    /// Hop cap for ownership resolution
    pub max_ownership_hops: usize,

    /// Upper bound on generated alias length
    pub max_alias_length: usize,

    /// Namespaces whose types are reference data
    pub reference_data_namespaces: Vec<String>,

    /// Type names treated as security principals (case and separator insensitive)
    pub security_principal_names: Vec<String>,

    /// Namespace assigned to types registered without one
    pub default_namespace: String,
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database provider
    pub fn with_provider(mut self, provider: DatabaseProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the naming settings
    pub fn with_naming(mut self, naming: NamingConventionSettings) -> Self {
        self.naming = naming;
        self
    }

    /// Set the ownership hop cap
    pub fn with_max_ownership_hops(mut self, hops: usize) -> Self {
        self.max_ownership_hops = hops;
        self
    }

    /// Add a reference-data namespace
    pub fn with_reference_data_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.reference_data_namespaces.push(namespace.into());
        self
    }

    /// Disable API generation for the whole run
    pub fn without_api(mut self) -> Self {
        self.generate_api = false;
        self
    }

    /// Disable UI generation for the whole run
    pub fn without_ui(mut self) -> Self {
        self.generate_ui = false;
        self
    }

    /// Resolve the effective naming style.
    ///
    /// `ProviderDefault` needs a provider; without one the setting cannot be
    /// defaulted and a configuration error is returned.
    pub fn resolved_naming_style(&self) -> EngineResult<NamingStyle> {
        match self.naming.db_naming_convention {
            DbNamingConvention::SnakeCase => Ok(NamingStyle::Snake),
            DbNamingConvention::PascalCase => Ok(NamingStyle::Pascal),
            DbNamingConvention::ProviderDefault => match self.provider {
                Some(provider) if provider.prefers_pascal_case() => Ok(NamingStyle::Pascal),
                Some(_) => Ok(NamingStyle::Snake),
                None => Err(EngineError::configuration(
                    "db_naming_convention is ProviderDefault but no provider is configured",
                )),
            },
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            naming: NamingConventionSettings::default(),
            provider: None,
            generate_api: true,
            generate_ui: true,
            paged_by_default: false,
            max_ownership_hops: DEFAULT_MAX_OWNERSHIP_HOPS,
            max_alias_length: DEFAULT_MAX_ALIAS_LENGTH,
            reference_data_namespaces: Vec::new(),
            security_principal_names: vec!["user".to_string(), "users".to_string()],
            default_namespace: String::new(),
        }
    }
}

impl Validatable for Settings {
    fn validate(&self) -> EngineResult<()> {
        if self.max_ownership_hops == 0 {
            return Err(EngineError::configuration(
                "max_ownership_hops must be at least 1",
            ));
        }
        if self.max_alias_length == 0 {
            return Err(EngineError::configuration(
                "max_alias_length must be at least 1",
            ));
        }
        self.resolved_naming_style()?;
        self.naming.validate()
    }
}

// ============================================================================
// NamingConventionSettings
// ============================================================================

/// Database naming style requested by the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbNamingConvention {
    /// Follow the provider's customary style
    #[default]
    ProviderDefault,
    SnakeCase,
    PascalCase,
}

/// Resolved naming style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStyle {
    Snake,
    Pascal,
}

/// Field-name roles recognised by naming conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    CreatedBy,
    CreatedAt,
    ModifiedBy,
    ModifiedAt,
    Thumbnail,
    ContentType,
}

impl FieldRole {
    /// Every role, in declaration order
    pub fn all() -> &'static [FieldRole] {
        &[
            FieldRole::CreatedBy,
            FieldRole::CreatedAt,
            FieldRole::ModifiedBy,
            FieldRole::ModifiedAt,
            FieldRole::Thumbnail,
            FieldRole::ContentType,
        ]
    }

    /// Lexical parts of the documented default name for this role.
    ///
    /// Each convention renders these through its own `join`, so snake case
    /// yields `created_by` and Pascal case yields `CreatedBy`.
    pub fn default_parts(&self) -> &'static [&'static str] {
        match self {
            FieldRole::CreatedBy => &["created", "by"],
            FieldRole::CreatedAt => &["created", "at"],
            FieldRole::ModifiedBy => &["modified", "by"],
            FieldRole::ModifiedAt => &["modified", "at"],
            FieldRole::Thumbnail => &["thumbnail"],
            FieldRole::ContentType => &["content", "type"],
        }
    }

    /// Check if the role records who or when a row was created or modified
    pub fn is_tracking(&self) -> bool {
        matches!(
            self,
            FieldRole::CreatedBy
                | FieldRole::CreatedAt
                | FieldRole::ModifiedBy
                | FieldRole::ModifiedAt
        )
    }

    /// Check if the role records the acting user
    pub fn is_tracking_user(&self) -> bool {
        matches!(self, FieldRole::CreatedBy | FieldRole::ModifiedBy)
    }

    /// Settings key for the role
    pub fn setting_name(&self) -> &'static str {
        match self {
            FieldRole::CreatedBy => "created_user_field_names",
            FieldRole::CreatedAt => "created_timestamp_field_names",
            FieldRole::ModifiedBy => "modified_user_field_names",
            FieldRole::ModifiedAt => "modified_timestamp_field_names",
            FieldRole::Thumbnail => "thumbnail_field_names",
            FieldRole::ContentType => "content_type_field_names",
        }
    }
}

/// Immutable naming configuration for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConventionSettings {
    /// Singularize the last part of type names
    pub singularize_type_names: bool,

    /// Database naming style
    pub db_naming_convention: DbNamingConvention,

    pub created_user_field_names: Vec<String>,
    pub created_timestamp_field_names: Vec<String>,
    pub modified_user_field_names: Vec<String>,
    pub modified_timestamp_field_names: Vec<String>,
    pub thumbnail_field_names: Vec<String>,
    pub content_type_field_names: Vec<String>,
}

impl NamingConventionSettings {
    /// Create settings with every role set empty (documented defaults apply)
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given naming style
    pub fn with_convention(mut self, convention: DbNamingConvention) -> Self {
        self.db_naming_convention = convention;
        self
    }

    /// Singularize type names
    pub fn singularized(mut self) -> Self {
        self.singularize_type_names = true;
        self
    }

    /// Replace the candidate names for a role
    pub fn with_role_names<I, S>(mut self, role: FieldRole, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.names_for_mut(role) = names.into_iter().map(Into::into).collect();
        self
    }

    /// Configured candidate names for a role (may be empty)
    pub fn names_for(&self, role: FieldRole) -> &[String] {
        match role {
            FieldRole::CreatedBy => &self.created_user_field_names,
            FieldRole::CreatedAt => &self.created_timestamp_field_names,
            FieldRole::ModifiedBy => &self.modified_user_field_names,
            FieldRole::ModifiedAt => &self.modified_timestamp_field_names,
            FieldRole::Thumbnail => &self.thumbnail_field_names,
            FieldRole::ContentType => &self.content_type_field_names,
        }
    }

    fn names_for_mut(&mut self, role: FieldRole) -> &mut Vec<String> {
        match role {
            FieldRole::CreatedBy => &mut self.created_user_field_names,
            FieldRole::CreatedAt => &mut self.created_timestamp_field_names,
            FieldRole::ModifiedBy => &mut self.modified_user_field_names,
            FieldRole::ModifiedAt => &mut self.modified_timestamp_field_names,
            FieldRole::Thumbnail => &mut self.thumbnail_field_names,
            FieldRole::ContentType => &mut self.content_type_field_names,
        }
    }
}

impl Validatable for NamingConventionSettings {
    /// A name may serve only one role; blank names are rejected.
    fn validate(&self) -> EngineResult<()> {
        let mut owners: HashMap<String, FieldRole> = HashMap::new();

        for &role in FieldRole::all() {
            for name in self.names_for(role) {
                if name.trim().is_empty() {
                    return Err(EngineError::configuration(format!(
                        "{} contains a blank name",
                        role.setting_name()
                    )));
                }
                let key = name.to_lowercase();
                if let Some(existing) = owners.get(&key) {
                    if *existing != role {
                        return Err(EngineError::configuration(format!(
                            "'{}' is listed in both {} and {}",
                            name,
                            existing.setting_name(),
                            role.setting_name()
                        )));
                    }
                }
                owners.insert(key, role);
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
