//! # Stratum CLI
//!
//! Command-line inspector for Stratum domain snapshots.
//!
//! This crate loads a JSON domain snapshot and prints the facts the analysis
//! engine derives from it, so schema authors can check classification,
//! ownership and naming without running a platform emitter.
//!
//! ## Commands
//!
//! - `validate` - Report schema-integrity issues
//! - `facts` - Show per-type classification facts
//! - `chain` - Show a type's ownership chain
//! - `aliases` - Assign aliases for one artifact scope
//! - `operations` - Derive and list standard operations
//! - `split` - Split a name with a naming convention
//!

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stratum_analysis::{AnalysisContext, TypeFacts, derive_operations};
use stratum_ir::{
    Convention, DbNamingConvention, Domain, NamingConvention, NamingConventionSettings,
    OperationReturn, Settings, TypeDef, load_domain_from_string,
};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "stratum")]
#[command(version)]
#[command(about = "Inspect the metadata Stratum derives from a domain snapshot")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report schema-integrity issues
    Validate {
        /// Domain snapshot (JSON)
        file: PathBuf,
    },

    /// Show per-type classification facts
    Facts {
        /// Domain snapshot (JSON)
        file: PathBuf,

        /// Only this type (`name` or `namespace.name`)
        #[arg(long = "type", value_name = "TYPE")]
        type_name: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show a type's ownership chain
    Chain {
        /// Domain snapshot (JSON)
        file: PathBuf,

        /// Type name (`name` or `namespace.name`)
        #[arg(value_name = "TYPE")]
        type_name: String,
    },

    /// Assign aliases for the given types within one scope
    Aliases {
        /// Domain snapshot (JSON)
        file: PathBuf,

        /// Types in encounter order
        #[arg(value_name = "TYPE", required = true, num_args = 1..)]
        types: Vec<String>,
    },

    /// Derive and list standard operations
    Operations {
        /// Domain snapshot (JSON)
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Split a name into lexical parts
    Split {
        /// Name to split
        name: String,

        /// Use the Pascal-case convention instead of snake case
        #[arg(long)]
        pascal: bool,
    },
}

impl Cli {
    /// Log filter directive for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Run a parsed command, printing to stdout and errors to stderr
pub fn run(cli: Cli) -> ExitCode {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match execute(&cli.command, &mut out) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Execute a command, writing its report to `out`.
///
/// Returns `false` when the command ran but found problems.
pub fn execute(command: &Commands, out: &mut dyn Write) -> Result<bool> {
    match command {
        Commands::Validate { file } => cmd_validate(file, out),
        Commands::Facts {
            file,
            type_name,
            json,
        } => cmd_facts(file, type_name.as_deref(), *json, out),
        Commands::Chain { file, type_name } => cmd_chain(file, type_name, out),
        Commands::Aliases { file, types } => cmd_aliases(file, types, out),
        Commands::Operations { file, json } => cmd_operations(file, *json, out),
        Commands::Split { name, pascal } => cmd_split(name, *pascal, out),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_validate(file: &Path, out: &mut dyn Write) -> Result<bool> {
    let domain = load_domain(file)?;
    let result = stratum_ir::Validator::with_default_rules().validate(&domain);

    for error in &result.errors {
        writeln!(out, "{} {}", "error".red().bold(), error)?;
    }
    for warning in &result.warnings {
        writeln!(out, "{} {}", "warn".yellow(), warning)?;
    }

    let summary = format!(
        "{} type(s), {} error(s), {} warning(s)",
        domain.type_count(),
        result.errors.len(),
        result.warnings.len()
    );
    if result.is_valid() {
        writeln!(out, "{} {}", "OK".green().bold(), summary)?;
    } else {
        writeln!(out, "{} {}", "FAILED".red().bold(), summary)?;
    }
    Ok(result.is_valid())
}

fn cmd_facts(
    file: &Path,
    type_name: Option<&str>,
    json: bool,
    out: &mut dyn Write,
) -> Result<bool> {
    let domain = load_domain(file)?;
    let ctx = AnalysisContext::new(&domain)?;

    let types: Vec<&TypeDef> = match type_name {
        Some(name) => vec![find_type(&domain, name)?],
        None => domain.types().collect(),
    };

    let mut facts = Vec::new();
    let mut all_sound = true;
    for ty in types {
        match ctx.facts(ty.id) {
            Ok(f) => facts.push(f),
            Err(e) => {
                all_sound = false;
                if json {
                    tracing::warn!("Skipping '{}': {}", ty.name, e);
                } else {
                    writeln!(out, "{} {}: {}", "error".red().bold(), ty.name, e)?;
                }
            }
        }
    }

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&facts)?)?;
    } else {
        for f in &facts {
            write_facts(f, out)?;
        }
    }
    Ok(all_sound)
}

fn write_facts(facts: &TypeFacts, out: &mut dyn Write) -> Result<()> {
    let title = if facts.namespace.is_empty() {
        facts.name.clone()
    } else {
        format!("{}.{}", facts.namespace, facts.name)
    };
    writeln!(out, "{} ({})", title.cyan().bold(), facts.kind)?;

    let flags = [
        ("link", facts.is_link),
        ("attachment", facts.is_attachment),
        ("reference data", facts.is_reference_data),
        ("security principal", facts.is_security_principal),
        ("help", facts.is_help),
        ("field labels", facts.is_field_labels),
        ("important", facts.is_important),
        ("paged", facts.is_paged),
        ("ignored", facts.is_ignored),
        ("api", facts.api_enabled),
        ("ui", facts.ui_enabled),
    ];
    for (label, value) in flags {
        writeln!(out, "  {:<20}{}", label, yes_no(value))?;
    }
    writeln!(out, "  {:<20}{}", "delete", facts.delete_type)?;
    writeln!(out, "  {:<20}{}", "rank", facts.rank)?;
    writeln!(
        out,
        "  {:<20}{}",
        "display field",
        facts.display_field.as_deref().unwrap_or("-")
    )?;
    Ok(())
}

fn cmd_chain(file: &Path, type_name: &str, out: &mut dyn Write) -> Result<bool> {
    let domain = load_domain(file)?;
    let ctx = AnalysisContext::new(&domain)?;
    let ty = find_type(&domain, type_name)?;

    let chain = ctx
        .ownership_chain(ty.id)
        .with_context(|| format!("Failed to resolve ownership of '{}'", ty.name))?;

    if chain.is_empty() {
        writeln!(out, "{}: {}", ty.name.cyan().bold(), "no owner".dimmed())?;
    } else {
        writeln!(
            out,
            "{}: {}",
            ty.name.cyan().bold(),
            chain.field_names().join(" -> ")
        )?;
    }
    Ok(true)
}

fn cmd_aliases(file: &Path, types: &[String], out: &mut dyn Write) -> Result<bool> {
    let domain = load_domain(file)?;
    let ctx = AnalysisContext::new(&domain)?;
    let mut scope = ctx.alias_scope();

    for name in types {
        let ty = find_type(&domain, name)?;
        let alias = scope.alias_for(ty)?;
        writeln!(out, "{:<24}{}", ty.name, alias.green())?;
    }
    Ok(true)
}

fn cmd_operations(file: &Path, json: bool, out: &mut dyn Write) -> Result<bool> {
    let mut domain = load_domain(file)?;
    let count = derive_operations(&mut domain)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(domain.operations())?)?;
        return Ok(true);
    }

    for op in domain.operations() {
        let returns = match op.returns {
            OperationReturn::Nothing => "()".to_string(),
            OperationReturn::One(id) => type_label(&domain, id),
            OperationReturn::Many(id) => format!("[{}]", type_label(&domain, id)),
        };
        let secured = if op.secured {
            format!(" {}", "secured".yellow())
        } else {
            String::new()
        };
        writeln!(
            out,
            "{}({}) -> {}{}",
            op.name.green(),
            op.parameter_names().join(", "),
            returns,
            secured
        )?;
    }
    writeln!(out, "{} operation(s)", count)?;
    Ok(true)
}

fn cmd_split(name: &str, pascal: bool, out: &mut dyn Write) -> Result<bool> {
    let convention = if pascal {
        DbNamingConvention::PascalCase
    } else {
        DbNamingConvention::SnakeCase
    };
    let settings =
        Settings::new().with_naming(NamingConventionSettings::new().with_convention(convention));
    let naming = Convention::from_settings(&settings)?;

    let parts = naming.split(name);
    writeln!(out, "{}", parts.join(" "))?;
    Ok(true)
}

// ============================================================================
// Helpers
// ============================================================================

/// Read a snapshot and infer field roles from names
pub fn load_domain(path: &Path) -> Result<Domain> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot '{}'", path.display()))?;
    let mut domain = load_domain_from_string(&json)
        .with_context(|| format!("Invalid snapshot '{}'", path.display()))?;

    let inferred = domain.infer_field_roles();
    tracing::info!(
        "Loaded {} type(s) from '{}' ({} field role(s) inferred)",
        domain.type_count(),
        path.display(),
        inferred
    );
    Ok(domain)
}

/// Find a type by `name` or `namespace.name`
fn find_type<'a>(domain: &'a Domain, name: &str) -> Result<&'a TypeDef> {
    let found = match name.split_once('.') {
        Some((namespace, local)) => domain.find(namespace, local),
        None => domain.find_by_name(name),
    };
    found.ok_or_else(|| anyhow!("type '{}' not found", name))
}

fn type_label(domain: &Domain, id: stratum_core::TypeId) -> String {
    domain
        .get(id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

// ============================================================================
// Tests
// ============================================================================
