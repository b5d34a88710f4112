//! KYC registry CLI — `kycr` command.
//!
//! Thin wrapper around the `kyc-registry` core: every command loads the
//! registry snapshot, applies a single operation, and (for mutating
//! commands) writes the snapshot back.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use kyc_registry::storage::{load_registry, save_registry};
use kyc_registry::{
    DocSelector, DocType, IdentityId, IdentityRecord, IdentityReport, Registry, RegistryError,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KYC_REGISTRY_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").expect("HOME not set");
    PathBuf::from(home).join(".kyc-registry")
}

fn registry_path(data_dir: &Option<PathBuf>) -> PathBuf {
    data_dir
        .clone()
        .unwrap_or_else(default_data_dir)
        .join("registry.json")
}

// ── Time formatting helpers ───────────────────────────────────────────────────

fn micros_to_datetime(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    let dt = chrono::DateTime::from_timestamp(secs, 0)
        .unwrap_or_else(|| chrono::DateTime::from_timestamp(0, 0).unwrap());
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// KYC registry CLI — manage identity records, submit and verify
/// documents, and inspect the audit trail.
#[derive(Parser, Debug)]
#[command(
    name = "kycr",
    about = "KYC identity registry CLI",
    version,
    long_about = "kycr — KYC identity registry CLI\n\nCreate identity records, submit and verify KYC documents,\nmanage lifecycle transitions, and inspect the audit trail."
)]
struct Cli {
    /// Data directory (default: $KYC_REGISTRY_DIR or ~/.kyc-registry)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new identity
    Create {
        /// Holder name
        #[arg(long)]
        name: String,

        /// Holder email (must be unique)
        #[arg(long)]
        email: String,
    },

    /// Submit a document for an identity
    SubmitDoc {
        /// Identity ID (idn_...)
        identity_id: String,

        /// Document type (passport, license, national_id, utility_bill)
        #[arg(long = "type")]
        doc_type: String,

        /// Document number
        #[arg(long)]
        number: String,

        /// Issuing country
        #[arg(long)]
        country: String,

        /// Expiry date (e.g. 2030-01-01)
        #[arg(long)]
        expiry: String,
    },

    /// Verify a submitted document
    VerifyDoc {
        /// Identity ID (idn_...)
        identity_id: String,

        /// Document position in submission order (0-based)
        #[arg(long)]
        index: Option<usize>,

        /// First unverified document of this type
        #[arg(long = "type")]
        doc_type: Option<String>,
    },

    /// Suspend an identity (reversible)
    Suspend {
        /// Identity ID (idn_...)
        identity_id: String,

        /// Reason recorded in the audit trail
        #[arg(long)]
        reason: Option<String>,
    },

    /// Revoke an identity (terminal)
    Revoke {
        /// Identity ID (idn_...)
        identity_id: String,

        /// Reason recorded in the audit trail
        #[arg(long)]
        reason: Option<String>,
    },

    /// Reactivate a suspended identity
    Reactivate {
        /// Identity ID (idn_...)
        identity_id: String,
    },

    /// Show a condensed summary of an identity
    Check {
        /// Identity ID (idn_...)
        identity_id: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the full report for an identity, including its audit trail
    Report {
        /// Identity ID (idn_...)
        identity_id: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List all identities
    List {
        /// Filter by status (active, suspended, revoked)
        #[arg(long)]
        status: Option<String>,

        /// Filter by verification level (unverified, basic, standard, enhanced)
        #[arg(long)]
        level: Option<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show aggregate registry statistics
    Stats {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Search identities by holder name or email
    Search {
        /// Case-insensitive substring to look for
        query: String,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let path = registry_path(&cli.data_dir);

    let result = match cli.command {
        Commands::Create { name, email } => cmd_create(&path, &name, &email),
        Commands::SubmitDoc {
            identity_id,
            doc_type,
            number,
            country,
            expiry,
        } => cmd_submit_doc(&path, &identity_id, &doc_type, &number, &country, &expiry),
        Commands::VerifyDoc {
            identity_id,
            index,
            doc_type,
        } => cmd_verify_doc(&path, &identity_id, index, doc_type.as_deref()),
        Commands::Suspend {
            identity_id,
            reason,
        } => cmd_suspend(&path, &identity_id, reason.as_deref()),
        Commands::Revoke {
            identity_id,
            reason,
        } => cmd_revoke(&path, &identity_id, reason.as_deref()),
        Commands::Reactivate { identity_id } => cmd_reactivate(&path, &identity_id),
        Commands::Check { identity_id, json } => cmd_check(&path, &identity_id, json),
        Commands::Report { identity_id, json } => cmd_report(&path, &identity_id, json),
        Commands::List {
            status,
            level,
            json,
        } => cmd_list(&path, status.as_deref(), level.as_deref(), json),
        Commands::Stats { json } => cmd_stats(&path, json),
        Commands::Search { query } => cmd_search(&path, &query),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

// ── Registry load/save helpers ────────────────────────────────────────────────

/// Load the registry snapshot; a missing file is an empty registry.
fn load_or_default(path: &std::path::Path) -> Result<Registry> {
    log::debug!("loading registry from {}", path.display());
    match load_registry(path) {
        Ok(registry) => Ok(registry),
        Err(RegistryError::NotFound(_)) => Ok(Registry::new()),
        Err(e) => Err(e).with_context(|| format!("failed to load {}", path.display())),
    }
}

fn save(registry: &Registry, path: &std::path::Path) -> Result<()> {
    save_registry(registry, path).with_context(|| format!("failed to save {}", path.display()))
}

// ── Command implementations ───────────────────────────────────────────────────

/// `kycr create --name NAME --email EMAIL`
fn cmd_create(path: &std::path::Path, name: &str, email: &str) -> Result<()> {
    let mut registry = load_or_default(path)?;
    let id = registry.create(name, email)?;
    save(&registry, path)?;

    println!("Created identity: {id}");
    println!("  Holder: {name} <{email}>");
    println!("  Status: active, level: unverified");
    Ok(())
}

/// `kycr submit-doc ID --type TYPE --number N --country C --expiry E`
fn cmd_submit_doc(
    path: &std::path::Path,
    identity_id: &str,
    doc_type: &str,
    number: &str,
    country: &str,
    expiry: &str,
) -> Result<()> {
    let doc_type: DocType = doc_type.parse()?;
    let id = IdentityId(identity_id.to_string());

    let mut registry = load_or_default(path)?;
    let index = registry.submit_document(&id, doc_type, number, country, expiry)?;
    save(&registry, path)?;

    println!("Submitted {doc_type} document for {id} (index {index})");
    Ok(())
}

/// `kycr verify-doc ID [--index N | --type TYPE]`
fn cmd_verify_doc(
    path: &std::path::Path,
    identity_id: &str,
    index: Option<usize>,
    doc_type: Option<&str>,
) -> Result<()> {
    let selector = match (index, doc_type) {
        (Some(i), None) => DocSelector::Index(i),
        (None, Some(tag)) => DocSelector::Type(tag.parse::<DocType>()?),
        (Some(_), Some(_)) => {
            return Err(anyhow!("pass either --index or --type, not both"));
        }
        (None, None) => {
            return Err(anyhow!("pass --index or --type to select a document"));
        }
    };
    let id = IdentityId(identity_id.to_string());

    let mut registry = load_or_default(path)?;
    let outcome = registry.verify_document(&id, selector)?;
    save(&registry, path)?;

    println!(
        "Verified {} document for {id} (index {})",
        outcome.doc_type, outcome.index
    );
    if outcome.level_changed() {
        println!("  Level: {} -> {}", outcome.previous_level, outcome.level);
    } else {
        println!("  Level: {} (unchanged)", outcome.level);
    }
    Ok(())
}

/// `kycr suspend ID [--reason TEXT]`
fn cmd_suspend(path: &std::path::Path, identity_id: &str, reason: Option<&str>) -> Result<()> {
    let id = IdentityId(identity_id.to_string());
    let mut registry = load_or_default(path)?;
    registry.suspend(&id, reason)?;
    save(&registry, path)?;

    println!("Suspended identity {id}");
    Ok(())
}

/// `kycr revoke ID [--reason TEXT]`
fn cmd_revoke(path: &std::path::Path, identity_id: &str, reason: Option<&str>) -> Result<()> {
    let id = IdentityId(identity_id.to_string());
    let mut registry = load_or_default(path)?;
    registry.revoke(&id, reason)?;
    save(&registry, path)?;

    println!("Revoked identity {id} (terminal)");
    Ok(())
}

/// `kycr reactivate ID`
fn cmd_reactivate(path: &std::path::Path, identity_id: &str) -> Result<()> {
    let id = IdentityId(identity_id.to_string());
    let mut registry = load_or_default(path)?;
    let result = registry.reactivate(&id);
    // The refused-but-logged case still changed the audit trail.
    save(&registry, path)?;
    result?;

    println!("Reactivated identity {id}");
    Ok(())
}

/// `kycr check ID [--json]`
fn cmd_check(path: &std::path::Path, identity_id: &str, json: bool) -> Result<()> {
    let id = IdentityId(identity_id.to_string());
    let registry = load_or_default(path)?;
    let summary = registry.check(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Identity: {}", summary.identity_id);
    println!("  Holder:   {} <{}>", summary.name, summary.email);
    println!("  Status:   {}", summary.status);
    println!("  Level:    {}", summary.verification_level);
    println!("  Created:  {}", micros_to_datetime(summary.created_at));
    println!(
        "  Documents: {} total, {} verified",
        summary.total_documents, summary.verified_documents
    );
    println!("  Audit entries: {}", summary.audit_entries);
    Ok(())
}

/// `kycr report ID [--json]`
fn cmd_report(path: &std::path::Path, identity_id: &str, json: bool) -> Result<()> {
    let id = IdentityId(identity_id.to_string());
    let registry = load_or_default(path)?;
    let report = registry.report(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", render_report(&report));
    Ok(())
}

fn render_report(report: &IdentityReport) -> String {
    let s = &report.summary;
    let mut lines = vec![
        "=".repeat(60),
        "KYC IDENTITY REPORT".to_string(),
        "=".repeat(60),
        format!("Identity ID   : {}", s.identity_id),
        format!("Holder Name   : {}", s.name),
        format!("Holder Email  : {}", s.email),
        format!("Status        : {}", s.status.as_tag().to_uppercase()),
        format!(
            "Level         : {}",
            s.verification_level.as_tag().to_uppercase()
        ),
        format!("Created       : {}", micros_to_datetime(s.created_at)),
        String::new(),
        format!(
            "Documents ({} total, {} verified):",
            s.total_documents, s.verified_documents
        ),
    ];

    for doc in &report.documents {
        let mark = if doc.verified { "x" } else { " " };
        lines.push(format!(
            "  [{mark}] {} - {} - Exp: {}",
            doc.doc_type, doc.issuing_country, doc.expiry
        ));
    }

    lines.push(String::new());
    lines.push(format!("Audit Trail ({} entries):", report.audit_trail.len()));
    for entry in &report.audit_trail {
        lines.push(format!(
            "  {} - {} - {}",
            micros_to_datetime(entry.timestamp),
            entry.action,
            entry.detail
        ));
    }

    lines.push("=".repeat(60));
    lines.push(String::new());
    lines.join("\n")
}

/// `kycr list [--status S] [--level L] [--json]`
fn cmd_list(
    path: &std::path::Path,
    status: Option<&str>,
    level: Option<&str>,
    json: bool,
) -> Result<()> {
    let registry = load_or_default(path)?;

    let records: Vec<&IdentityRecord> = registry
        .list()
        .into_iter()
        .filter(|r| status.map_or(true, |s| r.status.as_tag() == s))
        .filter(|r| level.map_or(true, |l| r.verification_level.as_tag() == l))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No identities found");
        return Ok(());
    }

    for record in records {
        println!("{}", list_line(record));
    }
    Ok(())
}

fn list_line(record: &IdentityRecord) -> String {
    format!(
        "{} {} <{}> [{}] [{}]",
        record.id,
        record.name,
        record.email,
        record.status,
        record.verification_level
    )
}

/// `kycr stats [--json]`
fn cmd_stats(path: &std::path::Path, json: bool) -> Result<()> {
    let registry = load_or_default(path)?;
    let stats = registry.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Identities: {}", stats.total_identities);
    println!("  By status:");
    for (status, count) in &stats.by_status {
        println!("    {status:<12} {count}");
    }
    println!("  By verification level:");
    for (level, count) in &stats.by_verification_level {
        println!("    {level:<12} {count}");
    }
    println!(
        "Documents: {} total, {} verified ({}%)",
        stats.total_documents, stats.verified_documents, stats.verification_rate
    );
    Ok(())
}

/// `kycr search QUERY`
fn cmd_search(path: &std::path::Path, query: &str) -> Result<()> {
    let registry = load_or_default(path)?;
    let hits = registry.search(query);

    if hits.is_empty() {
        println!("No identities match '{query}'");
        return Ok(());
    }

    for record in hits {
        println!("{}", list_line(record));
    }
    Ok(())
}
