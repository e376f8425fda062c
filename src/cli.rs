//! CLI argument parsing via `clap`.

use crate::models::Stakeholder;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "uxaudit",
    version,
    about = "UX platform validator for captured pages",
    long_about = "uxaudit checks captured page snapshots for route, responsive, accessibility, performance, consistency, interaction, and stakeholder issues.\n\nConfiguration precedence: CLI > uxaudit.toml > defaults.",
    after_help = "Examples:\n  uxaudit scan --snapshot 'snapshots/*.json' --site site.toml\n  uxaudit scan --severity high --output json\n  uxaudit report --stakeholder auditor\n  uxaudit watch --start /audits",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Debug, Clone, Default)]
/// Inputs shared by every validating subcommand.
pub struct CommonArgs {
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long = "snapshot", help = "Snapshot file or glob, relative to the repo root (repeatable)")]
    pub snapshots: Vec<String>,
    #[arg(long, help = "Site map TOML with routes and nav links (default: site.toml)")]
    pub site: Option<String>,
    #[arg(long, value_enum, help = "Audience for stakeholder checks and filtering")]
    pub stakeholder: Option<Stakeholder>,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current uxaudit version.")]
    Version,
    /// Validate snapshots and list issues
    #[command(
        about = "Validate snapshots",
        long_about = "Run the selected rules over every matched snapshot. Exits 1 when a high-severity issue remains after filtering.",
        after_help = "Examples:\n  uxaudit scan --snapshot snaps/home.json\n  uxaudit scan --rules route,accessibility --severity high,medium"
    )]
    Scan {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, help = "Comma-separated rules to run (default: all)")]
        rules: Option<String>,
        #[arg(long, help = "Comma-separated severities to keep (default: all)")]
        severity: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Print remediation suggestions")]
        suggestions: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Build a UX audit report per snapshot
    #[command(
        about = "Print audit reports",
        long_about = "Run every rule and print a bucketed UX audit report with suggested fixes for each snapshot."
    )]
    Report {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Interactive validator session over captured pages
    #[command(
        about = "Interactive session",
        long_about = "Mount a validator session on the captured pages and drive it from stdin. Navigation schedules a debounced scan.",
        after_help = "Commands:\n  go <path>, scan, sev <level>, type <type>, tips, fold <type>, open, close, help, quit"
    )]
    Watch {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, help = "Initial pathname (default: /)")]
        start: Option<String>,
        #[arg(long, help = "Debounce before a scan, in milliseconds (default: 300)")]
        debounce_ms: Option<u64>,
        #[arg(long, help = "Comma-separated severities kept by the session")]
        severity: Option<String>,
    },
}
