//! uxaudit CLI binary entry point.
//! Resolves configuration, loads inputs, and delegates to library modules.

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::exit;
use uxaudit::cli::{Cli, Commands, CommonArgs};
use uxaudit::config::{self, Effective, Overrides};
use uxaudit::models::site::SiteMap;
use uxaudit::models::Stakeholder;
use uxaudit::scan::{self, ScanFilter};
use uxaudit::session::SessionOptions;
use uxaudit::utils::{error_prefix, info_prefix, note_prefix, split_list};
use uxaudit::validate::RunOptions;
use uxaudit::watch::{self, Watch};

fn fail(msg: &str) -> ! {
    eprintln!("{} {}", error_prefix(), msg);
    exit(2);
}

fn overrides<'a>(common: &'a CommonArgs) -> Overrides<'a> {
    Overrides {
        repo_root: common.repo_root.as_deref(),
        site: common.site.as_deref(),
        snapshots: common.snapshots.clone(),
        stakeholder: common.stakeholder,
        ..Default::default()
    }
}

/// Friendly notes about configuration, then the site map.
fn load_site(eff: &Effective) -> SiteMap {
    if config::load_config(&eff.repo_root).is_none() {
        eprintln!("{} No uxaudit.toml found; using defaults.", note_prefix());
    }
    for tok in &eff.unknown {
        eprintln!("{} Ignoring unknown rule or severity '{}'.", note_prefix(), tok);
    }
    if let Some(msg) = &eff.invalid_selection {
        fail(msg);
    }
    let path = eff.repo_root.join(&eff.site);
    if !path.exists() {
        if eff.site_configured {
            fail(&format!("Site map not found: {}", path.display()));
        }
        eprintln!(
            "{} No site map at {}; route checks use an empty route table.",
            note_prefix(),
            path.display()
        );
        return SiteMap::default();
    }
    SiteMap::load(&path).unwrap_or_else(|e| fail(&e.to_string()))
}

fn snapshot_files(eff: &Effective) -> Vec<PathBuf> {
    let files = scan::collect_snapshots(&eff.repo_root, &eff.snapshots)
        .unwrap_or_else(|e| fail(&e.to_string()));
    if files.is_empty() {
        fail(&format!(
            "No snapshots matched [{}] (pass --snapshot or configure uxaudit.toml).",
            eff.snapshots.join(", ")
        ));
    }
    files
}

/// `general` means no audience filter.
fn audience(eff: &Effective) -> Option<Stakeholder> {
    (eff.stakeholder != Stakeholder::General).then_some(eff.stakeholder)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Scan {
            common,
            rules,
            severity,
            suggestions,
            output,
        } => {
            let eff = config::resolve_effective(&Overrides {
                rules: rules.as_deref().map(split_list),
                severity: severity.as_deref().map(split_list),
                output: output.as_deref(),
                show_suggestions: suggestions.then_some(true),
                ..overrides(&common)
            });
            let site = load_site(&eff);
            let files = snapshot_files(&eff);
            if eff.output != "json" {
                eprintln!("{} Scanning {} snapshot(s).", info_prefix(), files.len());
            }
            let opts = RunOptions {
                rules: eff.rules.clone(),
                stakeholder: eff.stakeholder,
            };
            let filter = ScanFilter {
                severities: eff.severities.clone(),
                stakeholder: audience(&eff),
            };
            let res = scan::run_scan(&eff.repo_root, &files, &site, &opts, &filter)
                .unwrap_or_else(|e| fail(&e.to_string()));
            uxaudit::output::print_scan(&res, &eff.output, eff.show_suggestions);
            if res.summary.high > 0 {
                exit(1);
            }
        }
        Commands::Report { common, output } => {
            let eff = config::resolve_effective(&Overrides {
                output: output.as_deref(),
                ..overrides(&common)
            });
            let site = load_site(&eff);
            let files = snapshot_files(&eff);
            let reports = scan::run_reports(&eff.repo_root, &files, &site, eff.stakeholder)
                .unwrap_or_else(|e| fail(&e.to_string()));
            uxaudit::output::print_reports(&reports, &eff.output);
        }
        Commands::Watch {
            common,
            start,
            debounce_ms,
            severity,
        } => {
            let eff = config::resolve_effective(&Overrides {
                start: start.as_deref(),
                debounce_ms,
                severity: severity.as_deref().map(split_list),
                ..overrides(&common)
            });
            let site = load_site(&eff);
            let files = snapshot_files(&eff);
            let pages = watch::load_pages(&files).unwrap_or_else(|e| fail(&e.to_string()));
            let opts = SessionOptions {
                debounce: eff.debounce,
                auto_run: eff.auto_run,
                run: RunOptions {
                    rules: eff.rules.clone(),
                    stakeholder: eff.stakeholder,
                },
                severities: eff.severities.clone(),
                stakeholder: audience(&eff),
            };
            let host = Watch::new(&pages, &site, opts, &eff.start, std::time::Instant::now());
            let color = uxaudit::utils::colors_enabled();
            let input = io::BufReader::new(io::stdin());
            let mut out = io::stdout();
            if let Err(e) = watch::run(host, input, &mut out, color) {
                fail(&format!("watch loop stopped: {}", e));
            }
        }
    }
}
