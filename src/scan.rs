//! Scan runner over snapshot files.
//!
//! Expands glob patterns relative to the repo root, loads every snapshot,
//! and validates files in parallel. Results are ordered by file path so
//! output is deterministic regardless of scheduling.

use crate::error::LoadError;
use crate::models::site::SiteMap;
use crate::models::snapshot::DomSnapshot;
use crate::models::{FileOutcome, ScanResult, Severity, Stakeholder, UxAuditReport};
use crate::validate::{filter_issues, generate_ux_audit_report, sort_issues, validate_all, RunOptions};
use glob::glob;
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Post-run filters applied to each file's issues.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    pub severities: Vec<Severity>,
    pub stakeholder: Option<Stakeholder>,
}

/// Expand `patterns` (relative to `root`) into a sorted, deduplicated list of
/// files.
pub fn collect_snapshots(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, LoadError> {
    let mut targets: BTreeSet<PathBuf> = BTreeSet::new();
    for pat in patterns {
        let abs = root.join(pat);
        let pattern = abs.to_string_lossy().to_string();
        let entries = glob(&pattern).map_err(|e| LoadError::Pattern {
            pattern: pat.clone(),
            message: e.msg.to_string(),
        })?;
        for entry in entries.flatten() {
            if entry.is_file() {
                targets.insert(entry);
            }
        }
    }
    debug!("{} snapshot file(s) matched", targets.len());
    Ok(targets.into_iter().collect())
}

/// Path shown to users: relative to `root` when possible.
pub fn display_path(root: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Validate every file. Fails on the first unreadable or invalid snapshot.
pub fn run_scan(
    root: &Path,
    files: &[PathBuf],
    site: &SiteMap,
    opts: &RunOptions,
    filter: &ScanFilter,
) -> Result<ScanResult, LoadError> {
    let mut outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| {
            let snap = DomSnapshot::load(path)?;
            let outcome = validate_all(&snap, site, &snap.pathname, opts);
            let mut issues = filter_issues(&outcome.issues, &filter.severities, filter.stakeholder);
            sort_issues(&mut issues);
            Ok(FileOutcome {
                file: display_path(root, path),
                pathname: snap.pathname.clone(),
                issues,
            })
        })
        .collect::<Result<_, LoadError>>()?;
    outcomes.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(ScanResult::new(outcomes))
}

/// Build one audit report per file, ordered by file path.
pub fn run_reports(
    root: &Path,
    files: &[PathBuf],
    site: &SiteMap,
    stakeholder: Stakeholder,
) -> Result<Vec<(String, UxAuditReport)>, LoadError> {
    let mut reports: Vec<(String, UxAuditReport)> = files
        .par_iter()
        .map(|path| {
            let snap = DomSnapshot::load(path)?;
            let report = generate_ux_audit_report(&snap, site, &snap.pathname, stakeholder);
            Ok((display_path(root, path), report))
        })
        .collect::<Result<_, LoadError>>()?;
    reports.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(reports)
}
