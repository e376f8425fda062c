//! Configuration discovery and effective settings resolution.
//!
//! uxaudit reads `uxaudit.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `site`: `site.toml`
//! - `snapshots`: `["snapshots/**/*.json"]`
//! - `output`: `human`
//! - `stakeholder`: `general`
//! - `rules`: all, `severity`: all
//! - `watch.debounceMs`: 300, `watch.autoRun`: true, `watch.start`: `/`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::models::{Severity, Stakeholder};
use crate::rules::RuleKind;
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_NAMES: [&str; 3] = ["uxaudit.toml", "uxaudit.yaml", "uxaudit.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Session settings under `[watch]`.
pub struct WatchCfg {
    #[serde(rename = "debounceMs")]
    pub debounce_ms: Option<u64>,
    #[serde(rename = "autoRun")]
    pub auto_run: Option<bool>,
    pub start: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `uxaudit.toml|yaml`.
pub struct AuditConfig {
    pub site: Option<String>,
    pub snapshots: Option<Vec<String>>,
    pub output: Option<String>,
    pub stakeholder: Option<Stakeholder>,
    pub rules: Option<Vec<String>>,
    pub severity: Option<Vec<String>>,
    #[serde(rename = "showSuggestions")]
    pub show_suggestions: Option<bool>,
    #[serde(default)]
    pub watch: Option<WatchCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub site: String,
    pub site_configured: bool,
    pub snapshots: Vec<String>,
    pub output: String,
    pub stakeholder: Stakeholder,
    /// Empty means every rule.
    pub rules: Vec<RuleKind>,
    /// Empty means every severity.
    pub severities: Vec<Severity>,
    pub show_suggestions: bool,
    pub debounce: Duration,
    pub auto_run: bool,
    pub start: String,
    /// Tokens that did not name a rule or severity.
    pub unknown: Vec<String>,
    /// Set when a rule or severity list was given but none of its tokens
    /// parsed; an empty selection would otherwise widen to everything.
    pub invalid_selection: Option<String>,
}

/// CLI-provided overrides; `None` falls through to config and defaults.
#[derive(Debug, Default, Clone)]
pub struct Overrides<'a> {
    pub repo_root: Option<&'a str>,
    pub site: Option<&'a str>,
    pub snapshots: Vec<String>,
    pub output: Option<&'a str>,
    pub stakeholder: Option<Stakeholder>,
    pub rules: Option<Vec<String>>,
    pub severity: Option<Vec<String>>,
    pub show_suggestions: Option<bool>,
    pub debounce_ms: Option<u64>,
    pub start: Option<&'a str>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `uxaudit.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `AuditConfig` from `uxaudit.toml` or `uxaudit.yaml|yml` if present.
/// A config file that fails to parse is reported and ignored.
pub fn load_config(root: &Path) -> Option<AuditConfig> {
    let toml_path = root.join("uxaudit.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!("ignoring {}: {}", toml_path.display(), e);
                None
            }
        };
    }
    for yml in ["uxaudit.yaml", "uxaudit.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    warn!("ignoring {}: {}", p.display(), e);
                    None
                }
            };
        }
    }
    None
}

fn parse_tokens<T>(
    tokens: &[String],
    parse: impl Fn(&str) -> Option<T>,
    unknown: &mut Vec<String>,
) -> Vec<T> {
    let mut out = Vec::new();
    for t in tokens {
        match parse(t) {
            Some(v) => out.push(v),
            None => unknown.push(t.clone()),
        }
    }
    out
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides<'_>) -> Effective {
    let start = PathBuf::from(cli.repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();
    let watch = cfg.watch.clone().unwrap_or_default();

    let site_src = cli.site.map(|s| s.to_string()).or(cfg.site);
    let site_configured = site_src.is_some();
    let site = site_src.unwrap_or_else(|| "site.toml".to_string());

    let snapshots = if !cli.snapshots.is_empty() {
        cli.snapshots.clone()
    } else {
        cfg.snapshots
            .unwrap_or_else(|| vec!["snapshots/**/*.json".to_string()])
    };

    let output = cli
        .output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let stakeholder = cli
        .stakeholder
        .or(cfg.stakeholder)
        .unwrap_or(Stakeholder::General);

    let mut unknown = Vec::new();
    let rule_tokens = cli.rules.clone().or(cfg.rules).unwrap_or_default();
    let rules = parse_tokens(&rule_tokens, RuleKind::parse, &mut unknown);
    let sev_tokens = cli.severity.clone().or(cfg.severity).unwrap_or_default();
    let severities = parse_tokens(&sev_tokens, Severity::parse, &mut unknown);
    let invalid_selection = if !rule_tokens.is_empty() && rules.is_empty() {
        Some(format!("No known rule in [{}].", rule_tokens.join(", ")))
    } else if !sev_tokens.is_empty() && severities.is_empty() {
        Some(format!("No known severity in [{}].", sev_tokens.join(", ")))
    } else {
        None
    };

    let show_suggestions = cli
        .show_suggestions
        .or(cfg.show_suggestions)
        .unwrap_or(false);
    let debounce_ms = cli.debounce_ms.or(watch.debounce_ms).unwrap_or(300);
    let auto_run = watch.auto_run.unwrap_or(true);
    let start = cli
        .start
        .map(|s| s.to_string())
        .or(watch.start)
        .unwrap_or_else(|| "/".to_string());

    Effective {
        repo_root,
        site,
        site_configured,
        snapshots,
        output,
        stakeholder,
        rules,
        severities,
        show_suggestions,
        debounce: Duration::from_millis(debounce_ms),
        auto_run,
        start,
        unknown,
        invalid_selection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn at(root: &Path) -> Overrides<'_> {
        Overrides {
            repo_root: root.to_str(),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("uxaudit.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
site = "web/site.toml"
snapshots = ["captures/*.json"]
output = "json"
stakeholder = "project-owner"
rules = ["route", "accessibility"]
[watch]
debounceMs = 50
autoRun = false
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(&at(root));
        assert_eq!(eff.site, "web/site.toml");
        assert!(eff.site_configured);
        assert_eq!(eff.snapshots, vec!["captures/*.json"]);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.stakeholder, Stakeholder::ProjectOwner);
        assert_eq!(eff.rules, vec![RuleKind::Route, RuleKind::Accessibility]);
        assert_eq!(eff.debounce, Duration::from_millis(50));
        assert!(!eff.auto_run);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("uxaudit.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
severity: [high, medium]
watch:
  start: /audits
            "#
        )
        .unwrap();

        let eff = resolve_effective(&at(root));
        assert_eq!(eff.site, "site.toml");
        assert!(!eff.site_configured);
        assert_eq!(eff.snapshots, vec!["snapshots/**/*.json"]);
        assert_eq!(eff.output, "human");
        assert_eq!(eff.severities, vec![Severity::High, Severity::Medium]);
        assert!(eff.rules.is_empty());
        assert_eq!(eff.start, "/audits");
        assert_eq!(eff.debounce, Duration::from_millis(300));
        assert!(eff.auto_run);
    }

    #[test]
    fn test_cli_precedence_and_unknown_tokens() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("uxaudit.toml"),
            "output = \"json\"\nseverity = [\"low\"]\n",
        )
        .unwrap();
        let cli = Overrides {
            output: Some("human"),
            severity: Some(vec!["high".into(), "urgent".into()]),
            rules: Some(vec!["perf".into()]),
            snapshots: vec!["one.json".into()],
            ..at(root)
        };
        let eff = resolve_effective(&cli);
        assert_eq!(eff.output, "human");
        assert_eq!(eff.severities, vec![Severity::High]);
        assert_eq!(eff.snapshots, vec!["one.json"]);
        assert_eq!(eff.unknown, vec!["perf".to_string(), "urgent".to_string()]);
    }

    #[test]
    fn test_all_unknown_selection_is_rejected() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("uxaudit.toml"), "severity = [\"urgent\"]\n").unwrap();
        let eff = resolve_effective(&at(root));
        assert!(eff.severities.is_empty());
        assert_eq!(
            eff.invalid_selection.as_deref(),
            Some("No known severity in [urgent].")
        );

        let cli = Overrides {
            rules: Some(vec!["perf".into(), "speed".into()]),
            severity: Some(vec!["high".into()]),
            ..at(root)
        };
        let eff = resolve_effective(&cli);
        assert_eq!(
            eff.invalid_selection.as_deref(),
            Some("No known rule in [perf, speed].")
        );

        // partially valid lists still resolve
        let cli = Overrides {
            severity: Some(vec!["high".into(), "urgent".into()]),
            ..at(root)
        };
        assert!(resolve_effective(&cli).invalid_selection.is_none());
    }

    #[test]
    fn test_detect_stops_at_git() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("apps/web")).unwrap();
        assert_eq!(detect_repo_root(&root.join("apps/web")), root.to_path_buf());
    }

    #[test]
    fn test_invalid_config_is_ignored() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("uxaudit.toml"), "output = [").unwrap();
        assert!(load_config(root).is_none());
        assert_eq!(resolve_effective(&at(root)).output, "human");
    }
}
