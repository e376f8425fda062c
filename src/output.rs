//! Output rendering for scan and report commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-file issues and a top-level summary.

use crate::models::{ScanResult, Severity, UxAuditReport, ValidationIssue};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

pub fn severity_icon(sev: Severity, color: bool) -> String {
    let icon = match sev {
        Severity::High => "✖",
        Severity::Medium => "▲",
        Severity::Low => "◆",
    };
    if !color {
        return icon.to_string();
    }
    match sev {
        Severity::High => icon.red().to_string(),
        Severity::Medium => icon.yellow().to_string(),
        Severity::Low => icon.blue().to_string(),
    }
}

pub fn severity_tag(sev: Severity, color: bool) -> String {
    let tag = format!("⟦{}⟧", sev);
    if !color {
        return tag;
    }
    match sev {
        Severity::High => tag.red().bold().to_string(),
        Severity::Medium => tag.yellow().bold().to_string(),
        Severity::Low => tag.blue().bold().to_string(),
    }
}

/// One issue on one line: icon, severity, type, description, location.
pub fn issue_line(is: &ValidationIssue, color: bool) -> String {
    let loc = if color {
        is.location.clone().dimmed().to_string()
    } else {
        is.location.clone()
    };
    format!(
        "{} {} ❲{}❳ {} @ {}",
        severity_icon(is.severity, color),
        severity_tag(is.severity, color),
        is.issue_type,
        is.description,
        loc
    )
}

fn bold(s: String, color: bool) -> String {
    if color {
        s.bold().to_string()
    } else {
        s
    }
}

/// Print scan results in the requested format.
pub fn print_scan(res: &ScanResult, output: &str, show_suggestions: bool) {
    match output {
        "json" => println!("{}", to_pretty(&compose_scan_json(res))),
        _ => {
            let color = use_colors(output);
            for f in &res.files {
                let header = format!("{} ({})", f.file, f.pathname);
                println!("{}", bold(header, color));
                if f.issues.is_empty() {
                    let ok = "  ✔ no issues found";
                    if color {
                        println!("{}", ok.green());
                    } else {
                        println!("{}", ok);
                    }
                }
                for is in &f.issues {
                    println!("  {}", issue_line(is, color));
                    if show_suggestions {
                        if let Some(s) = &is.suggestion {
                            println!("      ↳ {}", s);
                        }
                    }
                }
            }
            let summary = format!(
                "— Summary — high={} medium={} low={} files={}",
                res.summary.high, res.summary.medium, res.summary.low, res.summary.files
            );
            println!("{}", bold(summary, color));
        }
    }
}

/// Print one audit report per file.
pub fn print_reports(reports: &[(String, UxAuditReport)], output: &str) {
    match output {
        "json" => println!("{}", to_pretty(&compose_report_json(reports))),
        _ => {
            let color = use_colors(output);
            for (file, r) in reports {
                println!("{}", bold(format!("{} @ {}", file, r.timestamp.to_rfc3339()), color));
                println!(
                    "  total={} high={} medium={} low={}",
                    r.total_issues,
                    r.high_severity_count,
                    r.medium_severity_count,
                    r.low_severity_count
                );
                let buckets = [
                    ("route", &r.route_issues),
                    ("accessibility", &r.accessibility_issues),
                    ("responsive", &r.responsive_issues),
                    ("stakeholder", &r.stakeholder_issues),
                    ("general", &r.general_issues),
                ];
                for (name, issues) in buckets {
                    if issues.is_empty() {
                        continue;
                    }
                    println!("  {} ({})", bold(name.to_string(), color), issues.len());
                    for is in issues.iter() {
                        println!("    {}", issue_line(is, color));
                    }
                }
                if !r.suggested_fixes.is_empty() {
                    println!("  {}", bold("suggested fixes".to_string(), color));
                    for fix in &r.suggested_fixes {
                        println!("    - {}", fix);
                    }
                }
            }
        }
    }
}

fn to_pretty(v: &JsonVal) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

/// Compose scan JSON object (pure) for testing.
pub fn compose_scan_json(res: &ScanResult) -> JsonVal {
    serde_json::to_value(res).unwrap_or(JsonVal::Null)
}

/// Compose report JSON: `{"reports": [{"file", "report"}], "summary"}`.
pub fn compose_report_json(reports: &[(String, UxAuditReport)]) -> JsonVal {
    let items: Vec<_> = reports
        .iter()
        .map(|(file, r)| json!({"file": file, "report": r}))
        .collect();
    let summary = json!({
        "files": reports.len(),
        "totalIssues": reports.iter().map(|(_, r)| r.total_issues).sum::<usize>(),
        "high": reports.iter().map(|(_, r)| r.high_severity_count).sum::<usize>(),
    });
    json!({"reports": items, "summary": summary})
}
