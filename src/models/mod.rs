//! Shared data models: the issue vocabulary every rule emits into, the
//! derived audit report, and the site/snapshot inputs.

pub mod site;
pub mod snapshot;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Category of a detected problem.
pub enum IssueType {
    Route,
    Link,
    Ui,
    Responsive,
    Styling,
    Interactive,
    Accessibility,
    Performance,
    Functionality,
    Security,
    Content,
    Navigation,
    Seo,
}

impl IssueType {
    pub const ALL: [IssueType; 13] = [
        IssueType::Route,
        IssueType::Link,
        IssueType::Ui,
        IssueType::Responsive,
        IssueType::Styling,
        IssueType::Interactive,
        IssueType::Accessibility,
        IssueType::Performance,
        IssueType::Functionality,
        IssueType::Security,
        IssueType::Content,
        IssueType::Navigation,
        IssueType::Seo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Route => "route",
            IssueType::Link => "link",
            IssueType::Ui => "ui",
            IssueType::Responsive => "responsive",
            IssueType::Styling => "styling",
            IssueType::Interactive => "interactive",
            IssueType::Accessibility => "accessibility",
            IssueType::Performance => "performance",
            IssueType::Functionality => "functionality",
            IssueType::Security => "security",
            IssueType::Content => "content",
            IssueType::Navigation => "navigation",
            IssueType::Seo => "seo",
        }
    }

    pub fn parse(s: &str) -> Option<IssueType> {
        let s = s.trim();
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
/// Issue severity. Declaration order is the sort order: most severe first.
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Severity> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
/// Audience an issue matters to.
pub enum Stakeholder {
    General,
    Auditor,
    ProjectOwner,
    Admin,
    Developer,
    EndUsers,
    Compliance,
}

impl Stakeholder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stakeholder::General => "general",
            Stakeholder::Auditor => "auditor",
            Stakeholder::ProjectOwner => "project-owner",
            Stakeholder::Admin => "admin",
            Stakeholder::Developer => "developer",
            Stakeholder::EndUsers => "end-users",
            Stakeholder::Compliance => "compliance",
        }
    }
}

impl fmt::Display for Stakeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single detected deviation from a rule's expectation.
///
/// Two issues are duplicates when `description` and `location` match.
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub description: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_stakeholders: Option<Vec<Stakeholder>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag_criterion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        issue_type: IssueType,
        severity: Severity,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            issue_type,
            severity,
            description: description.into(),
            location: location.into(),
            suggestion: None,
            affected_stakeholders: None,
            wcag_criterion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_stakeholders(mut self, stakeholders: &[Stakeholder]) -> Self {
        self.affected_stakeholders = Some(stakeholders.to_vec());
        self
    }

    pub fn with_wcag(mut self, criterion: impl Into<String>) -> Self {
        self.wcag_criterion = Some(criterion.into());
        self
    }

    /// Identity used for deduplication.
    pub fn key(&self) -> (&str, &str) {
        (self.description.as_str(), self.location.as_str())
    }

    /// An issue without listed stakeholders, or tagged `General`, is
    /// relevant to everyone.
    pub fn concerns(&self, stakeholder: Stakeholder) -> bool {
        match self.affected_stakeholders.as_deref() {
            None | Some([]) => true,
            Some(list) => list.contains(&Stakeholder::General) || list.contains(&stakeholder),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Result of one aggregator pass.
pub struct ValidationOutcome {
    pub issues: Vec<ValidationIssue>,
    pub is_validating: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Severity-bucketed counts used by printers.
pub struct Summary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
    pub files: usize,
}

impl Summary {
    pub fn of(issues: &[ValidationIssue]) -> Self {
        let mut s = Summary::default();
        for is in issues {
            match is.severity {
                Severity::High => s.high += 1,
                Severity::Medium => s.medium += 1,
                Severity::Low => s.low += 1,
            }
        }
        s.total = issues.len();
        s
    }
}

#[derive(Debug, Clone, Serialize)]
/// Issues found in one snapshot file.
pub struct FileOutcome {
    pub file: String,
    pub pathname: String,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Serialize)]
/// Result of scanning a set of snapshot files.
pub struct ScanResult {
    pub files: Vec<FileOutcome>,
    pub summary: Summary,
}

impl ScanResult {
    pub fn new(files: Vec<FileOutcome>) -> Self {
        let all: Vec<ValidationIssue> = files.iter().flat_map(|f| f.issues.clone()).collect();
        let mut summary = Summary::of(&all);
        summary.files = files.len();
        ScanResult { files, summary }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Full audit report, recomputed on every run and never persisted.
pub struct UxAuditReport {
    pub timestamp: DateTime<Utc>,
    pub total_issues: usize,
    pub high_severity_count: usize,
    pub medium_severity_count: usize,
    pub low_severity_count: usize,
    pub route_issues: Vec<ValidationIssue>,
    pub accessibility_issues: Vec<ValidationIssue>,
    pub responsive_issues: Vec<ValidationIssue>,
    pub stakeholder_issues: Vec<ValidationIssue>,
    pub general_issues: Vec<ValidationIssue>,
    pub suggested_fixes: Vec<String>,
}

impl UxAuditReport {
    /// All issues across buckets in report order.
    pub fn all_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.route_issues
            .iter()
            .chain(self.accessibility_issues.iter())
            .chain(self.responsive_issues.iter())
            .chain(self.stakeholder_issues.iter())
            .chain(self.general_issues.iter())
    }
}
