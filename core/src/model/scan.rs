use crate::math::score::Score;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal classification of a finding, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Fixed display order shared by every chart, legend and table.
    pub const ORDER: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Title-cased name used in legends ("Critical").
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    /// Upper-cased name used in tables ("CRITICAL").
    pub fn upper(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of findings per severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityCount {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityCount {
    pub fn new(critical: u32, high: u32, medium: u32, low: u32) -> Self {
        Self {
            critical,
            high,
            medium,
            low,
        }
    }

    pub fn get(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> u64 {
        Severity::ORDER
            .iter()
            .map(|&severity| u64::from(self.get(severity)))
            .sum()
    }

    /// `(severity, count)` pairs in [`Severity::ORDER`].
    pub fn iter(&self) -> impl Iterator<Item = (Severity, u32)> + '_ {
        Severity::ORDER
            .iter()
            .map(move |&severity| (severity, self.get(severity)))
    }

    /// Tallies the severities of a list of findings.
    pub fn from_issues(issues: &[IssueRecord]) -> Self {
        issues.iter().fold(Self::default(), |mut counts, issue| {
            match issue.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
            counts
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Open,
    Fixed,
    Ignored,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Fixed => "fixed",
            IssueStatus::Ignored => "ignored",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReference {
    pub title: String,
    pub url: String,
}

/// A single finding. Renderers only ever borrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    pub id: String,
    #[serde(default)]
    pub file_id: String,
    pub file_path: String,
    pub line_number: u32,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub status: IssueStatus,
    pub code_snippet: String,
    pub impact: String,
    pub recommendation: String,
    #[serde(default)]
    pub references: Vec<IssueReference>,
}

impl IssueRecord {
    /// `path:line` form used by tables and detail pages.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file_path, self.line_number)
    }
}

/// Complete result of one scan; the sole input of the report generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    pub project_name: String,
    #[serde(default)]
    pub scan_type: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Scan duration in seconds.
    pub duration: u64,
    pub security_score: Score,
    pub files_scanned: u64,
    pub lines_of_code: u64,
    pub issues_by_severity: SeverityCount,
    #[serde(default)]
    pub issues: Vec<IssueRecord>,
}

impl ScanReport {
    pub fn total_issues(&self) -> u64 {
        self.issues_by_severity.total()
    }
}
