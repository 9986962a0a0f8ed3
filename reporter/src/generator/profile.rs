use anyhow::Context;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use codeiqcore::math::Score;
use codeiqcore::model::{
    IssueRecord, IssueReference, IssueStatus, ScanReport, Severity, SeverityCount,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const ISSUE_KINDS: [(&str, &str); 6] = [
    ("XSS", "Unescaped output rendered into the DOM"),
    ("Code Injection", "Dynamic evaluation of caller-supplied input"),
    ("API Security", "Credential embedded in client bundle"),
    ("Input Validation", "Permissive pattern accepts malformed input"),
    ("Security Configuration", "Overly broad content security policy"),
    ("Insecure Storage", "Session token kept in persistent storage"),
];

/// Configuration for generating a synthetic scan report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub issues: usize,
    pub seed: u64,
    pub project_name: String,
    pub language: String,
    /// Lines per generated code snippet.
    pub snippet_lines: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            issues: 12,
            seed: 0,
            project_name: "synthetic-project".into(),
            language: "JavaScript".into(),
            snippet_lines: 8,
        }
    }
}

fn pick_severity(rng: &mut StdRng) -> Severity {
    match rng.gen_range(0..100) {
        0..=9 => Severity::Critical,
        10..=39 => Severity::High,
        40..=74 => Severity::Medium,
        _ => Severity::Low,
    }
}

fn pick_status(rng: &mut StdRng) -> IssueStatus {
    match rng.gen_range(0..10) {
        0..=6 => IssueStatus::Open,
        7 | 8 => IssueStatus::Fixed,
        _ => IssueStatus::Ignored,
    }
}

fn build_snippet(rng: &mut StdRng, lines: usize) -> String {
    (0..lines.max(1))
        .map(|line| {
            let indent = "  ".repeat(rng.gen_range(0..3));
            format!("{indent}const value{line} = input[{}];", rng.gen_range(0..64))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_issue(rng: &mut StdRng, index: usize, config: &SyntheticConfig) -> IssueRecord {
    let (kind, summary) = ISSUE_KINDS[rng.gen_range(0..ISSUE_KINDS.len())];
    let file_index = rng.gen_range(1..=20);
    IssueRecord {
        id: format!("issue{}", index + 1),
        file_id: format!("file{file_index}"),
        file_path: format!("src/module{file_index}/handler.js"),
        line_number: rng.gen_range(1..400),
        title: format!("{summary} #{}", index + 1),
        description: format!(
            "{summary} was detected while scanning {}. The affected code path is reachable from request handlers.",
            config.project_name
        ),
        severity: pick_severity(rng),
        issue_type: kind.to_string(),
        status: pick_status(rng),
        code_snippet: build_snippet(rng, config.snippet_lines),
        impact: "An attacker able to reach this code path could read or alter data belonging to other users.".into(),
        recommendation: "Validate and encode untrusted input at the boundary and keep secrets on the server.".into(),
        references: vec![IssueReference {
            title: format!("OWASP guidance: {kind}"),
            url: "https://owasp.org/www-project-top-ten/".into(),
        }],
    }
}

/// Builds a deterministic report: the same config always yields the same issues.
pub fn build_scan_report(config: &SyntheticConfig) -> anyhow::Result<ScanReport> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let issues: Vec<IssueRecord> = (0..config.issues)
        .map(|index| build_issue(&mut rng, index, config))
        .collect();

    let counts = SeverityCount::from_issues(&issues);
    let penalty = counts.critical * 15 + counts.high * 8 + counts.medium * 3 + counts.low;
    let score = Score::saturating(100 - i64::from(penalty.min(100)));

    let started_at = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .context("building synthetic scan start time")?
        + ChronoDuration::minutes(rng.gen_range(0..600));
    let duration = rng.gen_range(5..120u64);
    let completed_at = started_at + ChronoDuration::seconds(duration as i64);
    let files_scanned = rng.gen_range(10..500u64);

    Ok(ScanReport {
        id: format!("synthetic-{}", config.seed),
        project_id: format!("p{}", config.seed),
        project_name: config.project_name.clone(),
        scan_type: "Full Scan".into(),
        language: config.language.clone(),
        status: "Completed".into(),
        started_at,
        completed_at,
        duration,
        security_score: score,
        files_scanned,
        lines_of_code: files_scanned * rng.gen_range(40..400u64),
        issues_by_severity: counts,
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_requested_issue_count() {
        let config = SyntheticConfig {
            issues: 25,
            ..Default::default()
        };
        let report = build_scan_report(&config).unwrap();
        assert_eq!(report.issues.len(), 25);
        assert_eq!(report.total_issues(), 25);
        assert_eq!(report.issues_by_severity.total(), 25);
        assert!(report.completed_at > report.started_at);
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = SyntheticConfig {
            issues: 6,
            seed: 13,
            snippet_lines: 3,
            ..Default::default()
        };
        let first = build_scan_report(&config).unwrap();
        let second = build_scan_report(&config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.issues[0].code_snippet.lines().count(), 3);

        let other = build_scan_report(&SyntheticConfig { seed: 14, ..config }).unwrap();
        assert_ne!(first.issues, other.issues);
    }

    #[test]
    fn empty_report_scores_full_marks() {
        let config = SyntheticConfig {
            issues: 0,
            ..Default::default()
        };
        let report = build_scan_report(&config).unwrap();
        assert_eq!(report.security_score.value(), 100);
        assert!(report.issues.is_empty());
    }
}
