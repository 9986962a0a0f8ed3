use crate::model::ScanReport;
use crate::prelude::{RenderError, RenderResult};
use crate::report::generator::{ReportGenerator, REPORT_TITLE};
use crate::report::pdf::encode_pdf;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoding of the downloadable report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    /// The laid-out document as JSON, for inspection and diffing.
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "json" => Ok(OutputFormat::Json),
            other => Err(RenderError::UnknownFormat(other.to_string())),
        }
    }
}

/// `security-report-<project>-<YYYY-MM-DD>.<ext>`. Path separators in the
/// project name are replaced so the name stays a single path component.
pub fn artifact_name(project: &str, date: NaiveDate, format: OutputFormat) -> String {
    let project: String = project
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' => '-',
            other => other,
        })
        .collect();
    format!(
        "security-report-{}-{}.{}",
        project,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Finished, named report bytes ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl ReportGenerator {
    /// Lays out `report` and encodes it as a single artifact dated `date`.
    pub fn render_artifact(
        &self,
        report: &ScanReport,
        date: NaiveDate,
        format: OutputFormat,
    ) -> RenderResult<ReportArtifact> {
        let document = self.generate(report);
        let bytes = match format {
            OutputFormat::Pdf => encode_pdf(&document, REPORT_TITLE)?,
            OutputFormat::Json => serde_json::to_vec_pretty(&document)
                .map_err(|err| RenderError::Encoding(err.to_string()))?,
        };
        Ok(ReportArtifact {
            file_name: artifact_name(&report.project_name, date, format),
            format,
            bytes,
            page_count: document.page_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::score::Score;
    use crate::model::SeverityCount;
    use chrono::{TimeZone, Utc};

    fn empty_report(project: &str) -> ScanReport {
        ScanReport {
            id: "scan1".into(),
            project_id: "p1".into(),
            project_name: project.into(),
            scan_type: "upload".into(),
            language: "javascript".into(),
            status: "completed".into(),
            started_at: Utc.with_ymd_and_hms(2023, 8, 15, 10, 0, 0).unwrap(),
            completed_at: Utc.with_ymd_and_hms(2023, 8, 15, 10, 2, 0).unwrap(),
            duration: 120,
            security_score: Score::new(100).unwrap(),
            files_scanned: 3,
            lines_of_code: 420,
            issues_by_severity: SeverityCount::default(),
            issues: Vec::new(),
        }
    }

    #[test]
    fn names_artifact_from_project_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            artifact_name("web-app", date, OutputFormat::Pdf),
            "security-report-web-app-2024-03-07.pdf"
        );
        assert_eq!(
            artifact_name("org/repo", date, OutputFormat::Json),
            "security-report-org-repo-2024-03-07.json"
        );
    }

    #[test]
    fn parses_formats_case_insensitively() {
        assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!(" json ".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!(matches!(
            "docx".parse::<OutputFormat>(),
            Err(RenderError::UnknownFormat(name)) if name == "docx"
        ));
    }

    #[test]
    fn renders_pdf_and_json_artifacts() {
        let generator = ReportGenerator::default();
        let report = empty_report("demo");
        let date = NaiveDate::from_ymd_opt(2023, 8, 16).unwrap();

        let pdf = generator
            .render_artifact(&report, date, OutputFormat::Pdf)
            .unwrap();
        assert_eq!(pdf.page_count, 3);
        assert!(pdf.bytes.starts_with(b"%PDF-1.4"));
        assert_eq!(pdf.file_name, "security-report-demo-2023-08-16.pdf");

        let json = generator
            .render_artifact(&report, date, OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json.bytes).unwrap();
        assert_eq!(value["pages"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["pages"][0]["kind"]["kind"], "cover");
    }
}
