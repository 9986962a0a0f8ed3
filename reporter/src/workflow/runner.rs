use crate::generator::profile::{build_scan_report, SyntheticConfig};
use crate::workflow::config::ReportConfig;
use anyhow::Context;
use chrono::NaiveDate;
use codeiqcore::model::{ChartDataset, ScanReport};
use codeiqcore::render::{DonutChart, DonutOutcome, RecordingSurface};
use codeiqcore::report::{severity_pie, ReportArtifact, ReportGenerator};
use codeiqcore::source::{MockDataSource, ScanDataSource};
use codeiqcore::telemetry::LogManager;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the scan report comes from.
#[derive(Clone, Debug)]
pub enum ReportInput {
    Fetch { scan_id: String },
    File(PathBuf),
    Synthetic(SyntheticConfig),
}

pub struct RunOutcome {
    pub path: PathBuf,
    pub page_count: usize,
    pub issue_count: usize,
    pub pie_slices: usize,
    pub donut_legend: usize,
}

#[derive(Clone)]
pub struct Runner {
    config: ReportConfig,
    source: Arc<dyn ScanDataSource>,
    logger: LogManager,
}

impl Runner {
    pub fn new(config: ReportConfig) -> Self {
        let source = Arc::new(MockDataSource::new(config.latency()));
        Self::with_source(config, source)
    }

    pub fn with_source(config: ReportConfig, source: Arc<dyn ScanDataSource>) -> Self {
        Self {
            config,
            source,
            logger: LogManager::new("runner"),
        }
    }

    /// Resolves the input to a report. A failed fetch is reported and yields
    /// `None`; unreadable local input is an error.
    pub async fn load(&self, input: &ReportInput) -> anyhow::Result<Option<ScanReport>> {
        match input {
            ReportInput::Fetch { scan_id } => match self.source.scan_result(scan_id).await {
                Ok(report) => Ok(Some(report)),
                Err(err) => {
                    self.logger
                        .notice(&format!("could not fetch scan {scan_id}: {err}"));
                    Ok(None)
                }
            },
            ReportInput::File(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("reading scan report {}", path.display()))?;
                let report = serde_json::from_str(&contents)
                    .with_context(|| format!("parsing scan report {}", path.display()))?;
                Ok(Some(report))
            }
            ReportInput::Synthetic(config) => build_scan_report(config).map(Some),
        }
    }

    pub fn render(&self, report: &ScanReport, date: NaiveDate) -> anyhow::Result<ReportArtifact> {
        let generator = ReportGenerator::new(self.config.page.clone(), self.config.palette.clone());
        generator
            .render_artifact(report, date, self.config.format)
            .with_context(|| format!("rendering report for {}", report.project_name))
    }

    pub fn write(&self, artifact: &ReportArtifact) -> anyhow::Result<PathBuf> {
        write_artifact(&self.config.output_dir, artifact)
    }

    /// Loads, renders and writes one report. Returns `None` when the data
    /// source could not supply the scan.
    pub async fn execute(
        &self,
        input: &ReportInput,
        date: NaiveDate,
    ) -> anyhow::Result<Option<RunOutcome>> {
        let Some(report) = self.load(input).await? else {
            return Ok(None);
        };
        let artifact = self.render(&report, date)?;
        let path = self.write(&artifact)?;

        let pie_slices = severity_pie(&report.issues_by_severity, &self.config.palette).len();
        let dataset =
            ChartDataset::from_severity_counts(&report.issues_by_severity, &self.config.palette);
        let mut surface = RecordingSurface::new();
        let donut_legend = match DonutChart::new(dataset, self.config.theme).render(&mut surface) {
            DonutOutcome::Drawn { legend } => legend.len(),
            DonutOutcome::NoData => 0,
        };

        self.logger.record(&format!(
            "wrote {} ({} pages, {} issues)",
            path.display(),
            artifact.page_count,
            report.issues.len()
        ));
        Ok(Some(RunOutcome {
            path,
            page_count: artifact.page_count,
            issue_count: report.issues.len(),
            pie_slices,
            donut_legend,
        }))
    }
}

pub fn write_artifact(dir: &Path, artifact: &ReportArtifact) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let path = dir.join(&artifact.file_name);
    fs::write(&path, &artifact.bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeiqcore::palette::ChartTheme;
    use codeiqcore::report::OutputFormat;
    use tempfile::tempdir;

    fn runner_in(dir: &Path, format: OutputFormat) -> Runner {
        Runner::new(ReportConfig::from_args(
            dir.to_path_buf(),
            format,
            ChartTheme::Light,
        ))
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 8, 16).unwrap()
    }

    #[tokio::test]
    async fn runner_fetches_and_writes_pdf() {
        let dir = tempdir().unwrap();
        let runner = runner_in(dir.path(), OutputFormat::Pdf);
        let outcome = runner
            .execute(
                &ReportInput::Fetch {
                    scan_id: "scan123".into(),
                },
                date(),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            outcome.path.file_name().unwrap(),
            "security-report-E-commerce Frontend-2023-08-16.pdf"
        );
        assert!(outcome.page_count >= 3 + outcome.issue_count);
        assert_eq!(outcome.issue_count, 8);
        assert_eq!(outcome.pie_slices, 3);
        assert_eq!(outcome.donut_legend, 4);
        let bytes = fs::read(&outcome.path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
    }

    #[tokio::test]
    async fn failed_fetch_skips_rendering() {
        let dir = tempdir().unwrap();
        let runner = runner_in(dir.path(), OutputFormat::Pdf);
        let outcome = runner
            .execute(
                &ReportInput::Fetch {
                    scan_id: "  ".into(),
                },
                date(),
            )
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn synthetic_input_renders_json_layout() {
        let dir = tempdir().unwrap();
        let runner = runner_in(dir.path(), OutputFormat::Json);
        let config = SyntheticConfig {
            issues: 5,
            seed: 7,
            ..Default::default()
        };
        let outcome = runner
            .execute(&ReportInput::Synthetic(config), date())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.issue_count, 5);
        let value: serde_json::Value =
            serde_json::from_slice(&fs::read(&outcome.path).unwrap()).unwrap();
        assert_eq!(
            value["pages"].as_array().map(Vec::len),
            Some(outcome.page_count)
        );
    }

    #[tokio::test]
    async fn unreadable_input_file_is_an_error() {
        let dir = tempdir().unwrap();
        let runner = runner_in(dir.path(), OutputFormat::Pdf);
        let err = runner
            .load(&ReportInput::File(dir.path().join("missing.json")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("reading scan report"));
    }
}
