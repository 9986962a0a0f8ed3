use anyhow::Context;
use codeiqcore::palette::{ChartTheme, SeverityPalette};
use codeiqcore::report::{OutputFormat, PageSetup};
use codeiqcore::source::Latency;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub theme: ChartTheme,
    /// Simulated data-source delay; absent means answers are immediate.
    pub latency_ms: Option<u64>,
    pub page: PageSetup,
    pub palette: SeverityPalette,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: OutputFormat::Pdf,
            theme: ChartTheme::Light,
            latency_ms: None,
            page: PageSetup::default(),
            palette: SeverityPalette::default(),
        }
    }
}

impl ReportConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading report config {}", path_ref.display()))?;
        let config: ReportConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing report config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(output_dir: PathBuf, format: OutputFormat, theme: ChartTheme) -> Self {
        Self {
            output_dir,
            format,
            theme,
            ..Default::default()
        }
    }

    pub fn latency(&self) -> Latency {
        match self.latency_ms {
            Some(ms) => Latency::uniform(Duration::from_millis(ms)),
            None => Latency::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeiqcore::Rgb;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_page_defaults() {
        let cfg = ReportConfig::from_args("out".into(), OutputFormat::Json, ChartTheme::Dark);
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.page, PageSetup::default());
        assert_eq!(cfg.latency(), Latency::NONE);
    }

    #[test]
    fn config_load_reads_yaml_overrides() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"output_dir: reports\nformat: json\ntheme: dark\nlatency_ms: 5\npage:\n  margin: 15\npalette:\n  low: \"#22C55E\"\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ReportConfig::load(&path).unwrap();
        assert_eq!(cfg.format, OutputFormat::Json);
        assert_eq!(cfg.theme, ChartTheme::Dark);
        assert_eq!(cfg.page.margin, 15.0);
        assert_eq!(cfg.page.line_height, 7.0);
        assert_eq!(cfg.palette.low, Rgb::from_u32(0x22C55E));
        assert_eq!(cfg.latency().ai, Duration::from_millis(5));
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = ReportConfig::load("/nonexistent/report.yaml").unwrap_err();
        assert!(err.to_string().contains("reading report config"));
    }
}
