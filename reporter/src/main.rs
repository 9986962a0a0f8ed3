use anyhow::Context;
use chrono::Local;
use clap::Parser;
use codeiqcore::palette::ChartTheme;
use codeiqcore::report::OutputFormat;
use generator::profile::SyntheticConfig;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::ReportConfig;
use workflow::runner::{ReportInput, Runner};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Renders CodeIQ scan results into security reports")]
struct Args {
    /// Scan to fetch from the data source
    #[arg(long, default_value = "scan123")]
    scan_id: String,
    /// Render a scan report JSON file instead of fetching
    #[arg(long, conflicts_with = "synthetic")]
    input: Option<PathBuf>,
    /// Render a synthetic report with this many issues
    #[arg(long)]
    synthetic: Option<usize>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Load report settings from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// pdf or json
    #[arg(long)]
    format: Option<OutputFormat>,
    #[arg(long, value_parser = parse_theme)]
    theme: Option<ChartTheme>,
    /// Print page and chart statistics after writing
    #[arg(long, default_value_t = false)]
    summary: bool,
}

fn parse_theme(value: &str) -> Result<ChartTheme, String> {
    match value.to_ascii_lowercase().as_str() {
        "light" => Ok(ChartTheme::Light),
        "dark" => Ok(ChartTheme::Dark),
        other => Err(format!("unknown theme {other}")),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut report_config = if let Some(path) = &args.workflow {
        ReportConfig::load(path)?
    } else {
        ReportConfig::from_args(
            PathBuf::from("."),
            OutputFormat::default(),
            ChartTheme::default(),
        )
    };
    if let Some(dir) = args.output_dir {
        report_config.output_dir = dir;
    }
    if let Some(format) = args.format {
        report_config.format = format;
    }
    if let Some(theme) = args.theme {
        report_config.theme = theme;
    }

    let input = match (args.input, args.synthetic) {
        (Some(path), _) => ReportInput::File(path),
        (None, Some(issues)) => ReportInput::Synthetic(SyntheticConfig {
            issues,
            seed: args.seed,
            ..Default::default()
        }),
        (None, None) => ReportInput::Fetch {
            scan_id: args.scan_id,
        },
    };

    let runner = Runner::new(report_config);
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for report workflow")?;
    let today = Local::now().date_naive();
    let outcome = runtime.block_on(runner.execute(&input, today))?;

    match outcome {
        Some(outcome) => {
            println!("Report written -> {}", outcome.path.display());
            if args.summary {
                println!(
                    "pages={} issues={} pie_slices={} legend_rows={}",
                    outcome.page_count,
                    outcome.issue_count,
                    outcome.pie_slices,
                    outcome.donut_legend
                );
            }
        }
        None => println!("Scan data unavailable; no report written."),
    }

    Ok(())
}
