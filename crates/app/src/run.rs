use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use serde::Deserialize;

use trimatch_core::ReconConfig;
use trimatch_email::{EmailConfig, ReportAttachment};
use trimatch_engine::{reconcile, ReconSummary};
use trimatch_ingest::load_folder;
use trimatch_report::{build_summary_pdf, build_workbook};

/// Top-level TOML config: recon tables plus delivery settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: Option<PathBuf>,
    pub recon: ReconConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.recon.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&raw)
    }
}

pub struct RunOptions {
    pub input: PathBuf,
    pub client: String,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub email: bool,
}

pub struct RunOutcome {
    pub run_dir: PathBuf,
    pub summary: ReconSummary,
}

fn slug(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if cleaned.chars().all(|c| c == '_') {
        "client".to_string()
    } else {
        cleaned
    }
}

/// One full run: load the feed folder, reconcile, write the workbook,
/// PDF summary and metadata into `output/<client>/runs/<timestamp>/`,
/// then optionally email the artifacts.
pub async fn execute(options: RunOptions) -> anyhow::Result<RunOutcome> {
    let config = match &options.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let feeds = load_folder(&options.input)
        .with_context(|| format!("loading feeds from {}", options.input.display()))?;
    let output = reconcile(&feeds.bank, &feeds.ledger, &feeds.gateway, &config.recon);
    tracing::info!(
        client = %options.client,
        total = output.summary.total,
        matched = output.summary.matched,
        match_rate_pct = output.summary.match_rate_pct,
        "reconciliation complete"
    );

    let output_root = options
        .output
        .or(config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("output"));
    let timestamp = Local::now();
    let run_dir = output_root
        .join(slug(&options.client))
        .join("runs")
        .join(timestamp.format("%Y%m%d_%H%M%S").to_string());
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating run folder {}", run_dir.display()))?;

    let workbook = build_workbook(&options.client, &output)?;
    let pdf = build_summary_pdf(&options.client, &output.summary)?;
    let workbook_name = format!("{}_reconciliation.xlsx", slug(&options.client));
    let pdf_name = format!("{}_summary.pdf", slug(&options.client));
    std::fs::write(run_dir.join(&workbook_name), &workbook)?;
    std::fs::write(run_dir.join(&pdf_name), &pdf)?;

    let metadata = serde_json::json!({
        "client": options.client,
        "generated_at": timestamp.to_rfc3339(),
        "input_dir": options.input.display().to_string(),
        "summary": output.summary,
        "artifacts": [workbook_name.clone(), pdf_name.clone()],
    });
    std::fs::write(
        run_dir.join("metadata.json"),
        serde_json::to_string_pretty(&metadata)?,
    )?;
    tracing::info!(run_dir = %run_dir.display(), "run artifacts written");

    if options.email {
        let attachments = vec![
            ReportAttachment::workbook(workbook_name, workbook),
            ReportAttachment::summary_pdf(pdf_name, pdf),
        ];
        trimatch_email::send_report(&config.email, &options.client, attachments).await?;
    }

    Ok(RunOutcome {
        run_dir,
        summary: output.summary,
    })
}
