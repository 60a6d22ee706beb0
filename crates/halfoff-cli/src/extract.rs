//! The `extract` command: feed the engine one store's page artifacts and
//! persist the result.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use halfoff_core::AppConfig;
use halfoff_engine::{run_extraction, CaptureBuffer, CaptureConfig, TileSelectors};
use scraper::Html;
use url::Url;

use crate::capture_log;
use crate::report::{self, StoreReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Rendered page snapshot (HTML) saved by the browser layer.
    #[arg(long)]
    pub snapshot: PathBuf,
    /// Capture log: one intercepted-response JSON object per line.
    #[arg(long)]
    pub captures: Option<PathBuf>,
    /// Storefront base origin, used to resolve relative product URLs.
    #[arg(long)]
    pub base_url: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    /// Output file; defaults to `<output_dir>/<host>.<ext>`.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &ExtractArgs, config: &AppConfig) -> anyhow::Result<()> {
    let base_url = Url::parse(&args.base_url)
        .with_context(|| format!("invalid base URL \"{}\"", args.base_url))?;

    let html = fs::read_to_string(&args.snapshot)
        .with_context(|| format!("cannot read snapshot {}", args.snapshot.display()))?;
    let document = Html::parse_document(&html);

    let mut buffer = CaptureBuffer::new(CaptureConfig {
        max_captures: config.max_captures,
        min_body_bytes: config.min_body_bytes,
        max_body_bytes: config.max_body_bytes,
    });
    if let Some(path) = &args.captures {
        let (offered, retained) = capture_log::load_into(path, &mut buffer)?;
        tracing::debug!(offered, retained, "loaded capture log");
    }

    let result = run_extraction(
        &document,
        buffer.captures(),
        &base_url,
        &TileSelectors::default(),
    )?;
    if result.is_empty() {
        tracing::warn!(store = %base_url, "no deep discounts extracted");
    }

    let out_path = match &args.out {
        Some(path) => path.clone(),
        None => default_out_path(config, &base_url, args.format)?,
    };

    let report = StoreReport::new(&base_url, &result);
    match args.format {
        OutputFormat::Json => report::write_json(&out_path, &report)?,
        OutputFormat::Csv => report::write_csv(&out_path, &report)?,
    }
    tracing::info!(path = %out_path.display(), kept = result.kept_count, "report written");

    Ok(())
}

fn default_out_path(
    config: &AppConfig,
    base_url: &Url,
    format: OutputFormat,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "cannot create output directory {}",
            config.output_dir.display()
        )
    })?;
    let host = base_url.host_str().unwrap_or("store");
    let extension = match format {
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
    };
    Ok(config.output_dir.join(format!("{host}.{extension}")))
}
