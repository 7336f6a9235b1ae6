use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use pdf_table_extract::Strategy;
use pdf_table_harvest::{
    HarvestConfig, TablePipeline, harvest_url, process_archive_files, process_uploaded_pdf,
    source_scraper,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf-harvest",
    version,
    about = "Find PDFs, extract their tables and write them as CSV"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// HTTP request timeout in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// User agent sent with every request.
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Rows copied into each record's sample_data.
    #[arg(long, global = true)]
    sample_rows: Option<usize>,

    /// Minimum cells required per candidate table row.
    #[arg(long, global = true)]
    min_cols: Option<usize>,

    /// Extraction strategies in order, like layout,stream.
    #[arg(long, global = true)]
    strategies: Option<String>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the PDF links found on a page.
    Links {
        url: String,
    },
    /// Download one PDF.
    Download {
        url: String,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Extract tables from local PDFs, one document at a time.
    Extract {
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Stage a local PDF as an upload and extract its tables.
    Upload {
        pdf: PathBuf,
        /// Name the upload is staged under; defaults to the file's own name.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        staging_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Download a PDF, or every PDF linked from a page, and extract tables.
    Harvest {
        url: String,
        #[arg(long)]
        download_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn load_config(args: &GlobalArgs) -> Result<HarvestConfig> {
    let mut config = HarvestConfig::from_env().context("failed to read configuration")?;
    if let Some(secs) = args.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(user_agent) = &args.user_agent {
        config.user_agent.clone_from(user_agent);
    }
    if let Some(sample_rows) = args.sample_rows {
        config.sample_rows = sample_rows;
    }
    if let Some(min_cols) = args.min_cols {
        config.extract.min_cols = min_cols;
    }
    if let Some(strategies) = &args.strategies {
        config.extract.strategies = Strategy::parse_list(strategies)
            .map_err(|error| anyhow!("invalid --strategies: {error}"))?;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}

/// Runs one command and reports whether it produced anything.
async fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli.global)?;

    match cli.command {
        Commands::Links { url } => {
            let client = source_scraper::build_client(&config)?;
            let links = source_scraper::discover_pdf_links(&client, &url)
                .await
                .with_context(|| format!("failed to discover PDF links on '{url}'"))?;
            print_json(&links)?;
            Ok(!links.is_empty())
        }
        Commands::Download { url, dir } => {
            let client = source_scraper::build_client(&config)?;
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            let path = source_scraper::download_pdf(&client, &url, &dir)
                .await
                .with_context(|| format!("failed to download '{url}'"))?;
            print_json(&path)?;
            Ok(true)
        }
        Commands::Extract { pdfs, output_dir } => {
            let pipeline = TablePipeline::new(&config.extract)?;
            let output_dir = output_dir.unwrap_or(config.output_dir);
            let report = process_archive_files(&pipeline, &pdfs, &output_dir, config.sample_rows);
            print_json(&report)?;
            Ok(!report.records.is_empty())
        }
        Commands::Upload {
            pdf,
            name,
            staging_dir,
            output_dir,
        } => {
            let pipeline = TablePipeline::new(&config.extract)?;
            let bytes = std::fs::read(&pdf)
                .with_context(|| format!("failed to read '{}'", pdf.display()))?;
            let name = name.or_else(|| {
                pdf.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            });
            let outcome = process_uploaded_pdf(
                &pipeline,
                &bytes,
                name.as_deref(),
                &staging_dir.unwrap_or(config.staging_dir),
                &output_dir.unwrap_or(config.output_dir),
                config.sample_rows,
            )
            .with_context(|| format!("failed to process upload '{}'", pdf.display()))?;
            print_json(&outcome)?;
            Ok(!outcome.records.is_empty())
        }
        Commands::Harvest {
            url,
            download_dir,
            output_dir,
        } => {
            let client = source_scraper::build_client(&config)?;
            let pipeline = Arc::new(TablePipeline::new(&config.extract)?);
            let report = harvest_url(
                &client,
                &pipeline,
                &url,
                &download_dir.unwrap_or_else(|| PathBuf::from(".")),
                &output_dir.unwrap_or(config.output_dir),
                config.sample_rows,
            )
            .await
            .with_context(|| format!("failed to harvest '{url}'"))?;
            print_json(&report)?;
            Ok(!report.records.is_empty())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.global.verbose {
        "pdf_table_harvest=debug,pdf_table_extract=debug"
    } else {
        "pdf_table_harvest=info,pdf_table_extract=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
