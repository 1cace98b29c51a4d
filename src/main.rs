//! CLI entry point for the AYCF availability tracker.
//!
//! Provides subcommands for downloading and extracting the published
//! availability document, and for computing statistics over the collected
//! snapshots.

use anyhow::{Context, Result};
use aycf_tracker::analyzers::SelectionReport;
use aycf_tracker::analyzers::airports::map_points;
use aycf_tracker::analyzers::daily::daily_counts;
use aycf_tracker::analyzers::report::DashboardReport;
use aycf_tracker::config::Settings;
use aycf_tracker::dataset::UnifiedDataset;
use aycf_tracker::extract::Extractor;
use aycf_tracker::fetch::{BasicClient, download_document};
use aycf_tracker::filter::{Selection, filter};
use aycf_tracker::geo::StaticCoordinates;
use aycf_tracker::output::{print_json, print_pretty, write_csv, write_json};
use aycf_tracker::store::{SnapshotStore, archive_document};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aycf_tracker")]
#[command(about = "Tracks Wizz Air All You Can Fly route availability", long_about = None)]
struct Cli {
    /// Snapshot directory (overrides AYCF_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Document archive directory (overrides AYCF_PDF_DIR)
    #[arg(long, global = true)]
    pdf_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the availability document, extract it and store the snapshot
    Fetch {
        /// Document URL (overrides AYCF_PDF_URL)
        #[arg(long)]
        url: Option<String>,
    },
    /// Extract a local availability document into the snapshot store
    Extract {
        #[arg(value_name = "PDF")]
        pdf: PathBuf,

        /// Print the extracted snapshot instead of storing it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Daily, monthly, weekday and airport statistics for one selection
    Stats {
        #[arg(long)]
        hub: Option<String>,

        #[arg(long)]
        destination: Option<String>,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Write the zero-filled daily series for one selection as CSV
    DailyCsv {
        #[arg(long)]
        hub: Option<String>,

        #[arg(long)]
        destination: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Build the dashboard summary over every stored snapshot
    Report {
        #[arg(short, long, default_value = "dashboard_data.json")]
        output: PathBuf,

        /// Only include the N most frequent routes
        #[arg(long)]
        top: Option<usize>,
    },
    /// List known departure and destination airports
    Locations,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let mut settings = Settings::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = settings
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = settings
        .log_file
        .file_name()
        .unwrap_or(OsStr::new("aycf_tracker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    if let Some(dir) = cli.pdf_dir {
        settings.pdf_dir = dir;
    }
    let store = SnapshotStore::new(&settings.data_dir);

    match cli.command {
        Commands::Fetch { url } => {
            let url = url.unwrap_or_else(|| settings.pdf_url.clone());
            fetch(&settings, &store, &url).await?;
        }
        Commands::Extract { pdf, dry_run } => {
            let bytes = std::fs::read(&pdf).with_context(|| format!("reading {}", pdf.display()))?;
            let snapshot = Extractor::pdf().extract_bytes(&bytes)?;
            if dry_run {
                print_json(&snapshot)?;
            } else {
                store.write(&snapshot)?;
            }
        }
        Commands::Stats {
            hub,
            destination,
            format,
        } => {
            let dataset = load(&store)?;
            let selection = Selection::new(hub.as_deref(), destination.as_deref());
            let report = SelectionReport::build(&dataset, &selection)?;
            match format {
                Format::Json => print_json(&report)?,
                Format::Pretty => print_pretty(&report),
            }

            if let Some(path) = &settings.coordinates {
                let lookup = StaticCoordinates::load(path)?;
                let points = map_points(&report.airports, &lookup);
                match format {
                    Format::Json => print_json(&points)?,
                    Format::Pretty => print_pretty(&points),
                }
            }
        }
        Commands::DailyCsv {
            hub,
            destination,
            output,
        } => {
            let dataset = load(&store)?;
            let selection = Selection::new(hub.as_deref(), destination.as_deref());
            let view = filter(&dataset, &selection)?;
            let series = daily_counts(&view);
            if series.is_empty() {
                warn!(selection = %selection.describe(), "No flights match the selection");
            }
            write_csv(&output, &series)?;
        }
        Commands::Report { output, top } => {
            let dataset = load(&store)?;
            if dataset.snapshots().is_empty() {
                warn!(dir = %store.dir().display(), "No valid snapshots found to report on");
            }
            let report = DashboardReport::build(&dataset, Utc::now(), top);
            write_json(&output, &report)?;
            info!(
                files = report.metadata.total_files,
                days = report.summary.total_days,
                avg_daily_flights = report.summary.avg_daily_flights,
                routes = report.metadata.top_routes_shown,
                "Dashboard data generated"
            );
        }
        Commands::Locations => {
            let dataset = load(&store)?;
            print_json(&dataset.locations())?;
        }
    }

    Ok(())
}

fn load(store: &SnapshotStore) -> Result<UnifiedDataset> {
    let dataset = store.load()?;
    if !dataset.warnings().is_empty() {
        warn!(
            warnings = dataset.warnings().len(),
            "Some snapshots had problems, see log for details"
        );
    }
    Ok(dataset)
}

/// Downloads, extracts and stores one snapshot. A document that fails to
/// extract is kept under its `_unparsed` name and nothing is stored.
#[tracing::instrument(skip(settings, store))]
async fn fetch(settings: &Settings, store: &SnapshotStore, url: &str) -> Result<()> {
    let client = BasicClient::new(settings.fetch_timeout)?;
    let fetched_at = Local::now().naive_local();
    let document = download_document(&client, url, &settings.pdf_dir, fetched_at).await?;

    let bytes = std::fs::read(&document)?;
    let snapshot = match Extractor::pdf().extract_bytes(&bytes) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(error = %e, path = %document.display(), "Extraction failed, document kept");
            return Err(e.into());
        }
    };

    let csv = store.write(&snapshot)?;
    let archived = archive_document(&document, &snapshot)?;
    info!(
        csv = %csv.display(),
        pdf = %archived.display(),
        routes = snapshot.routes.len(),
        "Snapshot collected"
    );
    Ok(())
}
