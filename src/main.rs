use std::path::PathBuf;

use asset_content_sync::config::Config;
use asset_content_sync::io::excel_read::WorkbookSheet;
use asset_content_sync::io::excel_write;
use asset_content_sync::io::smartsheet::SmartsheetClient;
use asset_content_sync::io::{HttpContentService, SheetSource};
use asset_content_sync::manager::Manager;
use asset_content_sync::{Result, SyncError};
use clap::{Parser, Subcommand};
use futures::executor::block_on;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&cli.log_level).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|err| SyncError::Logging(err.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| SyncError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    let service = HttpContentService::new(&config.content)?;
    let mut manager = Manager::new(config, Box::new(service))?;

    match &cli.command {
        Command::Libraries => print_json(&manager.load_libraries()?),
        Command::Assets => {
            let source = cli.sheet_source(manager.config())?;
            manager.load_assets(source.as_ref())?;
            print_json(&json!({
                "assets": manager.assets(),
                "warnings": manager.warnings(),
            }))
        }
        Command::Content { library } => {
            manager.select_library(*library)?;
            print_json(&json!({
                "content": manager.content(),
                "warnings": manager.warnings(),
            }))
        }
        Command::Reconcile(args) => {
            let source = cli.sheet_source(manager.config())?;
            manager.load_assets(source.as_ref())?;
            manager.select_library(args.library)?;
            let warnings = manager.warnings();
            let reconciliation = manager.reconciliation();

            if let Some(path) = &args.report {
                excel_write::write_report(path, reconciliation)?;
                info!(path = %path.display(), "report written");
            }
            let output = json!({
                "reconciliation": reconciliation,
                "warnings": warnings,
            });
            if let Some(path) = &args.json {
                std::fs::write(path, serde_json::to_string_pretty(&output)?)?;
                info!(path = %path.display(), "JSON written");
            }
            print_json(&output)
        }
        Command::SetTypeValue(args) => {
            let content = manager
                .fetcher()
                .fetch_by_revision(args.target.revision, args.target.library)?
                .value;
            let batch =
                manager.set_type_value(&content, &args.type_name, &args.parameter, &args.value)?;
            print_json(&batch)
        }
        Command::Correct(args) => {
            let content = manager
                .fetcher()
                .fetch_by_revision(args.target.revision, args.target.library)?
                .value;
            let batches =
                manager.apply_correction(&content, &args.type_name, &args.manufacturer, &args.model)?;
            print_json(&batches)
        }
        Command::BatchStatus { batch_id } => {
            let status = block_on(manager.refresh_batch(batch_id))?;
            print_json(&json!({
                "batch_id": batch_id,
                "status": status,
                "complete": status.is_complete(),
                "summary": status.summary(),
            }))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile asset-sheet records with content-management metadata."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file.
    #[arg(long, global = true, env = "ASSET_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Read assets from a local workbook instead of the remote sheet.
    #[arg(long, global = true)]
    sheet_file: Option<PathBuf>,

    /// Remote sheet identifier.
    #[arg(long, global = true, env = "ASSET_SYNC_SHEET_ID")]
    sheet_id: Option<String>,

    /// Access token for the sheet service.
    #[arg(long, global = true, env = "ASSET_SYNC_SHEET_TOKEN", hide_env_values = true)]
    sheet_token: Option<String>,

    /// API key for the content service.
    #[arg(long, global = true, env = "ASSET_SYNC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Records requested per content search page.
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(sheet_id) = &self.sheet_id {
            config.sheet.sheet_id = sheet_id.clone();
        }
        if let Some(token) = &self.sheet_token {
            config.sheet.access_token = token.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.content.api_key = api_key.clone();
        }
        if let Some(page_size) = self.page_size {
            config.content.page_size = page_size;
        }
        if let Command::SetTypeValue(args) = &self.command {
            if let Some(data_type) = &args.data_type {
                config.batch.data_type = data_type.clone();
            }
            if let Some(target_version) = args.target_version {
                config.batch.target_version = target_version;
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn sheet_source(&self, config: &Config) -> Result<Box<dyn SheetSource>> {
        match &self.sheet_file {
            Some(path) if !path.exists() => Err(SyncError::MissingInput(path.clone())),
            Some(path) => Ok(Box::new(WorkbookSheet::new(path.clone()))),
            None => Ok(Box::new(SmartsheetClient::new(&config.sheet)?)),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List the content libraries.
    Libraries,
    /// Load and print the asset records.
    Assets,
    /// Fetch every family of a library.
    Content {
        #[arg(long)]
        library: Uuid,
    },
    /// Compare the assets with the families of a library.
    Reconcile(ReconcileArgs),
    /// Set one type parameter on a family.
    SetTypeValue(SetTypeValueArgs),
    /// Write corrected manufacturer and model values to a family type.
    Correct(CorrectArgs),
    /// Read the progress of a submitted batch.
    BatchStatus { batch_id: String },
}

#[derive(clap::Args)]
struct ReconcileArgs {
    #[arg(long)]
    library: Uuid,

    /// Write the report as an Excel workbook.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Also write the JSON output to a file.
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ContentTarget {
    /// Library holding the family.
    #[arg(long)]
    library: Uuid,

    /// Active revision of the family.
    #[arg(long)]
    revision: Uuid,
}

#[derive(clap::Args)]
struct SetTypeValueArgs {
    #[command(flatten)]
    target: ContentTarget,

    #[arg(long)]
    type_name: String,

    #[arg(long)]
    parameter: String,

    #[arg(long)]
    value: String,

    #[arg(long)]
    data_type: Option<String>,

    #[arg(long)]
    target_version: Option<i32>,
}

#[derive(clap::Args)]
struct CorrectArgs {
    #[command(flatten)]
    target: ContentTarget,

    #[arg(long)]
    type_name: String,

    #[arg(long)]
    manufacturer: String,

    #[arg(long)]
    model: String,
}
