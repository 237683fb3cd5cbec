//! CLI tool for managing trendstore datasets.
//!
//! Every command prints a single JSON response envelope on stdout and exits
//! nonzero when the operation did not succeed, so the binary scripts cleanly.
//! The schema registry lives only as long as one invocation, so commands
//! that validate against a schema (`save`) take `--schema` and hydrate the
//! registry with a non-destructive provision before doing their work.

mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use snafu::ResultExt;
use trendstore_core::{
    DocStore, EngineConfig,
    api::{ApiResponse, ErrorKind},
    record::Record,
    schema::load_workbook,
    store::{ProvisionMode, TimeWindow},
};

use crate::error::{CliResult, EngineSnafu, LoadWorkbookSnafu, RenderSnafu};

#[derive(Debug, Subcommand)]
enum Command {
    /// Provision the dataset's collections from a schema workbook
    Init {
        /// Directory of CSV schema sheets (one per collection)
        #[arg(long)]
        schema: PathBuf,

        /// Drop every existing collection in the dataset first
        #[arg(long, default_value_t = false)]
        reset: bool,
    },

    /// Append one raw reading to a collection
    Save {
        /// Schema workbook directory (hydrates validation for this run)
        #[arg(long)]
        schema: PathBuf,

        /// Target collection
        #[arg(long)]
        collection: String,

        /// Sensor identifier
        #[arg(long)]
        sid: i64,

        /// Raw reading as a hex string
        #[arg(long)]
        hex: String,
    },

    /// List the dataset's collections and their observed columns
    Tables,

    /// Read records inside a time window, projected to selected columns
    Values {
        /// Collection to read
        #[arg(long)]
        collection: String,

        /// Columns to project (repeatable)
        #[arg(long = "column")]
        columns: Vec<String>,

        /// Inclusive window start (RFC 3339, naive date-time, or date)
        #[arg(long)]
        start: String,

        /// Inclusive window end; omit for an open-ended window
        #[arg(long)]
        end: Option<String>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "trendstore")]
struct Cli {
    /// Store root directory
    #[arg(long, default_value = "./data")]
    root: PathBuf,

    /// Dataset namespace
    #[arg(long, default_value = "ProGraphing")]
    dataset: String,

    /// Hours added to UTC when stamping InsertedDateTime
    #[arg(long = "offset-hours", default_value_t = 5)]
    offset_hours: i64,

    #[command(subcommand)]
    cmd: Command,
}

/// Load a workbook and run a non-destructive provision over it.
async fn provision(
    store: &DocStore,
    dataset: &str,
    schema_dir: &Path,
    mode: ProvisionMode,
) -> CliResult<ApiResponse> {
    let workbook = load_workbook(schema_dir).context(LoadWorkbookSnafu {
        dir: schema_dir.display().to_string(),
    })?;

    let report = store
        .provision(dataset, &workbook, mode)
        .await
        .context(EngineSnafu)?;

    let data = serde_json::to_value(&report).context(RenderSnafu)?;
    let response = if report.success() {
        ApiResponse::ok_with(
            format!(
                "Provisioned dataset '{dataset}': {} collection(s) created",
                report.created()
            ),
            data,
        )
    } else {
        let mut failed = ApiResponse::failed(
            format!("Provisioning dataset '{dataset}' finished with failures"),
            ErrorKind::Store,
        );
        failed.data = Some(data);
        failed
    };
    Ok(response)
}

async fn cmd_init(
    store: &DocStore,
    dataset: &str,
    schema_dir: &Path,
    reset: bool,
) -> CliResult<ApiResponse> {
    let mode = if reset {
        ProvisionMode::ResetAll
    } else {
        ProvisionMode::CreateOrReuse
    };
    provision(store, dataset, schema_dir, mode).await
}

async fn cmd_save(
    store: &DocStore,
    dataset: &str,
    schema_dir: &Path,
    collection: &str,
    sid: i64,
    hex: &str,
) -> CliResult<ApiResponse> {
    // One-shot process: hydrate the schema registry before validating.
    let hydrated = provision(store, dataset, schema_dir, ProvisionMode::CreateOrReuse).await?;
    if !hydrated.success {
        return Ok(hydrated);
    }

    let mut fields = Record::new();
    fields.insert("SID".to_string(), serde_json::json!(sid));
    fields.insert("hexString".to_string(), serde_json::json!(hex));

    match store.append(dataset, collection, fields).await {
        Ok(stored) => Ok(ApiResponse::ok_with(
            format!("Saved reading to '{collection}'"),
            serde_json::to_value(&stored).context(RenderSnafu)?,
        )),
        Err(e) if e.is_validation() => Ok(ApiResponse::from(&e)),
        Err(e) => Err(e).context(EngineSnafu),
    }
}

async fn cmd_tables(store: &DocStore, dataset: &str) -> CliResult<ApiResponse> {
    let infos = store.list_collections(dataset).await.context(EngineSnafu)?;
    Ok(ApiResponse::ok_with(
        format!("{} collection(s) in dataset '{dataset}'", infos.len()),
        serde_json::to_value(&infos).context(RenderSnafu)?,
    ))
}

async fn cmd_values(
    store: &DocStore,
    dataset: &str,
    collection: &str,
    columns: &[String],
    start: &str,
    end: Option<&str>,
) -> CliResult<ApiResponse> {
    let window = match TimeWindow::parse(start, end) {
        Ok(window) => window,
        Err(e) => return Ok(ApiResponse::from(&e)),
    };

    match store.query(dataset, collection, columns, window).await {
        Ok(rows) => Ok(ApiResponse::ok_with(
            format!("{} record(s) from '{collection}'", rows.len()),
            serde_json::to_value(&rows).context(RenderSnafu)?,
        )),
        Err(e) if e.is_validation() => Ok(ApiResponse::from(&e)),
        Err(e) => Err(e).context(EngineSnafu),
    }
}

async fn run() -> CliResult<ApiResponse> {
    let cli = Cli::parse();
    let store = DocStore::open(&cli.root, EngineConfig::with_offset_hours(cli.offset_hours));
    let dataset = cli.dataset.as_str();

    match cli.cmd {
        Command::Init { schema, reset } => cmd_init(&store, dataset, &schema, reset).await,

        Command::Save {
            schema,
            collection,
            sid,
            hex,
        } => cmd_save(&store, dataset, &schema, &collection, sid, &hex).await,

        Command::Tables => cmd_tables(&store, dataset).await,

        Command::Values {
            collection,
            columns,
            start,
            end,
        } => cmd_values(&store, dataset, &collection, &columns, &start, end.as_deref()).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(response) => {
            match serde_json::to_string_pretty(&response) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
            if !response.success {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
