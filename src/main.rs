// ABOUTME: CLI entry point for problem-sync
// ABOUTME: Parses commands and routes to the sync job, the API server, schema setup or the scraper

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use problem_sync::config::{DatabaseConfig, SyncSettings};
use problem_sync::postgres::PgProblemStore;
use problem_sync::sheets::SheetsClient;
use problem_sync::{scrape, server, SyncError, SyncPipeline, SyncStatus};

#[derive(Parser)]
#[command(name = "problem-sync")]
#[command(about = "Sync edited spreadsheet rows into PostgreSQL and serve them over HTTP", long_about = None)]
#[command(version)]
struct Cli {
    /// Set the log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct DatabaseArgs {
    /// Full PostgreSQL connection URL (overrides the individual --db-* settings)
    #[arg(long = "database-url", env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
    #[arg(long = "db-host", env = "DB_HOST", default_value = "localhost")]
    host: String,
    #[arg(long = "db-port", env = "DB_PORT", default_value_t = 5432)]
    port: u16,
    #[arg(long = "db-name", env = "DB_NAME", default_value = "problem_tracker")]
    dbname: String,
    #[arg(long = "db-user", env = "DB_USER")]
    user: Option<String>,
    #[arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Maximum number of pooled database connections
    #[arg(long = "pool-size", default_value_t = 10)]
    pool_size: usize,
    /// Allow self-signed TLS certificates (insecure - use only for testing)
    #[arg(long = "allow-self-signed-certs", default_value_t = false)]
    allow_self_signed_certs: bool,
}

impl From<DatabaseArgs> for DatabaseConfig {
    fn from(args: DatabaseArgs) -> Self {
        DatabaseConfig {
            url: args.database_url,
            host: args.host,
            port: args.port,
            dbname: args.dbname,
            user: args.user,
            password: args.password,
            pool_size: args.pool_size,
            allow_self_signed_certs: args.allow_self_signed_certs,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the rows listed in the change tracker to the problems table, then clear the tracker
    Sync {
        #[command(flatten)]
        db: DatabaseArgs,
        /// Path to a TOML file describing the spreadsheet layout
        #[arg(long)]
        config: Option<PathBuf>,
        /// Google spreadsheet id (overrides the config file)
        #[arg(long = "spreadsheet-id", env = "SPREADSHEET_ID")]
        spreadsheet_id: Option<String>,
        /// Service account key file
        #[arg(
            long,
            env = "GOOGLE_APPLICATION_CREDENTIALS",
            default_value = "credentials.json"
        )]
        credentials: PathBuf,
        /// Create the problems table first if it does not exist
        #[arg(long)]
        init_schema: bool,
    },
    /// Serve the problems HTTP API
    Serve {
        #[command(flatten)]
        db: DatabaseArgs,
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000")]
        listen: SocketAddr,
    },
    /// Create the problems table and its indexes if they do not exist
    InitSchema {
        #[command(flatten)]
        db: DatabaseArgs,
    },
    /// Print the description and constraints scraped from a problem page
    Scrape {
        #[arg(long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap resolves env-backed arguments
    let dotenv_result = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides --log
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log.clone()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(e) = dotenv_result {
        if !e.not_found() {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    match cli.command {
        Commands::Sync {
            db,
            config,
            spreadsheet_id,
            credentials,
            init_schema,
        } => {
            let mut settings = match &config {
                Some(path) => SyncSettings::load(path)?,
                None => SyncSettings::default(),
            };
            if let Some(id) = spreadsheet_id {
                settings.spreadsheet_id = id;
            }
            settings.validate()?;

            let sheets = SheetsClient::connect(&credentials, settings.spreadsheet_id.clone())
                .await
                .map_err(|e| SyncError::connection("connecting to Google Sheets", e))?;
            tracing::info!(
                "Starting the Google Sheets to PostgreSQL sync for spreadsheet {}",
                sheets.spreadsheet_id()
            );

            // No connection is opened until there are rows to upsert
            let store = PgProblemStore::lazy(&db.into())?;

            if init_schema {
                store.ensure_schema().await?;
            }

            let report = match SyncPipeline::new(&sheets, &store, &settings).run().await {
                Ok(report) => report,
                Err(e) => {
                    let e = anyhow::Error::from(e);
                    // Log with :# to show the full error chain including root cause
                    tracing::error!("Sync failed, change tracker left intact: {:#}", e);
                    return Err(e);
                }
            };

            match report.status {
                SyncStatus::NoChanges => tracing::info!("Nothing to sync"),
                SyncStatus::Applied => {
                    tracing::info!("Sync complete:");
                    tracing::info!("  Tracker entries: {}", report.markers_read);
                    tracing::info!("  Distinct rows: {}", report.distinct_rows);
                    tracing::info!("  Ranges fetched: {}", report.ranges.len());
                    tracing::info!("  Rows fetched: {}", report.rows_fetched);
                    tracing::info!("  Rows skipped: {}", report.rows_skipped);
                    tracing::info!("  Rows upserted: {}", report.records_upserted);
                    tracing::info!("  Duration: {}ms", report.duration_ms);
                }
            }
            Ok(())
        }
        Commands::Serve { db, listen } => {
            let store = PgProblemStore::connect(&db.into())
                .await
                .context("Database connection pool creation failed")?;
            server::serve(listen, Arc::new(store)).await
        }
        Commands::InitSchema { db } => {
            let store = PgProblemStore::connect(&db.into()).await?;
            store.ensure_schema().await?;
            tracing::info!("'problems' table is ready");
            Ok(())
        }
        Commands::Scrape { url } => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .context("Failed to create HTTP client")?;
            let description = scrape::scrape_problem_html(&client, &url).await?;
            println!("{}", description);
            Ok(())
        }
    }
}
