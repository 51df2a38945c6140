use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use lambda_layer_releases::cache::{CacheStore, MemoryCacheStore, SqliteCacheStore};
use lambda_layer_releases::config::{Config, data_dir, db_path, log_dir};
use lambda_layer_releases::datasource::{AwsLambdaLayerDatasource, Datasource};
use lambda_layer_releases::logging::{self, LogOptions};

#[derive(Parser)]
#[command(name = "lambda-layer-releases")]
#[command(version, about = "Resolve AWS Lambda layer versions into releases")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    log_stderr: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the releases of a layer as JSON
    Releases {
        /// Layer filter, e.g. '{"arn": "arn:aws:lambda:...:layer:my-layer", "runtime": "python3.9"}'
        package: String,

        /// Skip the persistent cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Manage the persistent cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove expired entries
    Purge,
    /// Remove all entries
    Clear,
}

fn open_sqlite_store() -> anyhow::Result<Arc<SqliteCacheStore>> {
    std::fs::create_dir_all(data_dir())?;
    Ok(Arc::new(SqliteCacheStore::new(&db_path())?))
}

async fn print_releases<S: CacheStore>(
    datasource: AwsLambdaLayerDatasource<S>,
    package: &str,
) -> anyhow::Result<()> {
    let result = datasource.get_releases(package).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Releases { package, no_cache } => {
            if no_cache || !config.cache.enabled {
                let store = Arc::new(MemoryCacheStore::new());
                print_releases(AwsLambdaLayerDatasource::from_config(store, &config), &package)
                    .await
            } else {
                let store = open_sqlite_store()?;
                print_releases(AwsLambdaLayerDatasource::from_config(store, &config), &package)
                    .await
            }
        }
        Command::Cache { action } => {
            let store = open_sqlite_store()?;
            match action {
                CacheAction::Purge => {
                    let purged = store.purge_expired()?;
                    println!("Purged {} expired entries", purged);
                }
                CacheAction::Clear => {
                    store.clear()?;
                    info!("Cache cleared");
                    println!("Cache cleared");
                }
            }
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(
        &log_dir(),
        LogOptions {
            stderr: cli.log_stderr,
            json: cli.log_json,
        },
    )?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
