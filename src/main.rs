//! redis-export
//!
//! Dumps every key of one Redis database into a single JSON file.
//!
//! # Usage
//!
//! ```bash
//! redis-export --host localhost:6379 --db 0 -o dump.json
//! redis-export --host sentinel-1,sentinel-2 --service-name mymaster -o dump.json
//! ```

use redis_export::cli::CliInterface;
use redis_export::connection::ConnectionManager;
use redis_export::error::Result;
use redis_export::export::{ExportCoordinator, JsonFileWriter, ProgressTracker};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Validate inputs, then connect
/// 4. Run the export and print the summary
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    // Nothing below runs unless every required input is present
    cli.validate()?;
    let output = cli.output_path()?.to_path_buf();

    let manager = ConnectionManager::new(cli.connection_settings()?);
    let store = manager.connect().await?;

    let writer = JsonFileWriter::new(output, cli.config().export.indent);
    let tracker = ProgressTracker::new(cli.show_progress());
    let mut coordinator =
        ExportCoordinator::new(Box::new(store), cli.export_options(), Box::new(writer), tracker);

    let result = coordinator.execute().await?;
    if result.keys_skipped > 0 {
        tracing::warn!("{} keys of unsupported types were skipped", result.keys_skipped);
    }

    cli.print_summary(result.keys_exported, &result.path);
    Ok(())
}

/// Initialize logging system based on verbosity level
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
