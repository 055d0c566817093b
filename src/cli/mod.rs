//! Command-line interface for redis-export
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging with arguments
//! - Validation of required inputs before any network activity
//! - Building connection settings for the export run

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{Config, LogLevel, UnsupportedTypePolicy};
use crate::connection::ConnectionSettings;
use crate::error::{ConfigError, Result};
use crate::export::ExportOptions;

/// Export a Redis database to a JSON file
#[derive(Parser, Debug)]
#[command(
    name = "redis-export",
    version,
    about = "Export every key of a Redis database to a JSON file",
    long_about = "Scans one logical database of a Redis-compatible store and writes every
string, list, set, sorted set and hash to a single indented JSON document."
)]
pub struct CliArgs {
    /// Redis host, `host[:port]`; sentinel hosts when --service-name is set
    ///
    /// Several endpoints may be given comma-separated.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Sentinel service name for high-availability deployments
    #[arg(long, value_name = "NAME")]
    pub service_name: Option<String>,

    /// Logical database index
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    pub db: i64,

    /// Password for authentication
    #[arg(
        short = 'p',
        long,
        value_name = "PASSWORD",
        env = "REDIS_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Output file path
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only export keys matching this pattern
    #[arg(long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// COUNT hint for each SCAN call
    #[arg(long, value_name = "N")]
    pub scan_count: Option<usize>,

    /// Timeout for any single store call, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Indentation width of the output document
    #[arg(long, value_name = "N")]
    pub indent: Option<usize>,

    /// Skip keys of unsupported types instead of aborting
    #[arg(long)]
    pub skip_unsupported: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Quiet mode (no progress, no summary)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for redis-export
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Parse the process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Destination path; required
    pub fn output_path(&self) -> Result<&Path> {
        self.args
            .output
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField("output".to_string()).into())
    }

    /// Connection settings from arguments and configuration
    ///
    /// Fails with a configuration error when no host is known.
    pub fn connection_settings(&self) -> Result<ConnectionSettings> {
        let host = self
            .config
            .connection
            .host
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField("host".to_string()))?;

        let settings = ConnectionSettings::new(
            host,
            self.config.connection.service_name.clone(),
            self.args.db,
            self.args.password.clone(),
        )?;

        Ok(settings.with_timeouts(self.config.response_timeout(), self.config.connect_timeout()))
    }

    /// Options for the export coordinator
    pub fn export_options(&self) -> ExportOptions {
        self.config.export.clone().into()
    }

    /// Whether to draw a progress bar
    ///
    /// Verbose logging would interleave with the bar, so it is off then too.
    pub fn show_progress(&self) -> bool {
        !(self.args.quiet || self.args.no_progress || self.args.verbose || self.args.very_verbose)
    }

    /// Validate every required input before touching the network
    pub fn validate(&self) -> Result<()> {
        if self.args.db < 0 {
            return Err(ConfigError::InvalidValue {
                field: "db".to_string(),
                value: self.args.db.to_string(),
            }
            .into());
        }
        self.output_path()?;
        self.connection_settings()?;
        Ok(())
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_connection_args(config, args);
        Self::apply_export_args(config, args);
        Self::apply_logging_args(config, args);
    }

    fn apply_connection_args(config: &mut Config, args: &CliArgs) {
        if let Some(host) = &args.host {
            config.connection.host = Some(host.clone());
        }
        if let Some(name) = &args.service_name {
            config.connection.service_name = Some(name.clone());
        }
        if let Some(timeout) = args.timeout {
            config.connection.timeout = timeout;
        }
    }

    fn apply_export_args(config: &mut Config, args: &CliArgs) {
        if let Some(pattern) = &args.pattern {
            config.export.pattern = pattern.clone();
        }
        if let Some(count) = args.scan_count {
            config.export.scan_count = count;
        }
        if let Some(indent) = args.indent {
            config.export.indent = indent;
        }
        if args.skip_unsupported {
            config.export.on_unsupported = UnsupportedTypePolicy::Skip;
        }
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        if args.very_verbose {
            config.logging.level = LogLevel::Trace;
        } else if args.verbose {
            config.logging.level = LogLevel::Debug;
        }
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled and the run is over
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Config { show }) => {
                if *show {
                    self.show_config()?;
                } else {
                    println!("Config file: {}", self.get_config_path().display());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn show_version(&self) {
        println!("redis-export {}", env!("CARGO_PKG_VERSION"));
    }

    fn show_config(&self) -> Result<()> {
        println!("# {}", self.get_config_path().display());
        println!("{}", self.config.to_toml()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// Print the summary line of a successful run
    pub fn print_summary(&self, count: u64, path: &Path) {
        if !self.args.quiet {
            println!("Exported {} keys to {}", count, path.display());
        }
    }
}
