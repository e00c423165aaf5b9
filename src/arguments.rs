/// Command-line arguments for CoinOps
///
/// Global flags apply to every subcommand: `--config` selects the TOML
/// file, `--debug` / `--verbose` lower the log level after config loading.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "coinops")]
#[command(about = "Live crypto price dashboard", long_about = None)]
#[command(version = crate::version::VERSION)]
pub struct Cli {
    /// Path to config.toml (default: ./config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Enable verbose logging (implies --debug)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the dashboard webserver
    Serve {
        /// Bind host, overrides server.host
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Bind port, overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Fetch current prices once and print them as a table
    List {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Generate dashboard credentials and write them to an env file
    Genenv {
        #[arg(short, long, default_value = ".env")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
