/// CLI subcommand implementations
///
/// Each command takes the already loaded `Config`; `main` only parses
/// arguments, loads config, initializes logging and dispatches here.
pub mod genenv;
pub mod list;
pub mod serve;

use crate::arguments::{Cli, Commands};
use crate::config::Config;
use crate::errors::CoinOpsResult;

pub async fn dispatch(cli: Cli, config: Config) -> CoinOpsResult<()> {
    match cli.command {
        Commands::Serve { host, port } => serve::run(config, host, port).await,
        Commands::List { username, password } => list::run(config, &username, &password).await,
        Commands::Genenv { output, force } => genenv::run(&output, force),
    }
}
