#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod error;
mod prelude;
mod se;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Query StackExchange sites for users matching location and tag criteria"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "SXTOOLS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// StackExchange (api.stackexchange.com) operations
    SE(crate::se::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::SE(sub_app) => crate::se::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
