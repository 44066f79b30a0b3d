use clap::Parser;

use cabin_mark_lib::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cabin_mark_lib::run(Cli::parse()).await
}
