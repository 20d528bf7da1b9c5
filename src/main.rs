use anyhow::Result;
use clap::Parser;
use rupee_ledger::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}
