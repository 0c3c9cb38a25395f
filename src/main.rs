use anyhow::Result;
use clap::Parser;
use restack::cli::Cli;

fn main() -> Result<()> {
    Cli::parse().run()
}
