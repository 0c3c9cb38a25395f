//! The CLI for `restack`.

use crate::{
    config::{Config, FileConfig},
    ctx::RestackContext,
    errors::{RestackError, RestackResult},
    git::GitCli,
    plan::RestackPlan,
    store::BranchTreeStore,
};
use anyhow::{anyhow, Result};
use clap::{
    builder::styling::{AnsiColor, Color, Style},
    ArgAction, Parser,
};
use inquire::InquireError;
use std::{env, path::PathBuf};
use tracing::{debug, Level};

const ABOUT: &str = "restack re-synchronizes every branch in the current stack onto its recorded parent.";

/// The CLI application for `restack`.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(about = ABOUT, version, styles = cli_styles())]
pub struct Cli {
    /// Verbosity level (0-4)
    #[arg(short, action = ArgAction::Count)]
    pub v: u8,
    /// Rebase each branch onto its parent instead of merging the parent in.
    #[arg(long)]
    pub rebase: bool,
    /// Path of the JSON file holding the branch -> parent map. Defaults to `.stack`.
    #[arg(long, env = "RESTACK_STACK_PATH")]
    pub stack_path: Option<PathBuf>,
}

impl Cli {
    /// Run the CLI application with the given arguments.
    pub fn run(self) -> Result<()> {
        let cli = self.init_tracing_subscriber()?;

        let config = Config::resolve(FileConfig::load_default()?, cli.rebase, cli.stack_path);
        debug!(?config, "Resolved configuration");

        let git = GitCli::discover(env::current_dir()?, config.remote.as_str())
            .map_err(|e| anyhow!("Not in a git repository: {e}"))?;
        let store = BranchTreeStore::new(config.stack_path);
        let mut ctx = RestackContext::load(&git, store)?;

        ctx.restack_current(config.mode, confirm_plan)?;
        Ok(())
    }

    /// Initializes the tracing subscriber
    ///
    /// # Returns
    /// - `Result<()>` - Ok if successful, Err otherwise.
    pub(crate) fn init_tracing_subscriber(self) -> Result<Self> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(match self.v {
                0 => Level::ERROR,
                1 => Level::WARN,
                2 => Level::INFO,
                3 => Level::DEBUG,
                _ => Level::TRACE,
            })
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow!(e))?;

        Ok(self)
    }
}

/// Asks the operator to confirm the previewed plan. A cancelled prompt counts as "no".
fn confirm_plan(_: &RestackPlan) -> RestackResult<bool> {
    match inquire::Confirm::new("Continue?")
        .with_default(false)
        .prompt()
    {
        Ok(answer) => Ok(answer),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
        Err(e) => Err(RestackError::from(e)),
    }
}

/// Styles for the CLI application.
const fn cli_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}
