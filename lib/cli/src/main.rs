mod commands;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use fscall::{CallRegistry, FsCallConfig};

use crate::commands::{Batch, Call, List};

/// Run filesystem calls by name.
#[derive(Parser, Debug)]
#[clap(name = "fscall", version, about)]
struct FsCallCmd {
    /// TOML file with buffer sizes, defaults apply when omitted
    #[clap(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(clap::Subcommand, Debug)]
enum Cmd {
    /// Print the name of every registered call
    List(List),
    /// Run a single call
    Call(Call),
    /// Run a sequence of calls, one per line
    Batch(Batch),
}

impl FsCallCmd {
    fn execute(self) -> anyhow::Result<ExitCode> {
        let registry = self.registry()?;
        match self.cmd {
            Cmd::List(list) => list.execute(&registry),
            Cmd::Call(call) => call.execute(&registry),
            Cmd::Batch(batch) => batch.execute(&registry),
        }
    }

    fn registry(&self) -> anyhow::Result<CallRegistry> {
        let config = match &self.config {
            Some(path) => FsCallConfig::from_path(path)
                .with_context(|| format!("failed to load `{}`", path.display()))?,
            None => FsCallConfig::default(),
        };
        Ok(fscall::default_registry(config)?)
    }
}

fn main() -> ExitCode {
    logging::set_up_logging();

    match FsCallCmd::parse().execute() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
