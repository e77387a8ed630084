use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use fscall::CallRegistry;
use tracing::debug;

/// Every line is `NAME PAYLOAD`, the payload being the rest of the line after
/// the first space. Blank lines and lines starting with `#` are skipped.
///
/// All calls run on one thread, so a streaming writer opened on one line is
/// visible to the lines after it.
#[derive(clap::Parser, Debug)]
pub struct Batch {
    /// File holding the calls, stdin when omitted or `-`
    #[clap(value_name = "FILE")]
    file: Option<PathBuf>,
    /// Carry on after a failed call, the exit status still reports the failure
    #[clap(long)]
    keep_going: bool,
}

impl Batch {
    pub fn execute(&self, registry: &CallRegistry) -> anyhow::Result<ExitCode> {
        let input: Box<dyn BufRead> = match &self.file {
            Some(path) if path.as_os_str() != "-" => Box::new(BufReader::new(
                File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?,
            )),
            _ => Box::new(std::io::stdin().lock()),
        };

        let ok = run_batch(
            registry,
            input,
            self.keep_going,
            &mut std::io::stdout().lock(),
            &mut std::io::stderr().lock(),
        )?;
        Ok(if ok {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

/// Returns whether every call succeeded.
fn run_batch(
    registry: &CallRegistry,
    input: impl BufRead,
    keep_going: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<bool> {
    let mut all_ok = true;
    for (index, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, payload) = line.split_once(' ').unwrap_or((line, ""));
        debug!(line = index + 1, call = name, "running batch line");
        let ok = super::run_call(registry, name, payload.as_bytes(), &mut *out, &mut *err)?;
        if ok {
            out.write_all(b"\n")?;
        } else {
            all_ok = false;
            if !keep_going {
                break;
            }
        }
    }
    out.flush()?;
    Ok(all_ok)
}
