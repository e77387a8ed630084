use std::io::Write;
use std::process::ExitCode;

use fscall::CallRegistry;

#[derive(clap::Parser, Debug)]
pub struct List {}

impl List {
    pub fn execute(&self, registry: &CallRegistry) -> anyhow::Result<ExitCode> {
        let mut stdout = std::io::stdout().lock();
        for name in registry.names() {
            writeln!(stdout, "{name}")?;
        }
        Ok(ExitCode::SUCCESS)
    }
}
