use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use fscall::CallRegistry;

#[derive(clap::Parser, Debug)]
pub struct Call {
    /// Name of the call, e.g. `fs_stat`
    #[clap(value_name = "NAME")]
    name: String,
    /// Payload handed to the call, read from stdin when omitted or `-`
    #[clap(value_name = "PAYLOAD")]
    payload: Option<String>,
}

impl Call {
    pub fn execute(&self, registry: &CallRegistry) -> anyhow::Result<ExitCode> {
        let payload = match self.payload.as_deref() {
            Some("-") | None => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buf)
                    .context("failed to read the payload from stdin")?;
                buf
            }
            Some(payload) => payload.as_bytes().to_vec(),
        };

        let ok = super::run_call(
            registry,
            &self.name,
            &payload,
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
