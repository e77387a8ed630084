//! The commands available in the `fscall` binary.

mod batch;
mod call;
mod list;

use std::io::Write;

use fscall::CallRegistry;

pub use self::{batch::Batch, call::Call, list::List};

/// Runs `name` on the current thread's session, writing the result to `out`
/// or the error payload to `err`. Returns whether the call succeeded.
fn run_call(
    registry: &CallRegistry,
    name: &str,
    payload: &[u8],
    out: &mut impl Write,
    err: &mut impl Write,
) -> std::io::Result<bool> {
    match registry.dispatch_payload(name, payload) {
        Ok(bytes) => {
            out.write_all(&bytes)?;
            Ok(true)
        }
        Err(bytes) => {
            err.write_all(&bytes)?;
            err.write_all(b"\n")?;
            Ok(false)
        }
    }
}
