use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;
use tracing::{Span, field, instrument};

use super::{FsCalls, path_param};
use crate::FsCallError;
use crate::registry::CallOutput;
use crate::session::SessionId;

/// ### `fs_read_lines()`
/// Read a UTF-8 text file as a list of lines
/// Inputs:
/// - `path`
///     The file to read
/// Output:
/// - JSON array of strings
///
/// `\n` and `\r\n` both end a line and are not part of it, a `\r` left at the
/// end of the last line is dropped too. An empty last line is not reported.
#[instrument(level = "debug", skip_all, fields(path = field::Empty, lines = field::Empty))]
pub(super) fn fs_read_lines(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let path = path_param(payload)?;
    Span::current().record("path", path.as_str());

    let file = calls
        .fs()
        .new_open_options()
        .read(true)
        .open(Path::new(&path))
        .map_err(FsCallError::io(path.as_str()))?;
    let mut lines = BufReader::with_capacity(calls.config().copy_buffer_size, file)
        .lines()
        .map(|line| line.map(strip_cr))
        .collect::<Result<Vec<_>, _>>()
        .map_err(FsCallError::io(path.as_str()))?;
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }

    Span::current().record("lines", lines.len());
    Ok(CallOutput::Json(Value::Array(
        lines.into_iter().map(Value::String).collect(),
    )))
}

fn strip_cr(mut line: String) -> String {
    if line.ends_with('\r') {
        line.pop();
    }
    line
}
