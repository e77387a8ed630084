use std::path::Path;

use serde_json::Value;
use tracing::{Span, field, instrument};

use super::{FsCalls, path_param};
use crate::FsCallError;
use crate::registry::CallOutput;
use crate::session::SessionId;

/// ### `fs_readdir()`
/// List the names of the entries of a directory
/// Inputs:
/// - `path`
///     The directory to list
/// Output:
/// - JSON array of file names, in the order the filesystem reports them
#[instrument(level = "debug", skip_all, fields(path = field::Empty, entries = field::Empty))]
pub(super) fn fs_readdir(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let path = path_param(payload)?;
    Span::current().record("path", path.as_str());

    let entries = calls
        .fs()
        .read_dir(Path::new(&path))
        .map_err(FsCallError::io(path))?;
    let names: Vec<Value> = entries
        .map(|entry| Value::String(entry.file_name().to_string_lossy().into_owned()))
        .collect();
    Span::current().record("entries", names.len());
    Ok(CallOutput::Json(Value::Array(names)))
}
