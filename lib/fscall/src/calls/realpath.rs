use std::path::Path;

use tracing::{Span, field, instrument};

use super::{FsCalls, display, path_param};
use crate::FsCallError;
use crate::registry::CallOutput;
use crate::session::SessionId;

/// ### `fs_realpath()`
/// Resolve a path to its absolute, canonical form
/// Inputs:
/// - `path`
///     An existing path, relative paths resolve against the working directory
/// Output:
/// - The canonical path as UTF-8 text
#[instrument(level = "debug", skip_all, fields(path = field::Empty))]
pub(super) fn fs_realpath(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let path = path_param(payload)?;
    Span::current().record("path", path.as_str());

    let canonical = calls
        .fs()
        .canonicalize(Path::new(&path))
        .map_err(FsCallError::io(path))?;
    Ok(CallOutput::Text(display(&canonical)))
}
