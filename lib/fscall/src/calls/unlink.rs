use std::path::Path;

use tracing::{Span, field, instrument};

use super::{FsCalls, path_param};
use crate::FsCallError;
use crate::error::EntryKind;
use crate::registry::CallOutput;
use crate::session::SessionId;

/// ### `fs_unlink()`
/// Delete a regular file
/// Inputs:
/// - `path`
///     The file to delete
/// Errors:
/// - `InvalidPath`
///     If `path` exists but is not a regular file; directories are never removed
#[instrument(level = "debug", skip_all, fields(path = field::Empty))]
pub(super) fn fs_unlink(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let path = path_param(payload)?;
    Span::current().record("path", path.as_str());

    let meta = calls
        .fs()
        .metadata(Path::new(&path))
        .map_err(FsCallError::io(path.as_str()))?;
    if !meta.is_file() {
        return Err(FsCallError::InvalidPath {
            path,
            expected: EntryKind::File,
        });
    }

    calls
        .fs()
        .remove_file(Path::new(&path))
        .map_err(FsCallError::io(path))?;
    Ok(CallOutput::Empty)
}
