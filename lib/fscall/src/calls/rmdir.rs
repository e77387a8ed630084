use std::path::Path;

use tracing::{Span, field, instrument};

use super::{FsCalls, path_param};
use crate::FsCallError;
use crate::error::EntryKind;
use crate::registry::CallOutput;
use crate::session::SessionId;

/// ### `fs_rmdir()`
/// Remove an empty directory
/// Inputs:
/// - `path`
///     The directory to remove
/// Errors:
/// - `InvalidPath`
///     If `path` exists but is not a directory; nothing is removed
/// - `IoError`
///     If `path` is missing, not empty, or cannot be removed
#[instrument(level = "debug", skip_all, fields(path = field::Empty))]
pub(super) fn fs_rmdir(
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
    if !meta.is_dir() {
        return Err(FsCallError::InvalidPath {
            path,
            expected: EntryKind::Directory,
        });
    }

    calls
        .fs()
        .remove_dir(Path::new(&path))
        .map_err(FsCallError::io(path))?;
    Ok(CallOutput::Empty)
}
