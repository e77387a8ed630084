use std::path::Path;

use tracing::{Span, field, instrument};

use super::{FsCalls, path_param};
use crate::FsCallError;
use crate::registry::CallOutput;
use crate::session::SessionId;

/// ### `fs_mkdir()`
/// Create a single directory
/// Inputs:
/// - `path`
///     The directory to create; its parent must exist
/// Errors:
/// - `IoError`
///     If the path already exists, the parent is missing or access is denied
#[instrument(level = "debug", skip_all, fields(path = field::Empty))]
pub(super) fn fs_mkdir(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let path = path_param(payload)?;
    Span::current().record("path", path.as_str());

    calls
        .fs()
        .create_dir(Path::new(&path))
        .map_err(FsCallError::io(path))?;
    Ok(CallOutput::Empty)
}
