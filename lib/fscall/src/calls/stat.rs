use std::path::Path;

use serde_json::json;
use tracing::{Span, field, instrument};

use super::{FsCalls, path_param};
use crate::FsCallError;
use crate::registry::CallOutput;
use crate::session::SessionId;

/// ### `fs_stat()`
/// Describe the entry at a path, following symlinks
/// Inputs:
/// - `path`
///     The entry to describe
/// Output:
/// - `{"size": int64, "isFile": bool, "isDirectory": bool}`, `size` is 0 unless
///   the entry is a regular file
#[instrument(level = "debug", skip_all, fields(path = field::Empty))]
pub(super) fn fs_stat(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let path = path_param(payload)?;
    Span::current().record("path", path.as_str());

    let meta = calls
        .fs()
        .metadata(Path::new(&path))
        .map_err(FsCallError::io(path))?;
    let size = if meta.is_file() {
        i64::try_from(meta.len()).unwrap_or(i64::MAX)
    } else {
        0
    };
    Ok(CallOutput::Json(json!({
        "size": size,
        "isFile": meta.is_file(),
        "isDirectory": meta.is_dir(),
    })))
}
