use std::path::Path;

use serde_json::json;
use tracing::{Span, field, instrument, trace};

use super::{FsCalls, path_param};
use crate::FsCallError;
use crate::registry::CallOutput;
use crate::session::SessionId;

/// ### `fs_exists()`
/// Check whether anything exists at a path
/// Inputs:
/// - `path`
///     The path to look up
/// Output:
/// - `{"exists": bool}`
///
/// Only parameter validation can fail. Any error while probing, permission
/// errors included, is reported as `{"exists": false}`.
#[instrument(level = "debug", skip_all, fields(path = field::Empty))]
pub(super) fn fs_exists(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let path = path_param(payload)?;
    Span::current().record("path", path.as_str());

    let exists = calls.fs().exists(Path::new(&path)).unwrap_or_else(|err| {
        trace!(%err, "metadata lookup failed, reporting as missing");
        false
    });
    Ok(CallOutput::Json(json!({ "exists": exists })))
}
