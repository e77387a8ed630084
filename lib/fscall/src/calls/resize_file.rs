use std::path::Path;

use tracing::{Span, field, instrument};

use super::FsCalls;
use crate::FsCallError;
use crate::params::{Field, Params};
use crate::registry::CallOutput;
use crate::session::SessionId;

const SCHEMA: &[Field] = &[Field::string("path").required(), Field::int32("size").required()];

/// ### `fs_resize_file()`
/// Truncate or zero-extend an existing file
/// Inputs:
/// - `path`
///     The file to resize, it must exist
/// - `size`
///     The new length in bytes
#[instrument(level = "debug", skip_all, fields(path = field::Empty, size = field::Empty))]
pub(super) fn fs_resize_file(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let params = Params::parse(payload, SCHEMA)?;
    let path = params.required_str("path")?;
    let size = params.u64_or("size", 0)?;
    Span::current().record("path", path);
    Span::current().record("size", size);

    let mut file = calls
        .fs()
        .new_open_options()
        .write(true)
        .open(Path::new(path))
        .map_err(FsCallError::io(path))?;
    file.set_len(size).map_err(FsCallError::io(path))?;
    Ok(CallOutput::Empty)
}
