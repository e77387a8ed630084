use std::path::Path;

use tracing::{Span, field, instrument};

use super::FsCalls;
use crate::FsCallError;
use crate::params::{Field, Params};
use crate::registry::CallOutput;
use crate::session::SessionId;

const SCHEMA: &[Field] = &[
    Field::string("oldPath").required(),
    Field::string("newPath").required(),
];

/// ### `fs_copy_file()`
/// Copy the content of a file to another path, replacing its content
/// Inputs:
/// - `oldPath`
///     The file to copy
/// - `newPath`
///     The destination file
#[instrument(
    level = "debug",
    skip_all,
    fields(old_path = field::Empty, new_path = field::Empty, bytes = field::Empty)
)]
pub(super) fn fs_copy_file(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let params = Params::parse(payload, SCHEMA)?;
    let old_path = params.required_str("oldPath")?;
    let new_path = params.required_str("newPath")?;
    Span::current().record("old_path", old_path);
    Span::current().record("new_path", new_path);

    let copied = calls
        .fs()
        .copy_file(Path::new(old_path), Path::new(new_path))
        .map_err(FsCallError::io2(old_path, new_path))?;
    Span::current().record("bytes", copied);
    Ok(CallOutput::Empty)
}
