use std::path::Path;

use tracing::{Span, field, instrument};

use super::FsCalls;
use crate::FsCallError;
use crate::params::{Field, Params};
use crate::registry::CallOutput;
use crate::session::SessionId;

const SCHEMA: &[Field] = &[Field::string("dest").required(), Field::string("link").required()];

/// ### `fs_symlink()`
/// Create a symbolic link
/// Inputs:
/// - `dest`
///     What the link points to, it does not need to exist
/// - `link`
///     Path of the link to create
#[instrument(level = "debug", skip_all, fields(dest = field::Empty, link = field::Empty))]
pub(super) fn fs_symlink(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let params = Params::parse(payload, SCHEMA)?;
    let dest = params.required_str("dest")?;
    let link = params.required_str("link")?;
    Span::current().record("dest", dest);
    Span::current().record("link", link);

    calls
        .fs()
        .symlink(Path::new(dest), Path::new(link))
        .map_err(FsCallError::io(link))?;
    Ok(CallOutput::Empty)
}
