use std::io::Read;
use std::path::Path;

use bytes::Bytes;
use tracing::{Span, field, instrument};

use super::{FsCalls, display};
use crate::FsCallError;
use crate::params::{Field, Params};
use crate::registry::CallOutput;
use crate::session::SessionId;
use crate::transcode::encode_reader;

const SCHEMA: &[Field] = &[Field::string("path").required(), Field::boolean("hex")];

/// ### `fs_read_file()`
/// Read the whole content of a file
/// Inputs:
/// - `path`
///     The file to read
/// - `hex` (optional, default `false`)
///     Return the content as lowercase hex text instead of raw bytes
#[instrument(level = "debug", skip_all, fields(path = field::Empty, hex = field::Empty))]
pub(super) fn fs_read_file(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let params = Params::parse(payload, SCHEMA)?;
    let path = Path::new(params.required_str("path")?);
    let hex = params.bool_or("hex", false);
    Span::current().record("path", field::display(path.display()));
    Span::current().record("hex", hex);

    let io_err = |e: std::io::Error| FsCallError::io(display(path))(e);
    let mut file = calls
        .fs()
        .new_open_options()
        .read(true)
        .open(path)
        .map_err(FsCallError::io(display(path)))?;

    if hex {
        let text = encode_reader(&mut file, calls.config().copy_buffer_size).map_err(io_err)?;
        Ok(CallOutput::Text(text))
    } else {
        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content).map_err(io_err)?;
        Ok(CallOutput::Bytes(Bytes::from(content)))
    }
}
