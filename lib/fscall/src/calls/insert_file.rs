use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{Span, field, instrument};

use super::FsCalls;
use crate::FsCallError;
use crate::params::{Field, Params};
use crate::registry::CallOutput;
use crate::session::SessionId;

const SCHEMA: &[Field] = &[
    Field::string("sourcePath").required(),
    Field::string("destPath").required(),
    Field::int32("offset"),
];

/// ### `fs_insert_file()`
/// Write the whole content of one file into another at a byte offset
/// Inputs:
/// - `sourcePath`
///     The file whose content is copied
/// - `destPath`
///     The file written into, created when missing; bytes past the copied
///     range are left as they were
/// - `offset` (optional, default `0`)
///     Where in `destPath` the content starts, may lie past its end
#[instrument(
    level = "debug",
    skip_all,
    fields(source = field::Empty, dest = field::Empty, offset = field::Empty, bytes = field::Empty)
)]
pub(super) fn fs_insert_file(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let params = Params::parse(payload, SCHEMA)?;
    let source_path = params.required_str("sourcePath")?;
    let dest_path = params.required_str("destPath")?;
    let offset = params.u64_or("offset", 0)?;
    Span::current().record("source", source_path);
    Span::current().record("dest", dest_path);
    Span::current().record("offset", offset);

    let mut source = calls
        .fs()
        .new_open_options()
        .read(true)
        .open(Path::new(source_path))
        .map_err(FsCallError::io(source_path))?;
    let mut dest = calls
        .fs()
        .new_open_options()
        .write(true)
        .create(true)
        .open(Path::new(dest_path))
        .map_err(FsCallError::io(dest_path))?;

    let dest_err = |e: io::Error| FsCallError::io(dest_path)(e);
    dest.seek(SeekFrom::Start(offset)).map_err(dest_err)?;

    let mut buf = vec![0u8; calls.config().copy_buffer_size];
    let mut copied = 0u64;
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FsCallError::io(source_path)(e)),
        };
        dest.write_all(&buf[..n]).map_err(dest_err)?;
        copied += n as u64;
    }
    dest.flush().map_err(dest_err)?;
    Span::current().record("bytes", copied);

    Ok(CallOutput::Empty)
}
