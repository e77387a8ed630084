use std::path::Path;

use tracing::{Span, field, instrument};

use super::FsCalls;
use crate::FsCallError;
use crate::params::{Field, Params};
use crate::registry::CallOutput;
use crate::session::SessionId;
use crate::writer::{FileWriter, WriteMode};

const SCHEMA: &[Field] = &[
    Field::string("path").required(),
    Field::string("data").required(),
    Field::boolean("hex"),
];

/// ### `fs_write_file()`
/// Replace the content of a file, creating it when missing
/// Inputs:
/// - `path`
///     The file to write
/// - `data`
///     The new content
/// - `hex` (optional, default `false`)
///     `data` is hex text and is decoded before it is written
#[instrument(level = "debug", skip_all, fields(path = field::Empty, hex = field::Empty))]
pub(super) fn fs_write_file(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    write_whole(calls, payload, WriteMode::Truncate)
}

/// ### `fs_append_file()`
/// Same as [`fs_write_file`] but keeps the existing content and writes after it
#[instrument(level = "debug", skip_all, fields(path = field::Empty, hex = field::Empty))]
pub(super) fn fs_append_file(
    calls: &FsCalls,
    _session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    write_whole(calls, payload, WriteMode::Append)
}

fn write_whole(calls: &FsCalls, payload: &[u8], mode: WriteMode) -> Result<CallOutput, FsCallError> {
    let params = Params::parse(payload, SCHEMA)?;
    let path = params.required_str("path")?;
    let data = params.required_str("data")?;
    let hex = params.bool_or("hex", false);
    Span::current().record("path", path);
    Span::current().record("hex", hex);

    let mut writer = FileWriter::open(
        calls.fs(),
        Path::new(path),
        mode,
        hex,
        calls.config().writer_buffer_size,
    )?;
    writer.append(data.as_bytes())?;
    writer.close()?;
    Ok(CallOutput::Empty)
}
