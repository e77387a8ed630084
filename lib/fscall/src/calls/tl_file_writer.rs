//! Streaming writes spread over several calls.
//!
//! A writer is opened, fed any number of chunks, then closed, all from the same
//! session. Each session holds at most one writer.

use std::path::Path;

use tracing::{Span, debug, field, instrument, warn};

use super::FsCalls;
use crate::FsCallError;
use crate::params::{Field, Params};
use crate::registry::CallOutput;
use crate::session::{SessionHandle, SessionId};
use crate::writer::{FileWriter, WriteMode};

const OPEN_SCHEMA: &[Field] = &[
    Field::string("path").required(),
    Field::boolean("hex"),
    Field::boolean("append"),
];

/// ### `fs_open_tl_file_writer()`
/// Open a streaming writer bound to the calling session
/// Inputs:
/// - `path`
///     The file to write, created when missing
/// - `hex` (optional, default `false`)
///     Chunks are hex text, decoded before they reach the file
/// - `append` (optional, default `false`)
///     Keep the existing content instead of truncating it
/// Errors:
/// - `HandleAlreadyOpen`
///     If the session already holds a writer; that writer stays open
#[instrument(level = "debug", skip_all, fields(%session, path = field::Empty))]
pub(super) fn fs_open_tl_file_writer(
    calls: &FsCalls,
    session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let params = Params::parse(payload, OPEN_SCHEMA)?;
    let path = params.required_str("path")?;
    let hex = params.bool_or("hex", false);
    let append = params.bool_or("append", false);
    Span::current().record("path", path);

    // Checked before opening so that an occupied slot never truncates the file.
    if let Ok(path) = calls.writers().peek(session, |writer| writer.describe()) {
        return Err(FsCallError::HandleAlreadyOpen { path });
    }

    let mode = if append {
        WriteMode::Append
    } else {
        WriteMode::Truncate
    };
    let writer = FileWriter::open(
        calls.fs(),
        Path::new(path),
        mode,
        hex,
        calls.config().writer_buffer_size,
    )?;
    calls.writers().put(session, writer)?;

    debug!(path, hex, append, "TL file writer opened");
    Ok(CallOutput::Empty)
}

/// ### `fs_append_tl_file_writer()`
/// Write a chunk through the session's writer
/// Inputs:
/// - the payload itself is the chunk, not JSON
/// Errors:
/// - `NoActiveHandle`
///     If the session holds no writer
/// - `InvalidHex` / `IoError`
///     The writer is closed and released, the session may open a new one
#[instrument(level = "trace", skip_all, fields(%session, len = payload.len()))]
pub(super) fn fs_append_tl_file_writer(
    calls: &FsCalls,
    session: SessionId,
    payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let appended = calls.writers().peek(session, |writer| {
        let appended = writer.append(payload);
        if let Ok(bytes) = appended {
            debug!(path = %writer.path().display(), bytes, "TL file writer chunk appended");
        }
        appended
    })?;
    match appended {
        Ok(_) => Ok(CallOutput::Empty),
        Err(err) => {
            if let Ok(writer) = calls.writers().remove(session) {
                let path = writer.path().display().to_string();
                if let Err(close_err) = writer.close() {
                    warn!(%path, error = %close_err, "failed to close TL file writer after a failed append");
                }
                warn!(%path, error = %err, "TL file writer released after a failed append");
            }
            Err(err)
        }
    }
}

/// ### `fs_close_tl_file_writer()`
/// Flush and release the session's writer
/// Inputs:
/// - the payload is ignored
/// Errors:
/// - `NoActiveHandle`
///     If the session holds no writer
/// - `InvalidHex`
///     If a hex writer was left with an unpaired digit; the file is still
///     flushed and the handle released
#[instrument(level = "debug", skip_all, fields(%session, path = field::Empty))]
pub(super) fn fs_close_tl_file_writer(
    calls: &FsCalls,
    session: SessionId,
    _payload: &[u8],
) -> Result<CallOutput, FsCallError> {
    let writer = calls.writers().remove(session)?;
    Span::current().record("path", field::display(writer.path().display()));
    let written = writer.close()?;
    debug!(written, "TL file writer closed");
    Ok(CallOutput::Empty)
}
