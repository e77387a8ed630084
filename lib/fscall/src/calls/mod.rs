//! The `fs_*` calls.
//!
//! Each call lives in its own module and has the same shape: validate the payload
//! against the call's schema, drive the [`FileSystem`], and build the response.

mod copy_file;
mod exists;
mod insert_file;
mod mkdir;
mod read_file;
mod read_lines;
mod readdir;
mod realpath;
mod rename;
mod resize_file;
mod rmdir;
mod stat;
mod symlink;
mod tl_file_writer;
mod unlink;
mod write_file;

use std::path::Path;
use std::sync::Arc;

use fscall_vfs::FileSystem;
use tracing::{debug, warn};

use crate::config::FsCallConfig;
use crate::params::{Field, Params};
use crate::registry::{CallOutput, CallRegistry};
use crate::session::{HandleRegistry, SessionId};
use crate::writer::FileWriter;
use crate::{FsCallError, RegistryError};

pub type CallFn = fn(&FsCalls, SessionId, &[u8]) -> Result<CallOutput, FsCallError>;

/// Every call this crate provides, under its wire name.
pub const FS_CALLS: &[(&str, CallFn)] = &[
    ("fs_exists", exists::fs_exists),
    ("fs_mkdir", mkdir::fs_mkdir),
    ("fs_readdir", readdir::fs_readdir),
    ("fs_read_file", read_file::fs_read_file),
    ("fs_read_lines", read_lines::fs_read_lines),
    ("fs_realpath", realpath::fs_realpath),
    ("fs_rename", rename::fs_rename),
    ("fs_rmdir", rmdir::fs_rmdir),
    ("fs_stat", stat::fs_stat),
    ("fs_unlink", unlink::fs_unlink),
    ("fs_copy_file", copy_file::fs_copy_file),
    ("fs_symlink", symlink::fs_symlink),
    ("fs_insert_file", insert_file::fs_insert_file),
    ("fs_resize_file", resize_file::fs_resize_file),
    ("fs_append_file", write_file::fs_append_file),
    ("fs_write_file", write_file::fs_write_file),
    ("fs_open_tl_file_writer", tl_file_writer::fs_open_tl_file_writer),
    ("fs_append_tl_file_writer", tl_file_writer::fs_append_tl_file_writer),
    ("fs_close_tl_file_writer", tl_file_writer::fs_close_tl_file_writer),
];

/// State shared by the filesystem calls: the filesystem they act on, the
/// per-session streaming writers and the tunables.
#[derive(Debug)]
pub struct FsCalls {
    fs: Arc<dyn FileSystem>,
    writers: HandleRegistry<FileWriter>,
    config: FsCallConfig,
}

impl FsCalls {
    pub fn new(fs: Arc<dyn FileSystem>, config: FsCallConfig) -> Self {
        Self {
            fs,
            writers: HandleRegistry::new(),
            config,
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn config(&self) -> &FsCallConfig {
        &self.config
    }

    /// The streaming writers currently open, one per session at most.
    pub fn writers(&self) -> &HandleRegistry<FileWriter> {
        &self.writers
    }

    /// Closes the writers of every session `keep` rejects and returns how many were released.
    ///
    /// Thread sessions are never reused, so this is how a host reclaims writers
    /// left open by threads that have exited.
    pub fn release_writers(&self, keep: impl FnMut(SessionId) -> bool) -> usize {
        let abandoned = self.writers.sweep(keep);
        let released = abandoned.len();
        for writer in abandoned {
            let path = writer.path().display().to_string();
            match writer.close() {
                Ok(written) => debug!(%path, written, "abandoned TL file writer released"),
                Err(error) => warn!(%path, %error, "failed to close an abandoned TL file writer"),
            }
        }
        released
    }
}

/// Registers every `fs_*` call in `registry`, sharing `calls` between them.
pub fn register_fs_calls(
    registry: &mut CallRegistry,
    calls: Arc<FsCalls>,
) -> Result<(), RegistryError> {
    for (name, call) in FS_CALLS {
        let calls = calls.clone();
        let call = *call;
        registry.register(name, move |session, payload| {
            call(&calls, session, payload)
        })?;
    }
    Ok(())
}

/// Parses `payload` against a schema holding just a required `path`.
fn path_param(payload: &[u8]) -> Result<String, FsCallError> {
    const SCHEMA: &[Field] = &[Field::string("path").required()];
    let params = Params::parse(payload, SCHEMA)?;
    Ok(params.required_str("path")?.to_string())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
