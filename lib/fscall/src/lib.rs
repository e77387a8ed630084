//! Filesystem operations exposed as named calls.
//!
//! Every call takes an opaque payload, usually a flat JSON object checked against a
//! closed schema, and hands back an opaque payload. Calls are looked up by name in a
//! [`CallRegistry`]; the `fs_*` family is installed with [`register_fs_calls`].
//!
//! ```no_run
//! use fscall::FsCallConfig;
//!
//! let registry = fscall::default_registry(FsCallConfig::default()).unwrap();
//! let out = registry.dispatch_payload("fs_exists", br#"{"path": "/tmp"}"#);
//! assert_eq!(out.unwrap().as_ref(), br#"{"exists":true}"#);
//! ```

mod calls;
mod config;
mod error;
pub mod params;
mod registry;
mod session;
pub mod transcode;
mod writer;

use std::sync::Arc;

use fscall_vfs::host_fs;

pub use crate::calls::{CallFn, FS_CALLS, FsCalls, register_fs_calls};
pub use crate::config::FsCallConfig;
pub use crate::error::{CallError, ConfigError, EntryKind, FsCallError, RegistryError};
pub use crate::registry::{CallHandler, CallOutput, CallRegistry};
pub use crate::session::{HandleRegistry, SessionHandle, SessionId};
pub use crate::writer::{FileWriter, WriteMode};

/// A registry holding every `fs_*` call, acting on the host filesystem.
pub fn default_registry(config: FsCallConfig) -> Result<CallRegistry, RegistryError> {
    let calls = Arc::new(FsCalls::new(Arc::new(host_fs::FileSystem::new()), config));
    let mut registry = CallRegistry::new();
    register_fs_calls(&mut registry, calls)?;
    Ok(registry)
}
