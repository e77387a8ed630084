#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use fscall::{CallRegistry, FsCallConfig, FsCallError, FsCalls, SessionId, register_fs_calls};
use fscall_vfs::host_fs;
use serde_json::Value;
use tempfile::TempDir;

/// A registry over the host filesystem, rooted at a scratch directory.
pub struct Harness {
    pub registry: CallRegistry,
    pub calls: Arc<FsCalls>,
    pub dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(FsCallConfig::default())
    }

    pub fn with_config(config: FsCallConfig) -> Self {
        let calls = Arc::new(FsCalls::new(Arc::new(host_fs::FileSystem::new()), config));
        let mut registry = CallRegistry::new();
        register_fs_calls(&mut registry, calls.clone()).unwrap();
        Self {
            registry,
            calls,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Same as [`Harness::path`], as the string form used in payloads.
    pub fn arg(&self, name: &str) -> String {
        self.path(name).to_str().unwrap().to_string()
    }

    pub fn call(&self, name: &str, params: Value) -> Result<Bytes, FsCallError> {
        self.call_raw(name, SessionId::from_raw(1), params.to_string().as_bytes())
    }

    pub fn call_raw(
        &self,
        name: &str,
        session: SessionId,
        payload: &[u8],
    ) -> Result<Bytes, FsCallError> {
        self.registry
            .dispatch(name, session, payload)
            .unwrap()
            .map_err(|err| err.error)
    }

    pub fn call_json(&self, name: &str, params: Value) -> Value {
        let out = self.call(name, params).unwrap();
        serde_json::from_slice(&out).unwrap()
    }
}
