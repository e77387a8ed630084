//! Routing of named calls to their handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, warn};

use crate::session::SessionId;
use crate::{CallError, FsCallError, RegistryError};

/// What a successful call hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutput {
    /// The call succeeded and has nothing to report.
    Empty,
    Json(Value),
    Text(String),
    Bytes(Bytes),
}

impl CallOutput {
    pub fn into_bytes(self) -> Bytes {
        match self {
            CallOutput::Empty => Bytes::new(),
            CallOutput::Json(value) => Bytes::from(value.to_string()),
            CallOutput::Text(text) => Bytes::from(text),
            CallOutput::Bytes(bytes) => bytes,
        }
    }
}

pub type CallHandler =
    Arc<dyn Fn(SessionId, &[u8]) -> Result<CallOutput, FsCallError> + Send + Sync + 'static>;

/// Name to handler table.
///
/// Filled once while the process starts, then shared read-only (usually behind an
/// `Arc`) with whatever dispatches incoming calls.
#[derive(Default, Clone)]
pub struct CallRegistry {
    calls: HashMap<String, CallHandler>,
}

impl fmt::Debug for CallRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallRegistry")
            .field("calls", &self.names())
            .finish()
    }
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a call. Names are unique, registering a name twice is an error.
    pub fn register<F>(&mut self, name: &str, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(SessionId, &[u8]) -> Result<CallOutput, FsCallError> + Send + Sync + 'static,
    {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.calls.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        self.calls.insert(name.to_string(), Arc::new(handler));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CallHandler> {
        self.calls.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.calls.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.calls.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Runs the call registered under `name` in the given session.
    pub fn dispatch(
        &self,
        name: &str,
        session: SessionId,
        payload: &[u8],
    ) -> Result<Result<Bytes, CallError>, RegistryError> {
        let handler = self
            .calls
            .get(name)
            .ok_or_else(|| RegistryError::UnknownCall(name.to_string()))?;

        debug!(call = name, %session, payload_len = payload.len(), "dispatching call");
        Ok(handler(session, payload)
            .map(CallOutput::into_bytes)
            .map_err(|error| {
                warn!(call = name, %session, %error, "call failed");
                CallError::new(name, error)
            }))
    }

    /// Runs a call on the calling thread's session and flattens every failure into
    /// an error payload, the form expected at the dispatch boundary.
    pub fn dispatch_payload(&self, name: &str, payload: &[u8]) -> Result<Bytes, Bytes> {
        match self.dispatch(name, SessionId::current_thread(), payload) {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(err)) => Err(Bytes::from(err.to_payload())),
            Err(err) => {
                let message = serde_json::json!({
                    "call": name,
                    "kind": "UnknownCall",
                    "message": err.to_string(),
                });
                Err(Bytes::from(message.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn echo(_: SessionId, payload: &[u8]) -> Result<CallOutput, FsCallError> {
        Ok(CallOutput::Bytes(Bytes::copy_from_slice(payload)))
    }

    #[test]
    fn dispatches_by_name() {
        let mut registry = CallRegistry::new();
        registry.register("echo", echo).unwrap();
        registry
            .register("fail", |_, _| Err(FsCallError::NoActiveHandle))
            .unwrap();

        let out = registry
            .dispatch("echo", SessionId::from_raw(1), b"ping")
            .unwrap()
            .unwrap();
        assert_eq!(out, Bytes::from_static(b"ping"));

        let err = registry
            .dispatch("fail", SessionId::from_raw(1), b"")
            .unwrap()
            .unwrap_err();
        assert_eq!(err.call, "fail");
        assert!(matches!(err.error, FsCallError::NoActiveHandle));

        assert_eq!(
            registry
                .dispatch("missing", SessionId::from_raw(1), b"")
                .unwrap_err(),
            RegistryError::UnknownCall("missing".to_string())
        );
    }

    #[test]
    fn duplicate_and_invalid_names_are_rejected() {
        let mut registry = CallRegistry::new();
        registry.register("echo", echo).unwrap();
        assert_eq!(
            registry.register("echo", echo),
            Err(RegistryError::AlreadyRegistered("echo".to_string()))
        );
        assert_eq!(
            registry.register("", echo),
            Err(RegistryError::InvalidName(String::new()))
        );
        assert_eq!(
            registry.register("two words", echo),
            Err(RegistryError::InvalidName("two words".to_string()))
        );
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[test]
    fn failures_become_error_payloads() {
        let mut registry = CallRegistry::new();
        registry
            .register("fail", |_, _| Err(FsCallError::NoActiveHandle))
            .unwrap();

        let payload = registry.dispatch_payload("fail", b"").unwrap_err();
        let value: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value["kind"], "NoActiveHandle");
        assert_eq!(value["call"], "fail");

        let payload = registry.dispatch_payload("nope", b"").unwrap_err();
        let value: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value["kind"], "UnknownCall");
    }

    #[test]
    fn empty_output_is_zero_bytes() {
        assert!(CallOutput::Empty.into_bytes().is_empty());
        assert_eq!(
            CallOutput::Json(serde_json::json!({"exists": true})).into_bytes(),
            Bytes::from_static(br#"{"exists":true}"#)
        );
    }
}
