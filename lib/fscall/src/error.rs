use fscall_vfs::{FsError, FsFailure};
use serde::Serialize;
use thiserror::Error;

/// The kind of entry a call expected to find at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    fn describe(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

/// Everything a filesystem call can fail with.
#[derive(Error, Debug)]
pub enum FsCallError {
    /// The payload could not be parsed as a flat JSON object.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
    #[error("Unknown data field: [{0}]")]
    UnknownField(String),
    #[error("Required parameter '{0}' not specified")]
    MissingRequiredParameter(&'static str),
    #[error("Invalid value for field '{name}', expected {expected}")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
    },
    #[error("Invalid hex data: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Invalid {} path: [{path}]", .expected.describe())]
    InvalidPath { path: String, expected: EntryKind },
    #[error("No file writer is open for this session")]
    NoActiveHandle,
    #[error("A file writer is already open for this session, path: [{path}]")]
    HandleAlreadyOpen { path: String },
    /// `message` is the text reported by the OS when there was one.
    #[error("I/O error on [{path}]: {message}")]
    Io {
        path: String,
        #[source]
        source: FsError,
        message: String,
    },
}

impl FsCallError {
    /// Wraps a filesystem or `std::io` failure that happened on `path`.
    pub(crate) fn io<E: Into<FsFailure>>(path: impl Into<String>) -> impl FnOnce(E) -> Self {
        let path = path.into();
        move |err| {
            let failure = err.into();
            FsCallError::Io {
                path,
                source: failure.kind(),
                message: failure.to_string(),
            }
        }
    }

    /// Same as [`FsCallError::io`] for calls that act on two paths.
    pub(crate) fn io2<E: Into<FsFailure>>(from: &str, to: &str) -> impl FnOnce(E) -> Self {
        Self::io(format!("{from} -> {to}"))
    }

    /// Stable name of the variant, used in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            FsCallError::MalformedPayload(_) => "MalformedPayload",
            FsCallError::UnknownField(_) => "UnknownField",
            FsCallError::MissingRequiredParameter(_) => "MissingRequiredParameter",
            FsCallError::TypeMismatch { .. } => "TypeMismatch",
            FsCallError::InvalidHex(_) => "InvalidHex",
            FsCallError::InvalidPath { .. } => "InvalidPath",
            FsCallError::NoActiveHandle => "NoActiveHandle",
            FsCallError::HandleAlreadyOpen { .. } => "HandleAlreadyOpen",
            FsCallError::Io { .. } => "IoError",
        }
    }
}

/// A failed call, carrying the name it was dispatched under.
#[derive(Error, Debug)]
#[error("{call}: {error}")]
pub struct CallError {
    pub call: String,
    #[source]
    pub error: FsCallError,
}

impl CallError {
    pub fn new(call: impl Into<String>, error: FsCallError) -> Self {
        Self {
            call: call.into(),
            error,
        }
    }

    /// Renders the failure as the JSON error payload handed back to callers.
    pub fn to_payload(&self) -> Vec<u8> {
        #[derive(Serialize)]
        struct ErrorPayload<'a> {
            call: &'a str,
            kind: &'a str,
            message: String,
        }

        let payload = ErrorPayload {
            call: &self.call,
            kind: self.error.kind(),
            message: self.error.to_string(),
        };
        // Serializing a struct of strings cannot fail.
        serde_json::to_vec(&payload).unwrap_or_default()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown call: [{0}]")]
    UnknownCall(String),
    #[error("call already registered: [{0}]")]
    AlreadyRegistered(String),
    #[error("invalid call name: [{0}]")]
    InvalidName(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file [{path}]")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    #[error("config value '{0}' must be greater than zero")]
    Zero(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_carry_context() {
        let err = FsCallError::InvalidPath {
            path: "/tmp/x".to_string(),
            expected: EntryKind::Directory,
        };
        assert_eq!(err.to_string(), "Invalid directory path: [/tmp/x]");

        let err = FsCallError::io("/tmp/y")(FsError::EntryNotFound);
        assert_eq!(err.to_string(), "I/O error on [/tmp/y]: entry not found");
        assert_eq!(err.kind(), "IoError");

        let os = std::io::Error::new(std::io::ErrorKind::CrossesDevices, "Invalid cross-device link");
        let err = FsCallError::io2("/a", "/proc/self/b")(os);
        assert_eq!(
            err.to_string(),
            "I/O error on [/a -> /proc/self/b]: Invalid cross-device link"
        );
        assert!(matches!(
            err,
            FsCallError::Io {
                source: FsError::UnknownError,
                ..
            }
        ));
    }

    #[test]
    fn error_payload_is_json() {
        let err = CallError::new("fs_mkdir", FsCallError::MissingRequiredParameter("path"));
        let value: serde_json::Value = serde_json::from_slice(&err.to_payload()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "call": "fs_mkdir",
                "kind": "MissingRequiredParameter",
                "message": "Required parameter 'path' not specified",
            })
        );
    }
}
