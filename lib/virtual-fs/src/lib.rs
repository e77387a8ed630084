use std::fmt;
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod host_fs;

pub type Result<T> = std::result::Result<T, FsFailure>;

/// The set of filesystem primitives the call handlers are built on.
///
/// Every method reports failures as an [`FsFailure`], classified by [`FsError`].
pub trait FileSystem: fmt::Debug + Send + Sync + 'static {
    fn metadata(&self, path: &Path) -> Result<Metadata>;
    fn read_dir(&self, path: &Path) -> Result<ReadDir>;
    fn create_dir(&self, path: &Path) -> Result<()>;
    fn remove_dir(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    /// Copies the content of `from` into `to`, returning the number of bytes copied.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64>;
    /// Creates a symbolic link at `link` pointing to `dest`.
    fn symlink(&self, dest: &Path, link: &Path) -> Result<()>;
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    fn new_open_options(&self) -> OpenOptions<'_>;

    /// Whether anything exists at `path`.
    ///
    /// A missing entry is `Ok(false)`; any other failure while probing is returned as is.
    fn exists(&self, path: &Path) -> Result<bool> {
        match self.metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == FsError::EntryNotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

pub trait FileOpener {
    fn open(&self, path: &Path, conf: &OpenOptionsConfig) -> Result<Box<dyn VirtualFile>>;
}

#[derive(Debug, Clone)]
pub struct OpenOptionsConfig {
    read: bool,
    write: bool,
    create_new: bool,
    create: bool,
    append: bool,
    truncate: bool,
}

impl OpenOptionsConfig {
    pub const fn read(&self) -> bool {
        self.read
    }

    pub const fn write(&self) -> bool {
        self.write
    }

    pub const fn create_new(&self) -> bool {
        self.create_new
    }

    pub const fn create(&self) -> bool {
        self.create
    }

    pub const fn append(&self) -> bool {
        self.append
    }

    pub const fn truncate(&self) -> bool {
        self.truncate
    }
}

pub struct OpenOptions<'a> {
    opener: &'a dyn FileOpener,
    conf: OpenOptionsConfig,
}

impl fmt::Debug for OpenOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenOptions")
            .field("conf", &self.conf)
            .finish_non_exhaustive()
    }
}

impl<'a> OpenOptions<'a> {
    pub fn new(opener: &'a dyn FileOpener) -> Self {
        Self {
            opener,
            conf: OpenOptionsConfig {
                read: false,
                write: false,
                create_new: false,
                create: false,
                append: false,
                truncate: false,
            },
        }
    }

    pub fn options(&mut self, options: OpenOptionsConfig) -> &mut Self {
        self.conf = options;
        self
    }

    pub fn read(&mut self, read: bool) -> &mut Self {
        self.conf.read = read;
        self
    }

    pub fn write(&mut self, write: bool) -> &mut Self {
        self.conf.write = write;
        self
    }

    pub fn append(&mut self, append: bool) -> &mut Self {
        self.conf.append = append;
        self
    }

    pub fn truncate(&mut self, truncate: bool) -> &mut Self {
        self.conf.truncate = truncate;
        self
    }

    pub fn create(&mut self, create: bool) -> &mut Self {
        self.conf.create = create;
        self
    }

    pub fn create_new(&mut self, create_new: bool) -> &mut Self {
        self.conf.create_new = create_new;
        self
    }

    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<Box<dyn VirtualFile>> {
        self.opener.open(path.as_ref(), &self.conf)
    }
}

/// An open file. Closing happens when the value is dropped.
pub trait VirtualFile: fmt::Debug + Send + Sync + Read + Write + Seek + 'static {
    /// the size of the file in bytes
    fn size(&self) -> u64;

    /// Change the size of the file, if the `new_size` is greater than the current size
    /// the extra bytes will be allocated and zeroed
    fn set_len(&mut self, new_size: u64) -> Result<()>;

    /// Store file contents and metadata to disk
    fn sync_to_disk(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileType {
    pub dir: bool,
    pub file: bool,
    pub symlink: bool,
}

impl FileType {
    pub fn is_dir(&self) -> bool {
        self.dir
    }

    pub fn is_file(&self) -> bool {
        self.file
    }

    pub fn is_symlink(&self) -> bool {
        self.symlink
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub ft: FileType,
    pub len: u64,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.ft.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.ft.is_file()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn file_type(&self) -> FileType {
        self.ft
    }
}

#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
}

impl DirEntry {
    pub fn path(&self) -> PathBuf {
        self.path.clone()
    }

    /// The final component of the entry's path.
    pub fn file_name(&self) -> std::ffi::OsString {
        self.path
            .file_name()
            .unwrap_or(self.path.as_os_str())
            .to_owned()
    }
}

/// Directory entries, in the order the filesystem reported them.
#[derive(Debug, Clone)]
pub struct ReadDir {
    data: Vec<DirEntry>,
    index: usize,
}

impl ReadDir {
    pub fn new(data: Vec<DirEntry>) -> Self {
        Self { data, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Iterator for ReadDir {
    type Item = DirEntry;

    fn next(&mut self) -> Option<DirEntry> {
        let entry = self.data.get(self.index).cloned();
        if entry.is_some() {
            self.index += 1;
        }
        entry
    }
}

/// Error type for external users
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum FsError {
    /// The fd given as a base was not a directory so the operation was not possible
    #[error("not a directory")]
    BaseNotDirectory,
    /// Expected a file but found not a file
    #[error("not a file")]
    NotAFile,
    /// File exists
    #[error("file exists")]
    AlreadyExists,
    /// Something failed when doing IO. These errors can generally not be handled.
    /// It may work if tried again.
    #[error("io error")]
    IOError,
    /// The operation was interrupted before it could finish
    #[error("operation interrupted")]
    Interrupted,
    /// Invalid internal data, if the argument data is invalid, use `InvalidInput`
    #[error("invalid internal data")]
    InvalidData,
    /// The provided data is invalid
    #[error("invalid input")]
    InvalidInput,
    /// The requested file or directory could not be found
    #[error("entry not found")]
    EntryNotFound,
    /// Caller was not allowed to perform this operation
    #[error("permission denied")]
    PermissionDenied,
    /// Found EOF when EOF was not expected
    #[error("unexpected eof")]
    UnexpectedEof,
    /// A call to write returned 0
    #[error("write returned 0")]
    WriteZero,
    /// Directory not Empty
    #[error("directory not empty")]
    DirectoryNotEmpty,
    /// The operation is not supported on this filesystem
    #[error("unsupported")]
    Unsupported,
    /// Some other unhandled error. If you see this, it's probably a bug.
    #[error("unknown error found")]
    UnknownError,
}

impl From<io::Error> for FsError {
    fn from(io_error: io::Error) -> Self {
        io_error.kind().into()
    }
}

impl From<io::ErrorKind> for FsError {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists,
            io::ErrorKind::Interrupted => FsError::Interrupted,
            io::ErrorKind::InvalidData => FsError::InvalidData,
            io::ErrorKind::InvalidInput => FsError::InvalidInput,
            io::ErrorKind::NotFound => FsError::EntryNotFound,
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied,
            io::ErrorKind::UnexpectedEof => FsError::UnexpectedEof,
            io::ErrorKind::WriteZero => FsError::WriteZero,
            io::ErrorKind::NotADirectory => FsError::BaseNotDirectory,
            io::ErrorKind::IsADirectory => FsError::NotAFile,
            io::ErrorKind::DirectoryNotEmpty => FsError::DirectoryNotEmpty,
            io::ErrorKind::Unsupported => FsError::Unsupported,
            io::ErrorKind::Other => FsError::IOError,
            // if the following triggers, a new error type was added to this non-exhaustive enum
            _ => FsError::UnknownError,
        }
    }
}

impl From<FsError> for io::Error {
    fn from(val: FsError) -> Self {
        let kind = match val {
            FsError::AlreadyExists => io::ErrorKind::AlreadyExists,
            FsError::Interrupted => io::ErrorKind::Interrupted,
            FsError::InvalidData => io::ErrorKind::InvalidData,
            FsError::InvalidInput => io::ErrorKind::InvalidInput,
            FsError::EntryNotFound => io::ErrorKind::NotFound,
            FsError::PermissionDenied => io::ErrorKind::PermissionDenied,
            FsError::UnexpectedEof => io::ErrorKind::UnexpectedEof,
            FsError::WriteZero => io::ErrorKind::WriteZero,
            FsError::Unsupported => io::ErrorKind::Unsupported,
            FsError::BaseNotDirectory
            | FsError::NotAFile
            | FsError::DirectoryNotEmpty
            | FsError::IOError
            | FsError::UnknownError => io::ErrorKind::Other,
        };
        kind.into()
    }
}

/// A failed filesystem operation: its [`FsError`] class and, when the OS
/// reported one, the original message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsFailure {
    kind: FsError,
    message: Option<String>,
}

impl FsFailure {
    pub fn kind(&self) -> FsError {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for FsFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => fmt::Display::fmt(&self.kind, f),
        }
    }
}

impl std::error::Error for FsFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<FsError> for FsFailure {
    fn from(kind: FsError) -> Self {
        Self {
            kind,
            message: None,
        }
    }
}

impl From<io::Error> for FsFailure {
    fn from(io_error: io::Error) -> Self {
        Self {
            kind: io_error.kind().into(),
            message: Some(io_error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn io_errors_are_classified_by_kind() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(FsError::from(not_found), FsError::EntryNotFound);

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(FsError::from(denied), FsError::PermissionDenied);

        let other = io::Error::other("boom");
        assert_eq!(FsError::from(other), FsError::IOError);
    }

    #[test]
    fn failures_keep_the_os_message() {
        let unmapped = io::Error::new(io::ErrorKind::CrossesDevices, "Invalid cross-device link");
        let failure = FsFailure::from(unmapped);
        assert_eq!(failure.kind(), FsError::UnknownError);
        assert_eq!(failure.to_string(), "Invalid cross-device link");

        let failure = FsFailure::from(FsError::EntryNotFound);
        assert_eq!(failure.message(), None);
        assert_eq!(failure.to_string(), "entry not found");
    }

    #[test]
    fn read_dir_preserves_order() {
        let entries = ["b.txt", "a.txt", "c"]
            .iter()
            .map(|name| DirEntry {
                path: Path::new("/base").join(name),
            })
            .collect();
        let names: Vec<_> = ReadDir::new(entries)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.txt", "a.txt", "c"]);
    }
}
