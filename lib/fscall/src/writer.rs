use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fscall_vfs::{FileSystem, VirtualFile};
use tracing::debug;

use crate::FsCallError;
use crate::session::SessionHandle;
use crate::transcode::HexDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create the file, or cut an existing one down to zero bytes.
    Truncate,
    /// Create the file, or keep existing bytes and write after them.
    Append,
}

/// A buffered sink to an open file, optionally decoding hex text before it is written.
#[derive(Debug)]
pub struct FileWriter {
    path: PathBuf,
    sink: BufWriter<Box<dyn VirtualFile>>,
    decoder: Option<HexDecoder>,
    scratch: Vec<u8>,
    written: u64,
}

impl FileWriter {
    pub fn open(
        fs: &dyn FileSystem,
        path: &Path,
        mode: WriteMode,
        hex: bool,
        buffer_size: usize,
    ) -> Result<Self, FsCallError> {
        let file = fs
            .new_open_options()
            .write(true)
            .create(true)
            .truncate(mode == WriteMode::Truncate)
            .append(mode == WriteMode::Append)
            .open(path)
            .map_err(FsCallError::io(path.display().to_string()))?;

        Ok(Self {
            path: path.to_owned(),
            sink: BufWriter::with_capacity(buffer_size, file),
            decoder: hex.then(HexDecoder::new),
            scratch: Vec::new(),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_hex(&self) -> bool {
        self.decoder.is_some()
    }

    /// Total bytes handed to the file so far, after decoding.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Writes `data`, decoding it first in hex mode. Returns the number of bytes written.
    pub fn append(&mut self, data: &[u8]) -> Result<usize, FsCallError> {
        let bytes = match self.decoder.as_mut() {
            Some(decoder) => {
                self.scratch.clear();
                decoder.decode(data, &mut self.scratch)?;
                self.scratch.as_slice()
            }
            None => data,
        };

        self.sink
            .write_all(bytes)
            .map_err(|e| FsCallError::io(self.path.display().to_string())(e))?;
        self.written += bytes.len() as u64;
        Ok(bytes.len())
    }

    /// Flushes buffered data and releases the file.
    ///
    /// The file is released even when the flush fails.
    pub fn close(mut self) -> Result<u64, FsCallError> {
        let pending = match self.decoder.as_mut() {
            Some(decoder) => decoder.finish(),
            None => Ok(()),
        };
        self.sink
            .flush()
            .map_err(|e| FsCallError::io(self.path.display().to_string())(e))?;
        pending?;
        debug!(path = %self.path.display(), bytes = self.written, "file writer closed");
        Ok(self.written)
    }
}

impl SessionHandle for FileWriter {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
