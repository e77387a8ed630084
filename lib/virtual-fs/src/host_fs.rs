use crate::{
    DirEntry, FileType, FsError, FsFailure, Metadata, OpenOptions, OpenOptionsConfig, ReadDir, Result,
    VirtualFile,
};
use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

/// The filesystem of the machine the process runs on, driven through `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct FileSystem;

impl FileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl crate::FileSystem for FileSystem {
    fn metadata(&self, path: &Path) -> Result<Metadata> {
        fs::metadata(path).map(Into::into).map_err(Into::into)
    }

    fn read_dir(&self, path: &Path) -> Result<ReadDir> {
        let data = fs::read_dir(path)?
            .map(|entry| entry.map(|entry| DirEntry { path: entry.path() }))
            .collect::<std::result::Result<Vec<DirEntry>, io::Error>>()
            .map_err::<FsFailure, _>(Into::into)?;
        Ok(ReadDir::new(data))
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        if path.parent().is_none() {
            return Err(FsError::BaseNotDirectory.into());
        }

        fs::create_dir(path).map_err(Into::into)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        if path.parent().is_none() {
            return Err(FsError::BaseNotDirectory.into());
        }

        // https://github.com/rust-lang/rust/issues/86442
        // DirectoryNotEmpty is not implemented consistently
        if path.is_dir() && self.read_dir(path).map(|s| !s.is_empty()).unwrap_or(false) {
            return Err(FsError::DirectoryNotEmpty.into());
        }
        fs::remove_dir(path).map_err(Into::into)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        if path.parent().is_none() {
            return Err(FsError::BaseNotDirectory.into());
        }

        fs::remove_file(path).map_err(Into::into)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if !from.exists() {
            return Err(FsError::EntryNotFound.into());
        }
        fs::rename(from, to).map_err(Into::into)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        if from.is_dir() {
            return Err(FsError::NotAFile.into());
        }
        fs::copy(from, to).map_err(Into::into)
    }

    fn symlink(&self, dest: &Path, link: &Path) -> Result<()> {
        trace!(dest = %dest.display(), link = %link.display(), "creating symlink");
        create_symlink(dest, link)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(FsError::EntryNotFound.into());
        }
        dunce::canonicalize(path).map_err(Into::into)
    }

    fn new_open_options(&self) -> OpenOptions<'_> {
        OpenOptions::new(self)
    }
}

#[cfg(unix)]
fn create_symlink(dest: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(dest, link).map_err(Into::into)
}

#[cfg(windows)]
fn create_symlink(dest: &Path, link: &Path) -> Result<()> {
    let target = match link.parent() {
        Some(parent) if dest.is_relative() => parent.join(dest),
        _ => dest.to_owned(),
    };
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(dest, link).map_err(Into::into)
    } else {
        std::os::windows::fs::symlink_file(dest, link).map_err(Into::into)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_dest: &Path, _link: &Path) -> Result<()> {
    Err(FsError::Unsupported.into())
}

impl From<fs::Metadata> for Metadata {
    fn from(metadata: fs::Metadata) -> Self {
        let filetype = metadata.file_type();
        Metadata {
            ft: FileType {
                dir: filetype.is_dir(),
                file: filetype.is_file(),
                symlink: filetype.is_symlink(),
            },
            len: metadata.len(),
        }
    }
}

impl crate::FileOpener for FileSystem {
    fn open(&self, path: &Path, conf: &OpenOptionsConfig) -> Result<Box<dyn VirtualFile>> {
        // std refuses truncate together with append, truncation wins.
        let append = if conf.truncate() { false } else { conf.append() };

        fs::OpenOptions::new()
            .read(conf.read())
            .write(conf.write())
            .create_new(conf.create_new())
            .create(conf.create())
            .append(append)
            .truncate(conf.truncate())
            .open(path)
            .map_err(Into::into)
            .map(|file| Box::new(File::new(file, path.to_owned())) as Box<dyn VirtualFile>)
    }
}

/// A thin wrapper around `std::fs::File`
#[derive(Debug)]
pub struct File {
    inner: fs::File,
    pub host_path: PathBuf,
}

impl File {
    pub fn new(file: fs::File, host_path: PathBuf) -> Self {
        Self {
            inner: file,
            host_path,
        }
    }
}

impl Read for File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Seek for File {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl VirtualFile for File {
    fn size(&self) -> u64 {
        self.inner.metadata().map(|m| m.len()).unwrap_or(0)
    }

    fn set_len(&mut self, new_size: u64) -> Result<()> {
        fs::File::set_len(&self.inner, new_size).map_err(Into::into)
    }

    fn sync_to_disk(&self) -> Result<()> {
        self.inner.sync_all().map_err(Into::into)
    }
}
