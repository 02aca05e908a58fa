//! Raw frame dump
//!
//! Appends extracted frame bytes to a flat file. The file backs both the
//! `dump-output` feature and the whole-file checksum, which is computed by
//! reading the file back from disk.

use crate::checksum::{self, FILE_CHECKSUM_ALGORITHM};
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Write all of `data`, retrying short writes from where they stopped
pub fn write_fully<W: Write + ?Sized>(writer: &mut W, mut data: &[u8]) -> std::io::Result<()> {
    while !data.is_empty() {
        match writer.write(data) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    ErrorKind::WriteZero,
                    "writer accepted no bytes",
                ))
            }
            Ok(written) => data = &data[written..],
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Append-only raw output file
#[derive(Debug)]
pub struct RawFileOutput {
    /// Caller-chosen location, or None for a temporary file
    location: Option<PathBuf>,
    /// Actual path once created
    path: Option<PathBuf>,
    /// Keep the file after the session
    retain: bool,
    file: Option<File>,
    bytes_written: u64,
    frame_count: u64,
    finished: bool,
}

impl RawFileOutput {
    /// Create a new raw output; nothing touches the disk until [`ensure_open`](Self::ensure_open)
    pub fn new(location: Option<PathBuf>, retain: bool) -> Self {
        Self {
            location,
            path: None,
            retain,
            file: None,
            bytes_written: 0,
            frame_count: 0,
            finished: false,
        }
    }

    /// Get the output path, once the file exists
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Create the backing file if it does not exist yet
    pub fn ensure_open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        if self.finished {
            return Err(Error::InvalidState("raw output already finished".into()));
        }

        let (file, path) = match &self.location {
            Some(location) => (open_location(location)?, location.clone()),
            None => open_temporary()?,
        };

        tracing::info!("raw file name: {}", path.display());
        self.file = Some(file);
        self.path = Some(path);
        Ok(())
    }

    /// Append one frame worth of bytes
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_open()?;
        let (Some(file), Some(path)) = (self.file.as_mut(), self.path.as_ref()) else {
            return Err(Error::InvalidState("raw output not open".into()));
        };

        write_fully(file, data).map_err(|source| Error::WriteFailure {
            path: path.clone(),
            source,
        })?;

        self.bytes_written += data.len() as u64;
        self.frame_count += 1;
        Ok(())
    }

    /// Flush to disk and close the file
    fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            let path = self.path.clone().unwrap_or_default();
            file.flush()
                .and_then(|_| file.sync_all())
                .map_err(|source| Error::WriteFailure { path, source })?;
        }
        Ok(())
    }

    /// Close the file, optionally checksum it, then delete it unless retained.
    ///
    /// Returns the whole-file MD5 when `compute_checksum` is set. The file is
    /// removed (when not retained) even if closing or hashing failed.
    pub fn finish(&mut self, compute_checksum: bool) -> Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }

        let closed = self.close();
        let digest = match (&closed, compute_checksum, &self.path) {
            (Ok(()), true, Some(path)) => Some(checksum::digest_file(FILE_CHECKSUM_ALGORITHM, path)),
            (Ok(()), true, None) => {
                tracing::warn!("unspecified raw file");
                None
            }
            _ => None,
        };

        self.finished = true;
        self.remove_unless_retained();

        tracing::info!(
            "Raw output finished: {} frames, {} bytes",
            self.frame_count,
            self.bytes_written
        );

        closed?;
        digest.transpose()
    }

    /// Swap the open handle, leaving path and counters untouched
    #[cfg(test)]
    pub(crate) fn replace_file(&mut self, file: File) {
        self.file = Some(file);
    }

    fn remove_unless_retained(&mut self) {
        if self.retain {
            return;
        }
        if let Some(path) = &self.path {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!("failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for RawFileOutput {
    fn drop(&mut self) {
        if !self.finished {
            self.file = None;
            self.finished = true;
            self.remove_unless_retained();
        }
    }
}

fn open_location(location: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o664);
    }
    options.open(location).map_err(|source| Error::OpenFailure {
        path: location.to_path_buf(),
        source,
    })
}

fn open_temporary() -> Result<(File, PathBuf)> {
    tempfile::Builder::new()
        .prefix("tmp_")
        .suffix(".yuv")
        .rand_bytes(6)
        .tempfile()
        .and_then(|tmp| tmp.keep().map_err(|e| e.error))
        .map_err(|source| Error::OpenFailure {
            path: std::env::temp_dir(),
            source,
        })
}
