//! Writing the finished canvas where the display can read it.
//!
//! A write happens in two steps. [`CanvasOutput::stage`] encodes the canvas
//! into a uniquely named temp file next to the target and syncs it to disk;
//! [`StagedCanvas::commit`] renames it over the target. Readers only ever see
//! a complete image, and concurrent runs never share a temp file. Dropping a
//! staged canvas without committing removes its temp file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use imageframe_core::{encode_canvas, DecodedImage, EncodeError, OutputFormat};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to encode canvas: {0}")]
    Encode(#[from] EncodeError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination for rendered canvases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasOutput {
    path: PathBuf,
    format: OutputFormat,
}

impl CanvasOutput {
    pub fn new(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Encode `image` into a synced temp file beside the target.
    pub fn stage(&self, image: &DecodedImage) -> Result<StagedCanvas, OutputError> {
        let bytes = encode_canvas(image, self.format)?;
        let dir = self.directory();

        let mut file = tempfile::Builder::new()
            .prefix(&self.temp_prefix())
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|source| io_error(dir, source))?;

        file.write_all(&bytes)
            .and_then(|()| file.as_file().sync_all())
            .map_err(|source| io_error(file.path(), source))?;

        Ok(StagedCanvas {
            file,
            target: self.path.clone(),
            len: bytes.len(),
        })
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Hidden, per-target prefix so stray temp files are easy to attribute.
    fn temp_prefix(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!(".{name}.")
    }
}

/// An encoded canvas waiting to replace the target file.
#[derive(Debug)]
pub struct StagedCanvas {
    file: NamedTempFile,
    target: PathBuf,
    len: usize,
}

impl StagedCanvas {
    /// Atomically replace the target with the staged canvas.
    pub fn commit(self) -> Result<PathBuf, OutputError> {
        self.file
            .persist(&self.target)
            .map_err(|e| io_error(&self.target, e.error))?;

        tracing::debug!(path = %self.target.display(), bytes = self.len, "canvas written");
        Ok(self.target)
    }
}

fn io_error(path: &Path, source: io::Error) -> OutputError {
    OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}
