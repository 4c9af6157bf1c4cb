//! Uploaded-file value object: a file- or stream-backed payload that can be
//! read once and moved to its final location exactly once.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::UploadError;
use crate::stream::{Body, Stream};

const COPY_BLOCK: usize = 1024 * 1024;

/// A file received with a request, backed by a temp file on disk or by an
/// injected stream.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    file: Option<PathBuf>,
    stream: Option<Body>,
    size: Option<u64>,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    moved: bool,
}

impl UploadedFile {
    /// An upload backed by a file on disk.
    pub fn from_path(
        path: impl Into<PathBuf>,
        size: Option<u64>,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Self {
        UploadedFile {
            file: Some(path.into()),
            stream: None,
            size,
            client_filename,
            client_media_type,
            moved: false,
        }
    }

    /// An upload backed by an already-open stream.
    pub fn from_body(
        body: Body,
        size: Option<u64>,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Self {
        UploadedFile {
            file: None,
            stream: Some(body),
            size,
            client_filename,
            client_media_type,
            moved: false,
        }
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    pub fn is_moved(&self) -> bool {
        self.moved
    }

    fn ensure_movable(&self) -> Result<(), UploadError> {
        if self.moved {
            return Err(UploadError::AlreadyMoved);
        }

        Ok(())
    }

    /// A readable stream over the upload's contents. A file-backed upload is
    /// opened on first access and the handle kept for later calls.
    pub fn stream(&mut self) -> Result<Body, UploadError> {
        self.ensure_movable()?;

        if let Some(stream) = &self.stream {
            return Ok(stream.clone());
        }

        if let Some(path) = &self.file {
            let stream = Body::from_stream(Stream::open(path)?);
            self.stream = Some(stream.clone());
            return Ok(stream);
        }

        Err(UploadError::NoBacking)
    }

    /// Move the upload's contents to `target`. File-backed uploads are
    /// renamed; stream-backed uploads are block-copied. Works once.
    pub fn move_to(&mut self, target: impl AsRef<Path>) -> Result<(), UploadError> {
        self.ensure_movable()?;

        let target = target.as_ref();
        if target.as_os_str().is_empty() {
            return Err(UploadError::EmptyTargetPath);
        }

        if let Some(path) = self.file.clone() {
            fs::rename(&path, target).map_err(UploadError::Io)?;
        } else {
            let source = self.stream()?;
            {
                let mut source = source.stream();
                if source.is_seekable() {
                    source.rewind()?;
                }

                let mut out = Stream::create(target)?;
                loop {
                    let block = source.read(COPY_BLOCK)?;
                    if block.is_empty() {
                        break;
                    }
                    out.write(&block)?;
                }
            }
        }

        self.moved = true;

        Ok(())
    }
}
