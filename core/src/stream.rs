//! Seekable byte streams backing message bodies.
//!
//! # Design
//! `Stream` wraps an open, position-tracked resource (an unbounded
//! in-memory buffer or a file) with readable/writable/seekable flags fixed
//! at construction. Once a stream is closed or detached every operation
//! fails with [`StreamError::Detached`] and the flags read false.
//!
//! `Body` is the handle messages hold: a shared, single-threaded reference
//! to a `Stream`. Cloning a message clones the handle, not the bytes, so a
//! derived message observes the same stream until `with_body` replaces it.
//! The `Rc` makes bodies `!Send`, which matches the ownership rule that a
//! stream must not be shared across concurrent exchanges.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::rc::Rc;

use crate::error::StreamError;

/// Raw resource behind a [`Stream`].
#[derive(Debug)]
pub enum Resource {
    /// Unbounded in-memory byte store.
    Buffer(io::Cursor<Vec<u8>>),

    /// An open file.
    File(File),
}

impl Read for Resource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Resource::Buffer(cursor) => cursor.read(buf),
            Resource::File(file) => file.read(buf),
        }
    }
}

impl Write for Resource {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Resource::Buffer(cursor) => cursor.write(buf),
            Resource::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Resource::Buffer(cursor) => cursor.flush(),
            Resource::File(file) => file.flush(),
        }
    }
}

impl Seek for Resource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Resource::Buffer(cursor) => cursor.seek(pos),
            Resource::File(file) => file.seek(pos),
        }
    }
}

/// Access flags for a file handed to [`Stream::from_file`].
///
/// Rust cannot read the open mode back off a `File` handle, so the caller
/// states it once and the stream derives its flags from that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    ReadWrite,
}

/// A seekable, readable/writable stream over a byte resource.
#[derive(Debug)]
pub struct Stream {
    resource: Option<Resource>,
    readable: bool,
    writable: bool,
    seekable: bool,
    eof: bool,
}

impl Stream {
    /// An empty read/write stream backed by an in-memory buffer.
    pub fn new() -> Self {
        Self::buffer(Vec::new())
    }

    /// A read/write stream over `bytes`, positioned at the start.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::buffer(bytes.into())
    }

    fn buffer(bytes: Vec<u8>) -> Self {
        Stream {
            resource: Some(Resource::Buffer(io::Cursor::new(bytes))),
            readable: true,
            writable: true,
            seekable: true,
            eof: false,
        }
    }

    /// Wrap an already-open file. Seekability is probed once; a file backed
    /// by a pipe reports non-seekable.
    pub fn from_file(mut file: File, mode: FileMode) -> Self {
        let seekable = file.stream_position().is_ok();
        Stream {
            resource: Some(Resource::File(file)),
            readable: matches!(mode, FileMode::Read | FileMode::ReadWrite),
            writable: matches!(mode, FileMode::Write | FileMode::ReadWrite),
            seekable,
            eof: false,
        }
    }

    /// A read/write stream over a fresh unnamed temporary file. The file is
    /// removed by the OS when the stream is dropped.
    pub fn temp() -> Result<Self, StreamError> {
        let file = tempfile::tempfile().map_err(StreamError::Io)?;
        Ok(Self::from_file(file, FileMode::ReadWrite))
    }

    /// Open `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let file = File::open(path).map_err(StreamError::Io)?;
        Ok(Self::from_file(file, FileMode::Read))
    }

    /// Create (or truncate) `path` for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let file = File::create(path).map_err(StreamError::Io)?;
        Ok(Self::from_file(file, FileMode::Write))
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    fn resource_mut(&mut self) -> Result<&mut Resource, StreamError> {
        self.resource.as_mut().ok_or(StreamError::Detached)
    }

    /// Read up to `len` bytes from the current position.
    pub fn read(&mut self, len: usize) -> Result<Vec<u8>, StreamError> {
        if self.resource.is_none() {
            return Err(StreamError::Detached);
        }
        if !self.readable {
            return Err(StreamError::NotReadable);
        }
        if len == 0 {
            return Ok(Vec::new());
        }

        let resource = self.resource_mut()?;
        let mut buf = vec![0u8; len];
        let n = resource.read(&mut buf).map_err(StreamError::Io)?;
        buf.truncate(n);
        if n == 0 {
            self.eof = true;
        }

        Ok(buf)
    }

    /// Write `data` at the current position, returning the byte count.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, StreamError> {
        if self.resource.is_none() {
            return Err(StreamError::Detached);
        }
        if !self.writable {
            return Err(StreamError::NotWritable);
        }

        let resource = self.resource_mut()?;
        resource.write_all(data).map_err(StreamError::Io)?;

        Ok(data.len())
    }

    /// Move the stream position.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<(), StreamError> {
        if self.resource.is_none() {
            return Err(StreamError::Detached);
        }
        if !self.seekable {
            return Err(StreamError::NotSeekable);
        }

        let resource = self.resource_mut()?;
        resource.seek(pos).map_err(StreamError::Io)?;
        self.eof = false;

        Ok(())
    }

    /// Seek to the start of the stream.
    pub fn rewind(&mut self) -> Result<(), StreamError> {
        self.seek(SeekFrom::Start(0))
    }

    /// Current stream position.
    pub fn tell(&mut self) -> Result<u64, StreamError> {
        let resource = self.resource_mut()?;
        resource.stream_position().map_err(StreamError::Io)
    }

    /// True once a read has hit the end of the resource, or when detached.
    pub fn eof(&self) -> bool {
        self.resource.is_none() || self.eof
    }

    /// Total size of the underlying resource, if it can report one.
    pub fn size(&self) -> Option<u64> {
        match self.resource.as_ref()? {
            Resource::Buffer(cursor) => Some(cursor.get_ref().len() as u64),
            Resource::File(file) => file.metadata().ok().map(|m| m.len()),
        }
    }

    /// Read everything from the current position to the end.
    pub fn contents(&mut self) -> Result<Vec<u8>, StreamError> {
        if self.resource.is_none() {
            return Err(StreamError::Detached);
        }
        if !self.readable {
            return Err(StreamError::NotReadable);
        }

        let resource = self.resource_mut()?;
        let mut out = Vec::new();
        resource.read_to_end(&mut out).map_err(StreamError::Io)?;
        self.eof = true;

        Ok(out)
    }

    /// Close the stream. Idempotent; further operations fail as detached.
    pub fn close(&mut self) {
        self.detach();
    }

    /// Hand back the raw resource and leave the stream detached.
    pub fn detach(&mut self) -> Option<Resource> {
        self.readable = false;
        self.writable = false;
        self.seekable = false;
        self.eof = false;
        self.resource.take()
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a [`Stream`]; messages hold their bodies through this.
#[derive(Clone, Debug)]
pub struct Body {
    stream: Rc<RefCell<Stream>>,
}

impl Body {
    /// An empty in-memory body.
    pub fn empty() -> Self {
        Self::from_stream(Stream::new())
    }

    /// Take ownership of a stream as a message body.
    pub fn from_stream(stream: Stream) -> Self {
        Body {
            stream: Rc::new(RefCell::new(stream)),
        }
    }

    /// Wrap an already-open file.
    pub fn from_file(file: File, mode: FileMode) -> Self {
        Self::from_stream(Stream::from_file(file, mode))
    }

    /// Mutable access to the underlying stream.
    pub fn stream(&self) -> RefMut<'_, Stream> {
        self.stream.borrow_mut()
    }

    /// Size of the underlying stream, if known.
    pub fn size(&self) -> Option<u64> {
        self.stream.borrow().size()
    }

    /// Read from the current position to the end.
    pub fn contents(&self) -> Result<Vec<u8>, StreamError> {
        self.stream.borrow_mut().contents()
    }

    /// Append to the stream at its current position.
    pub fn write(&self, data: &[u8]) -> Result<usize, StreamError> {
        self.stream.borrow_mut().write(data)
    }

    /// Seek the stream back to the start.
    pub fn rewind(&self) -> Result<(), StreamError> {
        self.stream.borrow_mut().rewind()
    }

    /// Best-effort full contents: rewind if seekable, read to end. Any
    /// failure collapses to an empty vector; this backs stringification,
    /// which must not fail.
    pub fn full_contents(&self) -> Vec<u8> {
        let Ok(mut stream) = self.stream.try_borrow_mut() else {
            return Vec::new();
        };
        if stream.is_seekable() && stream.rewind().is_err() {
            return Vec::new();
        }

        stream.contents().unwrap_or_default()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.full_contents()))
    }
}

impl From<Stream> for Body {
    fn from(stream: Stream) -> Self {
        Self::from_stream(stream)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Self::from_stream(Stream::from_bytes(s.as_bytes().to_vec()))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::from_stream(Stream::from_bytes(s.into_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_stream(Stream::from_bytes(bytes))
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Self::from_stream(Stream::from_bytes(bytes.to_vec()))
    }
}

impl From<bool> for Body {
    fn from(v: bool) -> Self {
        Self::from(v.to_string())
    }
}

impl From<i64> for Body {
    fn from(v: i64) -> Self {
        Self::from(v.to_string())
    }
}

impl From<f64> for Body {
    fn from(v: f64) -> Self {
        Self::from(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_seek_roundtrip() {
        let mut stream = Stream::new();
        assert_eq!(stream.write(b"hello world").unwrap(), 11);
        stream.rewind().unwrap();
        assert_eq!(stream.read(5).unwrap(), b"hello");
        assert_eq!(stream.tell().unwrap(), 5);
        stream.seek(SeekFrom::Start(6)).unwrap();
        assert_eq!(stream.contents().unwrap(), b"world");
    }

    #[test]
    fn from_bytes_is_positioned_at_start() {
        let mut stream = Stream::from_bytes(b"abc".to_vec());
        assert_eq!(stream.tell().unwrap(), 0);
        assert_eq!(stream.contents().unwrap(), b"abc");
    }

    #[test]
    fn size_reports_buffer_length() {
        let mut stream = Stream::from_bytes(b"abcd".to_vec());
        assert_eq!(stream.size(), Some(4));
        stream.read(2).unwrap();
        assert_eq!(stream.size(), Some(4));
    }

    #[test]
    fn eof_only_after_reading_past_end() {
        let mut stream = Stream::from_bytes(b"ab".to_vec());
        assert!(!stream.eof());
        stream.read(2).unwrap();
        assert!(!stream.eof());
        stream.read(1).unwrap();
        assert!(stream.eof());
        stream.rewind().unwrap();
        assert!(!stream.eof());
    }

    #[test]
    fn zero_length_read_returns_empty() {
        let mut stream = Stream::from_bytes(b"ab".to_vec());
        assert_eq!(stream.read(0).unwrap(), Vec::<u8>::new());
        assert_eq!(stream.tell().unwrap(), 0);
    }

    #[test]
    fn detached_stream_fails_every_operation() {
        let mut stream = Stream::from_bytes(b"ab".to_vec());
        let resource = stream.detach();
        assert!(resource.is_some());
        assert!(!stream.is_readable());
        assert!(!stream.is_writable());
        assert!(!stream.is_seekable());
        assert!(stream.eof());
        assert_eq!(stream.size(), None);
        assert!(matches!(stream.read(1), Err(StreamError::Detached)));
        assert!(matches!(stream.write(b"x"), Err(StreamError::Detached)));
        assert!(matches!(stream.rewind(), Err(StreamError::Detached)));
        assert!(matches!(stream.tell(), Err(StreamError::Detached)));
        assert!(matches!(stream.contents(), Err(StreamError::Detached)));
    }

    #[test]
    fn close_is_idempotent() {
        let mut stream = Stream::new();
        stream.close();
        stream.close();
        assert!(matches!(stream.read(1), Err(StreamError::Detached)));
    }

    #[test]
    fn write_fails_on_read_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"content").unwrap();

        let mut stream = Stream::open(&path).unwrap();
        assert!(stream.is_readable());
        assert!(!stream.is_writable());
        assert!(matches!(stream.write(b"x"), Err(StreamError::NotWritable)));
        assert_eq!(stream.contents().unwrap(), b"content");
    }

    #[test]
    fn read_fails_on_write_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut stream = Stream::create(dir.path().join("out.bin")).unwrap();
        stream.write(b"x").unwrap();
        assert!(matches!(stream.read(1), Err(StreamError::NotReadable)));
    }

    #[test]
    fn temp_stream_reads_back_what_was_written() {
        let mut stream = Stream::temp().unwrap();
        stream.write(b"spooled").unwrap();
        stream.rewind().unwrap();
        assert_eq!(stream.contents().unwrap(), b"spooled");
        assert_eq!(stream.size(), Some(7));
    }

    #[test]
    fn body_clone_shares_the_stream() {
        let body = Body::from("shared");
        let alias = body.clone();
        body.stream().seek(SeekFrom::End(0)).unwrap();
        body.write(b" bytes").unwrap();
        assert_eq!(alias.full_contents(), b"shared bytes");
    }

    #[test]
    fn body_display_is_full_contents() {
        let body = Body::from("payload");
        // Consume once; Display must still see everything via rewind.
        body.contents().unwrap();
        assert_eq!(body.to_string(), "payload");
    }

    #[test]
    fn body_display_swallows_errors() {
        let body = Body::empty();
        body.stream().close();
        assert_eq!(body.to_string(), "");
    }

    #[test]
    fn scalar_bodies_stringify() {
        assert_eq!(Body::from(true).to_string(), "true");
        assert_eq!(Body::from(42i64).to_string(), "42");
        assert_eq!(Body::from(1.5f64).to_string(), "1.5");
    }
}
