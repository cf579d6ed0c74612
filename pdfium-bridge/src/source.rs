//! Byte sources backed by readers

use crate::engine::ByteSource;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// [`ByteSource`] over any seekable reader.
///
/// The length is measured once at construction.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    len: u64,
}

impl ReaderSource<File> {
    /// Open a file for lazy block reads.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl ReaderSource<Cursor<Vec<u8>>> {
    /// Serve blocks from an in-memory copy of the document.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        Self {
            reader: Cursor::new(bytes),
            len,
        }
    }
}

impl<R: Read + Seek> ReaderSource<R> {
    pub fn new(mut reader: R) -> io::Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        Ok(Self { reader, len })
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek + Send> ByteSource for ReaderSource<R> {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_block(&mut self, position: u64, buf: &mut [u8]) -> io::Result<()> {
        let end = position
            .checked_add(buf.len() as u64)
            .filter(|&end| end <= self.len);
        if end.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "block {}+{} beyond end of source ({} bytes)",
                    position,
                    buf.len(),
                    self.len
                ),
            ));
        }
        self.reader.seek(SeekFrom::Start(position))?;
        self.reader.read_exact(buf)
    }
}
