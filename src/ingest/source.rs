//! Source location and chunked reading of a possibly growing file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Where the scene description lives and how large it is declared to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub path: PathBuf,
    /// Total size announced by the host; `None` when unknown.
    pub declared_size: Option<u64>,
}

impl SourceDescriptor {
    pub fn new(path: impl Into<PathBuf>, declared_size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            declared_size,
        }
    }

    /// Decode stream decoder info: 4-byte big-endian size, then the file name.
    ///
    /// A declared size of zero means unknown.
    pub fn parse(decoder_info: &[u8]) -> Option<Self> {
        if decoder_info.len() <= 4 {
            return None;
        }
        let size = u32::from_be_bytes([
            decoder_info[0],
            decoder_info[1],
            decoder_info[2],
            decoder_info[3],
        ]);
        let name = std::str::from_utf8(&decoder_info[4..]).ok()?;
        let name = name.trim_end_matches('\0');
        if name.is_empty() {
            return None;
        }
        Some(Self::new(
            name,
            if size == 0 { None } else { Some(u64::from(size)) },
        ))
    }

    pub fn encode(&self) -> Vec<u8> {
        let size = self
            .declared_size
            .map(|s| u32::try_from(s).unwrap_or(u32::MAX))
            .unwrap_or(0);
        let mut out = size.to_be_bytes().to_vec();
        out.extend_from_slice(self.path.to_string_lossy().as_bytes());
        out
    }
}

/// Reads fixed-size chunks from a saved position, reopening nothing between ticks.
#[derive(Debug)]
pub(crate) struct ChunkReader {
    file: File,
    position: u64,
}

impl ChunkReader {
    pub(crate) fn open(path: &Path) -> io::Result<Self> {
        Ok(Self {
            file: File::open(path)?,
            position: 0,
        })
    }

    /// Read up to `buf.len()` bytes. Zero means nothing more is available yet.
    pub(crate) fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.seek(SeekFrom::Start(self.position))?;
        let read = self.file.read(buf)?;
        self.position += read as u64;
        Ok(read)
    }

    pub(crate) fn position(&self) -> u64 {
        self.position
    }
}
