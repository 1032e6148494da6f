use std::{
    collections::VecDeque,
    io::{self, Read},
};

use super::ByteStream;

/// Reads each source to exhaustion before moving on to the next one.
///
/// End-of-stream is reported only after the last source drains. A source is dropped as soon as it
/// reports end-of-stream, so nothing beyond the caller's read buffer is held in memory.
#[derive(Default)]
pub struct ChainReader {
    sources: VecDeque<ByteStream>,
}

impl ChainReader {
    pub fn new(sources: impl IntoIterator<Item = ByteStream>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
        }
    }

    /// Append a source after the ones already queued.
    pub fn push(&mut self, source: ByteStream) {
        self.sources.push_back(source);
    }

    /// Number of sources that have not reached end-of-stream yet.
    pub fn pending(&self) -> usize {
        self.sources.len()
    }
}

impl Read for ChainReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while let Some(source) = self.sources.front_mut() {
            match source.read(buf) {
                Ok(0) => {
                    self.sources.pop_front();
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // The failing source stays queued; a caller may retry the read.
                Err(e) => return Err(e),
            }
        }
        Ok(0)
    }
}

impl std::fmt::Debug for ChainReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainReader")
            .field("pending", &self.sources.len())
            .finish()
    }
}
