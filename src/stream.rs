use std::io::{Cursor, Read};

pub mod concat;

/// One image's raw bytes, or any other body fragment, read incrementally.
///
/// Both in-memory buffers and external readers (files, sockets, response bodies) are carried as
/// the same boxed [`Read`] so they can be chained without materializing either.
pub type ByteStream = Box<dyn Read + Send + 'static>;

/// Wrap owned bytes as a [`ByteStream`].
pub fn image_stream(bytes: impl Into<Vec<u8>>) -> ByteStream {
    Box::new(Cursor::new(bytes.into()))
}

/// A stream that is immediately at end-of-stream.
pub fn empty_stream() -> ByteStream {
    Box::new(std::io::empty())
}

pub use concat::ChainReader;
