//! Byte buffer primitives shared by the curator and the decoders that
//! drive it.
//!
//! [`ByteReader`] is a zero-copy cursor over a borrowed slice. Every read is
//! bounds-checked: a decoder probing an unknown structure must never panic,
//! and a failed read must leave the cursor where it was so the caller can
//! fall back and try something else. [`ByteWriter`] is the growable
//! counterpart used to assemble buffers, mostly in tests and fixtures.

mod reader;
mod writer;

pub use reader::ByteReader;
pub use writer::ByteWriter;

use thiserror::Error;

/// Errors produced by bounds-checked buffer reads.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The read would run past the end of the buffer.
    #[error("read past end of buffer")]
    EndOfBuffer,
    /// The bytes are not valid UTF-8.
    #[error("bytes are not valid UTF-8")]
    InvalidUtf8,
}
