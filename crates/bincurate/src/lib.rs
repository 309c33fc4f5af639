//! bincurate — lossless region accounting and shift-tolerant diffing for
//! reverse-engineering opaque binary buffers.
//!
//! Three components, independent of each other except via shared data types:
//!
//! - [`curator`] — incremental bookkeeping of claimed vs unclaimed byte
//!   ranges over one buffer. At finalize time every byte is accounted for,
//!   either as an interpreted region or an explicitly-flagged unknown one.
//! - [`byte_diff`] — edit script between two raw buffers, aligned on common
//!   blocks so a single inserted byte does not make everything after it look
//!   different.
//! - [`record_diff`] — comparison of two decoder-produced record sequences
//!   by content identity rather than position.
//!
//! [`render`] is the reference consumer of the region and diff types: it
//! shows everything, and the only summarization it ever applies is the
//! information-preserving collapse of long single-byte runs.

pub mod byte_diff;
pub mod curator;
pub mod record_diff;
pub mod render;
