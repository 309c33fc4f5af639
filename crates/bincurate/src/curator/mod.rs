//! Region model and curator: incremental accounting of claimed vs unclaimed
//! byte ranges over one buffer.
//!
//! A decoder walks the buffer, claiming the ranges it understands in whatever
//! order it likes. [`Curator::get_regions`] then derives a complete partition
//! of the buffer: every gap between claims becomes an explicit unclaimed
//! region, so no byte can be silently dropped from a report. Double-claiming
//! is rejected with [`CuratorError::Overlap`], which is what makes the
//! lossless guarantee mechanically enforceable.
//!
//! ```
//! use bincurate::curator::{interp, Curator};
//!
//! let data = [0x34, 0x12, b'O', b'K', 0xff, 0xff];
//! let mut cur = Curator::new(&data);
//! cur.claim("magic", 2, interp::u16_le)?;
//! cur.claim("tag", 2, interp::ascii)?;
//!
//! let regions = cur.get_regions();
//! assert_eq!(regions.len(), 3); // magic, tag, trailing unclaimed bytes
//! assert_eq!(regions.iter().map(|r| r.len()).sum::<usize>(), data.len());
//! # Ok::<(), bincurate::curator::CuratorError>(())
//! ```

pub mod interp;

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced to the decoder driving a [`Curator`].
///
/// Both are local, recoverable conditions: a decoder that hits one should
/// stop claiming that region and let the remainder surface as unclaimed,
/// rather than abort the whole pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CuratorError {
    /// A claim or seek would run past the end of the buffer.
    #[error("offset {offset} is out of bounds (buffer size {size})")]
    OutOfBounds { offset: usize, size: usize },
    /// A claim intersects bytes that are already claimed.
    #[error(
        "claim \"{label}\" ({start}..{end}) overlaps \"{other_label}\" ({other_start}..{other_end})"
    )]
    Overlap {
        label: String,
        start: usize,
        end: usize,
        other_label: String,
        other_start: usize,
        other_end: usize,
    },
}

/// A byte range a decoder has interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimedRegion<'a> {
    pub label: String,
    pub start: usize,
    pub bytes: &'a [u8],
    /// Interpreted value, when the claim carried an interpreter.
    pub value: Option<Value>,
}

impl ClaimedRegion<'_> {
    pub fn end(&self) -> usize {
        self.start + self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A byte range no decoder has interpreted. Synthesized at finalize time.
#[derive(Debug, Clone, PartialEq)]
pub struct UnclaimedRegion<'a> {
    pub start: usize,
    pub bytes: &'a [u8],
}

impl UnclaimedRegion<'_> {
    pub fn end(&self) -> usize {
        self.start + self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One element of the partition returned by [`Curator::get_regions`].
///
/// Regions are contiguous, non-overlapping, and never empty; their total
/// length equals the buffer length.
#[derive(Debug, Clone, PartialEq)]
pub enum Region<'a> {
    Claimed(ClaimedRegion<'a>),
    Unclaimed(UnclaimedRegion<'a>),
}

impl<'a> Region<'a> {
    pub fn start(&self) -> usize {
        match self {
            Region::Claimed(r) => r.start,
            Region::Unclaimed(r) => r.start,
        }
    }

    pub fn end(&self) -> usize {
        self.start() + self.len()
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// The raw bytes of this region.
    pub fn bytes(&self) -> &'a [u8] {
        match self {
            Region::Claimed(r) => r.bytes,
            Region::Unclaimed(r) => r.bytes,
        }
    }

    /// The claim label, for claimed regions.
    pub fn label(&self) -> Option<&str> {
        match self {
            Region::Claimed(r) => Some(&r.label),
            Region::Unclaimed(_) => None,
        }
    }

    pub fn is_claimed(&self) -> bool {
        matches!(self, Region::Claimed(_))
    }
}

#[derive(Debug, Clone)]
struct Claim {
    label: String,
    start: usize,
    size: usize,
    value: Option<Value>,
}

impl Claim {
    fn end(&self) -> usize {
        self.start + self.size
    }
}

/// Bookkeeper for one decoding pass over one buffer.
///
/// Borrows the buffer read-only and owns only the claim ledger. Claims are
/// kept in insertion order and sorted once at finalize time, so out-of-order
/// claiming costs nothing extra.
#[derive(Debug)]
pub struct Curator<'a> {
    data: &'a [u8],
    cursor: usize,
    claims: Vec<Claim>,
}

impl<'a> Curator<'a> {
    /// Creates a curator at offset 0 with no claims.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: 0,
            claims: Vec::new(),
        }
    }

    /// Buffer length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The underlying buffer.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Moves the cursor to an absolute offset. `len()` is a valid target.
    ///
    /// Seeking does not materialize an unclaimed region; gaps are only
    /// synthesized by [`get_regions`](Self::get_regions).
    pub fn seek(&mut self, offset: usize) -> Result<(), CuratorError> {
        if offset > self.data.len() {
            return Err(CuratorError::OutOfBounds {
                offset,
                size: self.data.len(),
            });
        }
        self.cursor = offset;
        Ok(())
    }

    /// Moves the cursor forward by `size` bytes.
    pub fn skip(&mut self, size: usize) -> Result<(), CuratorError> {
        self.seek(self.cursor.checked_add(size).unwrap_or(usize::MAX))
    }

    /// Claims `size` bytes at the cursor, interprets them, advances the
    /// cursor, and returns the interpreted value.
    ///
    /// The claim fails with [`CuratorError::OutOfBounds`] when it would run
    /// past the buffer and with [`CuratorError::Overlap`] when it intersects
    /// any previous claim, regardless of claim order. A failed claim leaves
    /// the curator untouched.
    pub fn claim<F>(&mut self, label: &str, size: usize, interpret: F) -> Result<Value, CuratorError>
    where
        F: FnOnce(&'a [u8]) -> Value,
    {
        let start = self.check_claim(label, size)?;
        let bytes = &self.data[start..start + size];
        let value = interpret(bytes);
        self.record(label, start, size, Some(value.clone()));
        Ok(value)
    }

    /// Claims `size` bytes at the cursor without interpreting them, advances
    /// the cursor, and returns the raw slice.
    pub fn claim_raw(&mut self, label: &str, size: usize) -> Result<&'a [u8], CuratorError> {
        let start = self.check_claim(label, size)?;
        let bytes = &self.data[start..start + size];
        self.record(label, start, size, None);
        Ok(bytes)
    }

    fn check_claim(&self, label: &str, size: usize) -> Result<usize, CuratorError> {
        let start = self.cursor;
        if size > self.data.len() - start {
            return Err(CuratorError::OutOfBounds {
                offset: start.saturating_add(size),
                size: self.data.len(),
            });
        }
        let end = start + size;
        for c in &self.claims {
            if start < c.end() && c.start < end {
                return Err(CuratorError::Overlap {
                    label: label.to_string(),
                    start,
                    end,
                    other_label: c.label.clone(),
                    other_start: c.start,
                    other_end: c.end(),
                });
            }
        }
        Ok(start)
    }

    fn record(&mut self, label: &str, start: usize, size: usize, value: Option<Value>) {
        // Zero-size claims interpret an empty slice but produce no region:
        // regions always satisfy start < end.
        if size > 0 {
            self.claims.push(Claim {
                label: label.to_string(),
                start,
                size,
                value,
            });
        }
        self.cursor = start + size;
    }

    /// Finalizes the pass: sorts the claims and fills every gap with an
    /// unclaimed region, returning a complete partition of the buffer.
    ///
    /// Consuming `self` makes finalize-once part of the type signature.
    pub fn get_regions(self) -> Vec<Region<'a>> {
        let Curator {
            data, mut claims, ..
        } = self;
        claims.sort_by_key(|c| c.start);

        let mut regions = Vec::with_capacity(claims.len() * 2 + 1);
        let mut last_end = 0;
        for c in claims {
            if c.start > last_end {
                regions.push(Region::Unclaimed(UnclaimedRegion {
                    start: last_end,
                    bytes: &data[last_end..c.start],
                }));
            }
            let end = c.end();
            regions.push(Region::Claimed(ClaimedRegion {
                label: c.label,
                start: c.start,
                bytes: &data[c.start..end],
                value: c.value,
            }));
            last_end = end;
        }
        if last_end < data.len() {
            regions.push(Region::Unclaimed(UnclaimedRegion {
                start: last_end,
                bytes: &data[last_end..],
            }));
        }
        regions
    }
}
