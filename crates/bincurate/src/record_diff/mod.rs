//! Record signature diff engine: compares two decoder-produced record
//! sequences by content identity rather than position.
//!
//! Position-indexed comparison is useless on real containers: any record
//! whose encoded size changes shifts every later record's offset, and a
//! naive positional diff reports the whole remainder as rewritten. Matching
//! records by a decoder-chosen stable [`Signature`] restores locality — one
//! semantic change produces one diff entry wherever it falls in the buffer.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::render::hex_pairs;

/// Which input sequence a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceSide {
    Old,
    New,
}

impl fmt::Display for SequenceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceSide::Old => f.write_str("old"),
            SequenceSide::New => f.write_str("new"),
        }
    }
}

/// Errors surfaced by [`diff`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordDiffError {
    /// Two records in one sequence share a signature. Matching across
    /// versions would require guessing which record is "the" one, so the
    /// comparison aborts instead.
    #[error(
        "duplicate signature {signature} in {side} sequence (records #{first} and #{second})"
    )]
    AmbiguousSignature {
        side: SequenceSide,
        signature: Signature,
        first: usize,
        second: usize,
    },
}

/// Decoder-chosen stable key, the second half of a [`Signature`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SigKey {
    U64(u64),
    I64(i64),
    Str(String),
    Bytes(Vec<u8>),
}

impl fmt::Display for SigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigKey::U64(v) => write!(f, "{v}"),
            SigKey::I64(v) => write!(f, "{v}"),
            SigKey::Str(s) => write!(f, "{s:?}"),
            SigKey::Bytes(b) => write!(f, "[{}]", hex_pairs(b)),
        }
    }
}

impl From<u64> for SigKey {
    fn from(v: u64) -> Self {
        SigKey::U64(v)
    }
}

impl From<i64> for SigKey {
    fn from(v: i64) -> Self {
        SigKey::I64(v)
    }
}

impl From<&str> for SigKey {
    fn from(v: &str) -> Self {
        SigKey::Str(v.to_string())
    }
}

impl From<String> for SigKey {
    fn from(v: String) -> Self {
        SigKey::Str(v)
    }
}

impl From<Vec<u8>> for SigKey {
    fn from(v: Vec<u8>) -> Self {
        SigKey::Bytes(v)
    }
}

/// Stable identity of one logical record across buffer versions.
///
/// Two records from different versions denote the same logical record iff
/// their signatures are equal; the signature must therefore survive offset
/// shifts and re-encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub type_tag: String,
    pub key: SigKey,
}

impl Signature {
    pub fn new(type_tag: impl Into<String>, key: impl Into<SigKey>) -> Self {
        Self {
            type_tag: type_tag.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.type_tag, self.key)
    }
}

/// Decoder seam for the diff engine.
///
/// The engine knows nothing about the record's encoding; it only asks for
/// the record's identity and its named field values.
pub trait KeyedRecord {
    /// Stable identity of this record across buffer versions.
    fn signature(&self) -> Signature;

    /// Named field values, in the decoder's declared order.
    fn fields(&self) -> Vec<(String, Value)>;
}

/// Ready-made record type for decoders that need no custom one: a typed,
/// keyed slice of one buffer version.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_tag: String,
    /// Absolute offset of the record in its buffer version.
    pub offset: usize,
    pub bytes: Vec<u8>,
    pub key: SigKey,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl KeyedRecord for Record {
    fn signature(&self) -> Signature {
        Signature {
            type_tag: self.type_tag.clone(),
            key: self.key.clone(),
        }
    }

    fn fields(&self) -> Vec<(String, Value)> {
        self.fields.clone()
    }
}

/// How one logical record changed between versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Modified,
    Added,
    Removed,
}

/// One differing field of a modified record. Fields present on only one side
/// pair with `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff {
    pub path: String,
    pub old: Value,
    pub new: Value,
}

/// One reported change, borrowing the input records.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDiffEntry<'a, R> {
    pub status: ChangeStatus,
    pub signature: Signature,
    pub old: Option<&'a R>,
    pub new: Option<&'a R>,
    /// Populated only for `Modified` entries, and never empty there.
    pub field_diffs: Vec<FieldDiff>,
}

/// Compares two ordered record sequences by signature.
///
/// The output order is part of the contract: `Modified` entries first, in
/// the order their signature appears in the new sequence; then `Added`
/// entries in new-sequence order; then `Removed` entries in old-sequence
/// order. Records whose fields are all equal produce no entry.
pub fn diff<'a, R: KeyedRecord>(
    old: &'a [R],
    new: &'a [R],
) -> Result<Vec<RecordDiffEntry<'a, R>>, RecordDiffError> {
    let old_by_sig = index_by_signature(old, SequenceSide::Old)?;
    let new_by_sig = index_by_signature(new, SequenceSide::New)?;

    let mut entries = Vec::new();

    for (sig, new_rec) in &new_by_sig {
        if let Some(old_rec) = old_by_sig.get(sig) {
            let field_diffs = diff_fields(*old_rec, *new_rec);
            if !field_diffs.is_empty() {
                entries.push(RecordDiffEntry {
                    status: ChangeStatus::Modified,
                    signature: sig.clone(),
                    old: Some(*old_rec),
                    new: Some(*new_rec),
                    field_diffs,
                });
            }
        }
    }

    for (sig, new_rec) in &new_by_sig {
        if !old_by_sig.contains_key(sig) {
            entries.push(RecordDiffEntry {
                status: ChangeStatus::Added,
                signature: sig.clone(),
                old: None,
                new: Some(*new_rec),
                field_diffs: Vec::new(),
            });
        }
    }

    for (sig, old_rec) in &old_by_sig {
        if !new_by_sig.contains_key(sig) {
            entries.push(RecordDiffEntry {
                status: ChangeStatus::Removed,
                signature: sig.clone(),
                old: Some(*old_rec),
                new: None,
                field_diffs: Vec::new(),
            });
        }
    }

    Ok(entries)
}

/// Signature → record in first-appearance order; duplicate signatures are a
/// decoder contract violation.
fn index_by_signature<R: KeyedRecord>(
    seq: &[R],
    side: SequenceSide,
) -> Result<IndexMap<Signature, &R>, RecordDiffError> {
    let mut map: IndexMap<Signature, &R> = IndexMap::with_capacity(seq.len());
    for (i, rec) in seq.iter().enumerate() {
        let sig = rec.signature();
        if let Some(first) = map.get_index_of(&sig) {
            return Err(RecordDiffError::AmbiguousSignature {
                side,
                signature: sig,
                first,
                second: i,
            });
        }
        map.insert(sig, rec);
    }
    Ok(map)
}

/// Differing fields, in new-record field order, then old-only fields in
/// old-record order.
fn diff_fields<R: KeyedRecord>(old: &R, new: &R) -> Vec<FieldDiff> {
    let old_fields: IndexMap<String, Value> = old.fields().into_iter().collect();
    let new_fields: IndexMap<String, Value> = new.fields().into_iter().collect();

    let mut out = Vec::new();
    for (path, new_val) in &new_fields {
        match old_fields.get(path) {
            Some(old_val) if old_val == new_val => {}
            Some(old_val) => out.push(FieldDiff {
                path: path.clone(),
                old: old_val.clone(),
                new: new_val.clone(),
            }),
            None => out.push(FieldDiff {
                path: path.clone(),
                old: Value::Null,
                new: new_val.clone(),
            }),
        }
    }
    for (path, old_val) in &old_fields {
        if !new_fields.contains_key(path) {
            out.push(FieldDiff {
                path: path.clone(),
                old: old_val.clone(),
                new: Value::Null,
            });
        }
    }
    out
}
