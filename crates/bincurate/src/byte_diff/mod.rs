//! Byte-level diff engine: greedy longest-common-block alignment between two
//! raw buffers.
//!
//! The engine repeatedly finds the longest contiguous run of bytes common to
//! the unmatched remainders of both buffers (ties broken by earliest
//! position in the old buffer, then in the new one) and aligns around it, so
//! an insertion or deletion does not make everything after it look
//! different. Gaps between matched blocks become `Delete`, `Insert`, or
//! `Replace` operations; matched blocks become `Equal`.
//!
//! The old-side spans of the returned operations tile the old buffer exactly
//! and in order, and likewise for the new side — replaying the script
//! reproduces either input byte for byte.
//!
//! Runtime is fine for buffers up to tens of kilobytes; inputs with many
//! small scattered changes can degrade toward quadratic behavior. That is an
//! accepted limitation of the block-matching approach, not a defect.

use serde::Serialize;

/// What one [`DiffOp`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Equal,
    Insert,
    Delete,
    Replace,
}

/// One edit operation over borrowed spans of the two input buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOp<'a> {
    pub kind: DiffKind,
    /// Offset of `old_bytes` in the old buffer.
    pub old_start: usize,
    /// Offset of `new_bytes` in the new buffer.
    pub new_start: usize,
    /// Old-side span; empty for `Insert`.
    pub old_bytes: &'a [u8],
    /// New-side span; empty for `Delete`.
    pub new_bytes: &'a [u8],
}

impl DiffOp<'_> {
    pub fn old_end(&self) -> usize {
        self.old_start + self.old_bytes.len()
    }

    pub fn new_end(&self) -> usize {
        self.new_start + self.new_bytes.len()
    }

    pub fn is_change(&self) -> bool {
        self.kind != DiffKind::Equal
    }
}

/// Aggregate view of an edit script: per-kind operation and byte counts.
///
/// `net` always equals `len(new) - len(old)`; replace byte counts are kept
/// per side so that identity holds when a replacement changes size.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub equal_ops: usize,
    pub equal_bytes: usize,
    pub insert_ops: usize,
    pub inserted_bytes: usize,
    pub delete_ops: usize,
    pub deleted_bytes: usize,
    pub replace_ops: usize,
    pub replaced_old_bytes: usize,
    pub replaced_new_bytes: usize,
    pub net: i64,
}

impl DiffSummary {
    /// Number of non-`Equal` operations.
    pub fn change_ops(&self) -> usize {
        self.insert_ops + self.delete_ops + self.replace_ops
    }
}

/// Computes the complete edit script from `old` to `new`.
///
/// Deterministic: identical inputs always yield the identical operation
/// sequence. Two identical buffers yield a single `Equal` operation (none at
/// all when both are empty).
pub fn diff<'a>(old: &'a [u8], new: &'a [u8]) -> Vec<DiffOp<'a>> {
    let blocks = matching_blocks(old, new);
    let sentinel = Match {
        old: old.len(),
        new: new.len(),
        len: 0,
    };

    let mut ops = Vec::with_capacity(blocks.len() * 2 + 1);
    let mut i = 0;
    let mut j = 0;
    for m in blocks.into_iter().chain(std::iter::once(sentinel)) {
        if i < m.old || j < m.new {
            let kind = match (i < m.old, j < m.new) {
                (true, true) => DiffKind::Replace,
                (true, false) => DiffKind::Delete,
                (false, true) => DiffKind::Insert,
                (false, false) => unreachable!(),
            };
            ops.push(DiffOp {
                kind,
                old_start: i,
                new_start: j,
                old_bytes: &old[i..m.old],
                new_bytes: &new[j..m.new],
            });
        }
        if m.len > 0 {
            ops.push(DiffOp {
                kind: DiffKind::Equal,
                old_start: m.old,
                new_start: m.new,
                old_bytes: &old[m.old..m.old + m.len],
                new_bytes: &new[m.new..m.new + m.len],
            });
        }
        i = m.old + m.len;
        j = m.new + m.len;
    }
    ops
}

/// Like [`diff`], with `Equal` operations filtered out.
///
/// The filtered list no longer tiles the buffers; use [`diff`] when the
/// script has to be replayed or summarized.
pub fn diff_changes<'a>(old: &'a [u8], new: &'a [u8]) -> Vec<DiffOp<'a>> {
    diff(old, new).into_iter().filter(DiffOp::is_change).collect()
}

/// Sums a complete edit script into a [`DiffSummary`].
pub fn summarize(ops: &[DiffOp]) -> DiffSummary {
    let mut s = DiffSummary::default();
    for op in ops {
        match op.kind {
            DiffKind::Equal => {
                s.equal_ops += 1;
                s.equal_bytes += op.old_bytes.len();
            }
            DiffKind::Insert => {
                s.insert_ops += 1;
                s.inserted_bytes += op.new_bytes.len();
            }
            DiffKind::Delete => {
                s.delete_ops += 1;
                s.deleted_bytes += op.old_bytes.len();
            }
            DiffKind::Replace => {
                s.replace_ops += 1;
                s.replaced_old_bytes += op.old_bytes.len();
                s.replaced_new_bytes += op.new_bytes.len();
            }
        }
    }
    s.net = (s.inserted_bytes + s.replaced_new_bytes) as i64
        - (s.deleted_bytes + s.replaced_old_bytes) as i64;
    s
}

/// Reconstructs the old buffer from a complete edit script.
pub fn reconstruct_old(ops: &[DiffOp]) -> Vec<u8> {
    ops.iter()
        .flat_map(|op| op.old_bytes.iter().copied())
        .collect()
}

/// Reconstructs the new buffer from a complete edit script.
pub fn reconstruct_new(ops: &[DiffOp]) -> Vec<u8> {
    ops.iter()
        .flat_map(|op| op.new_bytes.iter().copied())
        .collect()
}

// ── Block matching ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Match {
    old: usize,
    new: usize,
    len: usize,
}

/// Positions of each byte value in `new`, ascending.
fn byte_positions(new: &[u8]) -> Vec<Vec<usize>> {
    let mut pos = vec![Vec::new(); 256];
    for (j, &b) in new.iter().enumerate() {
        pos[b as usize].push(j);
    }
    pos
}

/// Longest run common to `old[alo..ahi]` and `new[blo..bhi]`.
///
/// Scanning old positions ascending and candidate new positions ascending,
/// with a strictly-greater length test, makes ties resolve to the earliest
/// position in old, then the earliest in new.
fn longest_match(
    old: &[u8],
    pos: &[Vec<usize>],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> Match {
    use std::collections::HashMap;

    let mut best = Match {
        old: alo,
        new: blo,
        len: 0,
    };
    // run_len[j] = length of the common run ending at (i - 1, j - 1).
    let mut run_len: HashMap<usize, usize> = HashMap::new();
    for (i, &b) in old.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        for &j in &pos[b as usize] {
            if j < blo {
                continue;
            }
            if j >= bhi {
                break;
            }
            let k = j
                .checked_sub(1)
                .and_then(|p| run_len.get(&p).copied())
                .unwrap_or(0)
                + 1;
            next.insert(j, k);
            if k > best.len {
                best = Match {
                    old: i + 1 - k,
                    new: j + 1 - k,
                    len: k,
                };
            }
        }
        run_len = next;
    }
    best
}

/// All matched blocks, sorted by old offset, adjacent blocks merged.
fn matching_blocks(old: &[u8], new: &[u8]) -> Vec<Match> {
    let pos = byte_positions(new);
    let mut queue = vec![(0, old.len(), 0, new.len())];
    let mut blocks = Vec::new();

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let m = longest_match(old, &pos, alo, ahi, blo, bhi);
        if m.len == 0 {
            continue;
        }
        if alo < m.old && blo < m.new {
            queue.push((alo, m.old, blo, m.new));
        }
        if m.old + m.len < ahi && m.new + m.len < bhi {
            queue.push((m.old + m.len, ahi, m.new + m.len, bhi));
        }
        blocks.push(m);
    }

    blocks.sort_by_key(|m| (m.old, m.new));

    let mut merged: Vec<Match> = Vec::with_capacity(blocks.len());
    for m in blocks {
        if let Some(last) = merged.last_mut() {
            if last.old + last.len == m.old && last.new + last.len == m.new {
                last.len += m.len;
                continue;
            }
        }
        merged.push(m);
    }
    merged
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(ops: &[DiffOp]) -> Vec<DiffKind> {
        ops.iter().map(|op| op.kind).collect()
    }

    #[test]
    fn identical_buffers_yield_single_equal_op() {
        let data = b"some identical bytes";
        let ops = diff(data, data);
        assert_eq!(kinds(&ops), vec![DiffKind::Equal]);
        assert_eq!(ops[0].old_bytes, data.as_ref());

        let s = summarize(&ops);
        assert_eq!(s.change_ops(), 0);
        assert_eq!(s.net, 0);
        assert_eq!(s.equal_bytes, data.len());
    }

    #[test]
    fn empty_buffers_yield_no_ops() {
        assert!(diff(b"", b"").is_empty());
        assert_eq!(summarize(&diff(b"", b"")), DiffSummary::default());
    }

    #[test]
    fn insert_into_empty() {
        let ops = diff(b"", b"abc");
        assert_eq!(kinds(&ops), vec![DiffKind::Insert]);
        assert_eq!(ops[0].new_bytes, b"abc".as_ref());
        assert_eq!(summarize(&ops).net, 3);
    }

    #[test]
    fn delete_to_empty() {
        let ops = diff(b"abc", b"");
        assert_eq!(kinds(&ops), vec![DiffKind::Delete]);
        assert_eq!(summarize(&ops).net, -3);
    }

    #[test]
    fn insertion_scenario_hello_python_world() {
        let old = b"Hello World";
        let new = b"Hello Python World";
        let ops = diff(old, new);

        assert_eq!(
            kinds(&ops),
            vec![DiffKind::Equal, DiffKind::Insert, DiffKind::Equal]
        );
        assert_eq!(ops[0].old_bytes, b"Hello ".as_ref());
        assert_eq!(ops[1].old_start, 6);
        assert_eq!(ops[1].new_bytes, b"Python ".as_ref());
        assert_eq!(ops[2].old_bytes, b"World".as_ref());

        let s = summarize(&ops);
        assert_eq!(s.insert_ops, 1);
        assert_eq!(s.inserted_bytes, 7);
        assert_eq!(s.net, 7);
    }

    #[test]
    fn replace_in_the_middle() {
        let ops = diff(b"aaaXXbbb", b"aaaYYYbbb");
        assert_eq!(
            kinds(&ops),
            vec![DiffKind::Equal, DiffKind::Replace, DiffKind::Equal]
        );
        let s = summarize(&ops);
        assert_eq!(s.replace_ops, 1);
        assert_eq!(s.replaced_old_bytes, 2);
        assert_eq!(s.replaced_new_bytes, 3);
        assert_eq!(s.net, 1);
    }

    #[test]
    fn disjoint_buffers_are_one_replace() {
        let ops = diff(b"aaaa", b"bbbb");
        assert_eq!(kinds(&ops), vec![DiffKind::Replace]);
    }

    #[test]
    fn spans_tile_both_buffers() {
        let old = b"the quick brown fox jumps over the lazy dog";
        let new = b"the slow brown fox hops over the dog";
        let ops = diff(old, new);

        let mut i = 0;
        let mut j = 0;
        for op in &ops {
            assert_eq!(op.old_start, i);
            assert_eq!(op.new_start, j);
            i = op.old_end();
            j = op.new_end();
        }
        assert_eq!(i, old.len());
        assert_eq!(j, new.len());

        assert_eq!(reconstruct_old(&ops), old.as_ref());
        assert_eq!(reconstruct_new(&ops), new.as_ref());
    }

    #[test]
    fn net_delta_matches_length_difference() {
        let cases: &[(&[u8], &[u8])] = &[
            (b"", b""),
            (b"abc", b"abc"),
            (b"abcdef", b"abXdefYY"),
            (b"aaaa", b"bb"),
            (&[0u8; 300], &[1u8; 200]),
        ];
        for (old, new) in cases {
            let s = summarize(&diff(old, new));
            assert_eq!(s.net, new.len() as i64 - old.len() as i64);
        }
    }

    #[test]
    fn diff_is_deterministic() {
        let old = b"deterministic input buffer with repeats repeats repeats";
        let new = b"deterministic output buffer with repeats and repeats";
        assert_eq!(diff(old, new), diff(old, new));
    }

    #[test]
    fn diff_changes_drops_equal_runs() {
        let ops = diff_changes(b"Hello World", b"Hello Python World");
        assert_eq!(kinds(&ops), vec![DiffKind::Insert]);
    }

    #[test]
    fn ties_resolve_to_earliest_old_position() {
        // Both "ab" runs match; the aligned block must be the first one.
        let ops = diff(b"abab", b"ab");
        assert_eq!(ops[0].kind, DiffKind::Equal);
        assert_eq!(ops[0].old_start, 0);
    }

    #[test]
    fn shifted_tail_is_still_equal() {
        // One byte inserted up front must not rewrite the rest.
        let old: Vec<u8> = (0..=200).map(|i| (i % 251) as u8).collect();
        let mut new = old.clone();
        new.insert(0, 0xfe);
        let ops = diff(&old, &new);
        let s = summarize(&ops);
        assert_eq!(s.insert_ops, 1);
        assert_eq!(s.inserted_bytes, 1);
        assert_eq!(s.equal_bytes, old.len());
    }
}
