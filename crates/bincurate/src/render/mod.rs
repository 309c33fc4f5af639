//! Reference renderer for region partitions and byte-diff reports.
//!
//! The rendering rule the whole crate exists to uphold: every claimed region
//! shows its label and interpreted value, every unclaimed region shows its
//! raw bytes in full. The only summarization ever applied is collapsing a
//! long run of one repeated byte to `<byte> x<count>`, which is
//! information-preserving.

use std::fmt::Write;

use crate::byte_diff::{DiffKind, DiffOp, DiffSummary};
use crate::curator::Region;

/// Runs shorter than this are never collapsed (two full hex lines).
const RUN_COLLAPSE_MIN: usize = 32;

/// Space-separated lowercase hex pairs, e.g. `"de ad be ef"`.
pub fn hex_pairs(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02x}");
    }
    out
}

fn ascii_gutter(chunk: &[u8]) -> String {
    chunk
        .iter()
        .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '.' })
        .collect()
}

fn hex_line(out: &mut String, offset: usize, chunk: &[u8]) {
    let _ = writeln!(
        out,
        "{offset:08x}: {:<47} |{}|",
        hex_pairs(chunk),
        ascii_gutter(chunk)
    );
}

/// Classic 16-bytes-per-line hex dump; offsets start at `base`.
pub fn hex_dump(data: &[u8], base: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in data.chunks(16).enumerate() {
        hex_line(&mut out, base + i * 16, chunk);
    }
    out
}

/// Hex dump that collapses long runs of one repeated byte to
/// `<byte> x<count>`. Byte value and count are preserved, so the dump can
/// still be reconstructed exactly.
pub fn summarized_hex_dump(data: &[u8], base: usize) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < data.len() {
        let run = run_len(data, i);
        if run >= RUN_COLLAPSE_MIN {
            let _ = writeln!(out, "{:08x}: {:02x} x{run}", base + i, data[i]);
            i += run;
            continue;
        }
        // Plain line of up to 16 bytes, cut short where a long run begins so
        // the run collapses with its full count.
        let mut end = (i + 16).min(data.len());
        let mut j = i;
        while j < end {
            let r = run_len(data, j);
            if r >= RUN_COLLAPSE_MIN {
                end = j;
                break;
            }
            j += r;
        }
        hex_line(&mut out, base + i, &data[i..end]);
        i = end;
    }
    out
}

/// Length of the run of identical bytes starting at `i`.
fn run_len(data: &[u8], i: usize) -> usize {
    let b = data[i];
    data[i..].iter().take_while(|&&x| x == b).count()
}

/// Renders a complete region partition.
///
/// Claimed regions show label plus interpreted value, or the raw bytes when
/// the claim carried no interpreter; unclaimed regions are dumped in full.
pub fn render_regions(regions: &[Region]) -> String {
    let total: usize = regions.iter().map(|r| r.len()).sum();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "-- curated report: {} regions, {} bytes --",
        regions.len(),
        total
    );
    for region in regions {
        match region {
            Region::Claimed(c) => {
                let _ = writeln!(
                    out,
                    "[{}] 0x{:x}..0x{:x} ({} bytes)",
                    c.label,
                    c.start,
                    c.end(),
                    c.len()
                );
                match &c.value {
                    Some(v) => {
                        let _ = writeln!(out, "  value: {v}");
                    }
                    None => {
                        let _ = writeln!(out, "  raw: {}", hex_pairs(c.bytes));
                    }
                }
            }
            Region::Unclaimed(u) => {
                let _ = writeln!(
                    out,
                    "[unclaimed] 0x{:x}..0x{:x} ({} bytes)",
                    u.start,
                    u.end(),
                    u.len()
                );
                for line in summarized_hex_dump(u.bytes, u.start).lines() {
                    let _ = writeln!(out, "  {line}");
                }
            }
        }
    }
    out
}

/// Renders an edit script in the compact one-op-per-block format.
///
/// `Equal` runs are listed as counts; their bytes are dumped only with
/// `show_equal`.
pub fn render_byte_diff(ops: &[DiffOp], show_equal: bool) -> String {
    let changes = ops.iter().filter(|op| op.is_change()).count();
    let mut out = String::new();
    let _ = writeln!(out, "operations: {}, changes: {}", ops.len(), changes);
    for op in ops {
        match op.kind {
            DiffKind::Equal => {
                let _ = writeln!(out, "[{:08x}] = {}b", op.old_start, op.old_bytes.len());
                if show_equal {
                    for line in summarized_hex_dump(op.old_bytes, op.old_start).lines() {
                        let _ = writeln!(out, "  {line}");
                    }
                }
            }
            DiffKind::Insert => {
                let _ = writeln!(out, "[{:08x}] + {}b", op.old_start, op.new_bytes.len());
                let _ = writeln!(out, "  + {}", hex_pairs(op.new_bytes));
            }
            DiffKind::Delete => {
                let _ = writeln!(out, "[{:08x}] - {}b", op.old_start, op.old_bytes.len());
                let _ = writeln!(out, "  - {}", hex_pairs(op.old_bytes));
            }
            DiffKind::Replace => {
                let delta = op.new_bytes.len() as i64 - op.old_bytes.len() as i64;
                let sz = if delta != 0 {
                    format!(" [{delta:+}]")
                } else {
                    String::new()
                };
                let _ = writeln!(
                    out,
                    "[{:08x}] ~ {}->{}b{sz}",
                    op.old_start,
                    op.old_bytes.len(),
                    op.new_bytes.len()
                );
                let _ = writeln!(out, "  - {}", hex_pairs(op.old_bytes));
                let _ = writeln!(out, "  + {}", hex_pairs(op.new_bytes));
            }
        }
    }
    out
}

/// Renders the per-kind totals of an edit script.
pub fn render_summary(s: &DiffSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "replace: {} ops, {} -> {} bytes",
        s.replace_ops, s.replaced_old_bytes, s.replaced_new_bytes
    );
    let _ = writeln!(out, "delete:  {} ops, {} bytes", s.delete_ops, s.deleted_bytes);
    let _ = writeln!(out, "insert:  {} ops, {} bytes", s.insert_ops, s.inserted_bytes);
    let _ = writeln!(out, "net:     {:+} bytes", s.net);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_diff;
    use crate::curator::{interp, Curator};

    #[test]
    fn hex_pairs_format() {
        assert_eq!(hex_pairs(&[0xde, 0xad, 0xbe, 0xef]), "de ad be ef");
        assert_eq!(hex_pairs(&[]), "");
    }

    #[test]
    fn hex_dump_lines_and_gutter() {
        let data: Vec<u8> = (0x41..0x41 + 20).collect();
        let dump = hex_dump(&data, 0);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000: 41 42"));
        assert!(lines[0].ends_with("|ABCDEFGHIJKLMNOP|"));
        assert!(lines[1].starts_with("00000010:"));
    }

    #[test]
    fn short_runs_are_never_collapsed() {
        let data = [0u8; 31];
        let dump = summarized_hex_dump(&data, 0);
        assert!(!dump.contains('x'));
        assert_eq!(dump.lines().count(), 2);
    }

    #[test]
    fn long_runs_collapse_to_value_and_count() {
        let mut data = vec![0x11u8, 0x22];
        data.extend(std::iter::repeat(0xff).take(64));
        let dump = summarized_hex_dump(&data, 0);
        assert!(dump.contains("00000002: ff x64"));
        // The lead-in bytes stay a plain hex line.
        assert!(dump.starts_with("00000000: 11 22"));
    }

    #[test]
    fn region_report_shows_labels_values_and_unclaimed_bytes() {
        let mut data = vec![0x34, 0x12];
        data.extend(b"hidden");
        let mut cur = Curator::new(&data);
        cur.claim("magic", 2, interp::u16_le).unwrap();
        let report = render_regions(&cur.get_regions());

        assert!(report.contains("[magic]"));
        assert!(report.contains("value: 4660"));
        assert!(report.contains("[unclaimed]"));
        // Unclaimed bytes are dumped in full.
        assert!(report.contains("68 69 64 64 65 6e"));
    }

    #[test]
    fn region_report_shows_raw_bytes_for_uninterpreted_claims() {
        let data = [0xde, 0xad];
        let mut cur = Curator::new(&data);
        cur.claim_raw("pad", 2).unwrap();
        let report = render_regions(&cur.get_regions());
        assert!(report.contains("raw: de ad"));
    }

    #[test]
    fn byte_diff_report_marks_insertions() {
        let ops = byte_diff::diff(b"Hello World", b"Hello Python World");
        let report = render_byte_diff(&ops, false);
        assert!(report.contains("operations: 3, changes: 1"));
        assert!(report.contains("[00000006] + 7b"));
        assert!(report.contains("+ 50 79 74 68 6f 6e 20"));

        let summary = render_summary(&byte_diff::summarize(&ops));
        assert!(summary.contains("insert:  1 ops, 7 bytes"));
        assert!(summary.contains("net:     +7 bytes"));
    }

    #[test]
    fn equal_bytes_dumped_only_on_request() {
        let ops = byte_diff::diff(b"same same", b"same same");
        let quiet = render_byte_diff(&ops, false);
        assert!(!quiet.contains("73 61 6d 65"));
        let full = render_byte_diff(&ops, true);
        assert!(full.contains("73 61 6d 65"));
    }
}
