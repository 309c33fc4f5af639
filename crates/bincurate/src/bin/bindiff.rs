//! `bindiff` — byte-level diff of two binary files.
//!
//! Usage:
//!   bindiff <old-file> <new-file> [--show-equal] [--json]

use std::process::exit;

use bincurate::byte_diff;
use bincurate::render;
use serde_json::json;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut files: Vec<&str> = Vec::new();
    let mut show_equal = false;
    let mut as_json = false;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--show-equal" => show_equal = true,
            "--json" => as_json = true,
            other => files.push(other),
        }
    }

    let (old_path, new_path) = match files.as_slice() {
        [old, new] => (*old, *new),
        _ => {
            eprintln!("usage: bindiff <old-file> <new-file> [--show-equal] [--json]");
            exit(1);
        }
    };

    let old = read_file(old_path);
    let new = read_file(new_path);

    let ops = byte_diff::diff(&old, &new);
    let summary = byte_diff::summarize(&ops);

    if as_json {
        let ops_json: Vec<_> = ops
            .iter()
            .filter(|op| show_equal || op.is_change())
            .map(|op| {
                json!({
                    "kind": op.kind,
                    "old_start": op.old_start,
                    "new_start": op.new_start,
                    "old_bytes": compact_hex(op.old_bytes),
                    "new_bytes": compact_hex(op.new_bytes),
                })
            })
            .collect();
        let doc = json!({ "ops": ops_json, "summary": summary });
        match serde_json::to_string_pretty(&doc) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("{e}");
                exit(1);
            }
        }
        return;
    }

    println!(
        "{old_path}: {}b, {new_path}: {}b, diff: {:+}b",
        old.len(),
        new.len(),
        new.len() as i64 - old.len() as i64
    );
    print!("{}", render::render_byte_diff(&ops, show_equal));
    print!("{}", render::render_summary(&summary));

    if summary.change_ops() > 0 {
        // Same convention as diff(1): changes found is a distinct exit code.
        exit(2);
    }
}

fn read_file(path: &str) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{path}: {e}");
            exit(1);
        }
    }
}

fn compact_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
