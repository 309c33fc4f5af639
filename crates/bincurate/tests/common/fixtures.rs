//! A toy record container and its decoder, used to exercise the curator and
//! both diff engines end to end.
//!
//! Layout (all integers little-endian):
//!   magic  "CRT1" (4 bytes)
//!   count  u16
//!   flags  u16
//!   count records of: tag u8, id u32, payload_len u16, payload bytes
//! Anything after the last record is deliberately left for the curator to
//! surface as unclaimed.

use bincurate::curator::{interp, Curator, CuratorError, Region};
use bincurate::record_diff::{Record, SigKey};
use serde_json::json;

use bincurate_buffers::ByteWriter;

pub struct Entry {
    pub tag: u8,
    pub id: u32,
    pub payload: Vec<u8>,
}

pub fn entry(tag: u8, id: u32, payload: &[u8]) -> Entry {
    Entry {
        tag,
        id,
        payload: payload.to_vec(),
    }
}

pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        1 => "prop",
        2 => "name",
        _ => "unknown",
    }
}

pub fn build_container(entries: &[Entry], trailer: &[u8]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.bytes(b"CRT1");
    w.u16_le(entries.len() as u16);
    w.u16_le(0);
    for e in entries {
        w.u8(e.tag);
        w.u32_le(e.id);
        w.u16_le(e.payload.len() as u16);
        w.bytes(&e.payload);
    }
    w.bytes(trailer);
    w.into_vec()
}

/// Decodes a container, claiming what it understands. Any claim failure ends
/// the walk; everything not yet claimed surfaces as unclaimed in the
/// partition instead of aborting the pass.
pub fn decode_container(data: &[u8]) -> (Vec<Region<'_>>, Vec<Record>) {
    let mut cur = Curator::new(data);
    let mut records = Vec::new();
    let _ = walk(&mut cur, &mut records);
    (cur.get_regions(), records)
}

fn walk(cur: &mut Curator<'_>, records: &mut Vec<Record>) -> Result<(), CuratorError> {
    cur.claim("magic", 4, interp::ascii)?;
    let count = cur.claim("record count", 2, interp::u16_le)?;
    cur.claim("flags", 2, interp::u16_le)?;

    let count = count.as_u64().unwrap_or(0);
    for _ in 0..count {
        let offset = cur.cursor();
        let tag = cur.claim("record tag", 1, interp::u8)?.as_u64().unwrap_or(0) as u8;
        let id = cur.claim("record id", 4, interp::u32_le)?.as_u64().unwrap_or(0) as u32;
        let len = cur
            .claim("payload length", 2, interp::u16_le)?
            .as_u64()
            .unwrap_or(0) as usize;
        let payload = cur.claim("payload", len, interp::ascii)?;
        let end = cur.cursor();

        records.push(Record {
            type_tag: tag_name(tag).to_string(),
            offset,
            bytes: cur.data()[offset..end].to_vec(),
            key: SigKey::U64(id as u64),
            fields: vec![
                ("payload".to_string(), payload),
                ("length".to_string(), json!(len)),
            ],
        });
    }
    Ok(())
}
