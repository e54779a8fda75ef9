#![allow(dead_code)]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub fn short_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

/// One child table row.
#[derive(Clone)]
pub struct Row {
    pub prefix_len: u8,
    pub suffix: u8,
    pub name: String,
    pub payload: Vec<u8>,
    /// Declared uncompressed size, written only for compressed archives.
    pub unc_size: i32,
    pub time: f64,
    pub crc: Option<u32>,
}

impl Row {
    pub fn new(prefix_len: u8, suffix: u8, name: &str, payload: &[u8]) -> Self {
        Self {
            prefix_len,
            suffix,
            name: name.to_string(),
            payload: payload.to_vec(),
            unc_size: payload.len() as i32,
            time: 0.0,
            crc: None,
        }
    }

    pub fn unc(mut self, size: i32) -> Self {
        self.unc_size = size;
        self
    }

    pub fn crc(mut self, crc: u32) -> Self {
        self.crc = Some(crc);
        self
    }
}

/// Serializes an archive: header, child table, then payloads back to back.
/// The data section starts right after the table.
pub fn archive(version: u8, compress: bool, prefix: &str, rows: &[Row]) -> Vec<u8> {
    let mut table = Vec::new();
    let mut local = 0u32;
    for row in rows {
        table.push(row.prefix_len);
        table.push(row.suffix);
        short_string(&mut table, &row.name);
        table.extend_from_slice(&local.to_le_bytes());
        table.extend_from_slice(&(row.payload.len() as i32).to_le_bytes());
        if compress {
            table.extend_from_slice(&row.unc_size.to_le_bytes());
        }
        table.extend_from_slice(&row.time.to_le_bytes());
        if let Some(crc) = row.crc {
            table.extend_from_slice(&crc.to_le_bytes());
        }
        local += row.payload.len() as u32;
    }

    let mut header_len = 1 + 4 + 4;
    if version >= 2 {
        header_len += 1;
    }
    if version >= 3 {
        header_len += 2 + prefix.len();
    }
    let data_offset = (header_len + table.len()) as u32;

    let mut out = vec![version];
    if version >= 2 {
        out.push(u8::from(compress));
    }
    out.extend_from_slice(&data_offset.to_le_bytes());
    out.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    if version >= 3 {
        short_string(&mut out, prefix);
    }
    out.extend_from_slice(&table);
    for row in rows {
        out.extend_from_slice(&row.payload);
    }
    out
}

/// Header and child table only, as embedded in a hotfix descriptor.
pub fn archive_table(version: u8, prefix: &str, rows: &[Row]) -> Vec<u8> {
    let full = archive(version, false, prefix, rows);
    let payload_len: usize = rows.iter().map(|r| r.payload.len()).sum();
    full[..full.len() - payload_len].to_vec()
}

pub fn gmf_string(out: &mut Vec<u8>, s: &str) {
    out.push(5);
    short_string(out, s);
}

pub fn gmf_object(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (k, v) in entries {
        short_string(&mut body, k);
        body.extend_from_slice(v);
    }
    let mut out = vec![7];
    out.extend_from_slice(&(body.len() as i32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

pub fn gmf_str_value(s: &str) -> Vec<u8> {
    let mut out = Vec::new();
    gmf_string(&mut out, s);
    out
}
