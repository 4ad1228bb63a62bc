//! The generic ordered key-value document every store serializes through.
//!
//! A `Document` is one level of the persisted JSON tree. Keys keep their
//! insertion order (serde_json's `preserve_order` feature), so the emitted
//! files are deterministic and diff-friendly.

use anyhow::{Result, anyhow};
use serde_json::Value;

pub type Document = serde_json::Map<String, Value>;

/// Builds the zero-padded numeric keys used for list entries,
/// e.g. `padded_key("ROW", 1)` → `"ROW_01"`.
///
/// Padding is fixed at two digits; documents cap at 99 entries per list.
/// The limit comes from the save-file format and is kept for compatibility.
pub fn padded_key(prefix: &str, n: usize) -> String {
    format!("{prefix}_{n:02}")
}

pub fn req_i64(doc: &Document, key: &str) -> Result<i64> {
    doc.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow!("missing or non-integer `{key}`"))
}

pub fn req_i32(doc: &Document, key: &str) -> Result<i32> {
    Ok(req_i64(doc, key)? as i32)
}

pub fn req_u32(doc: &Document, key: &str) -> Result<u32> {
    doc.get(key)
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .ok_or_else(|| anyhow!("missing or non-integer `{key}`"))
}

pub fn req_bool(doc: &Document, key: &str) -> Result<bool> {
    doc.get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| anyhow!("missing or non-boolean `{key}`"))
}

pub fn req_str<'a>(doc: &'a Document, key: &str) -> Result<&'a str> {
    doc.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("missing or non-string `{key}`"))
}

pub fn req_obj<'a>(doc: &'a Document, key: &str) -> Result<&'a Document> {
    doc.get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| anyhow!("missing or non-object `{key}`"))
}

/// Nested blocks are only written when non-empty, so absence is not an error.
pub fn opt_obj<'a>(doc: &'a Document, key: &str) -> Option<&'a Document> {
    doc.get(key).and_then(Value::as_object)
}
