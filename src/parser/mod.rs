//! JSON text → documents → typed stores.
//!
//! The strict entry points return errors for malformed documents; the
//! `load_world` boundary degrades to empty stores instead, because the
//! game treats "no save data" as a valid (if useless) state.

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::path::Path;

use crate::document::Document;
use crate::store::atlas::Atlas;
use crate::store::items::AtlasItems;

/// Parse one JSON string into a document; the root must be an object.
pub fn document_from_json(json: &str) -> Result<Document> {
    let root: Value = serde_json::from_str(json)?;
    match root {
        Value::Object(doc) => Ok(doc),
        other => Err(anyhow!("expected a top-level object, got {other:?}")),
    }
}

pub fn atlas_from_json(json: &str) -> Result<Atlas> {
    let doc = document_from_json(json)?;
    let mut atlas = Atlas::new();
    atlas.deserialize(&doc)?;
    Ok(atlas)
}

pub fn items_from_json(json: &str, region_count: usize) -> Result<AtlasItems> {
    let doc = document_from_json(json)?;
    let mut items = AtlasItems::new();
    items.read_document(&doc, region_count)?;
    Ok(items)
}

/// Loads both persisted documents. Any I/O or parse failure on either
/// file is logged and swallowed; the affected store comes back empty.
/// Synchronous, single attempt, no retries.
pub fn load_world(atlas_path: &Path, items_path: &Path) -> (Atlas, AtlasItems) {
    let atlas = match read_file(atlas_path).and_then(|json| atlas_from_json(&json)) {
        Ok(atlas) => atlas,
        Err(e) => {
            log::warn!("atlas load failed, starting empty: {e:#}");
            Atlas::new()
        }
    };

    let region_count = atlas.map_count() as usize;
    let items = match read_file(items_path).and_then(|json| items_from_json(&json, region_count)) {
        Ok(items) => items,
        Err(e) => {
            log::warn!("items load failed, starting empty: {e:#}");
            let mut items = AtlasItems::new();
            items.store_region_info(region_count);
            items
        }
    };

    (atlas, items)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))
}
