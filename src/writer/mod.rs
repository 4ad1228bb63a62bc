//! Typed stores → documents → pretty-printed JSON files.

use anyhow::{Context, Result};
use std::path::Path;

use crate::document::Document;
use crate::store::atlas::Atlas;
use crate::store::items::AtlasItems;

pub fn save_atlas(atlas: &Atlas, path: &Path) -> Result<()> {
    write_document(&atlas.serialize()?, path)
}

pub fn save_items(items: &AtlasItems, path: &Path) -> Result<()> {
    write_document(&items.populate_document()?, path)
}

fn write_document(doc: &Document, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json).with_context(|| format!("Writing {}", path.display()))?;
    Ok(())
}
