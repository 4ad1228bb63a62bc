//! The atlas: every region in the game world, keyed by name and number.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::document::{Document, padded_key, req_obj};
use crate::model::EnemyType;
use crate::store::region::Region;

#[derive(Debug, Default)]
pub struct Atlas {
    regions: HashMap<String, Region>,
    names_by_number: HashMap<u32, String>,
    /// Next region number to hand out. Only ever increments; removing a
    /// region leaves a numbering gap on purpose (numbers are identifiers,
    /// not positions).
    next_number: u32,
}

impl Atlas {
    pub fn new() -> Self {
        Atlas::default()
    }

    /// Creates and registers a region under `name` and the next number,
    /// returning a handle for the follow-up `add_exit`/`add_shop`/
    /// `add_tile_row` calls.
    pub fn add_region(
        &mut self,
        name: &str,
        music: u32,
        width: i32,
        height: i32,
        background: u32,
        enemies: Vec<EnemyType>,
    ) -> &mut Region {
        let region = Region::new(name, 0, music, width, height, background, enemies);
        self.register(region)
    }

    fn register(&mut self, mut region: Region) -> &mut Region {
        let number = self.next_number;
        self.next_number += 1;
        region.assign_number(number);
        let name = region.name().to_string();
        self.names_by_number.insert(number, name.clone());
        match self.regions.entry(name) {
            Entry::Occupied(mut slot) => {
                // Re-adding a name replaces the old region outright; the
                // replaced region's number must stop resolving too.
                let old_number = slot.get().number();
                self.names_by_number.remove(&old_number);
                slot.insert(region);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(region),
        }
    }

    /// Removes from the name map only. The number cross-reference keeps
    /// its entry and later `add_region` calls continue past the gap.
    pub fn remove_region(&mut self, name: &str) -> bool {
        self.regions.remove(name).is_some()
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    pub fn region_by_number(&self, number: u32) -> Option<&Region> {
        self.names_by_number
            .get(&number)
            .and_then(|name| self.regions.get(name))
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// The next number `add_region` would assign. Equals `region_count`
    /// as long as nothing was removed.
    pub fn map_count(&self) -> u32 {
        self.next_number
    }

    /// Live regions in region-number order.
    pub fn regions_by_number(&self) -> Vec<&Region> {
        let mut list: Vec<&Region> = self.regions.values().collect();
        list.sort_by_key(|r| r.number());
        list
    }

    // ── document codec ────────────────────────────────────────────────

    pub fn serialize(&self) -> Result<Document> {
        let mut doc = Document::new();
        doc.insert("mapCount".into(), Value::from(self.next_number));

        // Written for tooling; the reader re-derives numbers from
        // insertion order and never consumes this block.
        let mut identifiers = Document::new();
        let regions = self.regions_by_number();
        for region in &regions {
            identifiers.insert(region.name().to_string(), Value::from(region.number()));
        }
        doc.insert("mapIdentifiers".into(), Value::Object(identifiers));

        let mut maps = Document::new();
        for region in &regions {
            maps.insert(
                padded_key("MAP", region.number() as usize),
                Value::Object(region.to_document()?),
            );
        }
        doc.insert("maps".into(), Value::Object(maps));

        Ok(doc)
    }

    /// Full reset, then replay of the construction API for every region
    /// in document order. Numbers come from insertion order, not from the
    /// stored `regionNbr`/`mapIdentifiers` fields.
    pub fn deserialize(&mut self, doc: &Document) -> Result<()> {
        self.regions.clear();
        self.names_by_number.clear();
        self.next_number = 0;

        let maps = req_obj(doc, "maps")?;
        for (key, value) in maps {
            let map_doc = value
                .as_object()
                .with_context(|| format!("map entry `{key}` is not an object"))?;
            let region = Region::from_document(map_doc)
                .with_context(|| format!("parsing map entry `{key}`"))?;
            self.register(region);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_atlas() -> Atlas {
        let mut atlas = Atlas::new();
        let village = atlas.add_region("village", 1, 3, 2, 0, vec![]);
        village.add_tile_row(vec![0, 0, 1]);
        village.add_tile_row(vec![0, 2, 0]);
        village.add_exit(2, 0, 1, 0, 0);
        village.add_shop(1, 1, 5, 1, 0);

        let crypt = atlas.add_region(
            "crypt",
            4,
            2,
            2,
            7,
            vec![EnemyType::Skeleton, EnemyType::GiantRat],
        );
        crypt.add_tile_row(vec![3, 3]);
        crypt.add_tile_row(vec![3, 4]);
        atlas
    }

    #[test]
    fn test_region_numbers_follow_insertion_order() {
        let atlas = sample_atlas();
        assert_eq!(atlas.region("village").unwrap().number(), 0);
        assert_eq!(atlas.region("crypt").unwrap().number(), 1);
        assert_eq!(atlas.map_count(), 2);
        assert_eq!(atlas.region_by_number(1).unwrap().name(), "crypt");
    }

    #[test]
    fn test_remove_region_leaves_numbering_gap() {
        let mut atlas = sample_atlas();
        assert!(atlas.remove_region("village"));
        assert_eq!(atlas.region_count(), 1);
        // Numbers never shift and the counter keeps going.
        assert_eq!(atlas.map_count(), 2);
        let moor = atlas.add_region("moor", 2, 1, 1, 3, vec![]);
        assert_eq!(moor.number(), 2);
        assert!(atlas.region_by_number(0).is_none());
    }

    #[test]
    fn test_readding_a_name_retires_the_old_number() {
        let mut atlas = sample_atlas();
        let rebuilt = atlas.add_region("village", 9, 1, 1, 2, vec![]);
        assert_eq!(rebuilt.number(), 2);

        // The stale number must not resolve to the replacement.
        assert!(atlas.region_by_number(0).is_none());
        assert_eq!(atlas.region_by_number(2).unwrap().name(), "village");
        assert_eq!(atlas.region("village").unwrap().number(), 2);
        assert_eq!(atlas.region_count(), 2);
    }

    #[test]
    fn test_serialize_layout() {
        let doc = sample_atlas().serialize().unwrap();
        assert_eq!(doc["mapCount"], 2);
        let identifiers = doc["mapIdentifiers"].as_object().unwrap();
        assert_eq!(identifiers["village"], 0);
        assert_eq!(identifiers["crypt"], 1);
        let maps = doc["maps"].as_object().unwrap();
        assert!(maps.contains_key("MAP_00"));
        assert!(maps.contains_key("MAP_01"));
    }

    #[test]
    fn test_serialize_deserialize_round_trip() {
        let atlas = sample_atlas();
        let doc = atlas.serialize().unwrap();

        let mut back = Atlas::new();
        back.deserialize(&doc).unwrap();

        assert_eq!(back.region_count(), 2);
        for name in ["village", "crypt"] {
            let a = atlas.region(name).unwrap();
            let b = back.region(name).unwrap();
            assert_eq!(a, b, "region `{name}` should round-trip");
        }
    }

    #[test]
    fn test_deserialize_resets_previous_state() {
        let mut atlas = sample_atlas();
        let doc = {
            let mut other = Atlas::new();
            let r = other.add_region("keep", 0, 1, 1, 0, vec![]);
            r.add_tile_row(vec![9]);
            other.serialize().unwrap()
        };

        atlas.deserialize(&doc).unwrap();
        assert_eq!(atlas.region_count(), 1);
        assert!(atlas.region("village").is_none());
        assert_eq!(atlas.region("keep").unwrap().number(), 0);
    }
}
