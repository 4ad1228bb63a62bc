//! The location-keyed item store: six entity families, a derived spatial
//! index over `(region, x, y, category)`, and per-region running counts.
//!
//! Entities live in append-only master lists. Soft-deletable families
//! (bone piles, chests, locked doors) are never compacted; a removed
//! entity keeps its slot with `active = false` so stored indices stay
//! valid for the life of the list.
//!
//! Deactivation and spatial-index removal are separate steps: `remove_x`
//! flips the flag and fixes the counts, `remove_x_entry` drops the index
//! bucket. Callers pair them; the `*_first` helpers do both in one call
//! for tiles that host at most one instance.

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::collections::HashMap;

use crate::document::{Document, opt_obj, padded_key, req_bool, req_i32, req_obj, req_str, req_u32};
use crate::model::{
    AlterMap, BonePile, CampaignGate, Chest, EnemyType, HayBale, ItemCategory, LocationKey,
    LockedDoor, MapLocation, RegionCounts, SpecificEnemy,
};

#[derive(Debug, Default)]
pub struct AtlasItems {
    alter_maps: Vec<AlterMap>,
    bone_piles: Vec<BonePile>,
    chests: Vec<Chest>,
    hay_bales: Vec<HayBale>,
    locked_doors: Vec<LockedDoor>,
    specific_enemies: Vec<SpecificEnemy>,

    alter_map_count: i32,
    bone_pile_count: i32,
    chest_count: i32,
    hay_bale_count: i32,
    locked_door_count: i32,
    specific_enemy_count: i32,

    /// Bucket per `(region, x, y, category)`; values are positions in the
    /// family's master list, in insertion order.
    index: HashMap<LocationKey, Vec<usize>>,
    /// Dense, indexed by region number. Rebuilt by `store_region_info`,
    /// patched incrementally afterwards.
    region_counts: Vec<RegionCounts>,
}

impl AtlasItems {
    pub fn new() -> Self {
        AtlasItems::default()
    }

    // ── add ───────────────────────────────────────────────────────────
    // Append-only; no uniqueness checks. Two chests on one tile are legal
    // and form a two-element bucket.

    pub fn add_alter_map(
        &mut self,
        region: u32,
        x: i32,
        y: i32,
        tile: i32,
        gate: Option<CampaignGate>,
    ) {
        self.alter_maps.push(AlterMap {
            region,
            x,
            y,
            tile,
            gate,
        });
        self.alter_map_count += 1;
    }

    pub fn add_bone_pile(&mut self, region: u32, x: i32, y: i32) {
        let index = self.bone_piles.len();
        self.bone_piles.push(BonePile {
            region,
            x,
            y,
            active: true,
            index,
        });
        self.bone_pile_count += 1;
    }

    pub fn add_chest(
        &mut self,
        region: u32,
        x: i32,
        y: i32,
        primary_item: &str,
        primary_count: u32,
        extra_items: Vec<String>,
    ) {
        let index = self.chests.len();
        self.chests.push(Chest {
            region,
            x,
            y,
            primary_item: primary_item.to_string(),
            primary_count,
            extra_items,
            active: true,
            index,
        });
        self.chest_count += 1;
    }

    pub fn add_hay_bale(&mut self, region: u32, x: i32, y: i32) {
        self.hay_bales.push(HayBale { region, x, y });
        self.hay_bale_count += 1;
    }

    pub fn add_locked_door(&mut self, region: u32, x: i32, y: i32) {
        let index = self.locked_doors.len();
        self.locked_doors.push(LockedDoor {
            region,
            x,
            y,
            active: true,
            index,
        });
        self.locked_door_count += 1;
    }

    pub fn add_specific_enemy(&mut self, region: u32, x: i32, y: i32, enemy: EnemyType) {
        self.specific_enemies.push(SpecificEnemy {
            region,
            x,
            y,
            enemy,
        });
        self.specific_enemy_count += 1;
    }

    // ── read access ───────────────────────────────────────────────────

    pub fn alter_maps(&self) -> &[AlterMap] {
        &self.alter_maps
    }

    pub fn bone_piles(&self) -> &[BonePile] {
        &self.bone_piles
    }

    pub fn chests(&self) -> &[Chest] {
        &self.chests
    }

    pub fn hay_bales(&self) -> &[HayBale] {
        &self.hay_bales
    }

    pub fn locked_doors(&self) -> &[LockedDoor] {
        &self.locked_doors
    }

    pub fn specific_enemies(&self) -> &[SpecificEnemy] {
        &self.specific_enemies
    }

    pub fn bone_pile(&self, index: usize) -> &BonePile {
        &self.bone_piles[index]
    }

    pub fn chest(&self, index: usize) -> &Chest {
        &self.chests[index]
    }

    pub fn locked_door(&self, index: usize) -> &LockedDoor {
        &self.locked_doors[index]
    }

    pub fn family_count(&self, category: ItemCategory) -> i32 {
        match category {
            ItemCategory::AlterMap => self.alter_map_count,
            ItemCategory::BonePile => self.bone_pile_count,
            ItemCategory::Chest => self.chest_count,
            ItemCategory::HayBale => self.hay_bale_count,
            ItemCategory::LockedDoor => self.locked_door_count,
            ItemCategory::SpecificEnemy => self.specific_enemy_count,
        }
    }

    pub fn region_counts(&self, region: u32) -> Option<&RegionCounts> {
        self.region_counts.get(region as usize)
    }

    pub fn all_region_counts(&self) -> &[RegionCounts] {
        &self.region_counts
    }

    fn bucket(&self, key: LocationKey) -> &[usize] {
        self.index.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_item_at(&self, region: u32, x: i32, y: i32, category: ItemCategory) -> bool {
        !self.bucket(LocationKey::new(region, x, y, category)).is_empty()
    }

    /// Bucket contents in insertion order. Inactive entities are NOT
    /// filtered out; callers check `active` themselves.
    pub fn alter_map_list(&self, region: u32, x: i32, y: i32) -> Vec<&AlterMap> {
        self.bucket(LocationKey::new(region, x, y, ItemCategory::AlterMap))
            .iter()
            .map(|&i| &self.alter_maps[i])
            .collect()
    }

    pub fn bone_pile_list(&self, region: u32, x: i32, y: i32) -> Vec<&BonePile> {
        self.bucket(LocationKey::new(region, x, y, ItemCategory::BonePile))
            .iter()
            .map(|&i| &self.bone_piles[i])
            .collect()
    }

    pub fn chest_list(&self, region: u32, x: i32, y: i32) -> Vec<&Chest> {
        self.bucket(LocationKey::new(region, x, y, ItemCategory::Chest))
            .iter()
            .map(|&i| &self.chests[i])
            .collect()
    }

    pub fn hay_bale_list(&self, region: u32, x: i32, y: i32) -> Vec<&HayBale> {
        self.bucket(LocationKey::new(region, x, y, ItemCategory::HayBale))
            .iter()
            .map(|&i| &self.hay_bales[i])
            .collect()
    }

    pub fn locked_door_list(&self, region: u32, x: i32, y: i32) -> Vec<&LockedDoor> {
        self.bucket(LocationKey::new(region, x, y, ItemCategory::LockedDoor))
            .iter()
            .map(|&i| &self.locked_doors[i])
            .collect()
    }

    pub fn specific_enemy_list(&self, region: u32, x: i32, y: i32) -> Vec<&SpecificEnemy> {
        self.bucket(LocationKey::new(region, x, y, ItemCategory::SpecificEnemy))
            .iter()
            .map(|&i| &self.specific_enemies[i])
            .collect()
    }

    // ── counts ────────────────────────────────────────────────────────

    /// Direct mutation of one region's category count and its total.
    /// This is the paired-adjustment primitive every removal goes
    /// through; the region must exist in the counts table.
    pub fn adjust_count(&mut self, region: u32, category: ItemCategory, delta: i32) {
        let counts = &mut self.region_counts[region as usize];
        *counts.slot_mut(category) += delta;
        counts.total += delta;
    }

    // ── soft delete ───────────────────────────────────────────────────

    /// Tombstones the bone pile at `index`: `active` goes false, the
    /// family count and the region's counts each drop by one. The slot
    /// itself stays. The spatial index is untouched — pair with
    /// `remove_bone_pile_entry`.
    pub fn remove_bone_pile(&mut self, index: usize, region: u32) {
        if !self.bone_piles[index].active {
            return;
        }
        self.bone_piles[index].active = false;
        self.bone_pile_count -= 1;
        self.adjust_count(region, ItemCategory::BonePile, -1);
    }

    /// Batch tombstone for chests looted together.
    pub fn remove_chests(&mut self, indices: &[usize], region: u32) {
        for &index in indices {
            if !self.chests[index].active {
                continue;
            }
            self.chests[index].active = false;
            self.chest_count -= 1;
            self.adjust_count(region, ItemCategory::Chest, -1);
        }
    }

    pub fn remove_locked_door(&mut self, index: usize, region: u32) {
        if !self.locked_doors[index].active {
            return;
        }
        self.locked_doors[index].active = false;
        self.locked_door_count -= 1;
        self.adjust_count(region, ItemCategory::LockedDoor, -1);
    }

    // ── spatial-index removal ─────────────────────────────────────────

    /// Drops the whole bucket for one `(region, x, y, category)` key.
    /// Returns whether a bucket existed.
    pub fn remove_entry(&mut self, region: u32, x: i32, y: i32, category: ItemCategory) -> bool {
        self.index
            .remove(&LocationKey::new(region, x, y, category))
            .is_some()
    }

    pub fn remove_alter_map_entry(&mut self, region: u32, x: i32, y: i32) -> bool {
        self.remove_entry(region, x, y, ItemCategory::AlterMap)
    }

    pub fn remove_bone_pile_entry(&mut self, region: u32, x: i32, y: i32) -> bool {
        self.remove_entry(region, x, y, ItemCategory::BonePile)
    }

    pub fn remove_chest_entry(&mut self, region: u32, x: i32, y: i32) -> bool {
        self.remove_entry(region, x, y, ItemCategory::Chest)
    }

    pub fn remove_hay_bale_entry(&mut self, region: u32, x: i32, y: i32) -> bool {
        self.remove_entry(region, x, y, ItemCategory::HayBale)
    }

    pub fn remove_locked_door_entry(&mut self, region: u32, x: i32, y: i32) -> bool {
        self.remove_entry(region, x, y, ItemCategory::LockedDoor)
    }

    pub fn remove_specific_enemy_entry(&mut self, region: u32, x: i32, y: i32) -> bool {
        self.remove_entry(region, x, y, ItemCategory::SpecificEnemy)
    }

    // ── one-call retirement ───────────────────────────────────────────
    // For tiles known to host at most one instance: deactivate the first
    // active entity at the location and drop the bucket, atomically from
    // the caller's point of view.

    pub fn remove_bone_pile_first(&mut self, location: &MapLocation) -> bool {
        let key = LocationKey::new(
            location.region,
            location.x,
            location.y,
            ItemCategory::BonePile,
        );
        let first = self
            .bucket(key)
            .iter()
            .copied()
            .find(|&i| self.bone_piles[i].active);
        match first {
            Some(index) => {
                self.remove_bone_pile(index, location.region);
                self.remove_entry(key.region, key.x, key.y, key.category);
                true
            }
            None => false,
        }
    }

    pub fn remove_locked_door_first(&mut self, location: &MapLocation) -> bool {
        let key = LocationKey::new(
            location.region,
            location.x,
            location.y,
            ItemCategory::LockedDoor,
        );
        let first = self
            .bucket(key)
            .iter()
            .copied()
            .find(|&i| self.locked_doors[i].active);
        match first {
            Some(index) => {
                self.remove_locked_door(index, location.region);
                self.remove_entry(key.region, key.x, key.y, key.category);
                true
            }
            None => false,
        }
    }

    // ── derived-state rebuild ─────────────────────────────────────────

    /// Rebuilds the per-region counts and the spatial index from the
    /// master lists. Run once after a bulk load; O(total entities).
    ///
    /// Soft-deletable families get their `index` fields re-assigned in
    /// list order here, restarting at 0 per family.
    pub fn store_region_info(&mut self, region_count: usize) {
        self.region_counts = vec![RegionCounts::default(); region_count];

        for e in &self.alter_maps {
            self.region_counts[e.region as usize].alter_maps += 1;
        }
        for (i, e) in self.bone_piles.iter_mut().enumerate() {
            e.index = i;
            if e.active {
                self.region_counts[e.region as usize].bone_piles += 1;
            }
        }
        for (i, e) in self.chests.iter_mut().enumerate() {
            e.index = i;
            if e.active {
                self.region_counts[e.region as usize].chests += 1;
            }
        }
        for e in &self.hay_bales {
            self.region_counts[e.region as usize].hay_bales += 1;
        }
        for (i, e) in self.locked_doors.iter_mut().enumerate() {
            e.index = i;
            if e.active {
                self.region_counts[e.region as usize].locked_doors += 1;
            }
        }
        for e in &self.specific_enemies {
            self.region_counts[e.region as usize].specific_enemies += 1;
        }

        for counts in &mut self.region_counts {
            counts.total = counts.category_sum();
        }

        self.index.clear();
        for (i, e) in self.alter_maps.iter().enumerate() {
            let key = LocationKey::new(e.region, e.x, e.y, ItemCategory::AlterMap);
            self.index.entry(key).or_default().push(i);
        }
        for (i, e) in self.bone_piles.iter().enumerate() {
            let key = LocationKey::new(e.region, e.x, e.y, ItemCategory::BonePile);
            self.index.entry(key).or_default().push(i);
        }
        for (i, e) in self.chests.iter().enumerate() {
            let key = LocationKey::new(e.region, e.x, e.y, ItemCategory::Chest);
            self.index.entry(key).or_default().push(i);
        }
        for (i, e) in self.hay_bales.iter().enumerate() {
            let key = LocationKey::new(e.region, e.x, e.y, ItemCategory::HayBale);
            self.index.entry(key).or_default().push(i);
        }
        for (i, e) in self.locked_doors.iter().enumerate() {
            let key = LocationKey::new(e.region, e.x, e.y, ItemCategory::LockedDoor);
            self.index.entry(key).or_default().push(i);
        }
        for (i, e) in self.specific_enemies.iter().enumerate() {
            let key = LocationKey::new(e.region, e.x, e.y, ItemCategory::SpecificEnemy);
            self.index.entry(key).or_default().push(i);
        }
    }

    // ── document codec ────────────────────────────────────────────────

    /// Flattens the store into the `items` document. Counter keys are
    /// always written, zero included; detail blocks only when their
    /// family count is positive. Only active entities are emitted.
    pub fn populate_document(&self) -> Result<Document> {
        let mut items = Document::new();
        items.insert("ALTER_MAP_CNT".into(), Value::from(self.alter_map_count));
        items.insert("BONE_PILE_CNT".into(), Value::from(self.bone_pile_count));
        items.insert("CHEST_CNT".into(), Value::from(self.chest_count));
        items.insert("HAY_BALE_CNT".into(), Value::from(self.hay_bale_count));
        items.insert("LOCKED_DOOR_CNT".into(), Value::from(self.locked_door_count));
        items.insert(
            "SPECIFIC_ENEMY_CNT".into(),
            Value::from(self.specific_enemy_count),
        );

        if self.alter_map_count > 0 {
            let mut block = Document::new();
            for (n, e) in self.alter_maps.iter().enumerate() {
                let mut entry = Document::new();
                entry.insert("POS_X".into(), Value::from(e.x));
                entry.insert("POS_Y".into(), Value::from(e.y));
                entry.insert("REGION_NBR".into(), Value::from(e.region));
                entry.insert("TILE_NBR".into(), Value::from(e.tile));
                entry.insert("CAMPAIGN_EVENT_IND".into(), Value::from(e.gate.is_some()));
                if let Some(gate) = &e.gate {
                    entry.insert("CAMPAIGN_EVENT".into(), Value::from(gate.event.as_str()));
                    entry.insert("CAMPAIGN_EVENT_TYPE".into(), Value::from(gate.must_exist));
                }
                block.insert(padded_key("ALTER_MAP", n + 1), Value::Object(entry));
            }
            items.insert("ALTER_MAP_EVENTS".into(), Value::Object(block));
        }

        if self.bone_pile_count > 0 {
            let mut block = Document::new();
            let mut n = 0;
            for e in self.bone_piles.iter().filter(|e| e.active) {
                n += 1;
                block.insert(
                    padded_key("BONE_PILE", n),
                    Value::Object(location_entry(e.x, e.y, e.region)),
                );
            }
            items.insert("BONE_PILES".into(), Value::Object(block));
        }

        if self.chest_count > 0 {
            let mut block = Document::new();
            let mut n = 0;
            for e in self.chests.iter().filter(|e| e.active) {
                n += 1;
                let mut entry = location_entry(e.x, e.y, e.region);
                entry.insert("PRIMARY_ITEM".into(), Value::from(e.primary_item.as_str()));
                entry.insert("PRIMARY_ITEM_CNT".into(), Value::from(e.primary_count));
                entry.insert("ADDL_ITEM_CNT".into(), Value::from(e.extra_items.len()));
                if !e.extra_items.is_empty() {
                    entry.insert("ADDL_ITEMS".into(), Value::from(e.extra_items.clone()));
                }
                block.insert(padded_key("CHEST", n), Value::Object(entry));
            }
            items.insert("CHESTS".into(), Value::Object(block));
        }

        if self.hay_bale_count > 0 {
            let mut block = Document::new();
            for (n, e) in self.hay_bales.iter().enumerate() {
                block.insert(
                    padded_key("HAY_BALE", n + 1),
                    Value::Object(location_entry(e.x, e.y, e.region)),
                );
            }
            items.insert("HAY_BALES".into(), Value::Object(block));
        }

        if self.locked_door_count > 0 {
            let mut block = Document::new();
            let mut n = 0;
            for e in self.locked_doors.iter().filter(|e| e.active) {
                n += 1;
                block.insert(
                    padded_key("LOCKED_DOOR", n),
                    Value::Object(location_entry(e.x, e.y, e.region)),
                );
            }
            items.insert("LOCKED_DOORS".into(), Value::Object(block));
        }

        if self.specific_enemy_count > 0 {
            let mut block = Document::new();
            for (n, e) in self.specific_enemies.iter().enumerate() {
                let mut entry = location_entry(e.x, e.y, e.region);
                entry.insert("ENEMY_TYPE".into(), serde_json::to_value(e.enemy)?);
                block.insert(padded_key("SPECIFIC_ENEMY", n + 1), Value::Object(entry));
            }
            items.insert("SPECIFIC_ENEMIES".into(), Value::Object(block));
        }

        let mut doc = Document::new();
        doc.insert("items".into(), Value::Object(items));
        Ok(doc)
    }

    /// Inverse of `populate_document`: resets the store, replays the
    /// `add_*` APIs for every entry, rebuilds the derived state, then
    /// checks the document's declared counts against what was actually
    /// loaded. A mismatch is warned about, never fatal.
    pub fn read_document(&mut self, doc: &Document, region_count: usize) -> Result<()> {
        *self = AtlasItems::new();

        let items = req_obj(doc, "items")?;
        let declared = [
            req_i32(items, "ALTER_MAP_CNT")?,
            req_i32(items, "BONE_PILE_CNT")?,
            req_i32(items, "CHEST_CNT")?,
            req_i32(items, "HAY_BALE_CNT")?,
            req_i32(items, "LOCKED_DOOR_CNT")?,
            req_i32(items, "SPECIFIC_ENEMY_CNT")?,
        ];

        if let Some(block) = opt_obj(items, "ALTER_MAP_EVENTS") {
            for (key, value) in block {
                let entry = entry_object(key, value)?;
                let (region, x, y) = location_fields(key, entry, region_count)?;
                let tile = req_i32(entry, "TILE_NBR").with_context(|| format!("entry `{key}`"))?;
                let gate = if req_bool(entry, "CAMPAIGN_EVENT_IND")
                    .with_context(|| format!("entry `{key}`"))?
                {
                    Some(CampaignGate {
                        event: req_str(entry, "CAMPAIGN_EVENT")
                            .with_context(|| format!("entry `{key}`"))?
                            .to_string(),
                        must_exist: req_bool(entry, "CAMPAIGN_EVENT_TYPE")
                            .with_context(|| format!("entry `{key}`"))?,
                    })
                } else {
                    None
                };
                self.add_alter_map(region, x, y, tile, gate);
            }
        }

        if let Some(block) = opt_obj(items, "BONE_PILES") {
            for (key, value) in block {
                let entry = entry_object(key, value)?;
                let (region, x, y) = location_fields(key, entry, region_count)?;
                self.add_bone_pile(region, x, y);
            }
        }

        if let Some(block) = opt_obj(items, "CHESTS") {
            for (key, value) in block {
                let entry = entry_object(key, value)?;
                let (region, x, y) = location_fields(key, entry, region_count)?;
                let primary_item =
                    req_str(entry, "PRIMARY_ITEM").with_context(|| format!("entry `{key}`"))?;
                let primary_count =
                    req_u32(entry, "PRIMARY_ITEM_CNT").with_context(|| format!("entry `{key}`"))?;
                let extra_count =
                    req_i32(entry, "ADDL_ITEM_CNT").with_context(|| format!("entry `{key}`"))?;
                let extra_items = if extra_count > 0 {
                    serde_json::from_value::<Vec<String>>(
                        entry.get("ADDL_ITEMS").cloned().unwrap_or(Value::Null),
                    )
                    .with_context(|| format!("entry `{key}` ADDL_ITEMS"))?
                } else {
                    Vec::new()
                };
                self.add_chest(region, x, y, primary_item, primary_count, extra_items);
            }
        }

        if let Some(block) = opt_obj(items, "HAY_BALES") {
            for (key, value) in block {
                let entry = entry_object(key, value)?;
                let (region, x, y) = location_fields(key, entry, region_count)?;
                self.add_hay_bale(region, x, y);
            }
        }

        if let Some(block) = opt_obj(items, "LOCKED_DOORS") {
            for (key, value) in block {
                let entry = entry_object(key, value)?;
                let (region, x, y) = location_fields(key, entry, region_count)?;
                self.add_locked_door(region, x, y);
            }
        }

        if let Some(block) = opt_obj(items, "SPECIFIC_ENEMIES") {
            for (key, value) in block {
                let entry = entry_object(key, value)?;
                let (region, x, y) = location_fields(key, entry, region_count)?;
                let enemy: EnemyType = serde_json::from_value(
                    entry.get("ENEMY_TYPE").cloned().unwrap_or(Value::Null),
                )
                .with_context(|| format!("entry `{key}` ENEMY_TYPE"))?;
                self.add_specific_enemy(region, x, y, enemy);
            }
        }

        self.store_region_info(region_count);

        let names = [
            "ALTER_MAP_CNT",
            "BONE_PILE_CNT",
            "CHEST_CNT",
            "HAY_BALE_CNT",
            "LOCKED_DOOR_CNT",
            "SPECIFIC_ENEMY_CNT",
        ];
        for ((name, want), category) in names.iter().zip(declared).zip(ItemCategory::ALL) {
            let have = self.family_count(category);
            if want != have {
                log::warn!("items document declares {name}={want} but {have} were loaded");
            }
        }

        Ok(())
    }
}

fn location_entry(x: i32, y: i32, region: u32) -> Document {
    let mut entry = Document::new();
    entry.insert("POS_X".into(), Value::from(x));
    entry.insert("POS_Y".into(), Value::from(y));
    entry.insert("REGION_NBR".into(), Value::from(region));
    entry
}

fn entry_object<'a>(key: &str, value: &'a Value) -> Result<&'a Document> {
    value
        .as_object()
        .with_context(|| format!("entry `{key}` is not an object"))
}

/// Region numbers in the document must fit the atlas being loaded;
/// anything else is a corrupt document and surfaces as an error the
/// load boundary can degrade on, not a fault later in the rebuild.
fn location_fields(key: &str, entry: &Document, region_count: usize) -> Result<(u32, i32, i32)> {
    let region = req_u32(entry, "REGION_NBR").with_context(|| format!("entry `{key}`"))?;
    if region as usize >= region_count {
        return Err(anyhow!(
            "entry `{key}` names region {region} but only {region_count} region(s) exist"
        ));
    }
    let x = req_i32(entry, "POS_X").with_context(|| format!("entry `{key}`"))?;
    let y = req_i32(entry, "POS_Y").with_context(|| format!("entry `{key}`"))?;
    Ok((region, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two regions, a bit of everything. `store_region_info` already run.
    fn sample_items() -> AtlasItems {
        let mut items = AtlasItems::new();
        items.add_alter_map(0, 1, 1, 7, None);
        items.add_alter_map(
            1,
            2,
            2,
            3,
            Some(CampaignGate {
                event: "DRAWBRIDGE_DOWN".into(),
                must_exist: true,
            }),
        );
        items.add_bone_pile(0, 4, 4);
        items.add_bone_pile(1, 0, 3);
        items.add_chest(0, 3, 4, "GOLD", 10, vec![]);
        items.add_chest(0, 3, 4, "SWORD", 1, vec!["POTION".into()]);
        items.add_hay_bale(1, 5, 5);
        items.add_locked_door(0, 2, 0);
        items.add_specific_enemy(1, 1, 0, EnemyType::Minotaur);
        items.store_region_info(2);
        items
    }

    #[test]
    fn test_counts_after_rebuild() {
        let items = sample_items();
        let r0 = items.region_counts(0).unwrap();
        assert_eq!(r0.alter_maps, 1);
        assert_eq!(r0.bone_piles, 1);
        assert_eq!(r0.chests, 2);
        assert_eq!(r0.locked_doors, 1);
        assert_eq!(r0.total, 5);

        let r1 = items.region_counts(1).unwrap();
        assert_eq!(r1.total, 4);
        assert_eq!(r1.category_sum(), r1.total);
    }

    #[test]
    fn test_index_holds_every_entity_once() {
        let items = sample_items();
        for (i, e) in items.bone_piles().iter().enumerate() {
            let hits = items
                .bone_pile_list(e.region, e.x, e.y)
                .iter()
                .filter(|p| p.index == i)
                .count();
            assert_eq!(hits, 1);
        }
        for (i, e) in items.chests().iter().enumerate() {
            let hits = items
                .chest_list(e.region, e.x, e.y)
                .iter()
                .filter(|c| c.index == i)
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_soft_delete_keeps_the_slot() {
        let mut items = sample_items();
        let before_total = items.region_counts(0).unwrap().total;

        items.remove_bone_pile(0, 0);

        let pile = items.bone_pile(0);
        assert!(!pile.active);
        assert_eq!((pile.x, pile.y), (4, 4), "slot survives deactivation");
        assert_eq!(items.family_count(ItemCategory::BonePile), 1);
        assert_eq!(items.region_counts(0).unwrap().bone_piles, 0);
        assert_eq!(items.region_counts(0).unwrap().total, before_total - 1);

        // A second remove of the same slot changes nothing.
        items.remove_bone_pile(0, 0);
        assert_eq!(items.family_count(ItemCategory::BonePile), 1);
    }

    #[test]
    fn test_two_chests_one_tile_two_step_removal() {
        let mut items = sample_items();

        let list = items.chest_list(0, 3, 4);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].primary_item, "GOLD", "insertion order preserved");
        assert_eq!(list[1].primary_item, "SWORD");
        let first_index = list[0].index;

        // Step one: deactivate. The bucket still answers lookups.
        items.remove_chests(&[first_index], 0);
        assert_eq!(items.chest_list(0, 3, 4).len(), 2);
        assert_eq!(items.family_count(ItemCategory::Chest), 1);
        assert!(!items.chest(first_index).active);

        // Step two: drop the bucket.
        assert!(items.remove_chest_entry(0, 3, 4));
        assert!(items.chest_list(0, 3, 4).is_empty());
        assert!(!items.has_item_at(0, 3, 4, ItemCategory::Chest));
    }

    #[test]
    fn test_remove_first_helpers() {
        let mut items = sample_items();
        let loc = MapLocation::new(1, 0, 3);

        assert!(items.remove_bone_pile_first(&loc));
        assert!(!items.has_item_at(1, 0, 3, ItemCategory::BonePile));
        assert_eq!(items.region_counts(1).unwrap().bone_piles, 0);

        // Nothing left there.
        assert!(!items.remove_bone_pile_first(&loc));

        let door = MapLocation::new(0, 2, 0);
        assert!(items.remove_locked_door_first(&door));
        assert_eq!(items.family_count(ItemCategory::LockedDoor), 0);
    }

    #[test]
    fn test_count_conservation() {
        let mut items = sample_items();
        for counts in items.all_region_counts() {
            assert_eq!(counts.category_sum(), counts.total);
        }

        items.remove_locked_door(0, 0);
        items.remove_chests(&[0, 1], 0);
        for counts in items.all_region_counts() {
            assert_eq!(counts.category_sum(), counts.total);
        }
    }

    #[test]
    fn test_document_counters_always_present() {
        let doc = AtlasItems::new().populate_document().unwrap();
        let items = doc["items"].as_object().unwrap();
        for key in [
            "ALTER_MAP_CNT",
            "BONE_PILE_CNT",
            "CHEST_CNT",
            "HAY_BALE_CNT",
            "LOCKED_DOOR_CNT",
            "SPECIFIC_ENEMY_CNT",
        ] {
            assert_eq!(items[key], 0);
        }
        assert!(!items.contains_key("CHESTS"));
        assert!(!items.contains_key("BONE_PILES"));
    }

    #[test]
    fn test_document_round_trip() {
        let source = sample_items();
        let doc = source.populate_document().unwrap();

        let mut loaded = AtlasItems::new();
        loaded.read_document(&doc, 2).unwrap();

        for category in ItemCategory::ALL {
            assert_eq!(
                loaded.family_count(category),
                source.family_count(category),
                "family count for {category:?}"
            );
        }
        assert_eq!(loaded.all_region_counts(), source.all_region_counts());

        // Bucket membership survives the trip.
        let list = loaded.chest_list(0, 3, 4);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].primary_item, "GOLD");
        assert_eq!(list[1].extra_items, vec!["POTION".to_string()]);
        assert_eq!(loaded.specific_enemy_list(1, 1, 0)[0].enemy, EnemyType::Minotaur);
        let gate = loaded.alter_map_list(1, 2, 2)[0].gate.as_ref().unwrap();
        assert_eq!(gate.event, "DRAWBRIDGE_DOWN");
        assert!(gate.must_exist);
    }

    #[test]
    fn test_deactivated_entities_are_not_saved() {
        let mut items = sample_items();
        items.remove_bone_pile(0, 0);
        let doc = items.populate_document().unwrap();
        let block = doc["items"]["BONE_PILES"].as_object().unwrap();
        assert_eq!(block.len(), 1, "only the active pile is written");
        assert_eq!(doc["items"]["BONE_PILE_CNT"], 1);
    }

    #[test]
    fn test_out_of_range_region_is_an_error_not_a_fault() {
        // sample_items spans two regions; loading it into a one-region
        // world must fail cleanly instead of faulting in the rebuild.
        let doc = sample_items().populate_document().unwrap();
        let mut loaded = AtlasItems::new();
        let err = loaded.read_document(&doc, 1).unwrap_err();
        assert!(err.to_string().contains("names region"), "got: {err:#}");

        let mut empty_world = AtlasItems::new();
        assert!(empty_world.read_document(&doc, 0).is_err());
    }

    #[test]
    fn test_count_mismatch_is_not_fatal() {
        let mut doc = sample_items().populate_document().unwrap();
        // Declare one chest too many.
        doc["items"]["CHEST_CNT"] = Value::from(3);

        let mut loaded = AtlasItems::new();
        loaded.read_document(&doc, 2).unwrap();
        assert_eq!(loaded.family_count(ItemCategory::Chest), 2);
    }
}
