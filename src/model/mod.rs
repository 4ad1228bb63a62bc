//! Shared value types for the atlas, item store and maze cursor.
//!
//! Everything here is plain data; the behavior lives in `store`.

use serde::{Deserialize, Serialize};

/// A `(region, x, y)` triple. Mutable in place so gameplay code can reuse
/// one instance as "where the player is" / "where this event happened".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapLocation {
    pub region: u32,
    pub x: i32,
    pub y: i32,
}

impl MapLocation {
    pub fn new(region: u32, x: i32, y: i32) -> Self {
        MapLocation { region, x, y }
    }

    pub fn move_to(&mut self, region: u32, x: i32, y: i32) {
        self.region = region;
        self.x = x;
        self.y = y;
    }
}

/// The six location-keyed entity families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    AlterMap,
    BonePile,
    Chest,
    HayBale,
    LockedDoor,
    SpecificEnemy,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 6] = [
        ItemCategory::AlterMap,
        ItemCategory::BonePile,
        ItemCategory::Chest,
        ItemCategory::HayBale,
        ItemCategory::LockedDoor,
        ItemCategory::SpecificEnemy,
    ];
}

/// Composite key of the spatial index. Structural equality and hashing —
/// one bucket per `(region, x, y, category)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub region: u32,
    pub x: i32,
    pub y: i32,
    pub category: ItemCategory,
}

impl LocationKey {
    pub fn new(region: u32, x: i32, y: i32, category: ItemCategory) -> Self {
        LocationKey {
            region,
            x,
            y,
            category,
        }
    }
}

/// Enemy roster. Serialized by name (SCREAMING_SNAKE_CASE) in both the
/// region enemy lists and the specific-enemy placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnemyType {
    GiantRat,
    CaveSpider,
    Skeleton,
    Zombie,
    Bandit,
    Wraith,
    Minotaur,
}

/// One walk-off transition out of a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    #[serde(rename = "EXIT_X")]
    pub x: i32,
    #[serde(rename = "EXIT_Y")]
    pub y: i32,
    #[serde(rename = "DEST_MAP")]
    pub dest_region: u32,
    #[serde(rename = "DEST_X")]
    pub dest_x: i32,
    #[serde(rename = "DEST_Y")]
    pub dest_y: i32,
}

/// A shop doorway; entering hands control to the shop with `shop_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(rename = "EXIT_X")]
    pub x: i32,
    #[serde(rename = "EXIT_Y")]
    pub y: i32,
    #[serde(rename = "SHOP_ID")]
    pub shop_id: u32,
    #[serde(rename = "DEST_X")]
    pub dest_x: i32,
    #[serde(rename = "DEST_Y")]
    pub dest_y: i32,
}

/// Optional gate on an alter-map trigger: the trigger only fires when the
/// named campaign event exists (or doesn't, when `must_exist` is false).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignGate {
    pub event: String,
    pub must_exist: bool,
}

/// Tile-rewrite trigger: stepping here changes the tile at its location.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterMap {
    pub region: u32,
    pub x: i32,
    pub y: i32,
    pub tile: i32,
    pub gate: Option<CampaignGate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BonePile {
    pub region: u32,
    pub x: i32,
    pub y: i32,
    pub active: bool,
    /// Position in the owning list at insertion time. Stable for the
    /// list's lifetime; deactivation never compacts.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chest {
    pub region: u32,
    pub x: i32,
    pub y: i32,
    pub primary_item: String,
    pub primary_count: u32,
    pub extra_items: Vec<String>,
    pub active: bool,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HayBale {
    pub region: u32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LockedDoor {
    pub region: u32,
    pub x: i32,
    pub y: i32,
    pub active: bool,
    pub index: usize,
}

/// A hand-placed enemy, as opposed to the random roster of its region.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecificEnemy {
    pub region: u32,
    pub x: i32,
    pub y: i32,
    pub enemy: EnemyType,
}

/// Running aggregate counts for one region: one slot per category plus a
/// total. Adjusted incrementally, never recomputed outside a full rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionCounts {
    pub alter_maps: i32,
    pub bone_piles: i32,
    pub chests: i32,
    pub hay_bales: i32,
    pub locked_doors: i32,
    pub specific_enemies: i32,
    pub total: i32,
}

impl RegionCounts {
    pub fn slot(&self, category: ItemCategory) -> i32 {
        match category {
            ItemCategory::AlterMap => self.alter_maps,
            ItemCategory::BonePile => self.bone_piles,
            ItemCategory::Chest => self.chests,
            ItemCategory::HayBale => self.hay_bales,
            ItemCategory::LockedDoor => self.locked_doors,
            ItemCategory::SpecificEnemy => self.specific_enemies,
        }
    }

    pub fn slot_mut(&mut self, category: ItemCategory) -> &mut i32 {
        match category {
            ItemCategory::AlterMap => &mut self.alter_maps,
            ItemCategory::BonePile => &mut self.bone_piles,
            ItemCategory::Chest => &mut self.chests,
            ItemCategory::HayBale => &mut self.hay_bales,
            ItemCategory::LockedDoor => &mut self.locked_doors,
            ItemCategory::SpecificEnemy => &mut self.specific_enemies,
        }
    }

    /// Sum over the six category slots. Equals `total` whenever every
    /// mutation went through the paired adjustment.
    pub fn category_sum(&self) -> i32 {
        ItemCategory::ALL.iter().map(|c| self.slot(*c)).sum()
    }
}
