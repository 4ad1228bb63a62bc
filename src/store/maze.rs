//! Runtime cursor over the atlas: tracks the region the player is in and
//! answers the bounds-checked tile queries the first-person view needs.

use anyhow::{Result, anyhow};

use crate::model::{Chest, SpecificEnemy};
use crate::store::atlas::Atlas;
use crate::store::items::AtlasItems;
use crate::store::region::Region;

/// Rendering seam. The view layer implements this; the maze pushes
/// `(slot, tile)` pairs at it and knows nothing about drawing.
pub trait TileSink {
    fn draw(&mut self, slot: usize, tile: i32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    North,
    South,
    East,
    West,
}

/// The 13 offsets of the forward visibility cone as `(lateral, depth)`
/// pairs: a far row two tiles out, a mid row one tile out, and the
/// player's own row. Slot numbers are positions in this table.
const VIEW_CONE: [(i32, i32); 13] = [
    (-2, 2),
    (-1, 2),
    (0, 2),
    (1, 2),
    (2, 2),
    (-2, 1),
    (-1, 1),
    (0, 1),
    (1, 1),
    (2, 1),
    (-1, 0),
    (0, 0),
    (1, 0),
];

pub struct MazeMap<'a> {
    atlas: &'a Atlas,
    items: &'a AtlasItems,
    region: &'a Region,
}

impl<'a> MazeMap<'a> {
    pub fn new(atlas: &'a Atlas, items: &'a AtlasItems, region_number: u32) -> Result<Self> {
        let region = atlas
            .region_by_number(region_number)
            .ok_or_else(|| anyhow!("no region numbered {region_number}"))?;
        Ok(MazeMap {
            atlas,
            items,
            region,
        })
    }

    /// Moves the cursor to another region, e.g. after taking an exit.
    pub fn set_region(&mut self, region_number: u32) -> Result<()> {
        self.region = self
            .atlas
            .region_by_number(region_number)
            .ok_or_else(|| anyhow!("no region numbered {region_number}"))?;
        Ok(())
    }

    pub fn current_region(&self) -> &Region {
        self.region
    }

    pub fn items(&self) -> &AtlasItems {
        self.items
    }

    pub fn bounds_check(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.region.width() && y >= 0 && y < self.region.height()
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<i32> {
        self.bounds_check(x, y).then(|| self.region.tile(x, y))
    }

    /// Resolves one tile for the view layer. Coordinates outside the
    /// region are a silent no-op: the sink is simply not called.
    pub fn render_tile(&self, x: i32, y: i32, slot: usize, sink: &mut impl TileSink) {
        if self.bounds_check(x, y) {
            sink.draw(slot, self.region.tile(x, y));
        }
    }

    /// Walks the 13-offset visibility cone in front of the player. The
    /// base table is authored facing SOUTH (+y); the other facings
    /// rotate it so slot numbering stays identical from the viewer's
    /// perspective.
    pub fn render(&self, player_x: i32, player_y: i32, facing: Facing, sink: &mut impl TileSink) {
        for (slot, (lateral, depth)) in VIEW_CONE.iter().enumerate() {
            let (x, y) = match facing {
                Facing::South => (player_x + lateral, player_y + depth),
                Facing::North => (player_x - lateral, player_y - depth),
                Facing::East => (player_x + depth, player_y - lateral),
                Facing::West => (player_x - depth, player_y + lateral),
            };
            self.render_tile(x, y, slot, sink);
        }
    }

    // Location queries against the item store, in current-region terms.

    pub fn chests_at(&self, x: i32, y: i32) -> Vec<&Chest> {
        self.items.chest_list(self.region.number(), x, y)
    }

    pub fn specific_enemies_at(&self, x: i32, y: i32) -> Vec<&SpecificEnemy> {
        self.items.specific_enemy_list(self.region.number(), x, y)
    }
}
