//! One map region: static geography plus its exits, shops and enemy roster.

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::document::{Document, padded_key, req_i32, req_obj, req_str, req_u32};
use crate::model::{EnemyType, Exit, Shop};

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    number: u32,
    music: u32,
    width: i32,
    height: i32,
    background: u32,
    /// Order matters: roster slots are referenced by index elsewhere.
    enemies: Vec<EnemyType>,
    exits: Vec<Exit>,
    shops: Vec<Shop>,
    /// Row-major; `tiles[y][x]`. Appended one row at a time.
    tiles: Vec<Vec<i32>>,
}

impl Region {
    pub fn new(
        name: impl Into<String>,
        number: u32,
        music: u32,
        width: i32,
        height: i32,
        background: u32,
        enemies: Vec<EnemyType>,
    ) -> Self {
        Region {
            name: name.into(),
            number,
            music,
            width,
            height,
            background,
            enemies,
            exits: Vec::new(),
            shops: Vec::new(),
            tiles: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Region numbers are assigned at registration and never change after.
    pub(crate) fn assign_number(&mut self, number: u32) {
        self.number = number;
    }

    pub fn music(&self) -> u32 {
        self.music
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    pub fn enemies(&self) -> &[EnemyType] {
        &self.enemies
    }

    pub fn exits(&self) -> &[Exit] {
        &self.exits
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    pub fn tile_rows(&self) -> &[Vec<i32>] {
        &self.tiles
    }

    /// Unchecked tile lookup; out of range is a programming fault.
    pub fn tile(&self, x: i32, y: i32) -> i32 {
        self.tiles[y as usize][x as usize]
    }

    /// Append-only; duplicate locations are the caller's problem.
    pub fn add_exit(&mut self, x: i32, y: i32, dest_region: u32, dest_x: i32, dest_y: i32) {
        self.exits.push(Exit {
            x,
            y,
            dest_region,
            dest_x,
            dest_y,
        });
    }

    pub fn add_shop(&mut self, x: i32, y: i32, shop_id: u32, dest_x: i32, dest_y: i32) {
        self.shops.push(Shop {
            x,
            y,
            shop_id,
            dest_x,
            dest_y,
        });
    }

    /// Appends one tile row. The caller must supply `width` values per row
    /// and `height` rows total; nothing checks this at append time.
    pub fn add_tile_row(&mut self, values: Vec<i32>) {
        self.tiles.push(values);
    }

    // ── document codec ────────────────────────────────────────────────

    pub fn to_document(&self) -> Result<Document> {
        let mut doc = Document::new();
        doc.insert("regionName".into(), Value::from(self.name.as_str()));
        doc.insert("regionNbr".into(), Value::from(self.number));
        doc.insert("regionMusic".into(), Value::from(self.music));
        doc.insert("regionWidth".into(), Value::from(self.width));
        doc.insert("regionHeight".into(), Value::from(self.height));
        doc.insert("regionBackground".into(), Value::from(self.background));
        doc.insert("enemyCount".into(), Value::from(self.enemies.len()));
        doc.insert("exitCount".into(), Value::from(self.exits.len()));
        doc.insert("shopCount".into(), Value::from(self.shops.len()));

        let mut tiles = Document::new();
        for (i, row) in self.tiles.iter().enumerate() {
            tiles.insert(padded_key("ROW", i + 1), Value::from(row.clone()));
        }
        doc.insert("tiles".into(), Value::Object(tiles));

        // Optional blocks only show up when non-empty.
        if !self.enemies.is_empty() {
            let mut enemies = Document::new();
            for (i, e) in self.enemies.iter().enumerate() {
                enemies.insert(padded_key("ENEMY", i + 1), serde_json::to_value(e)?);
            }
            doc.insert("enemies".into(), Value::Object(enemies));
        }
        if !self.exits.is_empty() {
            let mut exits = Document::new();
            for (i, e) in self.exits.iter().enumerate() {
                exits.insert(padded_key("EXIT", i + 1), serde_json::to_value(e)?);
            }
            doc.insert("exits".into(), Value::Object(exits));
        }
        if !self.shops.is_empty() {
            let mut shops = Document::new();
            for (i, s) in self.shops.iter().enumerate() {
                shops.insert(padded_key("SHOP", i + 1), serde_json::to_value(s)?);
            }
            doc.insert("shops".into(), Value::Object(shops));
        }

        Ok(doc)
    }

    /// Rebuilds a region by replaying the construction API against the
    /// document, so a loaded region is identical to an authored one.
    pub fn from_document(doc: &Document) -> Result<Region> {
        let name = req_str(doc, "regionName")?;
        let number = req_u32(doc, "regionNbr")?;
        let music = req_u32(doc, "regionMusic")?;
        let width = req_i32(doc, "regionWidth")?;
        let height = req_i32(doc, "regionHeight")?;
        let background = req_u32(doc, "regionBackground")?;
        let enemy_count = req_i32(doc, "enemyCount")? as usize;
        let exit_count = req_i32(doc, "exitCount")? as usize;
        let shop_count = req_i32(doc, "shopCount")? as usize;

        let mut enemies = Vec::with_capacity(enemy_count);
        if enemy_count > 0 {
            let block = req_obj(doc, "enemies")?;
            for i in 1..=enemy_count {
                let key = padded_key("ENEMY", i);
                let value = block
                    .get(&key)
                    .ok_or_else(|| anyhow!("region `{name}` missing `{key}`"))?;
                let enemy: EnemyType = serde_json::from_value(value.clone())
                    .with_context(|| format!("region `{name}` entry `{key}`"))?;
                enemies.push(enemy);
            }
        }

        let mut region = Region::new(name, number, music, width, height, background, enemies);

        let tiles = req_obj(doc, "tiles")?;
        for i in 1..=height.max(0) as usize {
            let key = padded_key("ROW", i);
            let row = tiles
                .get(&key)
                .and_then(Value::as_array)
                .ok_or_else(|| anyhow!("region `{name}` missing tile row `{key}`"))?;
            let values = row
                .iter()
                .map(|v| {
                    v.as_i64()
                        .map(|n| n as i32)
                        .ok_or_else(|| anyhow!("region `{name}` row `{key}` has a non-integer tile"))
                })
                .collect::<Result<Vec<i32>>>()?;
            region.add_tile_row(values);
        }

        if exit_count > 0 {
            let block = req_obj(doc, "exits")?;
            for i in 1..=exit_count {
                let key = padded_key("EXIT", i);
                let value = block
                    .get(&key)
                    .ok_or_else(|| anyhow!("region `{name}` missing `{key}`"))?;
                let exit: Exit = serde_json::from_value(value.clone())
                    .with_context(|| format!("region `{name}` entry `{key}`"))?;
                region.add_exit(exit.x, exit.y, exit.dest_region, exit.dest_x, exit.dest_y);
            }
        }
        if shop_count > 0 {
            let block = req_obj(doc, "shops")?;
            for i in 1..=shop_count {
                let key = padded_key("SHOP", i);
                let value = block
                    .get(&key)
                    .ok_or_else(|| anyhow!("region `{name}` missing `{key}`"))?;
                let shop: Shop = serde_json::from_value(value.clone())
                    .with_context(|| format!("region `{name}` entry `{key}`"))?;
                region.add_shop(shop.x, shop.y, shop.shop_id, shop.dest_x, shop.dest_y);
            }
        }

        Ok(region)
    }
}
