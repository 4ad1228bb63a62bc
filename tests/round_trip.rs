use std::fs;

use maze_atlas::model::{EnemyType, ItemCategory};
use maze_atlas::parser::{atlas_from_json, items_from_json, load_world};
use maze_atlas::store::{Facing, MazeMap, TileSink};
use maze_atlas::writer;

fn load_fixtures() -> (maze_atlas::store::Atlas, maze_atlas::store::AtlasItems) {
    let atlas_json = fs::read_to_string("tests/world_atlas.json").unwrap();
    let atlas = atlas_from_json(&atlas_json).expect("valid atlas document");
    let items_json = fs::read_to_string("tests/world_items.json").unwrap();
    let items =
        items_from_json(&items_json, atlas.map_count() as usize).expect("valid items document");
    (atlas, items)
}

#[test]
fn parses_the_world_fixtures() {
    let (atlas, items) = load_fixtures();

    assert_eq!(atlas.region_count(), 2);
    let greenfield = atlas.region("greenfield").unwrap();
    assert_eq!(greenfield.number(), 0);
    assert_eq!((greenfield.width(), greenfield.height()), (4, 3));
    assert_eq!(greenfield.enemies(), &[EnemyType::GiantRat, EnemyType::Bandit]);
    assert_eq!(greenfield.exits()[0].dest_region, 1);
    assert_eq!(greenfield.shops()[0].shop_id, 4);
    assert_eq!(greenfield.tile(1, 1), 2);

    assert_eq!(items.family_count(ItemCategory::Chest), 2);
    let chests = items.chest_list(0, 3, 2);
    assert_eq!(chests.len(), 2);
    assert_eq!(chests[0].primary_item, "GOLD");
    assert_eq!(chests[0].extra_items, vec!["POTION", "ROPE"]);
    assert_eq!(chests[1].primary_item, "SWORD");

    let gate = items.alter_map_list(0, 2, 0)[0].gate.as_ref().unwrap();
    assert_eq!(gate.event, "CRYPT_OPENED");

    let crypt_counts = items.region_counts(1).unwrap();
    assert_eq!(crypt_counts.bone_piles, 1);
    assert_eq!(crypt_counts.locked_doors, 1);
    assert_eq!(crypt_counts.specific_enemies, 1);
    assert_eq!(crypt_counts.total, 3);
}

#[test]
fn atlas_survives_a_full_round_trip() {
    let (atlas, _) = load_fixtures();
    let doc = atlas.serialize().unwrap();

    let mut reloaded = maze_atlas::store::Atlas::new();
    reloaded.deserialize(&doc).unwrap();

    assert_eq!(reloaded.region_count(), atlas.region_count());
    for region in atlas.regions_by_number() {
        let twin = reloaded.region(region.name()).unwrap();
        assert_eq!(twin, region);
    }
}

#[test]
fn items_survive_a_full_round_trip() {
    let (atlas, items) = load_fixtures();
    let doc = items.populate_document().unwrap();

    let mut reloaded = maze_atlas::store::AtlasItems::new();
    reloaded
        .read_document(&doc, atlas.map_count() as usize)
        .unwrap();

    for category in ItemCategory::ALL {
        assert_eq!(reloaded.family_count(category), items.family_count(category));
    }
    assert_eq!(reloaded.all_region_counts(), items.all_region_counts());
    assert_eq!(reloaded.chest_list(0, 3, 2).len(), 2);
    assert_eq!(
        reloaded.specific_enemy_list(1, 1, 0)[0].enemy,
        EnemyType::Wraith
    );
}

#[test]
fn saved_files_reload_identically() {
    let (atlas, items) = load_fixtures();

    let dir = std::env::temp_dir().join("maze-atlas-round-trip");
    fs::create_dir_all(&dir).unwrap();
    let atlas_path = dir.join("atlas.json");
    let items_path = dir.join("items.json");

    writer::save_atlas(&atlas, &atlas_path).unwrap();
    writer::save_items(&items, &items_path).unwrap();

    let (atlas2, items2) = load_world(&atlas_path, &items_path);
    assert_eq!(atlas2.region_count(), 2);
    assert_eq!(atlas2.region("old_crypt").unwrap(), atlas.region("old_crypt").unwrap());
    assert_eq!(items2.all_region_counts(), items.all_region_counts());
}

struct Recorder(Vec<(usize, i32)>);

impl TileSink for Recorder {
    fn draw(&mut self, slot: usize, tile: i32) {
        self.0.push((slot, tile));
    }
}

#[test]
fn maze_cursor_reads_the_loaded_world() {
    let (atlas, items) = load_fixtures();
    let mut maze = MazeMap::new(&atlas, &items, 0).unwrap();

    assert!(maze.bounds_check(3, 2));
    assert!(!maze.bounds_check(4, 0));
    assert_eq!(maze.chests_at(3, 2).len(), 2);

    let mut sink = Recorder(Vec::new());
    maze.render(1, 0, Facing::South, &mut sink);
    assert!(!sink.0.is_empty());

    maze.set_region(1).unwrap();
    assert_eq!(maze.current_region().name(), "old_crypt");
    assert_eq!(maze.specific_enemies_at(1, 0)[0].enemy, EnemyType::Wraith);
}
