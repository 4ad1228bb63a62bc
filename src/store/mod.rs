//! The functional core: the atlas of regions, the location-keyed item
//! store with its derived spatial index, and the maze cursor on top.

pub mod atlas;
pub mod items;
pub mod maze;
pub mod region;

pub use atlas::Atlas;
pub use items::AtlasItems;
pub use maze::{Facing, MazeMap, TileSink};
pub use region::Region;
