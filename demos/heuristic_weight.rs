use grid_util::point::Point;
use tile_pathfinding::{Aabb, Pathfinder, PathfinderConfig, TileMap, WindowLayout, WorldPoint, MAX_COST};

/// A 32x32 field with a long wall and a doorway at the far end.
struct Field;

impl TileMap for Field {
    type Tile = bool;
    fn tile_at(&self, tile: Point) -> Option<&bool> {
        if !(0..32).contains(&tile.x) || !(0..32).contains(&tile.y) {
            return None;
        }
        Some(if tile.x == 16 && tile.y < 28 { &true } else { &false })
    }
}

// Compares how many iterations a search needs for different heuristic weights and how long the
// resulting path is before shortening.
fn main() {
    let layout = WindowLayout {
        tile_size: 1.0,
        tiles_per_patch: 32,
        window_radius: 0,
    };
    let start = WorldPoint::new(2.5, 2.5);
    let end = WorldPoint::new(29.5, 2.5);
    for weight in [0.25, 0.5, 1.0, 2.0, 4.0] {
        let config = PathfinderConfig {
            heuristic_weight: weight,
            try_shorten: false,
            max_loops: 2000,
            ..PathfinderConfig::default()
        };
        let mut pf = Pathfinder::new(config, layout, |wall: &bool, _| !*wall, |_: &Aabb, _| MAX_COST);
        pf.update(start);
        match pf.get_path(&Field, &[], start, end, false) {
            Some(path) => println!(
                "weight {weight}: {} cells, {} iterations",
                path.len(),
                pf.last_search_iterations()
            ),
            None => println!("weight {weight}: no path within {} iterations", pf.config.max_loops),
        }
    }
}
