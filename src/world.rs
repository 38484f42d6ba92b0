//! The surface through which the pathfinder reads the game world. Terrain and dynamic objects are
//! never mutated; they are queried once per path request while the cost field is rebuilt.
use core::fmt;
use grid_util::point::Point;

/// A position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    pub const fn new(x: f32, y: f32) -> WorldPoint {
        WorldPoint { x, y }
    }
    pub fn distance_squared(&self, other: &WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl Aabb {
    pub fn new(min: WorldPoint, max: WorldPoint) -> Aabb {
        Aabb { min, max }
    }
    /// Builds a box from its centre and half extents.
    pub fn from_center(center: WorldPoint, half_width: f32, half_height: f32) -> Aabb {
        Aabb {
            min: WorldPoint::new(center.x - half_width, center.y - half_height),
            max: WorldPoint::new(center.x + half_width, center.y + half_height),
        }
    }
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }
}

/// Read access to the terrain. Returns [None] where no tile is loaded.
pub trait TileMap {
    type Tile;
    fn tile_at(&self, tile: Point) -> Option<&Self::Tile>;
}

/// A dynamic game object that may add traversal cost to the cells it covers.
pub trait Obstacle {
    /// The physical footprint of the object, [None] if it has no physical presence.
    fn footprint(&self) -> Option<Aabb>;
}

impl Obstacle for Aabb {
    fn footprint(&self) -> Option<Aabb> {
        Some(*self)
    }
}
