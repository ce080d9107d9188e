//! Regions, walls and connections.
//!
//! A region is a rectangle of a given kind. Its outer bounds include the wall
//! band; its inner bounds are the walkable floor. Neighbouring regions share
//! exactly one boundary row or column, and the openings between them live on
//! that shared line.

use serde::{Deserialize, Serialize};

use crate::furnish::FurnitureEntry;
use crate::geometry::{Axis, Direction, Point, Rect, Vec2};
use crate::raster::TileSetOverride;

/// What a region is used for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Freshly placed, kind not yet assigned.
    #[default]
    None,
    SpawnRoom,
    MainCorridor,
    Corridor,
    ClassRoom,
    Storage,
    Toilet,
}

impl RegionKind {
    pub fn is_corridor(self) -> bool {
        matches!(self, RegionKind::MainCorridor | RegionKind::Corridor)
    }
}

/// Registration-order id. Restarts at 0 every run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RegionId(pub u32);

impl RegionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Wall band thickness for each side of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallThickness {
    pub north: i32,
    pub east: i32,
    pub south: i32,
    pub west: i32,
}

impl Default for WallThickness {
    fn default() -> Self {
        Self::uniform(1)
    }
}

impl WallThickness {
    pub const fn uniform(t: i32) -> Self {
        Self {
            north: t,
            east: t,
            south: t,
            west: t,
        }
    }

    pub fn get(&self, direction: Direction) -> i32 {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Thickness as an outward offset.
    pub fn vector(&self, direction: Direction) -> Point {
        direction.unit().scale(self.get(direction))
    }

    /// Combined thickness of the two walls crossed when walking along `axis`.
    pub fn across(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.east + self.west,
            Axis::Y => self.north + self.south,
        }
    }
}

/// One cardinal side of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub direction: Direction,
    /// The wall band on this side of the outer bounds.
    pub bounds: Rect,
    /// Candidate openings, on the boundary row. Only templates provide these;
    /// generated regions get their candidates from the placement search.
    pub possible_connections: Vec<Rect>,
}

impl Wall {
    pub fn new(direction: Direction, bounds: Rect) -> Self {
        Self {
            direction,
            bounds,
            possible_connections: Vec::new(),
        }
    }

    /// Coordinate of the outermost row (north/south) or column (east/west).
    pub fn boundary_line(&self) -> i32 {
        let (min, max) = self.bounds.span(self.direction.normal_axis());
        if self.direction.is_negative() {
            min
        } else {
            max - 1
        }
    }

    /// Length of the wall along its own direction.
    pub fn extent(&self) -> i32 {
        self.bounds.extent(self.direction.along_axis())
    }
}

/// A placed rectangular area with walls and connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Assigned by the registry on registration.
    pub id: RegionId,
    pub kind: RegionKind,
    pub outer: Rect,
    pub inner: Rect,
    pub thickness: WallThickness,
    /// North, east, south, west.
    pub walls: Vec<Wall>,
    /// Realized openings shared with neighbouring regions.
    pub connections: Vec<Rect>,
    pub furnished: bool,
    pub is_spawn: bool,
    /// The side that was attached to an anchor region, if any.
    pub entry: Option<Direction>,
    pub tiles: Option<TileSetOverride>,
    pub furniture: Vec<FurnitureEntry>,
}

impl Region {
    pub fn new(
        outer: Rect,
        kind: RegionKind,
        entry: Option<Direction>,
        thickness: &WallThickness,
    ) -> Self {
        let inner = outer.inset(
            thickness.north,
            thickness.east,
            thickness.south,
            thickness.west,
        );
        let walls = Direction::ALL
            .iter()
            .map(|&d| Wall::new(d, outer.edge_strip(d, thickness.get(d))))
            .collect();
        Self {
            id: RegionId::default(),
            kind,
            outer,
            inner,
            thickness: *thickness,
            walls,
            connections: Vec::new(),
            furnished: false,
            is_spawn: false,
            entry,
            tiles: None,
            furniture: Vec::new(),
        }
    }

    pub fn wall(&self, direction: Direction) -> &Wall {
        &self.walls[wall_slot(direction)]
    }

    pub(crate) fn wall_mut(&mut self, direction: Direction) -> &mut Wall {
        &mut self.walls[wall_slot(direction)]
    }

    pub fn center(&self) -> Vec2 {
        self.outer.center()
    }

    /// Axis the region extends along: the axis of its entry side, or its
    /// longer dimension when it was not attached to anything.
    pub fn growth_axis(&self) -> Axis {
        match self.entry {
            Some(d) => d.normal_axis(),
            None if self.outer.width >= self.outer.height => Axis::X,
            None => Axis::Y,
        }
    }

    /// The two walls running parallel to the growth axis (the "sides" of a corridor).
    pub fn perpendicular_walls(&self) -> Vec<&Wall> {
        let axis = self.growth_axis();
        self.walls
            .iter()
            .filter(|w| w.direction.normal_axis() != axis)
            .collect()
    }

    /// Which boundary line of this region `rect` lies on.
    pub fn side_of(&self, rect: &Rect) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&d| self.outer.edge_strip(d, 1).contains_rect(rect))
    }

    /// `connection` pushed through this region's wall band until it meets the floor.
    pub fn doorway(&self, connection: &Rect) -> Rect {
        let Some(side) = self.side_of(connection) else {
            return *connection;
        };
        let band = self.outer.edge_strip(side, self.thickness.get(side));
        match side.normal_axis() {
            Axis::Y => Rect::new(connection.x, band.y, connection.width, band.height),
            Axis::X => Rect::new(band.x, connection.y, band.width, connection.height),
        }
    }

    /// Opening on the line shared with `other`, restricted to where both floors
    /// are reachable. `width` centers an opening of that size; `None` opens the
    /// whole shared stretch.
    pub fn shared_opening(&self, other: &Region, width: Option<i32>) -> Option<Rect> {
        let strip = self.outer.intersection(&other.outer)?;
        let normal = if strip.height == 1 {
            Axis::Y
        } else if strip.width == 1 {
            Axis::X
        } else {
            return None;
        };
        let along = normal.other();

        let (s0, s1) = strip.span(along);
        let (a0, a1) = self.inner.span(along);
        let (b0, b1) = other.inner.span(along);
        let lo = s0.max(a0).max(b0);
        let hi = s1.min(a1).min(b1);
        if hi <= lo {
            return None;
        }

        let (lo, hi) = match width {
            Some(w) if w > 0 && w < hi - lo => {
                let start = lo + (hi - lo - w) / 2;
                (start, start + w)
            }
            _ => (lo, hi),
        };
        Some(match along {
            Axis::X => Rect::new(lo, strip.y, hi - lo, 1),
            Axis::Y => Rect::new(strip.x, lo, 1, hi - lo),
        })
    }
}

fn wall_slot(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:?} outer={} inner={}",
            self.id, self.kind, self.outer, self.inner
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(outer: Rect) -> Region {
        Region::new(outer, RegionKind::ClassRoom, None, &WallThickness::default())
    }

    #[test]
    fn test_inner_uses_per_side_thickness() {
        let thickness = WallThickness {
            north: 2,
            east: 1,
            south: 1,
            west: 3,
        };
        let r = Region::new(Rect::new(0, 0, 10, 10), RegionKind::None, None, &thickness);
        assert_eq!(r.inner, Rect::new(3, 1, 6, 7));
        assert!(r.outer.contains_rect(&r.inner));
        assert_eq!(r.wall(Direction::North).bounds, Rect::new(0, 8, 10, 2));
        assert_eq!(r.wall(Direction::West).bounds, Rect::new(0, 0, 3, 10));
    }

    #[test]
    fn test_boundary_line() {
        let r = region(Rect::new(-5, -5, 10, 8));
        assert_eq!(r.wall(Direction::North).boundary_line(), 2);
        assert_eq!(r.wall(Direction::South).boundary_line(), -5);
        assert_eq!(r.wall(Direction::East).boundary_line(), 4);
        assert_eq!(r.wall(Direction::West).boundary_line(), -5);
    }

    #[test]
    fn test_perpendicular_walls_follow_entry() {
        let mut r = region(Rect::new(0, 0, 6, 20));
        r.entry = Some(Direction::South);
        let dirs: Vec<Direction> = r.perpendicular_walls().iter().map(|w| w.direction).collect();
        assert_eq!(dirs, vec![Direction::East, Direction::West]);

        r.entry = Some(Direction::West);
        let dirs: Vec<Direction> = r.perpendicular_walls().iter().map(|w| w.direction).collect();
        assert_eq!(dirs, vec![Direction::North, Direction::South]);
    }

    #[test]
    fn test_perpendicular_walls_without_entry_use_long_axis() {
        let r = region(Rect::new(0, 0, 6, 20));
        let dirs: Vec<Direction> = r.perpendicular_walls().iter().map(|w| w.direction).collect();
        assert_eq!(dirs, vec![Direction::East, Direction::West]);
    }

    #[test]
    fn test_shared_opening_centered() {
        let a = region(Rect::new(0, 0, 12, 6));
        // b sits on top of a and shares its row y = 5
        let b = region(Rect::new(2, 5, 8, 6));
        let full = a.shared_opening(&b, None).unwrap();
        assert_eq!(full, Rect::new(3, 5, 6, 1));
        let door = a.shared_opening(&b, Some(2)).unwrap();
        assert_eq!(door, Rect::new(5, 5, 2, 1));
        assert_eq!(a.side_of(&door), Some(Direction::North));
        assert_eq!(b.side_of(&door), Some(Direction::South));
    }

    #[test]
    fn test_shared_opening_requires_single_line() {
        let a = region(Rect::new(0, 0, 10, 10));
        let apart = region(Rect::new(20, 0, 5, 5));
        let deep = region(Rect::new(5, 5, 10, 10));
        assert_eq!(a.shared_opening(&apart, None), None);
        assert_eq!(a.shared_opening(&deep, None), None);
    }

    #[test]
    fn test_doorway_cuts_through_thick_wall() {
        let thickness = WallThickness {
            north: 3,
            ..WallThickness::default()
        };
        let r = Region::new(Rect::new(0, 0, 10, 10), RegionKind::None, None, &thickness);
        let opening = Rect::new(4, 9, 2, 1);
        assert_eq!(r.doorway(&opening), Rect::new(4, 7, 2, 3));
    }
}
