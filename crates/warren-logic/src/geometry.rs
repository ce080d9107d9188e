//! Integer grid geometry: cells, half-open rectangles and cardinal directions.
//!
//! The grid uses x to the east and y to the north. A [`Rect`] covers the cells
//! `x..x + width` by `y..y + height`, so `max()` is exclusive.

use serde::{Deserialize, Serialize};

/// A grid cell or an integer offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn scale(self, factor: i32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Component along `axis`.
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A continuous world position, used for spawn points and tile centers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One of the two grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Cardinal direction of a wall, measured outward from its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Wall order used everywhere a region lists its walls.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Outward unit vector.
    pub fn unit(self) -> Point {
        match self {
            Direction::North => Point::new(0, 1),
            Direction::East => Point::new(1, 0),
            Direction::South => Point::new(0, -1),
            Direction::West => Point::new(-1, 0),
        }
    }

    /// Unit vector along which a wall facing this way measures its width.
    pub fn perpendicular(self) -> Point {
        match self {
            Direction::North | Direction::South => Point::new(1, 0),
            Direction::East | Direction::West => Point::new(0, 1),
        }
    }

    /// Axis the wall's normal points along.
    pub fn normal_axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::Y,
            Direction::East | Direction::West => Axis::X,
        }
    }

    /// Axis running along the wall.
    pub fn along_axis(self) -> Axis {
        self.normal_axis().other()
    }

    /// True for the sides facing away from the positive axes.
    pub fn is_negative(self) -> bool {
        matches!(self, Direction::South | Direction::West)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Axis-aligned integer rectangle, half-open on its max side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_min_max(min: Point, max: Point) -> Self {
        Self {
            x: min.x,
            y: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
        }
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Exclusive upper corner.
    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Cell extent along `axis`.
    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// `(min, max_exclusive)` along `axis`.
    pub fn span(&self, axis: Axis) -> (i32, i32) {
        match axis {
            Axis::X => (self.x, self.x + self.width),
            Axis::Y => (self.y, self.y + self.height),
        }
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let min = Point::new(self.x.max(other.x), self.y.max(other.y));
        let max = Point::new(
            (self.x + self.width).min(other.x + other.width),
            (self.y + self.height).min(other.y + other.height),
        );
        let r = Rect::from_min_max(min, max);
        (!r.is_empty()).then_some(r)
    }

    /// True if the two rectangles share more than `margin` cells along both
    /// axes. Regions that only share a boundary strip `margin` cells thick do
    /// not count, however narrow either rectangle is.
    pub fn overlaps_by(&self, other: &Rect, margin: i32) -> bool {
        self.intersection(other)
            .is_some_and(|shared| shared.width > margin && shared.height > margin)
    }

    /// Shrinks each side by its own amount.
    pub fn inset(&self, north: i32, east: i32, south: i32, west: i32) -> Rect {
        Rect::new(
            self.x + west,
            self.y + south,
            (self.width - west - east).max(0),
            (self.height - south - north).max(0),
        )
    }

    pub fn translate(&self, by: Point) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }

    /// All cells, row by row from the bottom.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        let (x0, x1) = self.span(Axis::X);
        let (y0, y1) = self.span(Axis::Y);
        (y0..y1).flat_map(move |y| (x0..x1).map(move |x| Point::new(x, y)))
    }

    /// Strip of `thickness` cells along the `side` edge.
    pub fn edge_strip(&self, side: Direction, thickness: i32) -> Rect {
        let t = thickness.clamp(0, self.extent(side.normal_axis()));
        match side {
            Direction::North => Rect::new(self.x, self.y + self.height - t, self.width, t),
            Direction::South => Rect::new(self.x, self.y, self.width, t),
            Direction::East => Rect::new(self.x + self.width - t, self.y, t, self.height),
            Direction::West => Rect::new(self.x, self.y, t, self.height),
        }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {} → {}, {}]",
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height
        )
    }
}

/// `floor(a.center - b.center)` computed without floating point.
pub fn floor_center_offset(a: &Rect, b: &Rect) -> Point {
    Point::new(
        (2 * (a.x - b.x) + a.width - b.width).div_euclid(2),
        (2 * (a.y - b.y) + a.height - b.height).div_euclid(2),
    )
}
