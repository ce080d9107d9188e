//! Premade region templates.
//!
//! A template is a fixed-size region with one or more alternative openings per
//! side, so it can be attached in several equally valid ways. Openings are
//! authored in template-local coordinates (origin at the first floor cell) on
//! the innermost wall row of their side, which keeps templates independent of
//! the configured wall thickness. Instantiation projects them outward onto the
//! boundary row where neighbouring regions meet.

use serde::{Deserialize, Serialize};

use crate::furnish::FurnitureEntry;
use crate::geometry::{Direction, Point, Rect};
use crate::raster::TileSetOverride;
use crate::region::{Region, RegionKind, WallThickness};
use crate::rng::LayoutRng;

/// Alternative openings on one side of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConnections {
    pub direction: Direction,
    pub options: Vec<Rect>,
}

/// A predefined region layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTemplate {
    pub name: String,
    pub kind: RegionKind,
    /// Floor size along x.
    pub inner_width: i32,
    /// Floor size along y.
    pub inner_length: i32,
    #[serde(default)]
    pub connections: Vec<TemplateConnections>,
    #[serde(default)]
    pub tiles: Option<TileSetOverride>,
    #[serde(default)]
    pub furniture: Vec<FurnitureEntry>,
}

impl RegionTemplate {
    pub fn inner_size(&self) -> Point {
        Point::new(self.inner_width, self.inner_length)
    }

    pub fn outer_size(&self, thickness: &WallThickness) -> Point {
        Point::new(
            self.inner_width + thickness.east + thickness.west,
            self.inner_length + thickness.north + thickness.south,
        )
    }

    /// Openings authored for `direction`, in local coordinates.
    pub fn options(&self, direction: Direction) -> &[Rect] {
        self.connections
            .iter()
            .find(|c| c.direction == direction)
            .map(|c| c.options.as_slice())
            .unwrap_or(&[])
    }

    pub fn random_option(&self, direction: Direction, rng: &mut LayoutRng) -> Option<Rect> {
        rng.pick(self.options(direction)).copied()
    }

    /// True if `option` sits on the innermost wall row of `direction`, within the floor span.
    pub fn option_on_wall(&self, direction: Direction, option: &Rect) -> bool {
        let expected = match direction {
            Direction::North => Rect::new(0, self.inner_length, self.inner_width, 1),
            Direction::South => Rect::new(0, -1, self.inner_width, 1),
            Direction::East => Rect::new(self.inner_width, 0, 1, self.inner_length),
            Direction::West => Rect::new(-1, 0, 1, self.inner_length),
        };
        expected.contains_rect(option)
    }

    /// Builds a region whose inner bounds start at `position`.
    pub fn instantiate(&self, position: Point, thickness: &WallThickness) -> Region {
        let size = self.outer_size(thickness);
        let outer = Rect::new(
            position.x - thickness.west,
            position.y - thickness.south,
            size.x,
            size.y,
        );
        let mut region = Region::new(outer, self.kind, None, thickness);
        for group in &self.connections {
            let wall = region.wall_mut(group.direction);
            wall.possible_connections.extend(
                group
                    .options
                    .iter()
                    .map(|o| project_to_boundary(o, group.direction, thickness).translate(position)),
            );
        }
        region.tiles = self.tiles.clone();
        region.furniture = self.furniture.clone();
        region
    }

    /// 4×4 spawn room with a centered two-cell opening on every side.
    pub fn default_spawn() -> Self {
        Self {
            name: "spawn".to_string(),
            kind: RegionKind::SpawnRoom,
            inner_width: 4,
            inner_length: 4,
            connections: vec![
                TemplateConnections {
                    direction: Direction::North,
                    options: vec![Rect::new(1, 4, 2, 1)],
                },
                TemplateConnections {
                    direction: Direction::East,
                    options: vec![Rect::new(4, 1, 1, 2)],
                },
                TemplateConnections {
                    direction: Direction::South,
                    options: vec![Rect::new(1, -1, 2, 1)],
                },
                TemplateConnections {
                    direction: Direction::West,
                    options: vec![Rect::new(-1, 1, 1, 2)],
                },
            ],
            tiles: None,
            furniture: Vec::new(),
        }
    }

    /// 16×44 main corridor, openable at three points on each side.
    pub fn default_main_corridor() -> Self {
        let across = |y: i32| [3, 7, 11].map(|x| Rect::new(x, y, 2, 1)).to_vec();
        let along = |x: i32| [10, 21, 32].map(|y| Rect::new(x, y, 1, 2)).to_vec();
        Self {
            name: "main_corridor".to_string(),
            kind: RegionKind::MainCorridor,
            inner_width: 16,
            inner_length: 44,
            connections: vec![
                TemplateConnections {
                    direction: Direction::North,
                    options: across(44),
                },
                TemplateConnections {
                    direction: Direction::East,
                    options: along(16),
                },
                TemplateConnections {
                    direction: Direction::South,
                    options: across(-1),
                },
                TemplateConnections {
                    direction: Direction::West,
                    options: along(-1),
                },
            ],
            tiles: None,
            furniture: Vec::new(),
        }
    }
}

/// Moves an opening from the innermost wall row out to the boundary row.
pub fn project_to_boundary(option: &Rect, direction: Direction, thickness: &WallThickness) -> Rect {
    option.translate(direction.unit().scale(thickness.get(direction) - 1))
}
