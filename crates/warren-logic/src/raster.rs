//! Tile rasterization of the finished region graph.
//!
//! Every region writes its wall band, then its floor, then the doorways of its
//! connections into one [`TileGrid`]. Walls and floors never replace a tile that
//! is already there; doorways always do, so a connection stays open no matter
//! which of its two regions is drawn last.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Vec2};
use crate::region::{Region, RegionKind};
use crate::registry::RegionRegistry;

/// Global tile set names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSets {
    pub floor: String,
    pub wall: String,
    pub connection: String,
}

impl Default for TileSets {
    fn default() -> Self {
        Self {
            floor: "floor".to_string(),
            wall: "wall".to_string(),
            connection: "connection".to_string(),
        }
    }
}

/// Per-region or per-kind replacement for the floor and wall tile sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSetOverride {
    pub floor: Option<String>,
    pub wall: Option<String>,
}

/// Position of a cell within its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TilePart {
    BottomLeft,
    Bottom,
    BottomRight,
    Left,
    Middle,
    Right,
    TopLeft,
    Top,
    TopRight,
}

impl TilePart {
    /// Classifies local cell `(x, y)` of a `width` × `height` rectangle.
    pub fn classify(x: i32, y: i32, width: i32, height: i32) -> Self {
        let left = x == 0;
        let right = x == width - 1;
        let bottom = y == 0;
        let top = y == height - 1;
        match (left, right, bottom, top) {
            (true, _, true, _) => TilePart::BottomLeft,
            (_, true, true, _) => TilePart::BottomRight,
            (true, _, _, true) => TilePart::TopLeft,
            (_, true, _, true) => TilePart::TopRight,
            (true, ..) => TilePart::Left,
            (_, true, ..) => TilePart::Right,
            (_, _, true, _) => TilePart::Bottom,
            (.., true) => TilePart::Top,
            _ => TilePart::Middle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileClass {
    Wall(TilePart),
    Floor(TilePart),
    Connection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub class: TileClass,
    /// Index into [`TileGrid::tilesets`].
    pub tileset: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Replaced,
    Conflict,
    OutOfBounds,
}

/// Cell grid covering the generation bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub bounds: Rect,
    pub tile_size: f32,
    pub tilesets: Vec<String>,
    cells: Vec<Option<Tile>>,
}

impl TileGrid {
    pub fn new(bounds: Rect, tile_size: f32) -> Self {
        Self {
            bounds,
            tile_size,
            tilesets: Vec::new(),
            cells: vec![None; bounds.area().max(0) as usize],
        }
    }

    fn index(&self, cell: Point) -> Option<usize> {
        if !self.bounds.contains_point(cell) {
            return None;
        }
        let local = cell - self.bounds.min();
        Some(local.y as usize * self.bounds.width as usize + local.x as usize)
    }

    /// Index of a tile set name, registering it on first use.
    pub fn tileset_index(&mut self, name: &str) -> u16 {
        match self.tilesets.iter().position(|t| t == name) {
            Some(i) => i as u16,
            None => {
                self.tilesets.push(name.to_string());
                (self.tilesets.len() - 1) as u16
            }
        }
    }

    pub fn tileset_name(&self, tile: &Tile) -> &str {
        self.tilesets
            .get(tile.tileset as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn write(&mut self, cell: Point, tile: Tile, replace: bool) -> WriteOutcome {
        let Some(i) = self.index(cell) else {
            return WriteOutcome::OutOfBounds;
        };
        match (self.cells[i], replace) {
            (Some(_), false) => WriteOutcome::Conflict,
            (Some(_), true) => {
                self.cells[i] = Some(tile);
                WriteOutcome::Replaced
            }
            (None, _) => {
                self.cells[i] = Some(tile);
                WriteOutcome::Written
            }
        }
    }

    pub fn get(&self, cell: Point) -> Option<&Tile> {
        self.index(cell).and_then(|i| self.cells[i].as_ref())
    }

    /// World position of a cell's center.
    pub fn world_center(&self, cell: Point) -> Vec2 {
        Vec2::new(
            (cell.x as f32 + 0.5) * self.tile_size,
            (cell.y as f32 + 0.5) * self.tile_size,
        )
    }

    /// Occupied cells, row by row from the bottom.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &Tile)> + '_ {
        self.bounds
            .cells()
            .zip(self.cells.iter())
            .filter_map(|(p, t)| t.as_ref().map(|t| (p, t)))
    }

    pub fn count(&self, pred: impl Fn(&TileClass) -> bool) -> usize {
        self.cells.iter().flatten().filter(|t| pred(&t.class)).count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterStats {
    pub written: usize,
    pub replaced: usize,
    pub conflicts: usize,
    pub out_of_bounds: usize,
}

impl RasterStats {
    fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written += 1,
            WriteOutcome::Replaced => self.replaced += 1,
            WriteOutcome::Conflict => self.conflicts += 1,
            WriteOutcome::OutOfBounds => self.out_of_bounds += 1,
        }
    }
}

pub struct TileRasterizer<'a> {
    pub tiles: &'a TileSets,
    pub kind_tiles: &'a BTreeMap<RegionKind, TileSetOverride>,
}

impl<'a> TileRasterizer<'a> {
    pub fn new(tiles: &'a TileSets, kind_tiles: &'a BTreeMap<RegionKind, TileSetOverride>) -> Self {
        Self { tiles, kind_tiles }
    }

    pub fn rasterize(&self, registry: &RegionRegistry, tile_size: f32) -> (TileGrid, RasterStats) {
        let mut grid = TileGrid::new(registry.bounds(), tile_size);
        let mut stats = RasterStats::default();
        for region in registry.regions() {
            let before = stats;
            self.draw_region(&mut grid, region, &mut stats);
            let conflicts = stats.conflicts - before.conflicts;
            let clipped = stats.out_of_bounds - before.out_of_bounds;
            if conflicts > 0 {
                log::debug!("Region {}: {} tile conflicts skipped", region.id, conflicts);
            }
            if clipped > 0 {
                log::warn!(
                    "Region {}: {} tiles outside the grid {}",
                    region.id,
                    clipped,
                    grid.bounds
                );
            }
        }
        (grid, stats)
    }

    /// Floor and wall tile sets for `region`'s kind.
    fn tileset_names(&self, region: &Region) -> (&'a str, &'a str) {
        let tiles: &'a TileSets = self.tiles;
        let kind = self.kind_tiles.get(&region.kind);
        let floor = kind
            .and_then(|k| k.floor.as_deref())
            .unwrap_or(tiles.floor.as_str());
        let wall = kind
            .and_then(|k| k.wall.as_deref())
            .unwrap_or(tiles.wall.as_str());
        (floor, wall)
    }

    fn draw_region(&self, grid: &mut TileGrid, region: &Region, stats: &mut RasterStats) {
        let (kind_floor, kind_wall) = self.tileset_names(region);
        let own = region.tiles.as_ref();
        let floor_name = own.and_then(|o| o.floor.as_deref()).unwrap_or(kind_floor);
        let wall_name = own.and_then(|o| o.wall.as_deref()).unwrap_or(kind_wall);
        let floor = grid.tileset_index(floor_name);
        let wall = grid.tileset_index(wall_name);
        let connection = grid.tileset_index(&self.tiles.connection);

        let outer = region.outer;
        let t = region.thickness;
        for cell in outer.cells() {
            let local = cell - outer.min();
            let part = TilePart::classify(local.x, local.y, outer.width, outer.height);
            let in_band = local.x < t.west
                || local.x > outer.width - t.east - 1
                || local.y < t.south
                || local.y > outer.height - t.north - 1;
            if part == TilePart::Middle && !in_band {
                continue;
            }
            let tile = Tile {
                class: TileClass::Wall(part),
                tileset: wall,
            };
            stats.record(grid.write(cell, tile, false));
        }

        let inner = region.inner;
        for cell in inner.cells() {
            let local = cell - inner.min();
            let tile = Tile {
                class: TileClass::Floor(TilePart::classify(
                    local.x,
                    local.y,
                    inner.width,
                    inner.height,
                )),
                tileset: floor,
            };
            stats.record(grid.write(cell, tile, false));
        }

        for opening in &region.connections {
            let tile = Tile {
                class: TileClass::Connection,
                tileset: connection,
            };
            for cell in region.doorway(opening).cells() {
                stats.record(grid.write(cell, tile, true));
            }
        }
    }
}
