//! Diagnostic output for finished layouts.
//!
//! [`DiagnosticExport`] is a flat JSON description of every region and wall,
//! meant for an external tool to draw. [`render_ascii`] prints the tile grid
//! for quick inspection in a terminal.

use serde::{Deserialize, Serialize};

use crate::generator::{GrowthReport, Layout};
use crate::geometry::{Direction, Point, Rect};
use crate::raster::{RasterStats, TileClass};
use crate::region::{Region, RegionId, RegionKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallShape {
    pub direction: Direction,
    pub bounds: Rect,
    pub possible_connections: Vec<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionShape {
    pub id: RegionId,
    pub kind: RegionKind,
    pub outer: Rect,
    pub inner: Rect,
    pub entry: Option<Direction>,
    pub is_spawn: bool,
    pub walls: Vec<WallShape>,
    pub connections: Vec<Rect>,
}

impl From<&Region> for RegionShape {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id,
            kind: region.kind,
            outer: region.outer,
            inner: region.inner,
            entry: region.entry,
            is_spawn: region.is_spawn,
            walls: region
                .walls
                .iter()
                .map(|w| WallShape {
                    direction: w.direction,
                    bounds: w.bounds,
                    possible_connections: w.possible_connections.clone(),
                })
                .collect(),
            connections: region.connections.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticExport {
    pub seed: String,
    pub bounds: Rect,
    pub tile_size: f32,
    pub regions: Vec<RegionShape>,
    pub corridor_growth: GrowthReport,
    pub room_growth: GrowthReport,
    pub raster: RasterStats,
}

impl DiagnosticExport {
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            seed: layout.seed.clone(),
            bounds: layout.registry.bounds(),
            tile_size: layout.tiles.tile_size,
            regions: layout.registry.regions().iter().map(RegionShape::from).collect(),
            corridor_growth: layout.corridor_growth,
            room_growth: layout.room_growth,
            raster: layout.raster,
        }
    }
}

pub fn export_json(layout: &Layout) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&DiagnosticExport::from_layout(layout))
}

/// Text map of the tile grid, north up, cropped to the placed regions.
///
/// `#` wall, `.` floor, `+` doorway, blank for empty cells.
pub fn render_ascii(layout: &Layout) -> String {
    let grid = &layout.tiles;
    let Some(area) = layout
        .registry
        .regions()
        .iter()
        .map(|r| r.outer)
        .reduce(|a, b| {
            Rect::from_min_max(
                Point::new(a.x.min(b.x), a.y.min(b.y)),
                Point::new(a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
            )
        })
        .and_then(|a| a.intersection(&grid.bounds))
    else {
        return String::new();
    };

    let mut out = String::with_capacity(area.area() as usize + area.height as usize);
    for y in (area.y..area.y + area.height).rev() {
        let row: String = (area.x..area.x + area.width)
            .map(|x| match grid.get(Point::new(x, y)).map(|t| t.class) {
                Some(TileClass::Wall(_)) => '#',
                Some(TileClass::Floor(_)) => '.',
                Some(TileClass::Connection) => '+',
                None => ' ',
            })
            .collect();
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}
