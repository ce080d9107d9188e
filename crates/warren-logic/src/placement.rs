//! Wall-anchored placement search.
//!
//! Given a wall of an existing region, the search looks for the largest
//! rectangle that sits on the wall's boundary line, extends away from the
//! region, stays inside the generation bounds and overlaps nothing already
//! placed. It is greedy first-fit: candidate points are tried in random order
//! and sizes from largest to smallest, and the first fit wins.

use crate::config::{LayoutConfig, SizeRange};
use crate::geometry::{Axis, Direction, Point, Rect};
use crate::region::{Region, RegionKind, Wall, WallThickness};
use crate::registry::RegionRegistry;
use crate::rng::LayoutRng;

/// Size limits for a new region, relative to the anchor wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRequest {
    /// Extent along the anchor wall.
    pub along: SizeRange,
    /// Extent away from the anchor wall.
    pub away: SizeRange,
}

impl SizeRequest {
    /// Corridors run away from their anchor: `length` is the away extent.
    pub fn corridor(width: SizeRange, length: SizeRange) -> Self {
        Self {
            along: width,
            away: length,
        }
    }

    pub fn room(size: SizeRange) -> Self {
        Self {
            along: size,
            away: size,
        }
    }

    /// `(x, y)` ranges for a region attached to a wall facing `direction`.
    pub fn world_ranges(&self, direction: Direction) -> (SizeRange, SizeRange) {
        match direction.along_axis() {
            Axis::X => (self.along, self.away),
            Axis::Y => (self.away, self.along),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementSettings {
    pub corner_inset: i32,
    pub step: i32,
    pub overlap_margin: i32,
    pub thickness: WallThickness,
}

impl PlacementSettings {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            corner_inset: config.corner_inset,
            step: config.candidate_step,
            overlap_margin: config.overlap_margin,
            thickness: config.wall_thickness,
        }
    }
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

/// One search against a registry snapshot.
pub struct PlacementSearch<'a> {
    registry: &'a RegionRegistry,
    settings: PlacementSettings,
}

impl<'a> PlacementSearch<'a> {
    pub fn new(registry: &'a RegionRegistry, settings: PlacementSettings) -> Self {
        Self { registry, settings }
    }

    /// Finds a region attached to `wall`. `None` means nothing fits; callers
    /// treat it as a failed attempt.
    pub fn find(&self, wall: &Wall, request: &SizeRequest, rng: &mut LayoutRng) -> Option<Region> {
        let extent = wall.extent();
        let inset = self.settings.corner_inset;
        if extent < request.along.min || extent < 2 * inset + 1 {
            log::trace!(
                "{} wall {} too short ({} cells) for {}",
                wall.direction,
                wall.bounds,
                extent,
                request.along
            );
            return None;
        }

        let mut candidates = self.candidate_points(wall);
        while let Some(point) = rng.take(&mut candidates) {
            if let Some(rect) = self.fit_at(wall.direction, point, request) {
                return Some(Region::new(
                    rect,
                    RegionKind::None,
                    Some(wall.direction.opposite()),
                    &self.settings.thickness,
                ));
            }
        }
        None
    }

    /// Points on the wall's boundary line, away from its corners.
    pub fn candidate_points(&self, wall: &Wall) -> Vec<Point> {
        let axis = wall.direction.along_axis();
        let (min, max) = wall.bounds.span(axis);
        let inset = self.settings.corner_inset;
        let a = min + inset;
        let b = max - inset - 1;
        let (lo, hi) = (a.min(b), a.max(b));
        let line = wall.boundary_line();
        (lo..=hi)
            .step_by(self.settings.step.max(1) as usize)
            .map(|c| match axis {
                Axis::X => Point::new(c, line),
                Axis::Y => Point::new(line, c),
            })
            .collect()
    }

    /// Largest free rectangle anchored at `point`, trying away sizes first.
    pub fn fit_at(&self, direction: Direction, point: Point, request: &SizeRequest) -> Option<Rect> {
        for away in (request.away.min..=request.away.max).rev() {
            for along in (request.along.min..=request.along.max).rev() {
                let rect = rect_at(direction, point, along, away);
                if self.registry.contains(&rect)
                    && !self.registry.overlaps(&rect, self.settings.overlap_margin)
                {
                    return Some(rect);
                }
            }
        }
        None
    }
}

/// Rectangle on the far side of a wall facing `direction`. It starts on the
/// boundary line at `point` and ends at `point` along the wall.
pub fn rect_at(direction: Direction, point: Point, along: i32, away: i32) -> Rect {
    let Point { x, y } = point;
    match direction {
        Direction::North => Rect::new(x - along + 1, y, along, away),
        Direction::South => Rect::new(x - along + 1, y - away + 1, along, away),
        Direction::East => Rect::new(x, y - along + 1, away, along),
        Direction::West => Rect::new(x - away + 1, y - along + 1, away, along),
    }
}
