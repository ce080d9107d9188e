//! Placed regions for one generation run.
//!
//! The registry owns every region of the run, the role lists used by the growth
//! phases, and an occupancy grid that records which region claimed each cell.
//! The grid is informational only; overlap tests always scan the outer bounds.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::region::{Region, RegionId, RegionKind};

/// Occupancy record for one grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSpot {
    pub kind: RegionKind,
    pub id: Option<RegionId>,
}

impl RegionSpot {
    pub const EMPTY: Self = Self {
        kind: RegionKind::None,
        id: None,
    };

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
    }
}

/// Which role list a region joins on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRole {
    Room,
    Corridor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionRegistry {
    bounds: Rect,
    regions: Vec<Region>,
    rooms: Vec<RegionId>,
    corridors: Vec<RegionId>,
    grid: Vec<RegionSpot>,
    next_id: u32,
}

impl RegionRegistry {
    pub fn new(bounds: Rect) -> Self {
        let mut registry = Self::default();
        registry.reset(bounds);
        registry
    }

    /// Clears everything and reallocates the grid for `bounds`.
    pub fn reset(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.regions.clear();
        self.rooms.clear();
        self.corridors.clear();
        self.grid = vec![RegionSpot::EMPTY; bounds.area().max(0) as usize];
        self.next_id = 0;
    }

    /// Registers `region` and stamps its footprint. Performs no overlap check.
    pub fn add(&mut self, mut region: Region, role: RegionRole) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        region.id = id;

        let spot = RegionSpot {
            kind: region.kind,
            id: Some(id),
        };
        let mut clipped = 0usize;
        for cell in region.outer.cells() {
            match self.grid_index(cell) {
                Some(i) => self.grid[i] = spot,
                None => clipped += 1,
            }
        }
        if clipped > 0 {
            log::warn!(
                "Region {} {:?} has {} cells outside the grid {}",
                id,
                region.kind,
                clipped,
                self.bounds
            );
        }

        match role {
            RegionRole::Room => self.rooms.push(id),
            RegionRole::Corridor => self.corridors.push(id),
        }
        self.regions.push(region);
        id
    }

    /// True if `candidate` shares more than `margin` cells, along both axes,
    /// with any registered region.
    pub fn overlaps(&self, candidate: &Rect, margin: i32) -> bool {
        self.regions
            .iter()
            .any(|r| candidate.overlaps_by(&r.outer, margin))
    }

    /// True if `rect` lies entirely inside the generation bounds.
    pub fn contains(&self, rect: &Rect) -> bool {
        self.bounds.contains_rect(rect)
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn rooms(&self) -> &[RegionId] {
        &self.rooms
    }

    pub fn corridors(&self) -> &[RegionId] {
        &self.corridors
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Occupancy at a world cell, or `None` outside the grid.
    pub fn spot_at(&self, cell: Point) -> Option<RegionSpot> {
        self.grid_index(cell).map(|i| self.grid[i])
    }

    /// Records `opening` on both regions.
    pub fn connect(&mut self, a: RegionId, b: RegionId, opening: Rect) {
        for id in [a, b] {
            if let Some(region) = self.regions.get_mut(id.index()) {
                region.connections.push(opening);
            }
        }
    }

    pub fn mark_furnished(&mut self, id: RegionId) {
        if let Some(region) = self.regions.get_mut(id.index()) {
            region.furnished = true;
        }
    }

    pub(crate) fn set_spawn(&mut self, id: RegionId) {
        if let Some(region) = self.regions.get_mut(id.index()) {
            region.is_spawn = true;
        }
    }

    fn grid_index(&self, cell: Point) -> Option<usize> {
        if !self.bounds.contains_point(cell) {
            return None;
        }
        let local = cell - self.bounds.min();
        Some(local.y as usize * self.bounds.width as usize + local.x as usize)
    }
}
