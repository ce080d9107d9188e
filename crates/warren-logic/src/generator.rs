//! Layout generation run.
//!
//! A [`LayoutGenerator`] owns everything one run touches: the seeded random
//! stream, the region registry and the tile grid. The run advances through a
//! fixed sequence of phases:
//!
//! ```text
//! Uninitialized → SeedsSet → MapReset → SpawnPlaced → CorridorsGrown
//!               → RoomsGrown → Rasterized → Furnished
//! ```
//!
//! Each phase is a public method that refuses to run out of order, so callers
//! can step through a run and inspect the registry in between. [`run`] performs
//! all of them and returns the finished [`Layout`].
//!
//! [`run`]: LayoutGenerator::run

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::align::align;
use crate::config::{validate_config, ConfigError, LayoutConfig};
use crate::furnish::{furnish_region, FurnishError, FurnishingService};
use crate::geometry::{Direction, Vec2};
use crate::placement::{PlacementSearch, PlacementSettings, SizeRequest};
use crate::raster::{RasterStats, TileGrid, TileRasterizer};
use crate::region::{RegionId, RegionKind};
use crate::registry::{RegionRegistry, RegionRole};
use crate::rng::{time_seed, LayoutRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GenerationPhase {
    Uninitialized,
    SeedsSet,
    MapReset,
    SpawnPlaced,
    CorridorsGrown,
    RoomsGrown,
    Rasterized,
    Furnished,
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Furnish(#[from] FurnishError),
    #[error("phase {found} cannot be followed by this step (expected {expected})")]
    PhaseOrder {
        expected: GenerationPhase,
        found: GenerationPhase,
    },
    #[error("spawn template offers no connection the main corridor can meet")]
    NoSpawnConnection,
    #[error("main corridor template has no {0} connection")]
    NoCorridorConnection(Direction),
}

/// Outcome of one growth phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthReport {
    pub target: u32,
    pub added: u32,
    pub attempts: u32,
    pub longest_failure_streak: u32,
    /// Stopped because the consecutive-failure budget ran out.
    pub exhausted: bool,
}

/// A finished layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub seed: String,
    pub registry: RegionRegistry,
    pub tiles: TileGrid,
    pub spawn: RegionId,
    pub main_corridor: RegionId,
    pub corridor_growth: GrowthReport,
    pub room_growth: GrowthReport,
    pub raster: RasterStats,
}

impl Layout {
    fn world_center(&self, id: RegionId) -> Option<Vec2> {
        let c = self.registry.get(id)?.center();
        Some(Vec2::new(
            c.x * self.tiles.tile_size,
            c.y * self.tiles.tile_size,
        ))
    }

    /// Center of the spawn room, in world units.
    pub fn player_spawn_point(&self) -> Option<Vec2> {
        self.world_center(self.spawn)
    }

    /// Center of a random region other than the spawn room and main corridor.
    /// With `exclude_corridors` only rooms are considered. Falls back to the
    /// main corridor when nothing qualifies.
    pub fn random_spawn_point(&self, exclude_corridors: bool, rng: &mut impl Rng) -> Option<Vec2> {
        let candidates: Vec<RegionId> = if exclude_corridors {
            self.registry
                .rooms()
                .iter()
                .copied()
                .filter(|&id| id != self.spawn)
                .collect()
        } else {
            self.registry
                .regions()
                .iter()
                .map(|r| r.id)
                .filter(|&id| id != self.spawn && id != self.main_corridor)
                .collect()
        };
        let id = candidates.choose(rng).copied().unwrap_or(self.main_corridor);
        self.world_center(id)
    }
}

pub struct LayoutGenerator {
    config: LayoutConfig,
    phase: GenerationPhase,
    seed: String,
    rng: LayoutRng,
    registry: RegionRegistry,
    tiles: Option<TileGrid>,
    raster: RasterStats,
    spawn: RegionId,
    main_corridor: RegionId,
    corridor_growth: GrowthReport,
    room_growth: GrowthReport,
}

impl LayoutGenerator {
    /// Creates a generator for a validated copy of `config`.
    pub fn new(config: LayoutConfig) -> Result<Self, ConfigError> {
        let issues = validate_config(&config);
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        Ok(Self {
            config,
            phase: GenerationPhase::Uninitialized,
            seed: String::new(),
            rng: LayoutRng::from_u64(0),
            registry: RegionRegistry::default(),
            tiles: None,
            raster: RasterStats::default(),
            spawn: RegionId::default(),
            main_corridor: RegionId::default(),
            corridor_growth: GrowthReport::default(),
            room_growth: GrowthReport::default(),
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn tiles(&self) -> Option<&TileGrid> {
        self.tiles.as_ref()
    }

    /// Draws consumed from the run's random stream so far.
    pub fn draws(&self) -> u64 {
        self.rng.draws()
    }

    fn expect_phase(&self, expected: GenerationPhase) -> Result<(), GenerationError> {
        if self.phase != expected {
            return Err(GenerationError::PhaseOrder {
                expected,
                found: self.phase,
            });
        }
        Ok(())
    }

    /// Runs every phase and hands out the result. The generator can be run again.
    pub fn run(&mut self, service: &mut impl FurnishingService) -> Result<Layout, GenerationError> {
        self.set_seed();
        self.reset_map()?;
        self.place_spawn()?;
        self.grow_corridors()?;
        self.grow_rooms()?;
        self.rasterize()?;
        self.furnish(service)?;

        Ok(Layout {
            seed: self.seed.clone(),
            registry: std::mem::take(&mut self.registry),
            tiles: self.tiles.take().unwrap_or_default(),
            spawn: self.spawn,
            main_corridor: self.main_corridor,
            corridor_growth: self.corridor_growth,
            room_growth: self.room_growth,
            raster: self.raster,
        })
    }

    // ── Phases ──────────────────────────────────────────────────────────

    /// Starts a run: picks the seed string and reseeds the random stream.
    /// Allowed from any phase.
    pub fn set_seed(&mut self) {
        self.seed = if self.config.use_random_seed {
            time_seed()
        } else {
            self.config.seed.clone()
        };
        self.rng = LayoutRng::from_seed_str(&self.seed);
        self.phase = GenerationPhase::SeedsSet;
        log::info!("Layout seed \"{}\"", self.seed);
    }

    pub fn reset_map(&mut self) -> Result<(), GenerationError> {
        self.expect_phase(GenerationPhase::SeedsSet)?;
        self.tiles = None;
        self.registry.reset(self.config.bounds);
        self.raster = RasterStats::default();
        self.spawn = RegionId::default();
        self.main_corridor = RegionId::default();
        self.corridor_growth = GrowthReport::default();
        self.room_growth = GrowthReport::default();
        self.phase = GenerationPhase::MapReset;
        Ok(())
    }

    /// Places the spawn room and attaches the main corridor to it.
    pub fn place_spawn(&mut self) -> Result<(), GenerationError> {
        self.expect_phase(GenerationPhase::MapReset)?;
        let thickness = self.config.wall_thickness;
        let spawn_template = &self.config.spawn_template;
        let corridor_template = &self.config.main_corridor_template;

        let spawn = spawn_template.instantiate(self.config.spawn_position(), &thickness);
        let sides: Vec<Direction> = spawn
            .walls
            .iter()
            .filter(|w| !w.possible_connections.is_empty())
            .map(|w| w.direction)
            .filter(|d| !corridor_template.options(d.opposite()).is_empty())
            .collect();
        let side = *self
            .rng
            .pick(&sides)
            .ok_or(GenerationError::NoSpawnConnection)?;
        let opening = *self
            .rng
            .pick(&spawn.wall(side).possible_connections)
            .ok_or(GenerationError::NoSpawnConnection)?;
        let option = corridor_template
            .random_option(side.opposite(), &mut self.rng)
            .ok_or(GenerationError::NoCorridorConnection(side.opposite()))?;

        let position = align(&opening, &option, side, &thickness);
        let mut corridor = corridor_template.instantiate(position, &thickness);
        corridor.entry = Some(side.opposite());

        let spawn_id = self.registry.add(spawn, RegionRole::Room);
        self.registry.set_spawn(spawn_id);
        let corridor_id = self.registry.add(corridor, RegionRole::Corridor);
        self.registry.connect(spawn_id, corridor_id, opening);
        self.spawn = spawn_id;
        self.main_corridor = corridor_id;

        log::info!(
            "Spawn placed; main corridor attached on the {} side through {}",
            side,
            opening
        );
        self.phase = GenerationPhase::SpawnPlaced;
        Ok(())
    }

    pub fn grow_corridors(&mut self) -> Result<GrowthReport, GenerationError> {
        self.expect_phase(GenerationPhase::SpawnPlaced)?;
        let report = self.grow(self.config.additional_corridors, Self::try_corridor);
        log::info!(
            "Additional corridors: {} of {} ({} attempts)",
            report.added,
            report.target,
            report.attempts
        );
        self.corridor_growth = report;
        self.phase = GenerationPhase::CorridorsGrown;
        Ok(report)
    }

    pub fn grow_rooms(&mut self) -> Result<GrowthReport, GenerationError> {
        self.expect_phase(GenerationPhase::CorridorsGrown)?;
        let report = self.grow(self.config.additional_rooms, Self::try_room);
        log::info!(
            "Additional rooms: {} of {} ({} attempts)",
            report.added,
            report.target,
            report.attempts
        );
        self.room_growth = report;
        self.phase = GenerationPhase::RoomsGrown;
        Ok(report)
    }

    pub fn rasterize(&mut self) -> Result<RasterStats, GenerationError> {
        self.expect_phase(GenerationPhase::RoomsGrown)?;
        self.tiles = None;
        let rasterizer = TileRasterizer::new(&self.config.tiles, &self.config.kind_tiles);
        let (grid, stats) = rasterizer.rasterize(&self.registry, self.config.tile_size);
        log::info!(
            "Rasterized {} regions: {} tiles written, {} doorway cells, {} conflicts, {} clipped",
            self.registry.len(),
            stats.written,
            stats.replaced,
            stats.conflicts,
            stats.out_of_bounds
        );
        self.tiles = Some(grid);
        self.raster = stats;
        self.phase = GenerationPhase::Rasterized;
        Ok(stats)
    }

    /// Hands every unfurnished region's furniture to `service`. Stops at the
    /// first invalid entry.
    pub fn furnish(&mut self, service: &mut impl FurnishingService) -> Result<usize, GenerationError> {
        self.expect_phase(GenerationPhase::Rasterized)?;
        let ids: Vec<RegionId> = self
            .registry
            .regions()
            .iter()
            .filter(|r| !r.furnished)
            .map(|r| r.id)
            .collect();
        let mut placed = 0;
        for id in ids {
            if let Some(region) = self.registry.get(id) {
                let extra = self
                    .config
                    .furniture
                    .get(&region.kind)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                placed += furnish_region(region, extra, service)?;
            }
            self.registry.mark_furnished(id);
        }
        log::info!("Furnished {} entries", placed);
        self.phase = GenerationPhase::Furnished;
        Ok(placed)
    }

    // ── Growth ──────────────────────────────────────────────────────────

    /// Repeats `attempt` until `target` successes or until the failure budget
    /// runs out. Successes reset the failure count.
    fn grow(&mut self, target: u32, attempt: fn(&mut Self) -> bool) -> GrowthReport {
        let budget = self.config.max_generation_attempts;
        let mut report = GrowthReport {
            target,
            ..GrowthReport::default()
        };
        let mut failures = 0;
        while report.added < target {
            if failures >= budget {
                report.exhausted = true;
                log::warn!(
                    "{} consecutive failed attempts, stopping at {} of {}",
                    failures,
                    report.added,
                    target
                );
                break;
            }
            report.attempts += 1;
            if attempt(self) {
                report.added += 1;
                failures = 0;
            } else {
                failures += 1;
                report.longest_failure_streak = report.longest_failure_streak.max(failures);
            }
        }
        report
    }

    /// Tries every corridor, in random order, for a side branch.
    fn try_corridor(&mut self) -> bool {
        let request =
            SizeRequest::corridor(self.config.corridor_width, self.config.corridor_length);
        let mut pool = self.registry.corridors().to_vec();
        while let Some(anchor) = self.rng.take(&mut pool) {
            let Some(region) = self.registry.get(anchor) else {
                continue;
            };
            let mut walls: Vec<Direction> = region
                .perpendicular_walls()
                .iter()
                .map(|w| w.direction)
                .collect();
            if self.attach(anchor, &mut walls, &request, RegionKind::Corridor) {
                return true;
            }
        }
        false
    }

    /// Tries every wall of one random corridor for a room.
    fn try_room(&mut self) -> bool {
        let request = SizeRequest::room(self.config.room_size);
        let Some(&anchor) = self.rng.pick(self.registry.corridors()) else {
            return false;
        };
        let mut walls = Direction::ALL.to_vec();
        self.attach(anchor, &mut walls, &request, RegionKind::ClassRoom)
    }

    /// Searches the anchor's `walls` in random order and registers the first fit.
    fn attach(
        &mut self,
        anchor: RegionId,
        walls: &mut Vec<Direction>,
        request: &SizeRequest,
        kind: RegionKind,
    ) -> bool {
        let settings = PlacementSettings::from_config(&self.config);
        let (role, width) = if kind.is_corridor() {
            (RegionRole::Corridor, None)
        } else {
            (RegionRole::Room, Some(self.config.room_connection_width))
        };
        while let Some(direction) = self.rng.take(walls) {
            let Some(anchor_region) = self.registry.get(anchor) else {
                return false;
            };
            let search = PlacementSearch::new(&self.registry, settings);
            let Some(mut region) =
                search.find(anchor_region.wall(direction), request, &mut self.rng)
            else {
                continue;
            };
            region.kind = kind;
            let Some(opening) = anchor_region.shared_opening(&region, width) else {
                log::debug!(
                    "{:?} at {} shares no floor with {}",
                    kind,
                    region.outer,
                    anchor
                );
                continue;
            };
            let id = self.registry.add(region, role);
            self.registry.connect(anchor, id, opening);
            log::debug!("{:?} {} attached to {} through {}", kind, id, anchor, opening);
            return true;
        }
        false
    }
}
