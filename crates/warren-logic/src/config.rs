//! Generation configuration: tunables, templates and tile sets.
//!
//! Configs are plain JSON documents. Every field has a default, so a partial
//! file only overrides what it names. Loading validates the result and reports
//! every problem at once.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::align::align;
use crate::furnish::FurnitureEntry;
use crate::geometry::{Axis, Direction, Point, Rect};
use crate::raster::{TileSetOverride, TileSets};
use crate::region::{RegionKind, WallThickness};
use crate::template::RegionTemplate;

/// Current config file format.
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: i32,
    pub max: i32,
}

impl SizeRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl std::fmt::Display for SizeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}|{}]", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub format_version: u32,
    /// Generation area. Also the extent of the occupancy and tile grids.
    pub bounds: Rect,
    pub seed: String,
    /// Ignore `seed` and derive one from the clock.
    pub use_random_seed: bool,
    /// Consecutive failed attempts before a growth phase gives up.
    pub max_generation_attempts: u32,
    pub additional_corridors: u32,
    pub additional_rooms: u32,
    /// Corridor size along the anchor wall.
    pub corridor_width: SizeRange,
    /// Corridor size away from the anchor wall.
    pub corridor_length: SizeRange,
    /// Room size along both axes.
    pub room_size: SizeRange,
    pub spawn_template: RegionTemplate,
    pub main_corridor_template: RegionTemplate,
    pub tiles: TileSets,
    pub kind_tiles: BTreeMap<RegionKind, TileSetOverride>,
    pub wall_thickness: WallThickness,
    /// Candidate points keep this distance from both ends of a wall.
    pub corner_inset: i32,
    pub candidate_step: i32,
    /// Cells two regions may share along their outer edge.
    pub overlap_margin: i32,
    pub room_connection_width: i32,
    /// World size of one grid cell.
    pub tile_size: f32,
    pub furniture: BTreeMap<RegionKind, Vec<FurnitureEntry>>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            format_version: CONFIG_FORMAT_VERSION,
            bounds: Rect::new(-50, -50, 100, 100),
            seed: "elementary".to_string(),
            use_random_seed: false,
            max_generation_attempts: 25,
            additional_corridors: 2,
            additional_rooms: 10,
            corridor_width: SizeRange::new(4, 6),
            corridor_length: SizeRange::new(12, 24),
            room_size: SizeRange::new(6, 10),
            spawn_template: RegionTemplate::default_spawn(),
            main_corridor_template: RegionTemplate::default_main_corridor(),
            tiles: TileSets::default(),
            kind_tiles: BTreeMap::new(),
            wall_thickness: WallThickness::default(),
            corner_inset: 3,
            candidate_step: 2,
            overlap_margin: 1,
            room_connection_width: 2,
            tile_size: 1.0,
            furniture: BTreeMap::new(),
        }
    }
}

impl LayoutConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        let issues = validate_config(&config);
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Inner-bounds origin that centers the spawn template in the generation area.
    pub fn spawn_position(&self) -> Point {
        let size = self.spawn_template.inner_size();
        Point::new(
            self.bounds.x + (self.bounds.width - size.x).div_euclid(2),
            self.bounds.y + (self.bounds.height - size.y).div_euclid(2),
        )
    }

    /// Smallest outer size along either axis that still leaves `floor` cells of floor.
    pub fn min_outer_for_floor(&self, floor: i32) -> i32 {
        self.wall_thickness
            .across(Axis::X)
            .max(self.wall_thickness.across(Axis::Y))
            + floor
    }
}

/// A single problem found by [`validate_config`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("generation bounds {0} are empty")]
    EmptyBounds(Rect),
    #[error("{0} wall thickness must be at least 1, got {1}")]
    InvalidThickness(Direction, i32),
    #[error("{name} range {range} is empty or non-positive")]
    InvalidRange { name: String, range: SizeRange },
    #[error("{name} minimum {min} is below {required}, which leaves no usable floor")]
    RangeTooSmall {
        name: String,
        min: i32,
        required: i32,
    },
    #[error("corner inset {inset} is below {required}; connections could miss the floor")]
    CornerInsetTooSmall { inset: i32, required: i32 },
    #[error("candidate step must be at least 1, got {0}")]
    InvalidStep(i32),
    #[error("overlap margin must not be negative, got {0}")]
    NegativeMargin(i32),
    #[error("overlap margin {margin} is at least half the {name} minimum {min}")]
    MarginTooWide { name: String, margin: i32, min: i32 },
    #[error("room connection width must be at least 1, got {0}")]
    InvalidConnectionWidth(i32),
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),
    #[error("tile set name for {0} is empty")]
    EmptyTileSet(String),
    #[error("template {template} has empty inner size {width}x{length}")]
    EmptyTemplate {
        template: String,
        width: i32,
        length: i32,
    },
    #[error("template {template} {direction} option {option} is not on its innermost wall row")]
    OptionOffWall {
        template: String,
        direction: Direction,
        option: Rect,
    },
    #[error("spawn template has no connection options")]
    NoSpawnOptions,
    #[error("main corridor template has no {0} option to meet the spawn's {1} side")]
    NoMatchingCorridorOption(Direction, Direction),
    #[error("spawn template does not fit inside the generation bounds")]
    SpawnOutsideBounds,
    #[error("main corridor does not fit inside the generation bounds from any spawn side")]
    MainCorridorOutsideBounds,
}

/// Validate a config. Returns every issue found; empty means valid.
pub fn validate_config(config: &LayoutConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if config.format_version != CONFIG_FORMAT_VERSION {
        issues.push(ConfigIssue::UnsupportedVersion {
            found: config.format_version,
            expected: CONFIG_FORMAT_VERSION,
        });
    }
    if config.bounds.is_empty() {
        issues.push(ConfigIssue::EmptyBounds(config.bounds));
    }
    for d in Direction::ALL {
        let t = config.wall_thickness.get(d);
        if t < 1 {
            issues.push(ConfigIssue::InvalidThickness(d, t));
        }
    }

    // ── Size ranges ─────────────────────────────────────────────────────
    let cw = config.room_connection_width;
    let ranges = [
        ("corridor_width", config.corridor_width, config.min_outer_for_floor(1)),
        ("corridor_length", config.corridor_length, config.min_outer_for_floor(1)),
        ("room_size", config.room_size, config.min_outer_for_floor(cw.max(1))),
    ];
    for (name, range, required) in ranges {
        if range.min < 1 || range.min > range.max {
            issues.push(ConfigIssue::InvalidRange {
                name: name.to_string(),
                range,
            });
        } else {
            if range.min < required {
                issues.push(ConfigIssue::RangeTooSmall {
                    name: name.to_string(),
                    min: range.min,
                    required,
                });
            }
            if config.overlap_margin > 0 && 2 * config.overlap_margin >= range.min {
                issues.push(ConfigIssue::MarginTooWide {
                    name: name.to_string(),
                    margin: config.overlap_margin,
                    min: range.min,
                });
            }
        }
    }

    // ── Search parameters ───────────────────────────────────────────────
    let required_inset = config.min_outer_for_floor(cw.max(1)) - 1;
    if config.corner_inset < required_inset {
        issues.push(ConfigIssue::CornerInsetTooSmall {
            inset: config.corner_inset,
            required: required_inset,
        });
    }
    if config.candidate_step < 1 {
        issues.push(ConfigIssue::InvalidStep(config.candidate_step));
    }
    if config.overlap_margin < 0 {
        issues.push(ConfigIssue::NegativeMargin(config.overlap_margin));
    }
    if cw < 1 {
        issues.push(ConfigIssue::InvalidConnectionWidth(cw));
    }
    if config.tile_size.is_nan() || config.tile_size <= 0.0 {
        issues.push(ConfigIssue::InvalidTileSize(config.tile_size));
    }

    // ── Tile sets ───────────────────────────────────────────────────────
    for (name, value) in [
        ("floor", &config.tiles.floor),
        ("wall", &config.tiles.wall),
        ("connection", &config.tiles.connection),
    ] {
        if value.trim().is_empty() {
            issues.push(ConfigIssue::EmptyTileSet(name.to_string()));
        }
    }

    // ── Templates ───────────────────────────────────────────────────────
    for template in [&config.spawn_template, &config.main_corridor_template] {
        if template.inner_width < 1 || template.inner_length < 1 {
            issues.push(ConfigIssue::EmptyTemplate {
                template: template.name.clone(),
                width: template.inner_width,
                length: template.inner_length,
            });
        }
        for group in &template.connections {
            for option in &group.options {
                if !template.option_on_wall(group.direction, option) {
                    issues.push(ConfigIssue::OptionOffWall {
                        template: template.name.clone(),
                        direction: group.direction,
                        option: *option,
                    });
                }
            }
        }
    }

    let spawn_sides: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&d| !config.spawn_template.options(d).is_empty())
        .collect();
    let has_spawn_options = !spawn_sides.is_empty();
    if !has_spawn_options {
        issues.push(ConfigIssue::NoSpawnOptions);
    }
    for side in spawn_sides {
        if config
            .main_corridor_template
            .options(side.opposite())
            .is_empty()
        {
            issues.push(ConfigIssue::NoMatchingCorridorOption(side.opposite(), side));
        }
    }

    let spawn_size = config.spawn_template.outer_size(&config.wall_thickness);
    let position = config.spawn_position();
    let spawn_outer = Rect::new(
        position.x - config.wall_thickness.west,
        position.y - config.wall_thickness.south,
        spawn_size.x,
        spawn_size.y,
    );
    if !config.bounds.is_empty() && !config.bounds.contains_rect(&spawn_outer) {
        issues.push(ConfigIssue::SpawnOutsideBounds);
    } else if has_spawn_options && !main_corridor_fits(config) {
        issues.push(ConfigIssue::MainCorridorOutsideBounds);
    }

    issues
}

/// True if some spawn opening and matching corridor option place the main
/// corridor entirely inside the bounds.
fn main_corridor_fits(config: &LayoutConfig) -> bool {
    let thickness = &config.wall_thickness;
    let corridor = &config.main_corridor_template;
    let spawn = config
        .spawn_template
        .instantiate(config.spawn_position(), thickness);
    spawn.walls.iter().any(|wall| {
        let side = wall.direction;
        wall.possible_connections.iter().any(|opening| {
            corridor.options(side.opposite()).iter().any(|option| {
                let position = align(opening, option, side, thickness);
                let outer = corridor.instantiate(position, thickness).outer;
                config.bounds.contains_rect(&outer)
            })
        })
    })
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {}", join_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&LayoutConfig::default()), Vec::new());
    }

    #[test]
    fn test_spawn_centered_in_bounds() {
        let config = LayoutConfig::default();
        assert_eq!(config.spawn_position(), Point::new(-2, -2));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json(r#"{ "seed": "castle", "additional_rooms": 3 }"#)
            .unwrap();
        assert_eq!(config.seed, "castle");
        assert_eq!(config.additional_rooms, 3);
        assert_eq!(config.room_size, SizeRange::new(6, 10));
    }

    #[test]
    fn test_wrong_version_rejected() {
        let err = LayoutConfig::from_json(r#"{ "format_version": 7 }"#).unwrap_err();
        match err {
            ConfigError::Invalid(issues) => assert_eq!(
                issues,
                vec![ConfigIssue::UnsupportedVersion {
                    found: 7,
                    expected: CONFIG_FORMAT_VERSION
                }]
            ),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            LayoutConfig::from_json("{ seed: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_reports_every_issue() {
        let config = LayoutConfig {
            candidate_step: 0,
            overlap_margin: -1,
            corner_inset: 1,
            room_size: SizeRange::new(9, 4),
            tile_size: 0.0,
            ..LayoutConfig::default()
        };
        let issues = validate_config(&config);
        assert!(issues.contains(&ConfigIssue::InvalidStep(0)));
        assert!(issues.contains(&ConfigIssue::NegativeMargin(-1)));
        assert!(issues.contains(&ConfigIssue::CornerInsetTooSmall {
            inset: 1,
            required: 3
        }));
        assert!(issues.contains(&ConfigIssue::InvalidRange {
            name: "room_size".to_string(),
            range: SizeRange::new(9, 4)
        }));
        assert!(issues.contains(&ConfigIssue::InvalidTileSize(0.0)));
    }

    #[test]
    fn test_thick_walls_raise_minimums() {
        let config = LayoutConfig {
            wall_thickness: WallThickness {
                north: 2,
                east: 1,
                south: 2,
                west: 1,
            },
            ..LayoutConfig::default()
        };
        let issues = validate_config(&config);
        assert!(issues.contains(&ConfigIssue::CornerInsetTooSmall {
            inset: 3,
            required: 5
        }));
        assert!(!issues.iter().any(|i| matches!(
            i,
            ConfigIssue::RangeTooSmall { name, .. } if name == "room_size"
        )));
        assert!(issues.contains(&ConfigIssue::RangeTooSmall {
            name: "corridor_width".to_string(),
            min: 4,
            required: 5
        }));
    }

    #[test]
    fn test_template_option_checks() {
        let mut config = LayoutConfig::default();
        config.spawn_template.connections[0].options[0] = Rect::new(1, 2, 2, 1);
        config
            .main_corridor_template
            .connections
            .retain(|c| c.direction != Direction::West);
        let issues = validate_config(&config);
        assert!(issues.contains(&ConfigIssue::OptionOffWall {
            template: "spawn".to_string(),
            direction: Direction::North,
            option: Rect::new(1, 2, 2, 1)
        }));
        assert!(issues.contains(&ConfigIssue::NoMatchingCorridorOption(
            Direction::West,
            Direction::East
        )));
    }

    #[test]
    fn test_spawn_must_fit_bounds() {
        let config = LayoutConfig {
            bounds: Rect::new(0, 0, 4, 4),
            ..LayoutConfig::default()
        };
        assert!(validate_config(&config).contains(&ConfigIssue::SpawnOutsideBounds));
    }

    #[test]
    fn test_main_corridor_must_fit_bounds() {
        let config = LayoutConfig {
            bounds: Rect::new(-10, -10, 20, 20),
            ..LayoutConfig::default()
        };
        let issues = validate_config(&config);
        assert!(!issues.contains(&ConfigIssue::SpawnOutsideBounds));
        assert!(issues.contains(&ConfigIssue::MainCorridorOutsideBounds));
        assert!(!validate_config(&LayoutConfig::default())
            .contains(&ConfigIssue::MainCorridorOutsideBounds));
    }

    #[test]
    fn test_margin_must_leave_room_to_overlap() {
        let config = LayoutConfig {
            overlap_margin: 3,
            ..LayoutConfig::default()
        };
        let issues = validate_config(&config);
        assert!(issues.contains(&ConfigIssue::MarginTooWide {
            name: "room_size".to_string(),
            margin: 3,
            min: 6
        }));
        assert!(!issues.iter().any(|i| matches!(
            i,
            ConfigIssue::MarginTooWide { name, .. } if name == "corridor_length"
        )));

        let narrow = LayoutConfig {
            overlap_margin: 2,
            corridor_width: SizeRange::new(4, 6),
            ..LayoutConfig::default()
        };
        assert!(validate_config(&narrow).contains(&ConfigIssue::MarginTooWide {
            name: "corridor_width".to_string(),
            margin: 2,
            min: 4
        }));
    }
}
