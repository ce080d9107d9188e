//! Furnishing contract.
//!
//! The layout core does not place furniture itself. It validates each
//! furniture entry and hands it, together with its region, to a
//! [`FurnishingService`]. A malformed entry is a content error that aborts the
//! run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::region::{Region, RegionId, RegionKind};

/// Where and how to place one copy of a prefab, relative to the region's
/// inner-bounds minimum corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTransform {
    pub x: f32,
    pub y: f32,
    /// Degrees, counter-clockwise.
    #[serde(default)]
    pub rotation: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FurnitureEntry {
    pub prefab: Option<String>,
    #[serde(default)]
    pub spawn_transforms: Vec<SpawnTransform>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FurnishError {
    #[error("region {region} ({kind:?}) has a furniture entry without a prefab")]
    MissingPrefab { region: RegionId, kind: RegionKind },
    #[error("region {region}: prefab {prefab} has no spawn transforms")]
    NoSpawnTransforms { region: RegionId, prefab: String },
    #[error("region {region}: furnishing service failed: {reason}")]
    Service { region: RegionId, reason: String },
}

/// Checks that `entry` can be placed at all.
pub fn validate_entry(region: &Region, entry: &FurnitureEntry) -> Result<(), FurnishError> {
    let prefab = match entry.prefab.as_deref() {
        Some(p) if !p.trim().is_empty() => p,
        _ => {
            return Err(FurnishError::MissingPrefab {
                region: region.id,
                kind: region.kind,
            })
        }
    };
    if entry.spawn_transforms.is_empty() {
        return Err(FurnishError::NoSpawnTransforms {
            region: region.id,
            prefab: prefab.to_string(),
        });
    }
    Ok(())
}

/// Receives validated furniture entries.
pub trait FurnishingService {
    fn place(&mut self, region: &Region, entry: &FurnitureEntry) -> Result<(), FurnishError>;
}

/// One placed prefab copy, in world cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedFurniture {
    pub region: RegionId,
    pub prefab: String,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

/// Records placements instead of spawning anything. Used by the harness and tests.
#[derive(Debug, Clone, Default)]
pub struct PlacementLog {
    pub placed: Vec<PlacedFurniture>,
}

impl FurnishingService for PlacementLog {
    fn place(&mut self, region: &Region, entry: &FurnitureEntry) -> Result<(), FurnishError> {
        let prefab = entry.prefab.clone().unwrap_or_default();
        let origin = region.inner.min();
        for t in &entry.spawn_transforms {
            self.placed.push(PlacedFurniture {
                region: region.id,
                prefab: prefab.clone(),
                x: origin.x as f32 + t.x,
                y: origin.y as f32 + t.y,
                rotation: t.rotation,
            });
        }
        Ok(())
    }
}

/// Validates and places the region's own entries followed by `extra`.
/// Returns the number of entries placed.
pub fn furnish_region(
    region: &Region,
    extra: &[FurnitureEntry],
    service: &mut impl FurnishingService,
) -> Result<usize, FurnishError> {
    let entries: Vec<&FurnitureEntry> = region.furniture.iter().chain(extra).collect();
    for entry in &entries {
        validate_entry(region, entry)?;
    }
    for entry in &entries {
        service.place(region, entry)?;
    }
    Ok(entries.len())
}
