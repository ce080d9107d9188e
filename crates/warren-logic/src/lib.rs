//! Procedural layout generation for Warren.
//!
//! This crate places rectangular rooms and corridors on an integer grid,
//! attaches them wall to wall without overlap, and rasterizes the result into
//! a tile grid. It has no engine or renderer dependency: everything takes plain
//! data and a seeded random stream, so a seed and a config always produce the
//! same layout.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`align`] | Translation that makes two connection openings coincide |
//! | [`config`] | Generation config, JSON loading, validation |
//! | [`export`] | JSON region dump and ASCII map for inspection |
//! | [`furnish`] | Furniture entries, validation, furnishing service trait |
//! | [`generator`] | Per-run context object and phase state machine |
//! | [`geometry`] | Cells, half-open rectangles, cardinal directions |
//! | [`placement`] | Wall-anchored greedy largest-fit search |
//! | [`raster`] | Per-cell wall/floor/doorway tile classification |
//! | [`region`] | Regions, walls, wall thickness, shared openings |
//! | [`registry`] | Placed regions, role lists, occupancy grid, overlap test |
//! | [`rng`] | Seed hashing and the run's single random stream |
//! | [`snapshot`] | Versioned bincode save/load of finished layouts |
//! | [`template`] | Premade regions with alternative connection openings |

pub mod align;
pub mod config;
pub mod export;
pub mod furnish;
pub mod generator;
pub mod geometry;
pub mod placement;
pub mod raster;
pub mod region;
pub mod registry;
pub mod rng;
pub mod snapshot;
pub mod template;

pub use config::LayoutConfig;
pub use generator::{GenerationError, Layout, LayoutGenerator};
