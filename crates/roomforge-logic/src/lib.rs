//! Pure layout generation for Roomforge.
//!
//! This crate assembles a connected layout of modules ("rooms") from a
//! template library by matching connector sockets under grid-occupancy
//! constraints, then fills decorative gallery slots. It has no engine or
//! runtime dependency: functions take plain data and return placement
//! records, so a fixed seed gives the same output anywhere.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`branch`] | Per-spawn-socket backtracking growth, room distribution |
//! | [`broadcast`] | Placement records and the `SpawnBroadcaster` seam |
//! | [`capping`] | Terminal pass closing leftover connectors |
//! | [`config`] | Generation parameters and validation |
//! | [`connectors`] | Socket pairing graph and usage counters |
//! | [`error`] | Fatal configuration errors |
//! | [`gallery`] | Decorative slot population |
//! | [`generator`] | Full pipeline: `generate(library, params, seed)` |
//! | [`grid`] | Occupancy grid and footprint cells |
//! | [`layout`] | Arena of confirmed modules and sockets |
//! | [`placement`] | Socket × rotation placement search |
//! | [`templates`] | Template library and weighted selection |
//! | [`transform`] | Cardinal rotations and ground-plane vectors |
//! | [`validate`] | Layout validation (overlap, pairing, connectivity) |

pub mod branch;
pub mod broadcast;
pub mod capping;
pub mod config;
pub mod connectors;
pub mod error;
pub mod gallery;
pub mod generator;
pub mod grid;
pub mod layout;
pub mod placement;
pub mod templates;
pub mod transform;
pub mod validate;

pub use generator::{generate, generate_with, GenerationOutput, GenerationStats};
