//! Layout generation pipeline.
//!
//!   1. validate params and library   -- abort before anything is confirmed
//!   2. place the spawn module         -- once, at the origin, unrotated
//!   3. grow one branch per spawn socket
//!   4. cap leftover connectors with ending templates
//!   5. populate gallery slots         -- after topology is final
//!
//! One RNG threads through every step, so a fixed seed reproduces the exact
//! record sequence.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::branch::{distribute_rooms, Branch, BranchReport, TemplatePools};
use crate::broadcast::{PlacementRecord, RecordCollector, SpawnBroadcaster};
use crate::capping::cap_leftovers;
use crate::config::{validate_params, GenerationParams};
use crate::error::{GenerationError, LibraryError};
use crate::gallery::populate_galleries;
use crate::layout::Layout;
use crate::placement::PlacementEngine;
use crate::templates::{pick_weighted, validate_library, Category, TemplateLibrary};

/// Diagnostic counters for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationStats {
    /// Spawn module plus rooms grown by branches.
    pub rooms_placed: u32,
    /// Ending modules placed by the capping pass.
    pub caps_placed: u32,
    pub content_placed: u32,
    /// Sockets still unpaired at the end.
    pub connectors_open: usize,
    pub failed_attempts: u32,
    pub branches: Vec<BranchReport>,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Confirmed modules and content, in confirmation order.
    pub records: Vec<PlacementRecord>,
    pub layout: Layout,
    pub stats: GenerationStats,
}

/// Generate a layout from `seed`.
pub fn generate(
    library: &TemplateLibrary,
    params: &GenerationParams,
    seed: u64,
) -> Result<GenerationOutput, GenerationError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sink = RecordCollector::default();
    let output = generate_with(library, params, &mut rng, &mut sink)?;
    debug_assert_eq!(sink.records, output.records);
    Ok(output)
}

/// Generate a layout with a caller-supplied RNG and broadcaster.
pub fn generate_with<R, B>(
    library: &TemplateLibrary,
    params: &GenerationParams,
    rng: &mut R,
    broadcaster: &mut B,
) -> Result<GenerationOutput, GenerationError>
where
    R: Rng + ?Sized,
    B: SpawnBroadcaster + ?Sized,
{
    let config_errors = validate_params(params);
    if !config_errors.is_empty() {
        return Err(GenerationError::InvalidParams(config_errors));
    }
    let library_errors = validate_library(library);
    if !library_errors.is_empty() {
        return Err(GenerationError::InvalidLibrary(library_errors));
    }

    let pools = TemplatePools::from_library(library);
    info!(
        "Generating {} rooms from {} templates ({} normal, {} ending)",
        params.room_count,
        library.len(),
        pools.normal.len(),
        pools.ending.len()
    );
    if params.force_endings && pools.ending.is_empty() {
        warn!("force_endings set but library has no ending templates; branches end on normal rooms");
    }

    let mut engine = PlacementEngine::new(
        library,
        params.cell_size,
        params.attempt_budget,
        rng,
        broadcaster,
    );

    let spawns = library.by_category(Category::Spawn);
    let spawn_template = match pick_weighted(library, &spawns, engine.rng()).first() {
        Some(&id) => id,
        None => return Err(GenerationError::InvalidLibrary(vec![LibraryError::MissingSpawn])),
    };
    let spawn = engine.place_spawn(spawn_template, params.origin);

    let roots = engine.layout.module(spawn).sockets.clone();
    let targets = distribute_rooms(params.room_count - 1, roots.len());
    let mut leftovers = Vec::new();
    let mut branches = Vec::with_capacity(roots.len());
    for (&root, target) in roots.iter().zip(targets) {
        let report = Branch::new(root, target).grow(
            &mut engine,
            &pools,
            params.force_endings,
            &mut leftovers,
        );
        branches.push(report);
    }
    let grown: u32 = branches.iter().map(|b| b.placed).sum();

    let caps_placed = if params.room_count > 1 {
        cap_leftovers(&mut engine, &pools.ending, &leftovers)
    } else {
        0
    };

    let content_placed = populate_galleries(&mut engine, &params.gallery);

    let (layout, records, failed_attempts) = engine.finish();
    let stats = GenerationStats {
        rooms_placed: 1 + grown,
        caps_placed,
        content_placed,
        connectors_open: layout.open_socket_count(),
        failed_attempts,
        branches,
    };
    info!(
        "Layout complete: {} rooms, {} caps, {} content, {} connectors open",
        stats.rooms_placed, stats.caps_placed, stats.content_placed, stats.connectors_open
    );

    Ok(GenerationOutput {
        records,
        layout,
        stats,
    })
}
