//! Placement engine: fit one template against one open socket.
//!
//! For a candidate template the engine walks its sockets in random order
//! and, for each, the four cardinal rotations. The tentative module is
//! rotated, translated so the candidate socket sits exactly on the target
//! socket, and accepted on the first (socket, rotation) pair that both
//! faces the target (near-antiparallel) and fits the occupancy grid.
//!
//! There is no global backtracking. A failed attempt drops its tentative
//! module and touches nothing else; callers move on to the next weighted
//! candidate until the per-connector attempt budget runs out.

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::broadcast::{PlacementRecord, RecordKind, SpawnBroadcaster};
use crate::grid::Cell;
use crate::layout::{Layout, ModuleId, SocketId, TentativeModule};
use crate::templates::{pick_weighted, TemplateId, TemplateLibrary};
use crate::transform::{Rotation, Transform, Vec2};

/// Minimum `dot(candidate_facing, -target_facing)` for two sockets to join.
pub const FACING_THRESHOLD: f32 = 0.95;

/// Maximum distance between the world positions of two paired sockets.
pub const ALIGNMENT_TOLERANCE: f32 = 1e-3;

/// Outcome of a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placed {
    pub module: ModuleId,
    /// The new module's socket that was paired with the target.
    pub socket: SocketId,
}

/// Owns the layout under construction and threads the shared RNG and
/// broadcaster through every placement.
pub struct PlacementEngine<'a, R: Rng + ?Sized, B: SpawnBroadcaster + ?Sized> {
    library: &'a TemplateLibrary,
    cell_size: f32,
    attempt_budget: u32,
    rng: &'a mut R,
    broadcaster: &'a mut B,
    pub layout: Layout,
    pub records: Vec<PlacementRecord>,
    /// Template attempts that found no valid (socket, rotation).
    pub failed_attempts: u32,
}

impl<'a, R: Rng + ?Sized, B: SpawnBroadcaster + ?Sized> PlacementEngine<'a, R, B> {
    pub fn new(
        library: &'a TemplateLibrary,
        cell_size: f32,
        attempt_budget: u32,
        rng: &'a mut R,
        broadcaster: &'a mut B,
    ) -> Self {
        Self {
            library,
            cell_size,
            attempt_budget,
            rng,
            broadcaster,
            layout: Layout::new(),
            records: Vec::new(),
            failed_attempts: 0,
        }
    }

    pub fn library(&self) -> &'a TemplateLibrary {
        self.library
    }

    pub fn rng(&mut self) -> &mut R {
        &mut *self.rng
    }

    /// Place the spawn module at `origin` with no rotation.
    pub fn place_spawn(&mut self, template: TemplateId, origin: Vec2) -> ModuleId {
        let mut tentative = TentativeModule::new(template);
        tentative.transform = Transform::new(origin, Rotation::R0);
        let cells = tentative.cells(self.library.template(template), self.cell_size);
        self.confirm(tentative, cells)
    }

    /// Try to attach `template` to the open socket `target`.
    ///
    /// Returns `None`, with the layout untouched, if no (socket, rotation)
    /// combination both faces the target and fits.
    pub fn try_place(&mut self, template_id: TemplateId, target: SocketId) -> Option<Placed> {
        let library = self.library;
        let template = library.template(template_id);
        let (target_pos, target_facing) = {
            let s = self.layout.socket(target);
            (s.position, s.facing)
        };

        let mut tentative = TentativeModule::new(template_id);
        let mut order: Vec<usize> = (0..template.sockets.len()).collect();
        order.shuffle(&mut *self.rng);

        for index in order {
            for rotation in Rotation::ALL {
                tentative.transform = Transform::new(Vec2::ZERO, rotation);
                let (local, facing) = tentative.socket_pose(template, index, self.cell_size);
                tentative.transform.position = target_pos - local;

                if facing.dot(-target_facing) < FACING_THRESHOLD {
                    trace!(
                        "{} socket {} at {}°: facing mismatch",
                        template.id,
                        index,
                        rotation.degrees()
                    );
                    continue;
                }

                let cells = tentative.cells(template, self.cell_size);
                if !self.layout.grid.can_place(&cells) {
                    trace!(
                        "{} socket {} at {}°: occupied",
                        template.id,
                        index,
                        rotation.degrees()
                    );
                    continue;
                }

                let module = self.confirm(tentative, cells);
                let socket = self.layout.module(module).sockets[index];
                self.layout.connectors.pair(target, socket);
                return Some(Placed { module, socket });
            }
        }

        None
    }

    /// Try weighted candidates against `target` until one fits or the
    /// attempt budget is spent.
    pub fn place_with_budget(&mut self, candidates: &[TemplateId], target: SocketId) -> Option<Placed> {
        if candidates.is_empty() {
            return None;
        }
        let order = pick_weighted(self.library, candidates, &mut *self.rng);
        for template in order.into_iter().take(self.attempt_budget as usize) {
            if let Some(placed) = self.try_place(template, target) {
                return Some(placed);
            }
            self.failed_attempts += 1;
            debug!(
                "no fit for '{}' at socket {}",
                self.library.template(template).id,
                target.0
            );
        }
        None
    }

    /// Hand a decorative placement to the broadcaster.
    pub fn emit_content(&mut self, template_id: &str, position: Vec2, rotation: Rotation) {
        let record = PlacementRecord::new(template_id, RecordKind::Content, position, rotation);
        self.emit(record);
    }

    /// Consume the engine, returning the finished layout and records.
    pub fn finish(self) -> (Layout, Vec<PlacementRecord>, u32) {
        (self.layout, self.records, self.failed_attempts)
    }

    fn confirm(&mut self, tentative: TentativeModule, cells: Vec<Cell>) -> ModuleId {
        let template = self.library.template(tentative.template);
        let record = PlacementRecord::new(
            &template.id,
            RecordKind::Module,
            tentative.transform.position,
            tentative.transform.rotation,
        );
        let id = self
            .layout
            .confirm(tentative, self.library, cells, self.cell_size);
        self.emit(record);
        id
    }

    fn emit(&mut self, record: PlacementRecord) {
        self.broadcaster.broadcast(&record);
        self.records.push(record);
    }
}
