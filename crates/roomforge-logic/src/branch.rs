//! Branch growth: one backtracking walk per spawn-module connector.
//!
//! A branch keeps a worklist of open connectors. Each step pops one at
//! random and tries to attach a weighted template to it. New open sockets
//! feed both the branch worklist and the global leftover list; connectors
//! that cannot be filled go to the leftover list only, for the capping pass.

use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::broadcast::SpawnBroadcaster;
use crate::layout::SocketId;
use crate::placement::PlacementEngine;
use crate::templates::{Category, TemplateId, TemplateLibrary};

/// Lifecycle of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BranchState {
    Active,
    /// Room target reached.
    Done,
    /// Ran out of connectors before reaching the target.
    Exhausted,
}

/// Outcome of one branch, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchReport {
    pub root: SocketId,
    pub target: u32,
    pub placed: u32,
    pub state: BranchState,
}

/// Growth candidates split by category.
#[derive(Debug, Clone, Default)]
pub struct TemplatePools {
    pub normal: Vec<TemplateId>,
    pub ending: Vec<TemplateId>,
}

impl TemplatePools {
    pub fn from_library(library: &TemplateLibrary) -> Self {
        Self {
            normal: library.by_category(Category::Normal),
            ending: library.by_category(Category::Ending),
        }
    }
}

/// Split `total` rooms across `connectors` branches.
///
/// Every branch gets the integer quotient; the remainder goes one apiece to
/// the first branches.
pub fn distribute_rooms(total: u32, connectors: usize) -> Vec<u32> {
    if connectors == 0 {
        return Vec::new();
    }
    let n = connectors as u32;
    let base = total / n;
    let remainder = total % n;
    (0..n).map(|i| base + u32::from(i < remainder)).collect()
}

/// Growth state for a single spawn connector.
#[derive(Debug, Clone)]
pub struct Branch {
    root: SocketId,
    target: u32,
    placed: u32,
    state: BranchState,
    worklist: Vec<SocketId>,
}

impl Branch {
    pub fn new(root: SocketId, target: u32) -> Self {
        Self {
            root,
            target,
            placed: 0,
            state: BranchState::Active,
            worklist: vec![root],
        }
    }

    pub fn state(&self) -> BranchState {
        self.state
    }

    /// Run the branch to completion, appending unfilled connectors to
    /// `leftovers`.
    pub fn grow<R, B>(
        &mut self,
        engine: &mut PlacementEngine<'_, R, B>,
        pools: &TemplatePools,
        force_endings: bool,
        leftovers: &mut Vec<SocketId>,
    ) -> BranchReport
    where
        R: Rng + ?Sized,
        B: SpawnBroadcaster + ?Sized,
    {
        while self.state == BranchState::Active {
            self.step(engine, pools, force_endings, leftovers);
        }
        leftovers.append(&mut self.worklist);

        debug!(
            "branch from socket {}: {}/{} rooms ({:?})",
            self.root.0, self.placed, self.target, self.state
        );
        BranchReport {
            root: self.root,
            target: self.target,
            placed: self.placed,
            state: self.state,
        }
    }

    fn step<R, B>(
        &mut self,
        engine: &mut PlacementEngine<'_, R, B>,
        pools: &TemplatePools,
        force_endings: bool,
        leftovers: &mut Vec<SocketId>,
    ) where
        R: Rng + ?Sized,
        B: SpawnBroadcaster + ?Sized,
    {
        if self.placed >= self.target {
            self.state = BranchState::Done;
            return;
        }
        if self.worklist.is_empty() {
            self.state = BranchState::Exhausted;
            return;
        }

        let pick = engine.rng().gen_range(0..self.worklist.len());
        let connector = self.worklist.swap_remove(pick);
        if engine.layout.connectors.is_paired(connector) {
            return;
        }

        let last_room = self.placed + 1 == self.target;
        let mut placed = None;
        let mut is_ending = false;
        if last_room && force_endings && !pools.ending.is_empty() {
            placed = engine.place_with_budget(&pools.ending, connector);
            is_ending = placed.is_some();
        }
        if placed.is_none() {
            placed = engine.place_with_budget(&pools.normal, connector);
        }

        match placed {
            Some(p) => {
                self.placed += 1;
                engine.layout.connectors.record_use(self.root);
                if !is_ending {
                    for socket in engine.layout.open_sockets(p.module) {
                        self.worklist.push(socket);
                        leftovers.push(socket);
                    }
                }
            }
            None => {
                debug!("connector {} left open", connector.0);
                leftovers.push(connector);
            }
        }
    }
}
