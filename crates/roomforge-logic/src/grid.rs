//! Occupancy grid: the set of integer floor cells claimed by confirmed
//! modules.
//!
//! Collision is cell-granular. A footprint cell's centre is projected along
//! the instance's current (rotated) right/forward axes and rounded to the
//! nearest grid unit.

use std::collections::HashMap;

use crate::layout::ModuleId;
use crate::templates::Footprint;
use crate::transform::Transform;

/// Integer grid coordinate on the (x, z) plane.
pub type Cell = (i32, i32);

/// Footprint cells of a module at `transform`.
pub fn cells_for(footprint: Footprint, transform: &Transform, cell_size: f32) -> Vec<Cell> {
    let right = transform.rotation.right();
    let forward = transform.rotation.forward();
    let mut cells = Vec::with_capacity(footprint.area() as usize);
    for i in 0..footprint.width {
        for j in 0..footprint.depth {
            let centre = transform.position
                + right * (i as f32 * cell_size)
                + forward * (j as f32 * cell_size);
            cells.push((
                (centre.x / cell_size).round() as i32,
                (centre.z / cell_size).round() as i32,
            ));
        }
    }
    cells
}

/// Claimed cells and their owners.
#[derive(Debug, Clone, Default)]
pub struct OccupancyGrid {
    claimed: HashMap<Cell, ModuleId>,
}

impl OccupancyGrid {
    /// True iff none of `cells` is claimed.
    pub fn can_place(&self, cells: &[Cell]) -> bool {
        cells.iter().all(|c| !self.claimed.contains_key(c))
    }

    /// Mark `cells` as owned by `owner`. Only for confirmed instances.
    pub fn claim(&mut self, cells: &[Cell], owner: ModuleId) {
        for &c in cells {
            let prev = self.claimed.insert(c, owner);
            debug_assert!(prev.is_none(), "cell {:?} claimed twice", c);
        }
    }

    pub fn owner_of(&self, cell: Cell) -> Option<ModuleId> {
        self.claimed.get(&cell).copied()
    }

    /// Number of claimed cells.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
