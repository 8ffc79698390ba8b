//! Layout validation for generated module graphs.
//!
//! Pure functions that take a finished `Layout` and return validation
//! errors. Used by the integration tests and the simtest harness.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::grid::Cell;
use crate::layout::{Layout, ModuleId};
use crate::placement::{ALIGNMENT_TOLERANCE, FACING_THRESHOLD};
use crate::templates::Category;
use crate::transform::Vec2;

/// A layout validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

// ── A. Occupancy ────────────────────────────────────────────────────────

/// Check that no two modules share a cell.
pub fn check_disjoint_cells(layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut owner: HashMap<Cell, ModuleId> = HashMap::new();
    for m in &layout.modules {
        for &c in &m.cells {
            if let Some(prev) = owner.insert(c, m.id) {
                if prev != m.id {
                    errors.push(ValidationError {
                        category: "occupancy",
                        severity: Severity::Error,
                        message: format!(
                            "Modules #{} and #{} both occupy cell {:?}",
                            prev.0, m.id.0, c
                        ),
                    });
                }
            }
        }
    }
    errors
}

// ── B. Connectors ───────────────────────────────────────────────────────

/// Check that every pairing joins antiparallel, coincident sockets on
/// different modules.
pub fn check_pairings(layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (a, b) in layout.connectors.pairings() {
        let sa = layout.socket(a);
        let sb = layout.socket(b);
        if sa.module == sb.module {
            errors.push(ValidationError {
                category: "connectors",
                severity: Severity::Error,
                message: format!("Sockets {} and {} pair a module with itself", a.0, b.0),
            });
        }
        let dot = sa.facing.dot(sb.facing);
        if dot > -FACING_THRESHOLD {
            errors.push(ValidationError {
                category: "connectors",
                severity: Severity::Error,
                message: format!(
                    "Sockets {} and {} are not antiparallel (dot {:.3})",
                    a.0, b.0, dot
                ),
            });
        }
        let gap = sa.position.distance(sb.position);
        if gap > ALIGNMENT_TOLERANCE {
            errors.push(ValidationError {
                category: "connectors",
                severity: Severity::Error,
                message: format!("Sockets {} and {} are {:.4} apart", a.0, b.0, gap),
            });
        }
    }
    errors
}

// ── C. Spawn and budget ─────────────────────────────────────────────────

/// Check there is exactly one spawn module, first, at `origin`.
pub fn check_single_spawn(layout: &Layout, origin: Vec2) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let spawns: Vec<_> = layout
        .modules
        .iter()
        .filter(|m| m.category == Category::Spawn)
        .collect();
    if spawns.len() != 1 {
        errors.push(ValidationError {
            category: "spawn",
            severity: Severity::Error,
            message: format!("Expected exactly one spawn module, found {}", spawns.len()),
        });
        return errors;
    }
    let spawn = spawns[0];
    if spawn.id != ModuleId(0) {
        errors.push(ValidationError {
            category: "spawn",
            severity: Severity::Error,
            message: format!("Spawn module is #{}, not the first placement", spawn.id.0),
        });
    }
    if spawn.transform.position.distance(origin) > ALIGNMENT_TOLERANCE {
        errors.push(ValidationError {
            category: "spawn",
            severity: Severity::Error,
            message: format!(
                "Spawn module at ({:.2}, {:.2}), expected ({:.2}, {:.2})",
                spawn.transform.position.x,
                spawn.transform.position.z,
                origin.x,
                origin.z
            ),
        });
    }
    errors
}

/// Check that spawn plus grown rooms stays within `room_count`.
///
/// Caps placed by the capping pass are not rooms and are not counted.
pub fn check_room_budget(layout: &Layout, grown_rooms: u32, room_count: u32) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let rooms = layout.count(Category::Spawn) as u32 + grown_rooms;
    if rooms > room_count {
        errors.push(ValidationError {
            category: "budget",
            severity: Severity::Error,
            message: format!("{} rooms placed, budget is {}", rooms, room_count),
        });
    }
    errors
}

// ── D. Connectivity ─────────────────────────────────────────────────────

/// Check that every module is reachable from the spawn module through
/// pairings.
pub fn check_connectivity(layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if layout.modules.is_empty() {
        return errors;
    }

    let mut adj: HashMap<ModuleId, Vec<ModuleId>> = HashMap::new();
    for (a, b) in layout.connectors.pairings() {
        let ma = layout.socket(a).module;
        let mb = layout.socket(b).module;
        adj.entry(ma).or_default().push(mb);
        adj.entry(mb).or_default().push(ma);
    }

    let start = ModuleId(0);
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);
    while let Some(current) = queue.pop_front() {
        if let Some(neighbors) = adj.get(&current) {
            for &next in neighbors {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    let unreached: Vec<ModuleId> = layout
        .modules
        .iter()
        .map(|m| m.id)
        .filter(|id| !visited.contains(id))
        .collect();
    if !unreached.is_empty() {
        errors.push(ValidationError {
            category: "connectivity",
            severity: Severity::Error,
            message: format!(
                "{} of {} modules unreachable from spawn (e.g. #{})",
                unreached.len(),
                layout.modules.len(),
                unreached[0].0
            ),
        });
    }
    errors
}

/// Warn when more than half of all sockets are left open.
pub fn check_open_ratio(layout: &Layout) -> Vec<ValidationError> {
    let total = layout.sockets.len();
    let open = layout.open_socket_count();
    if total > 0 && open * 2 > total {
        vec![ValidationError {
            category: "connectors",
            severity: Severity::Warning,
            message: format!("{} of {} sockets left open", open, total),
        }]
    } else {
        Vec::new()
    }
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all layout validations and return combined results.
pub fn validate_all(
    layout: &Layout,
    origin: Vec2,
    grown_rooms: u32,
    room_count: u32,
) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_disjoint_cells(layout));
    all.extend(check_pairings(layout));
    all.extend(check_single_spawn(layout, origin));
    all.extend(check_room_budget(layout, grown_rooms, room_count));
    all.extend(check_connectivity(layout));
    all.extend(check_open_ratio(layout));
    all
}
