//! Placement records and the broadcaster seam.
//!
//! The generator hands every confirmed module and every filled gallery slot
//! to a `SpawnBroadcaster` exactly once, in confirmation order. What the
//! broadcaster does with it (replicate, persist, render) is outside this
//! crate.

use serde::{Deserialize, Serialize};

use crate::transform::{Rotation, Vec2};

/// What a placement record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Module,
    Content,
}

/// One confirmed placement, as seen by observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub template_id: String,
    pub kind: RecordKind,
    pub position: [f32; 2],
    /// Yaw in degrees: 0, 90, 180 or 270.
    pub rotation_degrees: u16,
}

impl PlacementRecord {
    pub fn new(template_id: &str, kind: RecordKind, position: Vec2, rotation: Rotation) -> Self {
        Self {
            template_id: template_id.to_string(),
            kind,
            position: position.into(),
            rotation_degrees: rotation.degrees(),
        }
    }
}

/// Receives each confirmed placement.
pub trait SpawnBroadcaster {
    fn broadcast(&mut self, record: &PlacementRecord);
}

/// Collects records in order.
#[derive(Debug, Clone, Default)]
pub struct RecordCollector {
    pub records: Vec<PlacementRecord>,
}

impl SpawnBroadcaster for RecordCollector {
    fn broadcast(&mut self, record: &PlacementRecord) {
        self.records.push(record.clone());
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBroadcaster;

impl SpawnBroadcaster for NullBroadcaster {
    fn broadcast(&mut self, _record: &PlacementRecord) {}
}
