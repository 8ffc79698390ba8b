//! Generation parameters and their validation.
//!
//! Parameters are plain serde data so they can be bundled as JSON next to
//! the template library or built in code. Every field has a default.
//!
//! ```
//! use roomforge_logic::config::{GenerationParams, validate_params};
//!
//! let params = GenerationParams {
//!     room_count: 12,
//!     ..GenerationParams::default()
//! };
//! assert!(validate_params(&params).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConfigError, GenerationError};
use crate::transform::Vec2;

/// Parameters for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Total rooms to place, including the spawn module.
    pub room_count: u32,
    /// Weighted candidates tried per connector before giving up on it.
    pub attempt_budget: u32,
    /// World size of one occupancy cell.
    pub cell_size: f32,
    /// Try ending templates first for the last room of each branch.
    pub force_endings: bool,
    /// Where the spawn module's pivot is placed.
    pub origin: Vec2,
    pub gallery: GalleryParams,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            room_count: 16,
            attempt_budget: 8,
            cell_size: 4.0,
            force_endings: true,
            origin: Vec2::ZERO,
            gallery: GalleryParams::default(),
        }
    }
}

impl GenerationParams {
    /// Parse parameters from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, GenerationError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parameters for the decorative post-pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryParams {
    /// Gallery group names the populator recognizes.
    pub group_names: Vec<String>,
    /// Slot name → decorative template id.
    pub content_lookup: HashMap<String, String>,
    /// Chance each eligible slot is filled.
    pub spawn_probability: f32,
    /// Restrict each group to a single randomly chosen content type.
    pub one_type_per_group: bool,
}

impl Default for GalleryParams {
    fn default() -> Self {
        Self {
            group_names: Vec::new(),
            content_lookup: HashMap::new(),
            spawn_probability: 0.5,
            one_type_per_group: false,
        }
    }
}

/// Validate generation parameters, returning all errors found.
pub fn validate_params(params: &GenerationParams) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if params.room_count < 1 {
        errors.push(ConfigError::RoomCountTooSmall(params.room_count));
    }
    if params.attempt_budget == 0 {
        errors.push(ConfigError::ZeroAttemptBudget);
    }
    if !params.cell_size.is_finite() || params.cell_size <= 0.0 {
        errors.push(ConfigError::InvalidCellSize(params.cell_size));
    }

    let p = params.gallery.spawn_probability;
    if !(0.0..=1.0).contains(&p) {
        errors.push(ConfigError::InvalidSpawnProbability(p));
    }

    let mut empty: Vec<&String> = params
        .gallery
        .content_lookup
        .iter()
        .filter(|(_, template)| template.trim().is_empty())
        .map(|(slot, _)| slot)
        .collect();
    empty.sort();
    for slot in empty {
        errors.push(ConfigError::EmptyContentTemplate(slot.clone()));
    }

    errors
}
