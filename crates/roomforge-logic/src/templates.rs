//! Module template library: the immutable catalog the generator draws from.
//!
//! Templates are loaded once (usually from JSON) and never mutated. Offsets
//! are expressed in grid-cell units relative to the pivot, which is the
//! centre of footprint cell (0, 0); the generator scales them by the
//! configured cell size at placement time.
//!
//! ```
//! use roomforge_logic::templates::{TemplateLibrary, validate_library};
//!
//! let json = r#"{ "templates": [
//!     { "id": "hub", "category": "spawn", "footprint": { "width": 1, "depth": 1 },
//!       "sockets": [ { "offset": { "x": 0.0, "z": 0.5 }, "facing": { "x": 0.0, "z": 1.0 } } ] }
//! ] }"#;
//! let library = TemplateLibrary::from_json(json).unwrap();
//! assert!(validate_library(&library).is_empty());
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{GenerationError, LibraryError};
use crate::transform::{Rotation, Vec2};

/// Role a template plays in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Placed exactly once, at the origin, before anything else.
    Spawn,
    /// Regular growth room.
    Normal,
    /// Terminal room: closes a branch, never seeds further growth.
    Ending,
}

/// Footprint size in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub depth: u32,
}

impl Footprint {
    pub fn area(&self) -> u32 {
        self.width * self.depth
    }
}

/// A connector socket definition in template-local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocketDef {
    /// Offset from the pivot, in cell units.
    pub offset: Vec2,
    /// Outward-facing unit direction.
    pub facing: Vec2,
}

/// A named decorative anchor inside a gallery group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDef {
    /// Slot name; matched against the gallery content lookup.
    pub name: String,
    /// Offset from the pivot, in cell units.
    pub offset: Vec2,
    /// Local yaw of the anchor relative to its module.
    #[serde(default)]
    pub rotation: Rotation,
}

/// A named group of gallery slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryGroupDef {
    pub name: String,
    #[serde(default)]
    pub slots: Vec<SlotDef>,
}

/// Reusable room blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleTemplate {
    pub id: String,
    pub category: Category,
    pub footprint: Footprint,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub sockets: Vec<SocketDef>,
    #[serde(default)]
    pub galleries: Vec<GalleryGroupDef>,
}

fn default_weight() -> u32 {
    1
}

/// Index of a template inside its library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TemplateId(pub u32);

/// Immutable template catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateLibrary {
    templates: Vec<ModuleTemplate>,
}

impl TemplateLibrary {
    pub fn new(templates: Vec<ModuleTemplate>) -> Self {
        Self { templates }
    }

    /// Parse a library from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, GenerationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn template(&self, id: TemplateId) -> &ModuleTemplate {
        &self.templates[id.0 as usize]
    }

    /// Look up a template by its string id.
    pub fn find(&self, name: &str) -> Option<TemplateId> {
        self.templates
            .iter()
            .position(|t| t.id == name)
            .map(|i| TemplateId(i as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TemplateId, &ModuleTemplate)> {
        self.templates
            .iter()
            .enumerate()
            .map(|(i, t)| (TemplateId(i as u32), t))
    }

    /// All templates of a category, in library order.
    pub fn by_category(&self, category: Category) -> Vec<TemplateId> {
        self.iter()
            .filter(|(_, t)| t.category == category)
            .map(|(id, _)| id)
            .collect()
    }
}

/// Largest spawn weight a template may carry. `pick_weighted` expands each
/// candidate into `weight` bag entries.
pub const MAX_TEMPLATE_WEIGHT: u32 = 1_000;

/// Weighted-without-replacement ordering via multiset expansion.
///
/// Each candidate appears `weight` times; the multiset is shuffled with the
/// shared RNG and returned. Callers walk it in order and stop at the first
/// candidate whose placement succeeds.
pub fn pick_weighted<R: Rng + ?Sized>(
    library: &TemplateLibrary,
    candidates: &[TemplateId],
    rng: &mut R,
) -> Vec<TemplateId> {
    let mut bag: Vec<TemplateId> = candidates
        .iter()
        .flat_map(|&id| std::iter::repeat(id).take(library.template(id).weight as usize))
        .collect();
    bag.shuffle(rng);
    bag
}

/// Validate a template library, returning all problems found.
pub fn validate_library(library: &TemplateLibrary) -> Vec<LibraryError> {
    let mut errors = Vec::new();

    if library.is_empty() {
        errors.push(LibraryError::Empty);
        return errors;
    }

    let spawns = library.by_category(Category::Spawn);
    if spawns.is_empty() {
        errors.push(LibraryError::MissingSpawn);
    }
    for id in spawns {
        let t = library.template(id);
        if t.sockets.is_empty() {
            errors.push(LibraryError::SpawnWithoutSockets(t.id.clone()));
        }
    }

    let mut seen = HashSet::new();
    for (_, t) in library.iter() {
        if !seen.insert(t.id.as_str()) {
            errors.push(LibraryError::DuplicateId(t.id.clone()));
        }
        if t.weight == 0 {
            errors.push(LibraryError::ZeroWeight(t.id.clone()));
        } else if t.weight > MAX_TEMPLATE_WEIGHT {
            errors.push(LibraryError::WeightTooLarge {
                template: t.id.clone(),
                weight: t.weight,
                max: MAX_TEMPLATE_WEIGHT,
            });
        }
        if t.footprint.area() == 0 {
            errors.push(LibraryError::EmptyFootprint(t.id.clone()));
        }
        for (i, s) in t.sockets.iter().enumerate() {
            if (s.facing.length() - 1.0).abs() > 1e-3 {
                errors.push(LibraryError::NonUnitFacing {
                    template: t.id.clone(),
                    socket: i,
                });
            }
        }
    }

    errors
}
