//! Module registry: arena storage for confirmed modules and their sockets.
//!
//! Modules and sockets live in flat `Vec`s and are addressed by index
//! (`ModuleId`, `SocketId`). A `TentativeModule` is a plain value owned by
//! whoever is trying to place it; it only enters the arena through
//! [`Layout::confirm`], which consumes it. Dropping a tentative module
//! leaves no trace in the layout.

use serde::Serialize;

use crate::connectors::ConnectorGraph;
use crate::grid::{cells_for, Cell, OccupancyGrid};
use crate::templates::{Category, ModuleTemplate, TemplateId, TemplateLibrary};
use crate::transform::{Rotation, Transform, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SocketId(pub u32);

/// A placed connector socket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Socket {
    pub id: SocketId,
    pub module: ModuleId,
    /// Index into the template's socket list.
    pub index: usize,
    pub position: Vec2,
    pub facing: Vec2,
}

/// Fill state of a gallery slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SlotState {
    Empty,
    Filled { content: String },
}

/// A gallery slot inside a confirmed module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GallerySlot {
    pub group: String,
    pub name: String,
    pub position: Vec2,
    pub rotation: Rotation,
    pub state: SlotState,
}

/// A confirmed module instance.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInstance {
    pub id: ModuleId,
    pub template: TemplateId,
    pub category: Category,
    pub transform: Transform,
    pub sockets: Vec<SocketId>,
    pub cells: Vec<Cell>,
    pub slots: Vec<GallerySlot>,
}

/// A module being tried at a candidate transform. Not yet in the layout.
#[derive(Debug, Clone)]
pub struct TentativeModule {
    pub template: TemplateId,
    pub transform: Transform,
}

impl TentativeModule {
    pub fn new(template: TemplateId) -> Self {
        Self {
            template,
            transform: Transform::IDENTITY,
        }
    }

    /// World position and facing of template socket `index`.
    pub fn socket_pose(&self, template: &ModuleTemplate, index: usize, cell_size: f32) -> (Vec2, Vec2) {
        let def = &template.sockets[index];
        (
            self.transform.point(def.offset * cell_size),
            self.transform.direction(def.facing),
        )
    }

    pub fn cells(&self, template: &ModuleTemplate, cell_size: f32) -> Vec<Cell> {
        cells_for(template.footprint, &self.transform, cell_size)
    }
}

/// Everything the generator has confirmed so far.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub modules: Vec<ModuleInstance>,
    pub sockets: Vec<Socket>,
    pub grid: OccupancyGrid,
    pub connectors: ConnectorGraph,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(&self, id: ModuleId) -> &ModuleInstance {
        &self.modules[id.0 as usize]
    }

    pub fn socket(&self, id: SocketId) -> &Socket {
        &self.sockets[id.0 as usize]
    }

    /// Move a tentative module into the registry and claim its cells.
    ///
    /// `cells` must be the tentative module's footprint at its current
    /// transform and must already have passed `can_place`.
    pub fn confirm(
        &mut self,
        tentative: TentativeModule,
        library: &TemplateLibrary,
        cells: Vec<Cell>,
        cell_size: f32,
    ) -> ModuleId {
        let template = library.template(tentative.template);
        let id = ModuleId(self.modules.len() as u32);

        let mut sockets = Vec::with_capacity(template.sockets.len());
        for index in 0..template.sockets.len() {
            let (position, facing) = tentative.socket_pose(template, index, cell_size);
            let sid = SocketId(self.sockets.len() as u32);
            self.sockets.push(Socket {
                id: sid,
                module: id,
                index,
                position,
                facing,
            });
            sockets.push(sid);
        }

        let transform = tentative.transform;
        let slots = template
            .galleries
            .iter()
            .flat_map(|group| {
                group.slots.iter().map(move |slot| GallerySlot {
                    group: group.name.clone(),
                    name: slot.name.clone(),
                    position: transform.point(slot.offset * cell_size),
                    rotation: transform.rotation.then(slot.rotation),
                    state: SlotState::Empty,
                })
            })
            .collect();

        self.grid.claim(&cells, id);
        self.modules.push(ModuleInstance {
            id,
            template: tentative.template,
            category: template.category,
            transform,
            sockets,
            cells,
            slots,
        });
        id
    }

    /// Sockets of `module` that are not yet paired, in template order.
    pub fn open_sockets(&self, module: ModuleId) -> Vec<SocketId> {
        self.module(module)
            .sockets
            .iter()
            .copied()
            .filter(|&s| !self.connectors.is_paired(s))
            .collect()
    }

    /// Count of confirmed modules in `category`.
    pub fn count(&self, category: Category) -> usize {
        self.modules.iter().filter(|m| m.category == category).count()
    }

    /// Every socket left unpaired.
    pub fn open_socket_count(&self) -> usize {
        self.sockets
            .iter()
            .filter(|s| !self.connectors.is_paired(s.id))
            .count()
    }
}
