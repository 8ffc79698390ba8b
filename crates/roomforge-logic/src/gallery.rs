//! Gallery populator: fill decorative anchors once the topology is final.
//!
//! Each confirmed module is handled on its own. Within every recognized
//! gallery group the populator finds the slots whose names appear in the
//! content lookup, optionally narrows them to one randomly chosen content
//! type, and fills each eligible slot with probability `spawn_probability`.
//! Filled slots are broadcast as content records; the rest stay empty.

use log::debug;
use rand::Rng;

use crate::broadcast::SpawnBroadcaster;
use crate::config::GalleryParams;
use crate::layout::SlotState;
use crate::placement::PlacementEngine;

struct Fill {
    module: usize,
    slot: usize,
    content: String,
}

/// Populate gallery slots across the whole layout. Returns the number of
/// content instances placed.
pub fn populate_galleries<R, B>(engine: &mut PlacementEngine<'_, R, B>, params: &GalleryParams) -> u32
where
    R: Rng + ?Sized,
    B: SpawnBroadcaster + ?Sized,
{
    if params.group_names.is_empty() || params.content_lookup.is_empty() {
        return 0;
    }

    let mut fills = Vec::new();
    for module in 0..engine.layout.modules.len() {
        let slots = engine.layout.modules[module].slots.clone();

        let mut groups: Vec<&str> = Vec::new();
        for slot in &slots {
            if !groups.contains(&slot.group.as_str()) {
                groups.push(&slot.group);
            }
        }

        for group in groups {
            if !params.group_names.iter().any(|g| g == group) {
                continue;
            }

            let matching: Vec<usize> = slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.group == group && params.content_lookup.contains_key(&s.name))
                .map(|(i, _)| i)
                .collect();
            if matching.is_empty() {
                continue;
            }

            let eligible = if params.one_type_per_group {
                let mut types: Vec<&str> = Vec::new();
                for &i in &matching {
                    if !types.contains(&slots[i].name.as_str()) {
                        types.push(&slots[i].name);
                    }
                }
                let chosen = types[engine.rng().gen_range(0..types.len())];
                debug!("module {} group '{}': using '{}'", module, group, chosen);
                matching
                    .into_iter()
                    .filter(|&i| slots[i].name == chosen)
                    .collect()
            } else {
                matching
            };

            for slot in eligible {
                if engine.rng().gen_bool(f64::from(params.spawn_probability)) {
                    fills.push(Fill {
                        module,
                        slot,
                        content: params.content_lookup[&slots[slot].name].clone(),
                    });
                }
            }
        }
    }

    let placed = fills.len() as u32;
    for fill in fills {
        let slot = &mut engine.layout.modules[fill.module].slots[fill.slot];
        let (position, rotation) = (slot.position, slot.rotation);
        slot.state = SlotState::Filled {
            content: fill.content.clone(),
        };
        engine.emit_content(&fill.content, position, rotation);
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::{RecordCollector, RecordKind};
    use crate::templates::tests::cross;
    use crate::templates::{Category, GalleryGroupDef, SlotDef, TemplateId, TemplateLibrary};
    use crate::transform::{Rotation, Vec2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn slot(name: &str, x: f32) -> SlotDef {
        SlotDef {
            name: name.into(),
            offset: Vec2::new(x, 0.0),
            rotation: Rotation::R0,
        }
    }

    fn gallery_library() -> TemplateLibrary {
        let mut hub = cross("hall", Category::Spawn);
        hub.galleries = vec![
            GalleryGroupDef {
                name: "exhibits".into(),
                slots: vec![slot("painting", -0.25), slot("statue", 0.0), slot("painting", 0.25)],
            },
            GalleryGroupDef {
                name: "storage".into(),
                slots: vec![slot("painting", 0.1)],
            },
        ];
        TemplateLibrary::new(vec![hub])
    }

    fn params(one_type: bool, p: f32) -> GalleryParams {
        let mut lookup = HashMap::new();
        lookup.insert("painting".to_string(), "deco_painting".to_string());
        lookup.insert("statue".to_string(), "deco_statue".to_string());
        GalleryParams {
            group_names: vec!["exhibits".into()],
            content_lookup: lookup,
            spawn_probability: p,
            one_type_per_group: one_type,
        }
    }

    fn filled(engine_slots: &[crate::layout::GallerySlot]) -> Vec<(String, String)> {
        engine_slots
            .iter()
            .filter_map(|s| match &s.state {
                SlotState::Filled { content } => Some((s.name.clone(), content.clone())),
                SlotState::Empty => None,
            })
            .collect()
    }

    #[test]
    fn test_one_type_per_group_fills_only_chosen_type() {
        let lib = gallery_library();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sink = RecordCollector::default();
            let mut engine = PlacementEngine::new(&lib, 1.0, 4, &mut rng, &mut sink);
            engine.place_spawn(TemplateId(0), Vec2::ZERO);

            let placed = populate_galleries(&mut engine, &params(true, 1.0));
            let slots = &engine.layout.modules[0].slots;
            let got = filled(slots);
            // Either both paintings or the single statue.
            assert!(placed == 2 || placed == 1, "seed {}: placed {}", seed, placed);
            assert_eq!(got.len() as u32, placed);
            let first = &got[0].0;
            assert!(got.iter().all(|(name, _)| name == first));
            // Storage is not a recognized group.
            assert_eq!(slots[3].state, SlotState::Empty);
        }
    }

    #[test]
    fn test_independent_selection_fills_all_matching() {
        let lib = gallery_library();
        let mut rng = StdRng::seed_from_u64(5);
        let mut sink = RecordCollector::default();
        let mut engine = PlacementEngine::new(&lib, 2.0, 4, &mut rng, &mut sink);
        engine.place_spawn(TemplateId(0), Vec2::new(10.0, 0.0));

        assert_eq!(populate_galleries(&mut engine, &params(false, 1.0)), 3);
        let (_, records, _) = engine.finish();
        let content: Vec<_> = records
            .iter()
            .filter(|r| r.kind == RecordKind::Content)
            .collect();
        assert_eq!(content.len(), 3);
        assert_eq!(content[0].template_id, "deco_painting");
        assert_eq!(content[0].position, [9.5, 0.0]);
        assert_eq!(content[1].template_id, "deco_statue");
        assert_eq!(sink.records.len(), 4);
    }

    #[test]
    fn test_zero_probability_leaves_slots_empty() {
        let lib = gallery_library();
        let mut rng = StdRng::seed_from_u64(6);
        let mut sink = RecordCollector::default();
        let mut engine = PlacementEngine::new(&lib, 1.0, 4, &mut rng, &mut sink);
        engine.place_spawn(TemplateId(0), Vec2::ZERO);

        assert_eq!(populate_galleries(&mut engine, &params(false, 0.0)), 0);
        assert!(filled(&engine.layout.modules[0].slots).is_empty());
        assert_eq!(engine.records.len(), 1);
    }

    #[test]
    fn test_unknown_slot_names_ignored() {
        let lib = gallery_library();
        let mut rng = StdRng::seed_from_u64(7);
        let mut sink = RecordCollector::default();
        let mut engine = PlacementEngine::new(&lib, 1.0, 4, &mut rng, &mut sink);
        engine.place_spawn(TemplateId(0), Vec2::ZERO);

        let mut p = params(true, 1.0);
        p.content_lookup.remove("statue");
        assert_eq!(populate_galleries(&mut engine, &p), 2);
        let got = filled(&engine.layout.modules[0].slots);
        assert!(got.iter().all(|(name, _)| name == "painting"));
    }
}
