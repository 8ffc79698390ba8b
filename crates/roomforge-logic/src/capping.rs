//! Capping pass: close leftover connectors with terminal templates.
//!
//! Leftovers are processed as one flat list in the order branches produced
//! them. Each connector gets at most one budgeted attempt, at its first
//! occurrence; repeats and anything already paired are skipped. Connectors
//! that still cannot be capped stay open.

use std::collections::HashSet;

use log::debug;
use rand::Rng;

use crate::broadcast::SpawnBroadcaster;
use crate::layout::SocketId;
use crate::placement::PlacementEngine;
use crate::templates::TemplateId;

/// Try one budgeted ending placement per unpaired leftover connector.
/// Returns the number of caps placed.
pub fn cap_leftovers<R, B>(
    engine: &mut PlacementEngine<'_, R, B>,
    endings: &[TemplateId],
    leftovers: &[SocketId],
) -> u32
where
    R: Rng + ?Sized,
    B: SpawnBroadcaster + ?Sized,
{
    if endings.is_empty() {
        return 0;
    }

    let mut capped = 0;
    let mut attempted = HashSet::new();
    for &connector in leftovers {
        if !attempted.insert(connector) || engine.layout.connectors.is_paired(connector) {
            continue;
        }
        if engine.place_with_budget(endings, connector).is_some() {
            capped += 1;
        } else {
            debug!("connector {} stays open", connector.0);
        }
    }
    capped
}
