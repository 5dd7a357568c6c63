//! Discovery filter: decides whether an archetype may appear to a player.
//!
//! The predicate is location-independent: it looks only at the archetype's
//! gating requirements and a [`PlayerStatus`] snapshot. Location matching and
//! weighting happen afterwards in [`crate::selector`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::SignalCatalog;
use crate::signal::SignalArchetype;

/// Snapshot of the player state relevant to discovery.
///
/// Built fresh by the caller for every query; the engine never keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStatus {
    pub player_level: u32,
    pub scanner_level: u32,
    pub completed_signals: BTreeSet<String>,
    pub found_lore: BTreeSet<String>,
    pub current_sector_type: String,
}

impl PlayerStatus {
    pub fn new(player_level: u32, scanner_level: u32) -> Self {
        Self {
            player_level,
            scanner_level,
            ..Self::default()
        }
    }

    pub fn with_completed<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completed_signals.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_lore<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.found_lore.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn in_sector(mut self, sector_type: impl Into<String>) -> Self {
        self.current_sector_type = sector_type.into();
        self
    }
}

/// Whether `archetype` is currently eligible to appear for `status`.
///
/// Clauses are checked in order and the first failure returns `false`:
/// event-triggered archetypes never pass; then player level, scanner level,
/// completed signals and found lore; finally the sector-type requirement,
/// which is waived for archetypes that allow random encounters.
pub fn is_discoverable(archetype: &SignalArchetype, status: &PlayerStatus) -> bool {
    if archetype.is_event_triggered() {
        return false;
    }

    let reqs = archetype.requirements();

    if status.player_level < reqs.min_player_level {
        return false;
    }
    if status.scanner_level < reqs.min_scanner_level {
        return false;
    }
    if !reqs
        .required_completed_signals
        .iter()
        .all(|id| status.completed_signals.contains(id))
    {
        return false;
    }
    if !reqs
        .required_lore_fragments
        .iter()
        .all(|id| status.found_lore.contains(id))
    {
        return false;
    }
    if !reqs.required_sector_types.is_empty()
        && !reqs
            .required_sector_types
            .iter()
            .any(|s| *s == status.current_sector_type)
        && !reqs.allows_random_encounter()
    {
        return false;
    }

    true
}

/// Every archetype in the catalog that passes [`is_discoverable`], in
/// catalog order.
pub fn discoverable<'a>(
    catalog: &'a SignalCatalog,
    status: &PlayerStatus,
) -> Vec<&'a SignalArchetype> {
    catalog
        .iter()
        .filter(|a| is_discoverable(a, status))
        .collect()
}
