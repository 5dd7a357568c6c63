//! Weighted selector: draws the signals a scan reveals at a location.
//!
//! Candidates are the discoverable archetypes that either match the location
//! (listed spawn location, or no spawn locations at all) or may appear as a
//! random encounter. Random-encounter-only candidates keep a tenth of their
//! weight. The draw samples with replacement in proportion to weight and
//! then drops repeats, so a scan can return fewer signals than requested.
//!
//! Upgrade effects (signal boosts, noise filters) are applied by the caller
//! to the returned list; the selector never reads them.

use std::collections::HashSet;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::SignalCatalog;
use crate::discovery::{is_discoverable, PlayerStatus};
use crate::signal::SignalArchetype;

/// Tunables for a scan draw.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Weight multiplier for candidates that only qualify as random encounters.
    pub fallback_weight_factor: f64,
    /// Number of signals requested when the caller has no preference.
    pub default_count: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            fallback_weight_factor: 0.1,
            default_count: 5,
        }
    }
}

/// How a candidate qualified for a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The location is one of the archetype's spawn locations, or it has none.
    LocationMatched,
    /// Off-location, admitted through its random-encounter chance.
    Fallback,
}

/// An archetype admitted to the draw, with its effective weight.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub archetype: &'a SignalArchetype,
    pub placement: Placement,
    pub weight: f64,
}

/// Classify and weight every discoverable archetype for `location`.
///
/// Archetypes that neither match the location nor allow random encounters
/// are dropped, as are those whose effective weight is not positive.
pub fn candidates<'a>(
    catalog: &'a SignalCatalog,
    location: &str,
    status: &PlayerStatus,
    config: &SelectionConfig,
) -> Vec<Candidate<'a>> {
    catalog
        .iter()
        .filter(|a| is_discoverable(a, status))
        .filter_map(|archetype| {
            let spawns = archetype.spawn_locations();
            let location_match = spawns.is_empty() || spawns.iter().any(|l| l == location);
            let placement = if location_match {
                Placement::LocationMatched
            } else if archetype.requirements().allows_random_encounter() {
                Placement::Fallback
            } else {
                return None;
            };

            let mut weight = archetype.base_rarity_score() + archetype.spawn_conditions_met_bonus();
            if placement == Placement::Fallback {
                weight *= config.fallback_weight_factor;
            }
            // Negated so a NaN weight is discarded too.
            if !(weight > 0.0) {
                return None;
            }

            Some(Candidate {
                archetype,
                placement,
                weight,
            })
        })
        .collect()
}

/// Draw up to `count` distinct archetypes for a scan of `location`.
///
/// Every returned archetype passes [`is_discoverable`] and qualifies for the
/// location. The result is empty when nothing qualifies or `count` is zero.
pub fn select_for_location<'a>(
    catalog: &'a SignalCatalog,
    location: &str,
    status: &PlayerStatus,
    count: usize,
    config: &SelectionConfig,
    rng: &mut impl Rng,
) -> Vec<&'a SignalArchetype> {
    let pool = candidates(catalog, location, status, config);
    let draws = count.min(pool.len());
    if draws == 0 {
        log::debug!("Scan of {location}: no candidates");
        return Vec::new();
    }

    let weights: Vec<f64> = pool.iter().map(|c| c.weight).collect();
    // WeightedIndex needs a finite total.
    let total: f64 = weights.iter().sum();
    let weighted = if total.is_finite() {
        WeightedIndex::new(&weights).ok()
    } else {
        None
    };
    let picked: Vec<&SignalArchetype> = match weighted {
        Some(dist) => {
            let mut seen = HashSet::with_capacity(draws);
            let mut picked = Vec::with_capacity(draws);
            for _ in 0..draws {
                let archetype = pool[dist.sample(rng)].archetype;
                if seen.insert(archetype.id()) {
                    picked.push(archetype);
                }
            }
            picked
        }
        // Zero or overflowing total weight: uniform draw without replacement.
        None => pool
            .choose_multiple(rng, draws)
            .map(|c| c.archetype)
            .collect(),
    };

    log::debug!(
        "Scan of {location}: {} candidates, {} draws, {} distinct signals",
        pool.len(),
        draws,
        picked.len()
    );
    picked
}
