//! Signal catalog: the immutable registry of every archetype in the game.
//!
//! The catalog is built once at startup (from the embedded data file, from a
//! JSON string, or from definitions assembled in code) and then shared by
//! reference. Loading is fail-fast: the first invalid definition or duplicate
//! id aborts the whole load. Cross-references between archetypes are not
//! checked at load time; [`SignalCatalog::audit`] reports them on request.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::signal::{ArchetypeDef, ArchetypeFault, SignalArchetype, SignalCategory, SignalTier};

/// Archetype data shipped with the game.
const BUILTIN_CATALOG_JSON: &str = include_str!("../../../data/signal_catalog.json");

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON could not be parsed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid archetype '{id}': {reason}")]
    InvalidArchetype { id: String, reason: ArchetypeFault },
    #[error("duplicate archetype id '{0}'")]
    DuplicateId(String),
}

/// A cross-reference problem found by [`SignalCatalog::audit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogIssue {
    #[error("'{source_id}' unlocks non-existent signal '{target}'")]
    MissingUnlockTarget { source_id: String, target: String },
    #[error(
        "'{source_id}' unlocks '{target}', which requires '{source_id}' to be completed first"
    )]
    CircularUnlock { source_id: String, target: String },
    #[error("'{source_id}' requires non-existent completed signal '{target}'")]
    MissingRequiredSignal { source_id: String, target: String },
    #[error("'{source_id}' evolves into non-existent signal '{target}'")]
    MissingEvolveTarget { source_id: String, target: String },
    #[error("'{source_id}' degrades into non-existent signal '{target}'")]
    MissingDegradeTarget { source_id: String, target: String },
    #[error("'{source_id}' provides unknown lore '{lore_id}'")]
    UnknownProvidedLore { source_id: String, lore_id: String },
    #[error("'{source_id}' requires unknown lore '{lore_id}'")]
    UnknownRequiredLore { source_id: String, lore_id: String },
}

/// Immutable registry of validated archetypes, in load order.
#[derive(Debug, Clone, Default)]
pub struct SignalCatalog {
    archetypes: Vec<SignalArchetype>,
    by_id: HashMap<String, usize>,
}

impl SignalCatalog {
    /// Build a catalog from raw definitions.
    pub fn from_defs(defs: Vec<ArchetypeDef>) -> Result<Self, CatalogError> {
        let mut archetypes = Vec::with_capacity(defs.len());
        let mut by_id = HashMap::with_capacity(defs.len());

        for def in defs {
            let id = def.id.clone();
            let archetype = SignalArchetype::new(def).map_err(|reason| {
                CatalogError::InvalidArchetype {
                    id: id.clone(),
                    reason,
                }
            })?;
            if by_id.contains_key(&id) {
                return Err(CatalogError::DuplicateId(id));
            }
            by_id.insert(id, archetypes.len());
            archetypes.push(archetype);
        }

        log::info!("Signal catalog loaded: {} archetypes", archetypes.len());
        Ok(Self { archetypes, by_id })
    }

    /// Parse a JSON array of archetype definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let defs: Vec<ArchetypeDef> = serde_json::from_str(json)?;
        Self::from_defs(defs)
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG_JSON)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Look up an archetype by id.
    pub fn get(&self, id: &str) -> Option<&SignalArchetype> {
        self.by_id.get(id).map(|&idx| &self.archetypes[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// All archetypes in load order.
    pub fn all(&self) -> &[SignalArchetype] {
        &self.archetypes
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalArchetype> {
        self.archetypes.iter()
    }

    /// Ids of archetypes carrying `tag`.
    pub fn ids_by_tag(&self, tag: &str, case_sensitive: bool) -> Vec<&str> {
        let wanted = if case_sensitive {
            tag.to_string()
        } else {
            tag.to_lowercase()
        };
        self.archetypes
            .iter()
            .filter(|a| {
                a.tags().iter().any(|t| {
                    if case_sensitive {
                        *t == wanted
                    } else {
                        t.to_lowercase() == wanted
                    }
                })
            })
            .map(|a| a.id())
            .collect()
    }

    pub fn by_tier(&self, tier: SignalTier) -> Vec<&SignalArchetype> {
        self.archetypes.iter().filter(|a| a.tier() == tier).collect()
    }

    pub fn by_category(&self, category: SignalCategory) -> Vec<&SignalArchetype> {
        self.archetypes
            .iter()
            .filter(|a| a.category() == category)
            .collect()
    }

    /// Archetypes whose complexity score lies in `[min, max]`.
    pub fn by_complexity(&self, min: f64, max: f64) -> Vec<&SignalArchetype> {
        self.archetypes
            .iter()
            .filter(|a| (min..=max).contains(&a.complexity_score()))
            .collect()
    }

    /// Archetypes directly unlocked by completing `id`. Dangling unlock
    /// targets are skipped.
    pub fn unlocked_by(&self, id: &str) -> Vec<&SignalArchetype> {
        let Some(source) = self.get(id) else {
            return Vec::new();
        };
        source
            .unlocks_signals()
            .iter()
            .filter_map(|target| self.get(target))
            .collect()
    }

    /// Check cross-references between archetypes. Lore references are only
    /// checked when the set of known lore ids is supplied.
    pub fn audit(&self, known_lore: Option<&BTreeSet<String>>) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        for archetype in &self.archetypes {
            let source_id = archetype.id();

            for target in archetype.unlocks_signals() {
                match self.get(target) {
                    None => issues.push(CatalogIssue::MissingUnlockTarget {
                        source_id: source_id.to_string(),
                        target: target.clone(),
                    }),
                    Some(unlocked)
                        if unlocked
                            .requirements()
                            .required_completed_signals
                            .iter()
                            .any(|req| req == source_id) =>
                    {
                        issues.push(CatalogIssue::CircularUnlock {
                            source_id: source_id.to_string(),
                            target: target.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }

            for req in &archetype.requirements().required_completed_signals {
                if !self.contains(req) {
                    issues.push(CatalogIssue::MissingRequiredSignal {
                        source_id: source_id.to_string(),
                        target: req.clone(),
                    });
                }
            }

            if let Some(target) = archetype.evolves_to() {
                if !self.contains(target) {
                    issues.push(CatalogIssue::MissingEvolveTarget {
                        source_id: source_id.to_string(),
                        target: target.to_string(),
                    });
                }
            }
            if let Some(target) = archetype.degrades_to() {
                if !self.contains(target) {
                    issues.push(CatalogIssue::MissingDegradeTarget {
                        source_id: source_id.to_string(),
                        target: target.to_string(),
                    });
                }
            }

            if let Some(lore) = known_lore {
                for lore_id in archetype.lore_provided() {
                    if !lore.contains(lore_id) {
                        issues.push(CatalogIssue::UnknownProvidedLore {
                            source_id: source_id.to_string(),
                            lore_id: lore_id.clone(),
                        });
                    }
                }
                for lore_id in &archetype.requirements().required_lore_fragments {
                    if !lore.contains(lore_id) {
                        issues.push(CatalogIssue::UnknownRequiredLore {
                            source_id: source_id.to_string(),
                            lore_id: lore_id.clone(),
                        });
                    }
                }
            }
        }

        for issue in &issues {
            log::warn!("Catalog audit: {}", issue);
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::tests::def;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = SignalCatalog::builtin().expect("builtin catalog");
        assert_eq!(catalog.len(), 10);
        let beacon = catalog.get("CIV_BEACON_STD_01").expect("beacon");
        assert_eq!(beacon.tier(), SignalTier::Basic);
        assert!((beacon.complexity_score() - 9.6).abs() < 1e-9);
    }

    #[test]
    fn unknown_id_is_absent() {
        let catalog = SignalCatalog::builtin().unwrap();
        assert!(catalog.get("NOPE").is_none());
        assert!(catalog.unlocked_by("NOPE").is_empty());
    }

    #[test]
    fn invalid_entry_aborts_load() {
        let mut bad = def("BROKEN");
        bad.stability = 2.0;
        let err = SignalCatalog::from_defs(vec![def("OK"), bad]).unwrap_err();
        match err {
            CatalogError::InvalidArchetype { id, reason } => {
                assert_eq!(id, "BROKEN");
                assert_eq!(reason, ArchetypeFault::StabilityOutOfRange(2.0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_id_aborts_load() {
        let err = SignalCatalog::from_defs(vec![def("A"), def("A")]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "A"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            SignalCatalog::from_json("[{\"id\": 3}]"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn tag_lookup_is_case_insensitive_by_default() {
        let catalog = SignalCatalog::builtin().unwrap();
        assert_eq!(catalog.ids_by_tag("PIRATE", false), vec!["PIRATE_DATA_RELAY_GAMMA"]);
        assert!(catalog.ids_by_tag("PIRATE", true).is_empty());
        assert_eq!(catalog.ids_by_tag("SOS", true), vec!["DISTRESS_CALL_FREIGHTER_VALIANT"]);
    }

    #[test]
    fn filters_by_tier_category_and_complexity() {
        let catalog = SignalCatalog::builtin().unwrap();
        assert_eq!(catalog.by_tier(SignalTier::Ancient).len(), 3);
        assert_eq!(catalog.by_category(SignalCategory::Pirate).len(), 3);

        let low = catalog.by_complexity(0.0, 10.0);
        assert!(low.iter().any(|a| a.id() == "CIV_BEACON_STD_01"));
        assert!(low.iter().all(|a| a.complexity_score() <= 10.0));

        // Inclusive bounds.
        let exact = catalog.by_complexity(9.6, 9.6);
        assert!(exact.iter().any(|a| a.id() == "CIV_BEACON_STD_01"));
    }

    #[test]
    fn unlocked_by_follows_edges() {
        let catalog = SignalCatalog::builtin().unwrap();
        let unlocked = catalog.unlocked_by("PIRATE_DATA_RELAY_GAMMA");
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].id(), "PIRATE_STRONGHOLD_BEACON_ALPHA");
    }

    #[test]
    fn audit_reports_dangling_and_circular_edges() {
        let mut a = def("A");
        a.unlocks_signals = vec!["B".into(), "GHOST".into()];
        a.can_evolve = true;
        a.evolves_to = Some("MISSING".into());
        let mut b = def("B");
        b.discovery_requirements.required_completed_signals = vec!["A".into()];

        let catalog = SignalCatalog::from_defs(vec![a, b]).unwrap();
        let issues = catalog.audit(None);
        assert_eq!(
            issues,
            vec![
                CatalogIssue::CircularUnlock {
                    source_id: "A".into(),
                    target: "B".into(),
                },
                CatalogIssue::MissingUnlockTarget {
                    source_id: "A".into(),
                    target: "GHOST".into(),
                },
                CatalogIssue::MissingEvolveTarget {
                    source_id: "A".into(),
                    target: "MISSING".into(),
                },
            ]
        );
    }

    #[test]
    fn unlock_without_back_requirement_is_not_circular() {
        let mut a = def("A");
        a.unlocks_signals = vec!["B".into()];
        let b = def("B");
        let catalog = SignalCatalog::from_defs(vec![a, b]).unwrap();
        assert!(catalog.audit(None).is_empty());
    }

    #[test]
    fn audit_checks_lore_only_when_known() {
        let mut a = def("A");
        a.lore_provided = vec!["LORE_X".into()];
        a.discovery_requirements.required_lore_fragments = vec!["LORE_Y".into()];
        let catalog = SignalCatalog::from_defs(vec![a]).unwrap();

        assert!(catalog.audit(None).is_empty());

        let known: BTreeSet<String> = ["LORE_X".to_string()].into_iter().collect();
        let issues = catalog.audit(Some(&known));
        assert_eq!(
            issues,
            vec![CatalogIssue::UnknownRequiredLore {
                source_id: "A".into(),
                lore_id: "LORE_Y".into(),
            }]
        );
    }

    #[test]
    fn builtin_has_no_broken_requirements() {
        let catalog = SignalCatalog::builtin().unwrap();
        let issues = catalog.audit(None);
        assert!(!issues
            .iter()
            .any(|i| matches!(i, CatalogIssue::MissingRequiredSignal { .. })));
    }

    #[test]
    fn builtin_unlock_chains_are_flagged_circular() {
        let issues = SignalCatalog::builtin().unwrap().audit(None);
        let circular: Vec<(&str, &str)> = issues
            .iter()
            .filter_map(|issue| match issue {
                CatalogIssue::CircularUnlock { source_id, target } => {
                    Some((source_id.as_str(), target.as_str()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            circular,
            vec![
                ("PIRATE_DATA_RELAY_GAMMA", "PIRATE_STRONGHOLD_BEACON_ALPHA"),
                ("ANCIENT_PROBE_RETURN_SIGNAL", "ANCIENT_PROBE_TRANSMISSION_DECODED"),
                ("DISTRESS_CALL_FREIGHTER_VALIANT", "WRECKAGE_SITE_VALIANT"),
            ]
        );
    }
}
