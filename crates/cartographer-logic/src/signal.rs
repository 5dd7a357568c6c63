//! Signal archetypes: static definitions of every kind of detectable signal.
//!
//! An archetype is read from an [`ArchetypeDef`] (plain serde data, all
//! optional fields defaulted) and converted once into an immutable
//! [`SignalArchetype`]. Conversion validates the physical attributes and the
//! evolve/degrade edges and computes the complexity score. Nothing mutates an
//! archetype afterwards; the catalog only hands out shared references.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::puzzle::PuzzleKind;

/// Ordered rarity/power classification of an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalTier {
    Basic,
    Advanced,
    ExoticTier,
    Ancient,
    Quantum,
}

impl SignalTier {
    pub const ALL: [SignalTier; 5] = [
        SignalTier::Basic,
        SignalTier::Advanced,
        SignalTier::ExoticTier,
        SignalTier::Ancient,
        SignalTier::Quantum,
    ];

    /// Complexity contribution of the tier.
    pub fn complexity_weight(self) -> f64 {
        match self {
            SignalTier::Basic => 5.0,
            SignalTier::Advanced => 15.0,
            SignalTier::ExoticTier => 30.0,
            SignalTier::Ancient => 50.0,
            SignalTier::Quantum => 100.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalTier::Basic => "Basic",
            SignalTier::Advanced => "Advanced",
            SignalTier::ExoticTier => "Exotic Tier",
            SignalTier::Ancient => "Ancient",
            SignalTier::Quantum => "Quantum",
        }
    }
}

/// Perceived origin of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalCategory {
    Technological,
    Biological,
    Geological,
    Stellar,
    QuantumPhenomena,
    Crystalline,
    Memetic,
    Archaeological,
    Distress,
    Civilian,
    Pirate,
    Military,
    Research,
    Unknown,
}

/// Modulation scheme of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modulation {
    Am,
    Fm,
    Cw,
    Pulsed,
    Fsk,
    Psk,
    DataBurst,
    Noise,
    Exotic,
}

impl Modulation {
    pub const ALL: [Modulation; 9] = [
        Modulation::Am,
        Modulation::Fm,
        Modulation::Cw,
        Modulation::Pulsed,
        Modulation::Fsk,
        Modulation::Psk,
        Modulation::DataBurst,
        Modulation::Noise,
        Modulation::Exotic,
    ];

    /// Complexity contribution of the modulation scheme.
    pub fn complexity_weight(self) -> f64 {
        match self {
            Modulation::Am => 1.0,
            Modulation::Fm => 2.0,
            Modulation::Cw => 1.5,
            Modulation::Pulsed => 3.0,
            Modulation::Fsk => 4.0,
            Modulation::Psk => 5.0,
            Modulation::DataBurst => 8.0,
            Modulation::Noise => 0.5,
            Modulation::Exotic => 10.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Modulation::Am => "Amplitude Modulation",
            Modulation::Fm => "Frequency Modulation",
            Modulation::Cw => "Continuous Wave",
            Modulation::Pulsed => "Pulsed",
            Modulation::Fsk => "Frequency-Shift Keying",
            Modulation::Psk => "Phase-Shift Keying",
            Modulation::DataBurst => "Data Burst",
            Modulation::Noise => "Broadband Noise",
            Modulation::Exotic => "Exotic/Unknown",
        }
    }
}

/// Gating conditions a player must satisfy before an archetype can appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryRequirements {
    pub min_player_level: u32,
    #[serde(alias = "required_scanner_level")]
    pub min_scanner_level: u32,
    pub required_completed_signals: Vec<String>,
    pub required_lore_fragments: Vec<String>,
    pub required_sector_types: Vec<String>,
    /// Probability in \[0, 1\]. Any positive value lets the archetype appear
    /// outside its required sectors and spawn locations as a fallback.
    pub random_encounter_chance: Option<f64>,
}

impl DiscoveryRequirements {
    /// Whether the archetype may show up as a random encounter.
    pub fn allows_random_encounter(&self) -> bool {
        self.random_encounter_chance.unwrap_or(0.0) > 0.0
    }
}

/// Raw archetype data as stored in the catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDef {
    #[serde(alias = "signal_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,

    pub tier: SignalTier,
    pub category: SignalCategory,

    pub base_frequency: f64,
    /// kHz.
    pub bandwidth: f64,
    pub modulation: Modulation,
    pub strength_levels: Vec<f64>,
    /// 0.0 (chaotic) to 1.0 (perfectly stable).
    pub stability: f64,

    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lore_fragments_unlocked: Vec<String>,
    #[serde(default)]
    pub required_equipment: Vec<String>,
    #[serde(default)]
    pub associated_puzzle: Option<PuzzleKind>,

    #[serde(default)]
    pub discovery_requirements: DiscoveryRequirements,
    #[serde(default)]
    pub is_event_triggered: bool,
    #[serde(default)]
    pub event_name: Option<String>,

    #[serde(default = "default_rarity")]
    pub base_rarity_score: f64,
    #[serde(default)]
    pub spawn_locations: Vec<String>,
    #[serde(default)]
    pub spawn_conditions_met_bonus: f64,

    #[serde(default)]
    pub unlocks_signals: Vec<String>,
    #[serde(default)]
    pub lore_provided: Vec<String>,
    #[serde(default)]
    pub combination_hint: Option<String>,
    #[serde(default)]
    pub ascii_signature: Option<String>,

    #[serde(default)]
    pub can_evolve: bool,
    #[serde(default)]
    pub evolves_to: Option<String>,
    #[serde(default)]
    pub evolution_conditions: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub can_degrade: bool,
    #[serde(default)]
    pub degrades_to: Option<String>,
    #[serde(default)]
    pub degradation_conditions: BTreeMap<String, serde_json::Value>,
}

fn default_rarity() -> f64 {
    0.5
}

/// The reason an archetype definition was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArchetypeFault {
    #[error("archetype id is empty")]
    EmptyId,
    #[error("base frequency must be positive, got {0}")]
    NonPositiveFrequency(f64),
    #[error("bandwidth must be positive, got {0}")]
    NonPositiveBandwidth(f64),
    #[error("stability must be within [0, 1], got {0}")]
    StabilityOutOfRange(f64),
    #[error("base rarity score must be within [0, 1], got {0}")]
    RarityOutOfRange(f64),
    #[error("random encounter chance must be within [0, 1], got {0}")]
    EncounterChanceOutOfRange(f64),
    #[error("spawn conditions bonus must be finite, got {0}")]
    NonFiniteSpawnBonus(f64),
    #[error("strength levels cannot be empty")]
    EmptyStrengthLevels,
    #[error("event-triggered archetype has no event name")]
    MissingEventName,
    #[error("can_evolve is set but no evolution target is given")]
    MissingEvolveTarget,
    #[error("can_degrade is set but no degradation target is given")]
    MissingDegradeTarget,
}

/// Inputs of the complexity formula, separated so the score can be
/// recomputed without building an archetype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexityInputs {
    pub tier: SignalTier,
    pub modulation: Modulation,
    pub bandwidth: f64,
    pub stability: f64,
    pub equipment_count: usize,
    pub has_puzzle: bool,
}

impl ComplexityInputs {
    const BANDWIDTH_FACTOR: f64 = 0.01;
    const INSTABILITY_FACTOR: f64 = 10.0;
    const EQUIPMENT_PER_ITEM: f64 = 3.0;
    const PUZZLE_BONUS: f64 = 10.0;

    /// Complexity score, clamped at zero and rounded to two decimals.
    pub fn score(&self) -> f64 {
        let mut score = self.tier.complexity_weight() + self.modulation.complexity_weight();
        score += self.bandwidth * Self::BANDWIDTH_FACTOR;
        score += (1.0 - self.stability) * Self::INSTABILITY_FACTOR;
        score += self.equipment_count as f64 * Self::EQUIPMENT_PER_ITEM;
        if self.has_puzzle {
            score += Self::PUZZLE_BONUS;
        }
        round2(score.max(0.0))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Immutable, validated signal archetype.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalArchetype {
    def: ArchetypeDef,
    complexity_score: f64,
}

impl SignalArchetype {
    /// Validate a definition and compute its complexity score.
    pub fn new(def: ArchetypeDef) -> Result<Self, ArchetypeFault> {
        validate(&def)?;
        let complexity_score = complexity_inputs(&def).score();
        Ok(Self {
            def,
            complexity_score,
        })
    }

    pub fn id(&self) -> &str {
        &self.def.id
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn description(&self) -> &str {
        &self.def.description
    }

    pub fn tier(&self) -> SignalTier {
        self.def.tier
    }

    pub fn category(&self) -> SignalCategory {
        self.def.category
    }

    pub fn modulation(&self) -> Modulation {
        self.def.modulation
    }

    pub fn base_frequency(&self) -> f64 {
        self.def.base_frequency
    }

    pub fn bandwidth(&self) -> f64 {
        self.def.bandwidth
    }

    pub fn stability(&self) -> f64 {
        self.def.stability
    }

    pub fn strength_levels(&self) -> &[f64] {
        &self.def.strength_levels
    }

    pub fn tags(&self) -> &[String] {
        &self.def.tags
    }

    pub fn required_equipment(&self) -> &[String] {
        &self.def.required_equipment
    }

    pub fn associated_puzzle(&self) -> Option<PuzzleKind> {
        self.def.associated_puzzle
    }

    pub fn requirements(&self) -> &DiscoveryRequirements {
        &self.def.discovery_requirements
    }

    pub fn is_event_triggered(&self) -> bool {
        self.def.is_event_triggered
    }

    pub fn event_name(&self) -> Option<&str> {
        self.def.event_name.as_deref()
    }

    pub fn base_rarity_score(&self) -> f64 {
        self.def.base_rarity_score
    }

    /// Empty means the archetype can spawn anywhere.
    pub fn spawn_locations(&self) -> &[String] {
        &self.def.spawn_locations
    }

    pub fn spawn_conditions_met_bonus(&self) -> f64 {
        self.def.spawn_conditions_met_bonus
    }

    pub fn unlocks_signals(&self) -> &[String] {
        &self.def.unlocks_signals
    }

    pub fn lore_fragments_unlocked(&self) -> &[String] {
        &self.def.lore_fragments_unlocked
    }

    pub fn lore_provided(&self) -> &[String] {
        &self.def.lore_provided
    }

    pub fn combination_hint(&self) -> Option<&str> {
        self.def.combination_hint.as_deref()
    }

    pub fn ascii_signature(&self) -> Option<&str> {
        self.def.ascii_signature.as_deref()
    }

    /// Evolution target, present only when the archetype can evolve.
    pub fn evolves_to(&self) -> Option<&str> {
        self.def
            .evolves_to
            .as_deref()
            .filter(|_| self.def.can_evolve)
    }

    /// Degradation target, present only when the archetype can degrade.
    pub fn degrades_to(&self) -> Option<&str> {
        self.def
            .degrades_to
            .as_deref()
            .filter(|_| self.def.can_degrade)
    }

    pub fn evolution_conditions(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.def.evolution_conditions
    }

    pub fn degradation_conditions(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.def.degradation_conditions
    }

    pub fn complexity_score(&self) -> f64 {
        self.complexity_score
    }

    pub fn complexity_inputs(&self) -> ComplexityInputs {
        complexity_inputs(&self.def)
    }

    /// The definition this archetype was built from.
    pub fn definition(&self) -> &ArchetypeDef {
        &self.def
    }
}

fn complexity_inputs(def: &ArchetypeDef) -> ComplexityInputs {
    ComplexityInputs {
        tier: def.tier,
        modulation: def.modulation,
        bandwidth: def.bandwidth,
        stability: def.stability,
        equipment_count: def.required_equipment.len(),
        has_puzzle: def.associated_puzzle.is_some(),
    }
}

fn validate(def: &ArchetypeDef) -> Result<(), ArchetypeFault> {
    if def.id.trim().is_empty() {
        return Err(ArchetypeFault::EmptyId);
    }
    // Negated comparisons so NaN is rejected as well.
    if !(def.base_frequency > 0.0) {
        return Err(ArchetypeFault::NonPositiveFrequency(def.base_frequency));
    }
    if !(def.bandwidth > 0.0) {
        return Err(ArchetypeFault::NonPositiveBandwidth(def.bandwidth));
    }
    if !(0.0..=1.0).contains(&def.stability) {
        return Err(ArchetypeFault::StabilityOutOfRange(def.stability));
    }
    if !(0.0..=1.0).contains(&def.base_rarity_score) {
        return Err(ArchetypeFault::RarityOutOfRange(def.base_rarity_score));
    }
    if !def.spawn_conditions_met_bonus.is_finite() {
        return Err(ArchetypeFault::NonFiniteSpawnBonus(def.spawn_conditions_met_bonus));
    }
    if let Some(chance) = def.discovery_requirements.random_encounter_chance {
        if !(0.0..=1.0).contains(&chance) {
            return Err(ArchetypeFault::EncounterChanceOutOfRange(chance));
        }
    }
    if def.strength_levels.is_empty() {
        return Err(ArchetypeFault::EmptyStrengthLevels);
    }
    if def.is_event_triggered && is_blank(&def.event_name) {
        return Err(ArchetypeFault::MissingEventName);
    }
    if def.can_evolve && is_blank(&def.evolves_to) {
        return Err(ArchetypeFault::MissingEvolveTarget);
    }
    if def.can_degrade && is_blank(&def.degrades_to) {
        return Err(ArchetypeFault::MissingDegradeTarget);
    }
    Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal valid definition used across the crate's tests.
    pub(crate) fn def(id: &str) -> ArchetypeDef {
        ArchetypeDef {
            id: id.to_string(),
            name: format!("Test {id}"),
            description: String::new(),
            tier: SignalTier::Basic,
            category: SignalCategory::Unknown,
            base_frequency: 100.0,
            bandwidth: 10.0,
            modulation: Modulation::Am,
            strength_levels: vec![-50.0],
            stability: 0.5,
            tags: Vec::new(),
            lore_fragments_unlocked: Vec::new(),
            required_equipment: Vec::new(),
            associated_puzzle: None,
            discovery_requirements: DiscoveryRequirements::default(),
            is_event_triggered: false,
            event_name: None,
            base_rarity_score: 0.5,
            spawn_locations: Vec::new(),
            spawn_conditions_met_bonus: 0.0,
            unlocks_signals: Vec::new(),
            lore_provided: Vec::new(),
            combination_hint: None,
            ascii_signature: None,
            can_evolve: false,
            evolves_to: None,
            evolution_conditions: BTreeMap::new(),
            can_degrade: false,
            degrades_to: None,
            degradation_conditions: BTreeMap::new(),
        }
    }

    #[test]
    fn civilian_beacon_score() {
        let mut d = def("CIV");
        d.stability = 0.95;
        d.required_equipment = vec!["basic_receiver".into()];
        let a = SignalArchetype::new(d).unwrap();
        // 5 + 1 + 0.1 + 0.5 + 3
        assert!((a.complexity_score() - 9.6).abs() < 1e-9);
    }

    #[test]
    fn puzzle_and_equipment_add_to_score() {
        let mut d = def("PIRATE");
        d.tier = SignalTier::Advanced;
        d.modulation = Modulation::Fsk;
        d.bandwidth = 25.0;
        d.stability = 0.6;
        d.required_equipment = vec!["a".into(), "b".into()];
        d.associated_puzzle = Some(PuzzleKind::AudioConversion);
        let a = SignalArchetype::new(d).unwrap();
        // 15 + 4 + 0.25 + 4 + 6 + 10
        assert!((a.complexity_score() - 39.25).abs() < 1e-9);
    }

    #[test]
    fn score_matches_recomputation() {
        let mut d = def("X");
        d.tier = SignalTier::Quantum;
        d.modulation = Modulation::Exotic;
        d.bandwidth = 1000.0;
        d.stability = 0.3;
        let a = SignalArchetype::new(d).unwrap();
        assert_eq!(a.complexity_score(), a.complexity_inputs().score());
        assert!((a.complexity_score() - 127.0).abs() < 1e-9);
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(SignalTier::Basic < SignalTier::Advanced);
        assert!(SignalTier::Advanced < SignalTier::ExoticTier);
        assert!(SignalTier::ExoticTier < SignalTier::Ancient);
        assert!(SignalTier::Ancient < SignalTier::Quantum);
    }

    #[test]
    fn rejects_non_positive_frequency() {
        let mut d = def("BAD");
        d.base_frequency = 0.0;
        assert_eq!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::NonPositiveFrequency(0.0))
        );
    }

    #[test]
    fn rejects_nan_bandwidth() {
        let mut d = def("BAD");
        d.bandwidth = f64::NAN;
        assert!(matches!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::NonPositiveBandwidth(_))
        ));
    }

    #[test]
    fn rejects_stability_and_rarity_out_of_range() {
        let mut d = def("BAD");
        d.stability = 1.2;
        assert!(matches!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::StabilityOutOfRange(_))
        ));

        let mut d = def("BAD");
        d.base_rarity_score = -0.1;
        assert!(matches!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::RarityOutOfRange(_))
        ));
    }

    #[test]
    fn rejects_non_finite_spawn_bonus() {
        let mut d = def("BAD");
        d.spawn_conditions_met_bonus = f64::INFINITY;
        assert_eq!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::NonFiniteSpawnBonus(f64::INFINITY))
        );

        let mut d = def("BAD");
        d.spawn_conditions_met_bonus = f64::NAN;
        assert!(matches!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::NonFiniteSpawnBonus(_))
        ));
    }

    #[test]
    fn rejects_empty_strength_levels() {
        let mut d = def("BAD");
        d.strength_levels.clear();
        assert_eq!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::EmptyStrengthLevels)
        );
    }

    #[test]
    fn rejects_missing_graph_targets() {
        let mut d = def("BAD");
        d.can_evolve = true;
        assert_eq!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::MissingEvolveTarget)
        );

        let mut d = def("BAD");
        d.can_degrade = true;
        d.degrades_to = Some("  ".into());
        assert_eq!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::MissingDegradeTarget)
        );
    }

    #[test]
    fn rejects_event_without_name() {
        let mut d = def("BAD");
        d.is_event_triggered = true;
        assert_eq!(
            SignalArchetype::new(d),
            Err(ArchetypeFault::MissingEventName)
        );
    }

    #[test]
    fn graph_targets_hidden_without_flag() {
        let mut d = def("X");
        d.evolves_to = Some("Y".into());
        let a = SignalArchetype::new(d).unwrap();
        assert_eq!(a.evolves_to(), None);
    }

    #[test]
    fn parses_legacy_field_names() {
        let json = r#"{
            "signal_id": "LEGACY",
            "name": "Legacy",
            "tier": "ADVANCED",
            "category": "RESEARCH",
            "base_frequency": 50.0,
            "bandwidth": 2.0,
            "modulation": "DATA_BURST",
            "strength_levels": [-80.0],
            "stability": 0.7,
            "discovery_requirements": { "required_scanner_level": 3 }
        }"#;
        let d: ArchetypeDef = serde_json::from_str(json).unwrap();
        assert_eq!(d.id, "LEGACY");
        assert_eq!(d.discovery_requirements.min_scanner_level, 3);
        assert!((d.base_rarity_score - 0.5).abs() < f64::EPSILON);
    }
}
