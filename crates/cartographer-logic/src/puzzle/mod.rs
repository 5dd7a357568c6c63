//! Analysis puzzles: the shared generate/display/solve contract.
//!
//! Three puzzle kinds implement [`Puzzle`]:
//!
//! | Kind | Payload | Solution |
//! |------|---------|----------|
//! | [`pulse::PulseSequencePuzzle`] | 0/1 pulse strip | sorted pulse positions |
//! | [`harmonic::HarmonicPatternPuzzle`] | frequency list | sorted inharmonic positions |
//! | [`audio::AudioConversionPuzzle`] | rendered tone groups | the encoded phrase |
//!
//! `solve` is a pure comparison against the stored solution and never fails:
//! malformed input is simply a wrong answer. [`GeneratedPuzzle`] erases the
//! kind for callers that pick the puzzle from an archetype at runtime.

pub mod audio;
pub mod harmonic;
pub mod pulse;

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signal::SignalTier;

use audio::{AudioConversionPuzzle, AudioTranscript};
use harmonic::{HarmonicPatternPuzzle, HarmonicSequence};
use pulse::{PulseSequence, PulseSequencePuzzle};

/// Puzzle difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Parse a difficulty label. Unrecognised labels fall back to `Medium`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    /// Suggested difficulty for analysing an archetype of `tier`.
    pub fn for_tier(tier: SignalTier) -> Self {
        match tier {
            SignalTier::Basic => Difficulty::Easy,
            SignalTier::Advanced | SignalTier::ExoticTier => Difficulty::Medium,
            SignalTier::Ancient | SignalTier::Quantum => Difficulty::Hard,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The puzzle an archetype is analysed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PuzzleKind {
    #[serde(rename = "PulseSequencePuzzle")]
    PulseSequence,
    #[serde(rename = "HarmonicPatternPuzzle")]
    HarmonicPattern,
    #[serde(rename = "AudioConversionPuzzle")]
    AudioConversion,
}

impl PuzzleKind {
    pub const ALL: [PuzzleKind; 3] = [
        PuzzleKind::PulseSequence,
        PuzzleKind::HarmonicPattern,
        PuzzleKind::AudioConversion,
    ];

    /// Parse the puzzle name used in catalog data.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "PulseSequencePuzzle" => Some(PuzzleKind::PulseSequence),
            "HarmonicPatternPuzzle" => Some(PuzzleKind::HarmonicPattern),
            "AudioConversionPuzzle" => Some(PuzzleKind::AudioConversion),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PuzzleKind::PulseSequence => "Pulse Sequence Puzzle",
            PuzzleKind::HarmonicPattern => "Harmonic Anomaly Detection",
            PuzzleKind::AudioConversion => "Audio-to-Text Conversion",
        }
    }
}

/// Errors from the public generation helpers when called with bad arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PuzzleError {
    #[error("base frequency must be positive, got {0}")]
    NonPositiveBaseFrequency(f64),
    #[error("base frequency must be finite, got {0}")]
    NonFiniteBaseFrequency(f64),
    #[error("max harmonic multiple must be at least 1")]
    ZeroHarmonicMultiple,
    #[error("detune probability must be within [0, 1], got {0}")]
    DetuneProbabilityOutOfRange(f64),
    #[error("{name} [{low}, {high}] is not an ordered, finite, positive range")]
    InvalidRange {
        name: &'static str,
        low: f64,
        high: f64,
    },
}

/// A generated puzzle: its difficulty, what the player sees, and the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleInstance<P, S> {
    pub difficulty: Difficulty,
    pub payload: P,
    pub solution: S,
}

/// A player's answer as typed at the prompt or assembled by a UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    Indices(Vec<i64>),
    Text(String),
}

impl From<&str> for PlayerInput {
    fn from(s: &str) -> Self {
        PlayerInput::Text(s.to_string())
    }
}

impl From<String> for PlayerInput {
    fn from(s: String) -> Self {
        PlayerInput::Text(s)
    }
}

impl From<Vec<i64>> for PlayerInput {
    fn from(v: Vec<i64>) -> Self {
        PlayerInput::Indices(v)
    }
}

impl From<&[usize]> for PlayerInput {
    fn from(v: &[usize]) -> Self {
        PlayerInput::Indices(v.iter().map(|&i| i as i64).collect())
    }
}

/// Shared contract of every puzzle kind.
pub trait Puzzle {
    type Payload;
    type Solution;

    fn kind(&self) -> PuzzleKind;

    fn generate(
        &self,
        difficulty: Difficulty,
        rng: &mut impl Rng,
    ) -> PuzzleInstance<Self::Payload, Self::Solution>;

    /// Player-facing text: title, difficulty, the puzzle itself and the task.
    fn display(&self, instance: &PuzzleInstance<Self::Payload, Self::Solution>) -> String;

    /// Whether `input` is a correct answer. Never fails on malformed input.
    fn solve(
        &self,
        instance: &PuzzleInstance<Self::Payload, Self::Solution>,
        input: &PlayerInput,
    ) -> bool;
}

/// Parse a position answer into a set.
///
/// Accepts a list of integers, or comma-separated integers with surrounding
/// whitespace and empty tokens ignored. Blank text is the empty set. Text
/// made only of separators, or containing a non-integer token, is rejected.
pub fn parse_index_set(input: &PlayerInput) -> Option<BTreeSet<i64>> {
    match input {
        PlayerInput::Indices(values) => Some(values.iter().copied().collect()),
        PlayerInput::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Some(BTreeSet::new());
            }
            let tokens: Vec<&str> = trimmed
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.is_empty() {
                return None;
            }
            tokens.iter().map(|t| t.parse::<i64>().ok()).collect()
        }
    }
}

/// Set equality between a position answer and the stored solution.
pub(crate) fn positions_match(solution: &[usize], input: &PlayerInput) -> bool {
    let Some(answer) = parse_index_set(input) else {
        return false;
    };
    let expected: BTreeSet<i64> = solution.iter().map(|&i| i as i64).collect();
    answer == expected
}

/// A puzzle of any kind, as handed to the command layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedPuzzle {
    Pulse(PuzzleInstance<PulseSequence, Vec<usize>>),
    Harmonic(PuzzleInstance<HarmonicSequence, Vec<usize>>),
    Audio(PuzzleInstance<AudioTranscript, String>),
}

impl GeneratedPuzzle {
    pub fn generate(kind: PuzzleKind, difficulty: Difficulty, rng: &mut impl Rng) -> Self {
        match kind {
            PuzzleKind::PulseSequence => {
                GeneratedPuzzle::Pulse(PulseSequencePuzzle.generate(difficulty, rng))
            }
            PuzzleKind::HarmonicPattern => GeneratedPuzzle::Harmonic(
                HarmonicPatternPuzzle::default().generate(difficulty, rng),
            ),
            PuzzleKind::AudioConversion => {
                GeneratedPuzzle::Audio(AudioConversionPuzzle.generate(difficulty, rng))
            }
        }
    }

    pub fn kind(&self) -> PuzzleKind {
        match self {
            GeneratedPuzzle::Pulse(_) => PuzzleKind::PulseSequence,
            GeneratedPuzzle::Harmonic(_) => PuzzleKind::HarmonicPattern,
            GeneratedPuzzle::Audio(_) => PuzzleKind::AudioConversion,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            GeneratedPuzzle::Pulse(p) => p.difficulty,
            GeneratedPuzzle::Harmonic(p) => p.difficulty,
            GeneratedPuzzle::Audio(p) => p.difficulty,
        }
    }

    pub fn display(&self) -> String {
        match self {
            GeneratedPuzzle::Pulse(p) => PulseSequencePuzzle.display(p),
            GeneratedPuzzle::Harmonic(p) => HarmonicPatternPuzzle::default().display(p),
            GeneratedPuzzle::Audio(p) => AudioConversionPuzzle.display(p),
        }
    }

    pub fn solve(&self, input: &PlayerInput) -> bool {
        match self {
            GeneratedPuzzle::Pulse(p) => PulseSequencePuzzle.solve(p, input),
            GeneratedPuzzle::Harmonic(p) => HarmonicPatternPuzzle::default().solve(p, input),
            GeneratedPuzzle::Audio(p) => AudioConversionPuzzle.solve(p, input),
        }
    }

    /// The stored solution in answer form.
    pub fn canonical_answer(&self) -> PlayerInput {
        match self {
            GeneratedPuzzle::Pulse(p) => PlayerInput::from(p.solution.as_slice()),
            GeneratedPuzzle::Harmonic(p) => PlayerInput::from(p.solution.as_slice()),
            GeneratedPuzzle::Audio(p) => PlayerInput::Text(p.solution.clone()),
        }
    }
}
