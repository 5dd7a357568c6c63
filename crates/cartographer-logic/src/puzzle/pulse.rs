//! Pulse sequence puzzle: find the positions of the pulses in a 0/1 strip.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{positions_match, Difficulty, PlayerInput, Puzzle, PuzzleInstance, PuzzleKind};

/// Per-difficulty generation bounds (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseProfile {
    pub length: (usize, usize),
    pub pulses: (usize, usize),
}

impl PulseProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                length: (4, 6),
                pulses: (2, 3),
            },
            Difficulty::Medium => Self {
                length: (6, 9),
                pulses: (3, 5),
            },
            Difficulty::Hard => Self {
                length: (8, 12),
                pulses: (4, 6),
            },
        }
    }
}

/// The strip shown to the player; `1` is a pulse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseSequence {
    pub sequence: Vec<u8>,
}

impl PulseSequence {
    pub fn pulse_positions(&self) -> Vec<usize> {
        self.sequence
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 1)
            .map(|(i, _)| i)
            .collect()
    }

    /// `|` for a pulse, `-` for silence.
    pub fn visual(&self) -> String {
        self.sequence
            .iter()
            .map(|&v| if v == 1 { '|' } else { '-' })
            .collect()
    }
}

/// A 0/1 sequence of `length` with exactly `min(pulses, length)` ones at
/// distinct uniformly chosen positions.
pub fn generate_pulse_sequence(length: usize, pulses: usize, rng: &mut impl Rng) -> Vec<u8> {
    let mut sequence = vec![0u8; length];
    for i in index::sample(rng, length, pulses.min(length)).into_iter() {
        sequence[i] = 1;
    }
    sequence
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PulseSequencePuzzle;

impl Puzzle for PulseSequencePuzzle {
    type Payload = PulseSequence;
    type Solution = Vec<usize>;

    fn kind(&self) -> PuzzleKind {
        PuzzleKind::PulseSequence
    }

    fn generate(
        &self,
        difficulty: Difficulty,
        rng: &mut impl Rng,
    ) -> PuzzleInstance<PulseSequence, Vec<usize>> {
        let profile = PulseProfile::for_difficulty(difficulty);
        let length = rng.gen_range(profile.length.0..=profile.length.1);
        let pulses = rng.gen_range(profile.pulses.0..=profile.pulses.1);

        let payload = PulseSequence {
            sequence: generate_pulse_sequence(length, pulses, rng),
        };
        let solution = payload.pulse_positions();
        PuzzleInstance {
            difficulty,
            payload,
            solution,
        }
    }

    fn display(&self, instance: &PuzzleInstance<PulseSequence, Vec<usize>>) -> String {
        format!(
            "Puzzle: {}\n\
             Difficulty: {}\n\
             Length of sequence: {}\n\
             Visual: {}\n\
             Task: Identify the 0-indexed positions of the pulses ('|').\n\
             Submit your answer as a comma-separated list of numbers (e.g., 0,2,4).",
            self.kind().title(),
            instance.difficulty,
            instance.payload.sequence.len(),
            instance.payload.visual(),
        )
    }

    fn solve(
        &self,
        instance: &PuzzleInstance<PulseSequence, Vec<usize>>,
        input: &PlayerInput,
    ) -> bool {
        positions_match(&instance.solution, input)
    }
}
