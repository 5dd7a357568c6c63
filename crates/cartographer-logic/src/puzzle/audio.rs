//! Audio-to-text puzzle: transcribe a phrase rendered as tone groups.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{Difficulty, PlayerInput, Puzzle, PuzzleInstance, PuzzleKind};
use crate::codec::{self, ToneGroup};

const EASY_WORDS: &[&str] = &[
    "HELLO", "WORLD", "TEST", "CODE", "GAME", "PLAY", "CAT", "DOG", "SUN", "MOON",
];
const MEDIUM_WORDS: &[&str] = &[
    "SIGNAL", "PUZZLE", "PYTHON", "AGENT", "SECRET", "MESSAGE", "BEACON", "CIPHER",
];
const HARD_WORDS: &[&str] = &[
    "ENCRYPTION",
    "ALGORITHM",
    "TRANSMISSION",
    "CARTOGRAPHER",
    "FREQUENCY",
    "SEQUENCE",
    "PROTOCOL",
];

/// Chance an injected number is glued onto a word rather than added as a token.
const ATTACH_NUMBER_PROBABILITY: f64 = 0.7;

/// Per-difficulty phrase generation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioProfile {
    pub words: &'static [&'static str],
    pub word_count: usize,
    /// Chance a number in 1..=999 is injected into the phrase.
    pub number_chance: f64,
}

impl AudioProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                words: EASY_WORDS,
                word_count: 1,
                number_chance: 0.15,
            },
            Difficulty::Medium => Self {
                words: MEDIUM_WORDS,
                word_count: 2,
                number_chance: 0.30,
            },
            Difficulty::Hard => Self {
                words: HARD_WORDS,
                word_count: 2,
                number_chance: 0.50,
            },
        }
    }
}

/// What the player hears: the tone groups and their rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTranscript {
    pub tones: Vec<ToneGroup>,
    pub rendered: String,
}

impl AudioTranscript {
    pub fn of(text: &str) -> Self {
        let tones = codec::encode(text);
        let rendered = codec::format_for_display(&tones);
        Self { tones, rendered }
    }
}

/// Uppercase with whitespace runs collapsed and trimmed.
pub fn normalize_transcription(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pick the phrase for a puzzle: words from the difficulty's list, with an
/// occasional number glued to a word or inserted as its own token.
pub fn generate_phrase(profile: &AudioProfile, rng: &mut impl Rng) -> String {
    let mut words: Vec<String> = (0..profile.word_count)
        .filter_map(|_| profile.words.choose(rng))
        .map(|w| w.to_string())
        .collect();

    if rng.gen_bool(profile.number_chance) {
        let number = rng.gen_range(1..=999u32).to_string();
        let target = if words.is_empty() {
            0
        } else {
            rng.gen_range(0..words.len())
        };

        if !words.is_empty() && rng.gen_bool(ATTACH_NUMBER_PROBABILITY) {
            if rng.gen_bool(0.5) {
                words[target].insert_str(0, &number);
            } else {
                words[target].push_str(&number);
            }
        } else {
            words.insert(target, number);
        }
    }

    words.join(" ")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AudioConversionPuzzle;

impl Puzzle for AudioConversionPuzzle {
    type Payload = AudioTranscript;
    type Solution = String;

    fn kind(&self) -> PuzzleKind {
        PuzzleKind::AudioConversion
    }

    fn generate(
        &self,
        difficulty: Difficulty,
        rng: &mut impl Rng,
    ) -> PuzzleInstance<AudioTranscript, String> {
        let phrase = generate_phrase(&AudioProfile::for_difficulty(difficulty), rng);
        PuzzleInstance {
            difficulty,
            payload: AudioTranscript::of(&phrase),
            solution: phrase,
        }
    }

    fn display(&self, instance: &PuzzleInstance<AudioTranscript, String>) -> String {
        format!(
            "Puzzle: {}\n\
             Difficulty: {}\n\n\
             Legend:\n\
             \x20 '.' represents a short tone (like Morse dot)\n\
             \x20 '-' represents a long tone (like Morse dash)\n\
             \x20 Tones for each character are grouped (e.g., '.-' is one letter).\n\
             \x20 Spaces between these groups represent separation between letters.\n\
             \x20 A wider gap ('{}') separates words.\n\
             The following sequence of tones was detected:\n\n\
             Audio Signal: '{}'\n\n\
             Task: Transcribe the text from the pseudo-audio signal.\n\
             Enter the transcribed text below.",
            self.kind().title(),
            instance.difficulty,
            codec::WORD_SPACING,
            instance.payload.rendered,
        )
    }

    /// Case-insensitive, whitespace-normalized equality. Position lists are
    /// never a transcription.
    fn solve(
        &self,
        instance: &PuzzleInstance<AudioTranscript, String>,
        input: &PlayerInput,
    ) -> bool {
        match input {
            PlayerInput::Text(text) => {
                normalize_transcription(text) == normalize_transcription(&instance.solution)
            }
            PlayerInput::Indices(_) => false,
        }
    }
}
