//! Audio codec: the fixed tone table behind the transcription puzzle.
//!
//! Letters A–Z and digits 0–9 map to short sequences of short and long
//! tones (Morse-like). The word space maps to a two-gap marker. Any other
//! character is dropped on encode; it does not reappear anywhere in the
//! puzzle.
//!
//! ```
//! use cartographer_logic::codec;
//!
//! assert_eq!(codec::render("SOS"), "... --- ...");
//! assert_eq!(codec::render("HI!"), ".... ..");
//! ```

use serde::{Deserialize, Serialize};

/// A single symbolic tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tone {
    /// Silence; only appears in the word-space marker.
    Gap = 0,
    Short = 1,
    Long = 2,
}

impl Tone {
    pub fn glyph(self) -> char {
        match self {
            Tone::Gap => ' ',
            Tone::Short => '.',
            Tone::Long => '-',
        }
    }
}

/// Tones of one encoded character.
pub type ToneGroup = &'static [Tone];

/// Separator between two characters' glyph groups.
pub const LETTER_SPACING: &str = " ";
/// Rendered form of the word-space marker.
pub const WORD_SPACING: &str = "   ";

use Tone::{Gap as G, Long as L, Short as S};

const WORD_SPACE: ToneGroup = &[G, G];

/// Tone group for `ch` (case-insensitive), or `None` for unmapped characters.
pub fn tones_for(ch: char) -> Option<ToneGroup> {
    let group: ToneGroup = match ch.to_ascii_uppercase() {
        'A' => &[S, L],
        'B' => &[L, S, S, S],
        'C' => &[L, S, L, S],
        'D' => &[L, S, S],
        'E' => &[S],
        'F' => &[S, S, L, S],
        'G' => &[L, L, S],
        'H' => &[S, S, S, S],
        'I' => &[S, S],
        'J' => &[S, L, L, L],
        'K' => &[L, S, L],
        'L' => &[S, L, S, S],
        'M' => &[L, L],
        'N' => &[L, S],
        'O' => &[L, L, L],
        'P' => &[S, L, L, S],
        'Q' => &[L, L, S, L],
        'R' => &[S, L, S],
        'S' => &[S, S, S],
        'T' => &[L],
        'U' => &[S, S, L],
        'V' => &[S, S, S, L],
        'W' => &[S, L, L],
        'X' => &[L, S, S, L],
        'Y' => &[L, S, L, L],
        'Z' => &[L, L, S, S],
        '0' => &[L, L, L, L, L],
        '1' => &[S, L, L, L, L],
        '2' => &[S, S, L, L, L],
        '3' => &[S, S, S, L, L],
        '4' => &[S, S, S, S, L],
        '5' => &[S, S, S, S, S],
        '6' => &[L, S, S, S, S],
        '7' => &[L, L, S, S, S],
        '8' => &[L, L, L, S, S],
        '9' => &[L, L, L, L, S],
        ' ' => WORD_SPACE,
        _ => return None,
    };
    Some(group)
}

/// Encode text character by character, silently dropping unmapped characters.
pub fn encode(text: &str) -> Vec<ToneGroup> {
    text.chars().filter_map(tones_for).collect()
}

fn is_word_space(group: &[Tone]) -> bool {
    group.iter().all(|&t| t == Tone::Gap)
}

/// Render encoded groups for the player.
///
/// Tones of one character are written without separators, characters are
/// separated by a single space and a word space becomes a wider gap.
pub fn format_for_display(groups: &[ToneGroup]) -> String {
    let rendered: Vec<String> = groups
        .iter()
        .map(|group| {
            if is_word_space(group) {
                WORD_SPACING.to_string()
            } else {
                group.iter().map(|t| t.glyph()).collect()
            }
        })
        .collect();

    let joined = rendered.join(LETTER_SPACING);
    joined.replace(
        &format!("{WORD_SPACING}{LETTER_SPACING}"),
        WORD_SPACING,
    )
}

/// Encode and render in one step.
pub fn render(text: &str) -> String {
    format_for_display(&encode(text))
}

/// Map encoded groups back to text. Groups not in the table are skipped.
pub fn decode(groups: &[ToneGroup]) -> String {
    groups
        .iter()
        .filter_map(|group| {
            if is_word_space(group) {
                return Some(' ');
            }
            ALPHABET
                .chars()
                .find(|&c| tones_for(c).is_some_and(|g| g == *group))
        })
        .collect()
}

const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
