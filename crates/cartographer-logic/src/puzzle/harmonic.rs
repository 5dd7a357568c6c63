//! Harmonic anomaly puzzle.
//!
//! A shuffled series of harmonics of one base frequency, with a few entries
//! overwritten by values that sit clearly off the harmonic grid. The player
//! names the overwritten positions.
//!
//! The replacement search is bounded: after `max_attempts` draws the last
//! candidate is kept even if it lands near a harmonic. The cap guarantees
//! termination; a borderline value is rare but possible.

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    positions_match, Difficulty, PlayerInput, Puzzle, PuzzleError, PuzzleInstance, PuzzleKind,
};

/// Base frequencies (Hz) a puzzle may be built on.
pub const BASE_FREQUENCIES: [f64; 8] = [50.0, 60.0, 100.0, 110.0, 120.0, 150.0, 200.0, 220.0];

/// Tunables for the inharmonic replacement search.
#[derive(Debug, Clone, PartialEq)]
pub struct InharmonicConfig {
    /// Bounds, as multiples of the base, for uniformly drawn replacements.
    pub random_range: (f64, f64),
    /// Fraction of the original value a detune moves it by.
    pub detune_range: (f64, f64),
    /// Chance that an attempt detunes instead of drawing uniformly.
    pub detune_probability: f64,
    pub max_attempts: u32,
    /// Relative distance to a harmonic that still counts as "on" it.
    pub harmonic_tolerance: f64,
    /// Harmonics 1..=n are checked.
    pub checked_harmonics: u32,
    /// A downward detune landing below `base * low_floor_factor` is flipped upward.
    pub low_floor_factor: f64,
}

impl InharmonicConfig {
    /// Check that every range and probability can be sampled from.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if !(0.0..=1.0).contains(&self.detune_probability) {
            return Err(PuzzleError::DetuneProbabilityOutOfRange(self.detune_probability));
        }
        let (low, high) = self.random_range;
        if !(low > 0.0 && low <= high && high.is_finite()) {
            return Err(PuzzleError::InvalidRange {
                name: "random_range",
                low,
                high,
            });
        }
        let (low, high) = self.detune_range;
        if !(low >= 0.0 && low <= high && high.is_finite()) {
            return Err(PuzzleError::InvalidRange {
                name: "detune_range",
                low,
                high,
            });
        }
        Ok(())
    }
}

impl Default for InharmonicConfig {
    fn default() -> Self {
        Self {
            random_range: (0.1, 2.0),
            detune_range: (0.15, 0.45),
            detune_probability: 0.7,
            max_attempts: 20,
            harmonic_tolerance: 0.05,
            checked_harmonics: 9,
            low_floor_factor: 0.5,
        }
    }
}

/// Per-difficulty generation bounds (ranges inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarmonicProfile {
    pub length: (usize, usize),
    pub inharmonic: (usize, usize),
    pub max_multiple: u32,
}

impl HarmonicProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                length: (5, 7),
                inharmonic: (1, 2),
                max_multiple: 5,
            },
            Difficulty::Medium => Self {
                length: (7, 10),
                inharmonic: (2, 3),
                max_multiple: 7,
            },
            Difficulty::Hard => Self {
                length: (9, 12),
                inharmonic: (3, 4),
                max_multiple: 10,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicSequence {
    pub base_frequency: f64,
    pub frequencies: Vec<f64>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `count` values drawn with replacement from `base × 1 ..= base × max_multiple`,
/// rounded to two decimals and shuffled.
pub fn generate_harmonic_series(
    base: f64,
    count: usize,
    max_multiple: u32,
    rng: &mut impl Rng,
) -> Result<Vec<f64>, PuzzleError> {
    if !(base > 0.0) {
        return Err(PuzzleError::NonPositiveBaseFrequency(base));
    }
    if max_multiple == 0 {
        return Err(PuzzleError::ZeroHarmonicMultiple);
    }
    Ok(harmonic_series(base, count, max_multiple, rng))
}

fn harmonic_series(base: f64, count: usize, max_multiple: u32, rng: &mut impl Rng) -> Vec<f64> {
    let mut series: Vec<f64> = (0..count)
        .map(|_| round2(base * f64::from(rng.gen_range(1..=max_multiple))))
        .collect();
    series.shuffle(rng);
    series
}

/// Whether `freq` is farther than the configured tolerance from every
/// checked harmonic of `base`.
pub fn is_clearly_inharmonic(freq: f64, base: f64, config: &InharmonicConfig) -> bool {
    (1..=config.checked_harmonics).all(|h| {
        let harmonic = base * f64::from(h);
        (freq - harmonic).abs() >= config.harmonic_tolerance * harmonic
    })
}

/// Overwrite `min(count, len)` distinct positions of `sequence` with
/// inharmonic values. Returns the new sequence and the sorted positions.
///
/// Fails if `base` is not a positive finite frequency or `config` does not
/// pass [`InharmonicConfig::validate`].
pub fn introduce_inharmonic_frequencies(
    sequence: &[f64],
    count: usize,
    base: f64,
    config: &InharmonicConfig,
    rng: &mut impl Rng,
) -> Result<(Vec<f64>, Vec<usize>), PuzzleError> {
    if !(base > 0.0) {
        return Err(PuzzleError::NonPositiveBaseFrequency(base));
    }
    if !base.is_finite() {
        return Err(PuzzleError::NonFiniteBaseFrequency(base));
    }
    config.validate()?;
    let (low, high) = config.random_range;
    if !(base * high).is_finite() {
        return Err(PuzzleError::InvalidRange {
            name: "random_range",
            low: base * low,
            high: base * high,
        });
    }
    Ok(replace_inharmonic(sequence, count, base, config, rng))
}

fn replace_inharmonic(
    sequence: &[f64],
    count: usize,
    base: f64,
    config: &InharmonicConfig,
    rng: &mut impl Rng,
) -> (Vec<f64>, Vec<usize>) {
    let mut modified = sequence.to_vec();
    let count = count.min(sequence.len());
    if count == 0 {
        return (modified, Vec::new());
    }

    let mut positions = index::sample(rng, sequence.len(), count).into_vec();
    for &idx in &positions {
        modified[idx] = inharmonic_replacement(sequence[idx], base, config, rng);
    }
    positions.sort_unstable();
    (modified, positions)
}

fn inharmonic_replacement(
    original: f64,
    base: f64,
    config: &InharmonicConfig,
    rng: &mut impl Rng,
) -> f64 {
    let mut candidate = original;
    for _ in 0..config.max_attempts {
        candidate = if rng.gen_bool(config.detune_probability) {
            let amount = original * rng.gen_range(config.detune_range.0..=config.detune_range.1);
            let detuned = if rng.gen_bool(0.5) {
                original + amount
            } else {
                original - amount
            };
            if detuned < base * config.low_floor_factor {
                original + amount
            } else {
                detuned
            }
        } else {
            rng.gen_range(base * config.random_range.0..=base * config.random_range.1)
        };

        candidate = round2(candidate);
        if candidate <= 0.0 {
            candidate = round2(base * rng.gen_range(0.5..=1.5));
        }
        if is_clearly_inharmonic(candidate, base, config) {
            return candidate;
        }
    }

    log::debug!(
        "No clean inharmonic value for {original} Hz (base {base} Hz) \
         after {} attempts, keeping {candidate}",
        config.max_attempts
    );
    candidate
}

#[derive(Debug, Clone, Default)]
pub struct HarmonicPatternPuzzle {
    pub config: InharmonicConfig,
}

impl Puzzle for HarmonicPatternPuzzle {
    type Payload = HarmonicSequence;
    type Solution = Vec<usize>;

    fn kind(&self) -> PuzzleKind {
        PuzzleKind::HarmonicPattern
    }

    fn generate(
        &self,
        difficulty: Difficulty,
        rng: &mut impl Rng,
    ) -> PuzzleInstance<HarmonicSequence, Vec<usize>> {
        let profile = HarmonicProfile::for_difficulty(difficulty);
        let base = BASE_FREQUENCIES[rng.gen_range(0..BASE_FREQUENCIES.len())];
        let length = rng.gen_range(profile.length.0..=profile.length.1);
        let count = rng
            .gen_range(profile.inharmonic.0..=profile.inharmonic.1)
            .min(length);

        let series = harmonic_series(base, length, profile.max_multiple, rng);
        let (frequencies, solution) = if self.config.validate().is_ok() {
            replace_inharmonic(&series, count, base, &self.config, rng)
        } else {
            log::warn!("Invalid inharmonic config {:?}, using defaults", self.config);
            replace_inharmonic(&series, count, base, &InharmonicConfig::default(), rng)
        };

        PuzzleInstance {
            difficulty,
            payload: HarmonicSequence {
                base_frequency: base,
                frequencies,
            },
            solution,
        }
    }

    fn display(&self, instance: &PuzzleInstance<HarmonicSequence, Vec<usize>>) -> String {
        let payload = &instance.payload;
        let listing: Vec<String> = payload
            .frequencies
            .iter()
            .enumerate()
            .map(|(i, f)| format!("  {i}: {f:.2} Hz"))
            .collect();

        format!(
            "Puzzle: {}\n\
             Difficulty: {}\n\n\
             A sequence of {} audio frequencies is provided below. Most are harmonically\n\
             related to a common fundamental frequency (approx. {:.2} Hz).\n\
             Some frequencies are inharmonic (not part of the series or detuned).\n\n\
             Frequency Sequence (0-indexed):\n\
             {}\n\n\
             Task: Identify the 0-indexed positions of ALL inharmonic frequencies.\n\
             Submit your answer as a comma-separated list of numbers (e.g., 1,4,6).",
            self.kind().title(),
            instance.difficulty,
            payload.frequencies.len(),
            payload.base_frequency,
            listing.join("\n"),
        )
    }

    fn solve(
        &self,
        instance: &PuzzleInstance<HarmonicSequence, Vec<usize>>,
        input: &PlayerInput,
    ) -> bool {
        positions_match(&instance.solution, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn series_uses_only_listed_multiples() {
        let mut rng = StdRng::seed_from_u64(42);
        let series = generate_harmonic_series(100.0, 5, 3, &mut rng).unwrap();
        assert_eq!(series.len(), 5);
        assert!(series.iter().all(|f| [100.0, 200.0, 300.0].contains(f)));
    }

    #[test]
    fn series_rejects_bad_arguments() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_harmonic_series(0.0, 3, 3, &mut rng),
            Err(PuzzleError::NonPositiveBaseFrequency(0.0))
        );
        assert!(generate_harmonic_series(f64::NAN, 3, 3, &mut rng).is_err());
        assert_eq!(
            generate_harmonic_series(100.0, 3, 0, &mut rng),
            Err(PuzzleError::ZeroHarmonicMultiple)
        );
        assert_eq!(generate_harmonic_series(100.0, 0, 3, &mut rng), Ok(Vec::new()));
    }

    #[test]
    fn zero_inharmonic_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let seq = vec![100.0, 200.0, 300.0];
        let config = InharmonicConfig::default();
        let (out, idx) =
            introduce_inharmonic_frequencies(&seq, 0, 100.0, &config, &mut rng).unwrap();
        assert_eq!(out, seq);
        assert!(idx.is_empty());
    }

    #[test]
    fn inharmonic_count_is_clamped_to_length() {
        let mut rng = StdRng::seed_from_u64(5);
        let seq = vec![100.0, 200.0];
        let config = InharmonicConfig::default();
        let (out, idx) =
            introduce_inharmonic_frequencies(&seq, 5, 100.0, &config, &mut rng).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(idx, vec![0, 1]);
    }

    #[test]
    fn untouched_positions_keep_their_value() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = InharmonicConfig::default();
        let seq = generate_harmonic_series(110.0, 10, 7, &mut rng).unwrap();
        let (out, idx) =
            introduce_inharmonic_frequencies(&seq, 3, 110.0, &config, &mut rng).unwrap();
        assert_eq!(idx.len(), 3);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        for (i, (&before, &after)) in seq.iter().zip(&out).enumerate() {
            if !idx.contains(&i) {
                assert_eq!(before, after);
            }
            assert!(after > 0.0);
        }
    }

    #[test]
    fn replacements_are_usually_clean() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = InharmonicConfig::default();
        let mut clean = 0;
        let mut total = 0;
        for _ in 0..100 {
            let seq = generate_harmonic_series(100.0, 8, 7, &mut rng).unwrap();
            let (out, idx) =
                introduce_inharmonic_frequencies(&seq, 3, 100.0, &config, &mut rng).unwrap();
            for i in idx {
                total += 1;
                if is_clearly_inharmonic(out[i], 100.0, &config) {
                    clean += 1;
                }
            }
        }
        assert!(clean * 100 >= total * 95, "{clean}/{total} clean");
    }

    #[test]
    fn inharmonic_rejects_bad_arguments() {
        let mut rng = StdRng::seed_from_u64(3);
        let seq = vec![100.0, 200.0, 300.0];
        let config = InharmonicConfig::default();
        for _ in 0..50 {
            assert_eq!(
                introduce_inharmonic_frequencies(&seq, 2, -100.0, &config, &mut rng),
                Err(PuzzleError::NonPositiveBaseFrequency(-100.0))
            );
        }
        assert!(introduce_inharmonic_frequencies(&seq, 2, f64::NAN, &config, &mut rng).is_err());
        assert_eq!(
            introduce_inharmonic_frequencies(&seq, 2, f64::INFINITY, &config, &mut rng),
            Err(PuzzleError::NonFiniteBaseFrequency(f64::INFINITY))
        );

        let eager = InharmonicConfig {
            detune_probability: 1.5,
            ..InharmonicConfig::default()
        };
        assert_eq!(
            introduce_inharmonic_frequencies(&seq, 2, 100.0, &eager, &mut rng),
            Err(PuzzleError::DetuneProbabilityOutOfRange(1.5))
        );

        let inverted = InharmonicConfig {
            random_range: (2.0, 0.1),
            ..InharmonicConfig::default()
        };
        assert_eq!(
            introduce_inharmonic_frequencies(&seq, 2, 100.0, &inverted, &mut rng),
            Err(PuzzleError::InvalidRange {
                name: "random_range",
                low: 2.0,
                high: 0.1,
            })
        );

        assert!(matches!(
            introduce_inharmonic_frequencies(&seq, 2, f64::MAX, &config, &mut rng),
            Err(PuzzleError::InvalidRange {
                name: "random_range",
                ..
            })
        ));

        let negative_detune = InharmonicConfig {
            detune_range: (-0.2, 0.4),
            ..InharmonicConfig::default()
        };
        assert!(negative_detune.validate().is_err());
        assert_eq!(InharmonicConfig::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_puzzle_config_falls_back_to_defaults() {
        let mut rng = StdRng::seed_from_u64(8);
        let puzzle = HarmonicPatternPuzzle {
            config: InharmonicConfig {
                detune_probability: 2.0,
                ..InharmonicConfig::default()
            },
        };
        for _ in 0..20 {
            let p = puzzle.generate(Difficulty::Hard, &mut rng);
            assert!(puzzle.solve(&p, &PlayerInput::from(p.solution.as_slice())));
        }
    }

    #[test]
    fn inharmonic_check() {
        let config = InharmonicConfig::default();
        assert!(!is_clearly_inharmonic(100.0, 100.0, &config));
        assert!(!is_clearly_inharmonic(304.0, 100.0, &config));
        assert!(is_clearly_inharmonic(150.0, 100.0, &config));
        assert!(is_clearly_inharmonic(40.0, 100.0, &config));
        // Beyond the checked harmonics nothing is "on" the grid.
        assert!(is_clearly_inharmonic(1000.0, 100.0, &config));
    }

    #[test]
    fn generated_within_difficulty_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let puzzle = HarmonicPatternPuzzle::default();
        for difficulty in Difficulty::ALL {
            let profile = HarmonicProfile::for_difficulty(difficulty);
            for _ in 0..30 {
                let p = puzzle.generate(difficulty, &mut rng);
                let len = p.payload.frequencies.len();
                assert!(BASE_FREQUENCIES.contains(&p.payload.base_frequency));
                assert!((profile.length.0..=profile.length.1).contains(&len));
                let inharmonic = profile.inharmonic.0..=profile.inharmonic.1;
                assert!(inharmonic.contains(&p.solution.len()));
                assert!(p.solution.iter().all(|&i| i < len));
                assert!(puzzle.solve(&p, &PlayerInput::from(p.solution.as_slice())));
            }
        }
    }

    #[test]
    fn display_lists_frequencies() {
        let instance = PuzzleInstance {
            difficulty: Difficulty::Hard,
            payload: HarmonicSequence {
                base_frequency: 100.0,
                frequencies: vec![100.0, 137.5, 300.0],
            },
            solution: vec![1],
        };
        let puzzle = HarmonicPatternPuzzle::default();
        let text = puzzle.display(&instance);
        assert!(text.contains("Puzzle: Harmonic Anomaly Detection"));
        assert!(text.contains("approx. 100.00 Hz"));
        assert!(text.contains("  1: 137.50 Hz"));
        assert!(puzzle.solve(&instance, &"1".into()));
        assert!(!puzzle.solve(&instance, &"0,1".into()));
    }
}
