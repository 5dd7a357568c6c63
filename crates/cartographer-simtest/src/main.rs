//! Signal Cartographer Headless Validation Harness
//!
//! Validates the shipped signal catalog, discovery rules, scan draws and
//! puzzle generators without a terminal front end.
//! Runs entirely in-process with a seeded RNG, so a failing run reproduces.
//!
//! Usage:
//!   cargo run -p cartographer-simtest
//!   cargo run -p cartographer-simtest -- --verbose --seed 7 --rounds 500
//!   cargo run -p cartographer-simtest -- --json

use std::collections::HashSet;

use cartographer_logic::catalog::{CatalogIssue, SignalCatalog};
use cartographer_logic::codec;
use cartographer_logic::discovery::{self, is_discoverable, PlayerStatus};
use cartographer_logic::puzzle::harmonic::{
    self, HarmonicPatternPuzzle, InharmonicConfig, BASE_FREQUENCIES,
};
use cartographer_logic::puzzle::{Difficulty, GeneratedPuzzle, PlayerInput, Puzzle, PuzzleKind};
use cartographer_logic::selector::{self, SelectionConfig};
use cartographer_logic::signal::{SignalArchetype, SignalTier};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const SECTOR_TYPES: &[&str] = &[
    "CIVILIAN_SECTOR",
    "LAWLESS_SECTOR",
    "BORDER_SECTOR",
    "DEEP_SPACE",
    "NEBULA_CORE",
    "ANOMALY_FIELD",
];

#[derive(Parser, Debug)]
#[command(name = "cartographer-simtest")]
#[command(version, about = "Headless validation of signal discovery and puzzles")]
struct Args {
    /// Print passing checks too, and raise the log level to debug
    #[arg(short, long)]
    verbose: bool,

    /// Base seed; every randomized section derives its RNG from it
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Iterations for randomized sweeps
    #[arg(short, long, default_value_t = 200)]
    rounds: usize,

    /// Emit results as a JSON array instead of the text report
    #[arg(long)]
    json: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail: detail.into(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    log::info!("seed {} rounds {}", args.seed, args.rounds);

    if !args.json {
        println!("=== Signal Cartographer Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Catalog load and audit
    let catalog = match SignalCatalog::builtin() {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            results.push(TestResult::new("catalog_load", false, e.to_string()));
            None
        }
    };

    if let Some(catalog) = &catalog {
        results.extend(validate_catalog(catalog, !args.json));

        // 2. Discovery sweep
        results.extend(validate_discovery(catalog, !args.json));

        // 3. Scan draws
        results.extend(validate_selector(catalog, args.seed, args.rounds, !args.json));
    }

    // 4. Puzzle generation and self-solve
    results.extend(validate_puzzles(args.seed, args.rounds, !args.json));

    // 5. Tone codec
    results.extend(validate_codec(!args.json));

    let failed = results.iter().filter(|r| !r.passed).count();

    if args.json {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("could not serialize results: {e}"),
        }
    } else {
        println!();
        let passed = results.len() - failed;
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || args.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            results.len(),
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(catalog: &SignalCatalog, announce: bool) -> Vec<TestResult> {
    if announce {
        println!("--- Signal Catalog ---");
    }
    let mut results = Vec::new();

    results.push(TestResult::new(
        "catalog_not_empty",
        !catalog.is_empty(),
        format!("{} archetypes loaded", catalog.len()),
    ));

    let rescored: Vec<_> = catalog
        .iter()
        .filter(|a| (a.complexity_inputs().score() - a.complexity_score()).abs() > 1e-9)
        .map(SignalArchetype::id)
        .collect();
    results.push(TestResult::new(
        "catalog_scores_consistent",
        rescored.is_empty(),
        if rescored.is_empty() {
            "stored complexity matches recomputation".to_string()
        } else {
            format!("score drift: {}", rescored.join(", "))
        },
    ));

    let negative = catalog.iter().filter(|a| a.complexity_score() < 0.0).count();
    results.push(TestResult::new(
        "catalog_scores_non_negative",
        negative == 0,
        format!("{negative} negative scores"),
    ));

    let tiered: usize = SignalTier::ALL.iter().map(|&t| catalog.by_tier(t).len()).sum();
    results.push(TestResult::new(
        "catalog_tiers_partition",
        tiered == catalog.len(),
        format!("{tiered} archetypes across {} tiers", SignalTier::ALL.len()),
    ));

    let with_puzzle = catalog.iter().filter(|a| a.associated_puzzle().is_some()).count();
    results.push(TestResult::new(
        "catalog_has_puzzles",
        with_puzzle > 0,
        format!("{with_puzzle} archetypes name a puzzle"),
    ));

    let issues = catalog.audit(None);
    let broken: Vec<String> = issues
        .iter()
        .filter(|issue| {
            matches!(
                issue,
                CatalogIssue::MissingUnlockTarget { .. }
                    | CatalogIssue::MissingRequiredSignal { .. }
            )
        })
        .map(ToString::to_string)
        .collect();
    results.push(TestResult::new(
        "catalog_unlock_graph",
        broken.is_empty(),
        if broken.is_empty() {
            "no broken unlocks or requirements".to_string()
        } else {
            broken.join("; ")
        },
    ));

    // Reported, never fatal.
    let gated = issues
        .iter()
        .filter(|i| matches!(i, CatalogIssue::CircularUnlock { .. }))
        .count();
    results.push(TestResult::new(
        "catalog_unlock_chains",
        true,
        format!("{gated} unlocks gated on their own source"),
    ));
    let dangling = issues
        .iter()
        .filter(|i| {
            matches!(
                i,
                CatalogIssue::MissingEvolveTarget { .. } | CatalogIssue::MissingDegradeTarget { .. }
            )
        })
        .count();
    results.push(TestResult::new(
        "catalog_transformation_targets",
        true,
        format!("{dangling} dangling evolve/degrade targets"),
    ));

    results
}

// ── 2. Discovery ────────────────────────────────────────────────────────

fn validate_discovery(catalog: &SignalCatalog, announce: bool) -> Vec<TestResult> {
    if announce {
        println!("--- Discovery ---");
    }
    let mut results = Vec::new();

    let mut event_leaks = 0;
    let mut monotonic_breaks = 0;
    let mut checked = 0;
    for sector in SECTOR_TYPES {
        for level in 0..=10u32 {
            for scanner in 0..=5u32 {
                let status = PlayerStatus::new(level, scanner).in_sector(*sector);
                let higher = PlayerStatus::new(level + 1, scanner + 1).in_sector(*sector);
                for archetype in catalog.iter() {
                    checked += 1;
                    let visible = is_discoverable(archetype, &status);
                    if visible && archetype.is_event_triggered() {
                        event_leaks += 1;
                    }
                    if visible && !is_discoverable(archetype, &higher) {
                        monotonic_breaks += 1;
                    }
                }
            }
        }
    }

    results.push(TestResult::new(
        "discovery_events_hidden",
        event_leaks == 0,
        format!("{event_leaks} event-triggered archetypes leaked in {checked} checks"),
    ));
    results.push(TestResult::new(
        "discovery_monotonic_in_level",
        monotonic_breaks == 0,
        format!("{monotonic_breaks} archetypes lost by levelling up"),
    ));

    let newcomer = PlayerStatus::new(1, 1).in_sector("CIVILIAN_SECTOR");
    let starters = discovery::discoverable(catalog, &newcomer);
    results.push(TestResult::new(
        "discovery_new_player_has_signals",
        !starters.is_empty(),
        format!(
            "{} signals at level 1: {}",
            starters.len(),
            starters.iter().map(|a| a.id()).collect::<Vec<_>>().join(", ")
        ),
    ));

    // Completing everything must never hide a signal that was visible before.
    let all_ids: Vec<&str> = catalog.iter().map(|a| a.id()).collect();
    let veteran = PlayerStatus::new(10, 5)
        .with_completed(all_ids.iter().copied())
        .in_sector("CIVILIAN_SECTOR");
    let novice = PlayerStatus::new(10, 5).in_sector("CIVILIAN_SECTOR");
    let lost = catalog
        .iter()
        .filter(|a| is_discoverable(a, &novice) && !is_discoverable(a, &veteran))
        .count();
    results.push(TestResult::new(
        "discovery_monotonic_in_progress",
        lost == 0,
        format!("{lost} archetypes lost by completing signals"),
    ));

    results
}

// ── 3. Scan draws ───────────────────────────────────────────────────────

fn qualifies_for(archetype: &SignalArchetype, location: &str) -> bool {
    let spawns = archetype.spawn_locations();
    spawns.is_empty()
        || spawns.iter().any(|l| l == location)
        || archetype.requirements().allows_random_encounter()
}

fn validate_selector(
    catalog: &SignalCatalog,
    seed: u64,
    rounds: usize,
    announce: bool,
) -> Vec<TestResult> {
    if announce {
        println!("--- Scan Draws ---");
    }
    let mut results = Vec::new();
    let config = SelectionConfig::default();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut oversized = 0;
    let mut duplicated = 0;
    let mut ineligible = 0;
    let mut misplaced = 0;
    let mut total_drawn = 0;

    for _ in 0..rounds {
        let sector = SECTOR_TYPES.choose(&mut rng).copied().unwrap_or("DEEP_SPACE");
        let status =
            PlayerStatus::new(rng.gen_range(0..=10), rng.gen_range(0..=5)).in_sector(sector);
        let count = rng.gen_range(0..=config.default_count + 2);

        let picked =
            selector::select_for_location(catalog, sector, &status, count, &config, &mut rng);
        total_drawn += picked.len();

        if picked.len() > count {
            oversized += 1;
        }
        let distinct: HashSet<_> = picked.iter().map(|a| a.id()).collect();
        if distinct.len() != picked.len() {
            duplicated += 1;
        }
        ineligible += picked.iter().filter(|a| !is_discoverable(a, &status)).count();
        misplaced += picked.iter().filter(|a| !qualifies_for(a, sector)).count();
    }

    results.push(TestResult::new(
        "selector_respects_count",
        oversized == 0,
        format!("{oversized}/{rounds} scans returned too many signals"),
    ));
    results.push(TestResult::new(
        "selector_distinct_ids",
        duplicated == 0,
        format!("{duplicated}/{rounds} scans repeated an archetype"),
    ));
    results.push(TestResult::new(
        "selector_only_discoverable",
        ineligible == 0,
        format!("{ineligible} of {total_drawn} drawn signals were not discoverable"),
    ));
    results.push(TestResult::new(
        "selector_location_qualified",
        misplaced == 0,
        format!("{misplaced} of {total_drawn} drawn signals did not qualify for the location"),
    ));

    let status = PlayerStatus::new(5, 3).in_sector("LAWLESS_SECTOR");
    let scan = |s: u64| {
        let mut rng = StdRng::seed_from_u64(s);
        selector::select_for_location(catalog, "LAWLESS_SECTOR", &status, 3, &config, &mut rng)
            .iter()
            .map(|a| a.id().to_string())
            .collect::<Vec<_>>()
    };
    let first = scan(seed);
    results.push(TestResult::new(
        "selector_deterministic",
        first == scan(seed),
        format!("seed {seed} -> [{}]", first.join(", ")),
    ));

    results
}

// ── 4. Puzzles ──────────────────────────────────────────────────────────

fn wrong_answer(puzzle: &GeneratedPuzzle) -> PlayerInput {
    match puzzle {
        GeneratedPuzzle::Audio(_) => PlayerInput::from("~"),
        GeneratedPuzzle::Pulse(p) => PlayerInput::Indices(vec![p.payload.sequence.len() as i64]),
        GeneratedPuzzle::Harmonic(p) => {
            PlayerInput::Indices(vec![p.payload.frequencies.len() as i64])
        }
    }
}

fn validate_puzzles(seed: u64, rounds: usize, announce: bool) -> Vec<TestResult> {
    if announce {
        println!("--- Puzzles ---");
    }
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));

    for kind in PuzzleKind::ALL {
        for difficulty in Difficulty::ALL {
            let mut unsolved = 0;
            let mut accepted_wrong = 0;
            let mut bad_display = 0;
            for _ in 0..rounds {
                let puzzle = GeneratedPuzzle::generate(kind, difficulty, &mut rng);
                if !puzzle.solve(&puzzle.canonical_answer()) {
                    unsolved += 1;
                }
                if puzzle.solve(&wrong_answer(&puzzle)) {
                    accepted_wrong += 1;
                }
                if !puzzle.display().contains(kind.title()) {
                    bad_display += 1;
                }
            }
            let slug = kind.title().to_lowercase().replace([' ', '-'], "_");
            let name = format!("puzzle_{slug}_{difficulty}");
            results.push(TestResult::new(
                &name,
                unsolved == 0 && accepted_wrong == 0 && bad_display == 0,
                format!(
                    "{rounds} generated, {unsolved} rejected own answer, \
                     {accepted_wrong} accepted a wrong one, {bad_display} bad displays"
                ),
            ));
        }
    }

    // Harmonic replacements should land off the grid nearly always.
    let puzzle = HarmonicPatternPuzzle::default();
    let config = InharmonicConfig::default();
    let mut total = 0;
    let mut borderline = 0;
    for _ in 0..rounds {
        let instance = puzzle.generate(Difficulty::Hard, &mut rng);
        for &i in &instance.solution {
            total += 1;
            let f = instance.payload.frequencies[i];
            if !harmonic::is_clearly_inharmonic(f, instance.payload.base_frequency, &config) {
                borderline += 1;
            }
        }
    }
    results.push(TestResult::new(
        "harmonic_replacements_clean",
        borderline * 100 <= total,
        format!("{borderline}/{total} replacements within tolerance of a harmonic"),
    ));

    let bases_ok = BASE_FREQUENCIES
        .iter()
        .all(|&b| harmonic::generate_harmonic_series(b, 10, 10, &mut rng).is_ok());
    results.push(TestResult::new(
        "harmonic_bases_valid",
        bases_ok,
        format!("{} base frequencies", BASE_FREQUENCIES.len()),
    ));

    results
}

// ── 5. Codec ────────────────────────────────────────────────────────────

fn validate_codec(announce: bool) -> Vec<TestResult> {
    if announce {
        println!("--- Tone Codec ---");
    }
    let mut results = Vec::new();

    let unmapped: Vec<char> = ('A'..='Z')
        .chain('0'..='9')
        .filter(|&c| codec::tones_for(c).is_none())
        .collect();
    results.push(TestResult::new(
        "codec_alphanumeric_coverage",
        unmapped.is_empty(),
        format!("{} unmapped symbols", unmapped.len()),
    ));

    let sample = "SIGNAL 42 CARTOGRAPHER";
    let decoded = codec::decode(&codec::encode(sample));
    results.push(TestResult::new(
        "codec_decode_inverts_encode",
        decoded == sample,
        format!("'{sample}' -> '{}' -> '{decoded}'", codec::render(sample)),
    ));

    let sos = codec::render("SOS");
    results.push(TestResult::new(
        "codec_reference_rendering",
        sos == "... --- ...",
        format!("SOS renders as '{sos}'"),
    ));

    results
}
