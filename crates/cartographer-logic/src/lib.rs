//! Signal discovery and puzzle verification for Signal Cartographer.
//!
//! This crate holds the game's algorithmic core, independent of any terminal
//! front end or save format. Functions take plain data (a catalog, a player
//! status snapshot, a caller-owned RNG) and return results, so every rule is
//! unit-testable and a fixed seed reproduces a scan or a puzzle exactly.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`signal`] | Signal archetype definitions, validation, complexity scoring |
//! | [`catalog`] | Immutable archetype catalog, lookups, relationship audit |
//! | [`discovery`] | Player status snapshot and the discoverability predicate |
//! | [`selector`] | Rarity-weighted scan draws for a location |
//! | [`codec`] | Fixed tone table behind the transcription puzzle |
//! | [`puzzle`] | Pulse, harmonic and audio puzzles on one generate/solve contract |
//!
//! ```
//! use cartographer_logic::{
//!     select_for_location, Difficulty, GeneratedPuzzle, PlayerStatus, SelectionConfig,
//!     SignalCatalog,
//! };
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let catalog = SignalCatalog::builtin().unwrap();
//! let status = PlayerStatus::new(5, 2).in_sector("LAWLESS_SECTOR");
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let found = select_for_location(
//!     &catalog, "LAWLESS_SECTOR", &status, 3, &SelectionConfig::default(), &mut rng,
//! );
//! assert!(!found.is_empty());
//!
//! for signal in found {
//!     if let Some(kind) = signal.associated_puzzle() {
//!         let difficulty = Difficulty::for_tier(signal.tier());
//!         let puzzle = GeneratedPuzzle::generate(kind, difficulty, &mut rng);
//!         assert!(puzzle.solve(&puzzle.canonical_answer()));
//!     }
//! }
//! ```

pub mod catalog;
pub mod codec;
pub mod discovery;
pub mod puzzle;
pub mod selector;
pub mod signal;

pub use catalog::{CatalogError, CatalogIssue, SignalCatalog};
pub use discovery::{is_discoverable, PlayerStatus};
pub use puzzle::{Difficulty, GeneratedPuzzle, PlayerInput, Puzzle, PuzzleKind};
pub use selector::{select_for_location, SelectionConfig};
pub use signal::{ArchetypeDef, ArchetypeFault, SignalArchetype, SignalCategory, SignalTier};
