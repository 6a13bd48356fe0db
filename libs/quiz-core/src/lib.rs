//! Core engine shared by the backend: question supply and player progress.
//!
//! Provides:
//! - Bilingual question normalization into one canonical shape
//! - Content hashing for deduplication and storage keys
//! - Type-balanced, deduplicated batch selection
//! - The progress ledger: XP, streaks, time-gated lives, shop upgrades

pub mod batch;
pub mod hash;
pub mod lives;
pub mod normalize;
pub mod shop;
pub mod streak;
pub mod types;

pub use batch::build_batch;
pub use hash::content_hash;
pub use normalize::normalize;
pub use shop::PurchaseError;
pub use streak::local_date;
pub use types::{
    Category, Level, MatchingQuestion, MultipleQuestion, Preferences, Progress, Question,
    QuestionKind,
};
