pub mod streak_preference_repo;
pub mod streak_repo;
pub mod xp_ledger_repo;

pub use streak_preference_repo::SqliteStreakPreferenceRepository;
pub use streak_repo::SqliteStreakRepository;
pub use xp_ledger_repo::SqliteXpLedger;
