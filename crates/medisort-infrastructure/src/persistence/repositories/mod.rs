pub mod adherence_repo;
pub mod reminder_repo;
pub mod streak_repo;

pub use adherence_repo::SqliteAdherenceRepository;
pub use reminder_repo::SqliteReminderRepository;
pub use streak_repo::SqliteStreakRepository;
