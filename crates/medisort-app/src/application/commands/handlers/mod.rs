mod record_adherence_handler;
mod update_streak_handler;


pub use record_adherence_handler::RecordAdherenceCommandHandler;
pub use update_streak_handler::UpdateStreakCommandHandler;
