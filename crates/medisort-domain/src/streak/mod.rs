mod aggregate;
mod repository;


pub use aggregate::{StreakTransition, UserStreak};
pub use repository::{StreakMutation, StreakRepository};
