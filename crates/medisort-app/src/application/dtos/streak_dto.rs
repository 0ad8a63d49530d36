use serde::{Deserialize, Serialize};

use medisort_domain::streak::UserStreak;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakDto {
    pub user_id: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_adherence_date: Option<String>, // YYYY-MM-DD
    pub streak_start_date: Option<String>,   // YYYY-MM-DD
}

impl From<&UserStreak> for StreakDto {
    fn from(streak: &UserStreak) -> Self {
        Self {
            user_id: streak.user_id().to_string(),
            current_streak: streak.current_streak(),
            longest_streak: streak.longest_streak(),
            last_adherence_date: streak
                .last_adherence_date()
                .map(|d| d.format("%Y-%m-%d").to_string()),
            streak_start_date: streak
                .streak_start_date()
                .map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}
