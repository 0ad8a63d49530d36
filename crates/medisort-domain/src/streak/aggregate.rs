use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::{DomainError, UserId};

/// How a day's result moves the streak counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakTransition {
    /// Not every reminder was taken on time: counter drops to 0
    Reset,
    /// Already credited today: counter unchanged
    Hold,
    /// Continues from yesterday: counter + 1
    Increment,
    /// First day after a gap (or ever): counter starts over at 1
    Restart,
}

impl StreakTransition {
    pub fn classify(last_adherence_date: Option<NaiveDate>, today: NaiveDate, all_on_time: bool) -> Self {
        if !all_on_time {
            return StreakTransition::Reset;
        }

        match last_adherence_date {
            Some(last) if last == today => StreakTransition::Hold,
            Some(last) if today.pred_opt() == Some(last) => StreakTransition::Increment,
            _ => StreakTransition::Restart,
        }
    }
}

/// UserStreak aggregate root. One per user.
///
/// Invariant: `longest_streak >= current_streak`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStreak {
    user_id: UserId,
    current_streak: u32,
    longest_streak: u32,
    last_adherence_date: Option<NaiveDate>,
    streak_start_date: Option<NaiveDate>,
}

impl UserStreak {
    /// Zero streak for a user without a stored document
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            current_streak: 0,
            longest_streak: 0,
            last_adherence_date: None,
            streak_start_date: None,
        }
    }

    /// Reconstruct from persistence
    pub fn restore(
        user_id: UserId,
        current_streak: u32,
        longest_streak: u32,
        last_adherence_date: Option<NaiveDate>,
        streak_start_date: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        if longest_streak < current_streak {
            return Err(DomainError::DataIntegrity(format!(
                "Streak for user {} has longest {} below current {}",
                user_id, longest_streak, current_streak
            )));
        }

        Ok(Self {
            user_id,
            current_streak,
            longest_streak,
            last_adherence_date,
            streak_start_date,
        })
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    pub fn last_adherence_date(&self) -> Option<NaiveDate> {
        self.last_adherence_date
    }

    pub fn streak_start_date(&self) -> Option<NaiveDate> {
        self.streak_start_date
    }

    /// Fold today's result into the counter.
    pub fn advance(&self, all_on_time: bool, today: NaiveDate) -> (Self, StreakTransition) {
        let transition = StreakTransition::classify(self.last_adherence_date, today, all_on_time);

        let new_streak = match transition {
            StreakTransition::Reset => 0,
            StreakTransition::Hold => self.current_streak,
            StreakTransition::Increment => self.current_streak.saturating_add(1),
            StreakTransition::Restart => 1,
        };

        let updated = Self {
            user_id: self.user_id.clone(),
            current_streak: new_streak,
            longest_streak: self.longest_streak.max(new_streak),
            last_adherence_date: Some(today),
            streak_start_date: if new_streak == 1 {
                Some(today)
            } else {
                self.streak_start_date
            },
        };

        (updated, transition)
    }
}
