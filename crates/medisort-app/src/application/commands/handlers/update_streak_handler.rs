use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::application::commands::adherence_commands::*;
use crate::application::commands::command_handler::CommandHandler;
use medisort_domain::events::adherence_events::StreakUpdated;
use medisort_domain::events::EventBus;
use medisort_domain::shared::DomainError;
use medisort_domain::streak::{StreakRepository, UserStreak};

/// Read-modify-write of the user's streak inside a store transaction
pub struct UpdateStreakCommandHandler {
    streak_repo: Arc<dyn StreakRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl UpdateStreakCommandHandler {
    pub fn new(streak_repo: Arc<dyn StreakRepository>, event_bus: Arc<dyn EventBus>) -> Self {
        Self {
            streak_repo,
            event_bus,
        }
    }
}

#[async_trait]
impl CommandHandler<UpdateStreakCommand> for UpdateStreakCommandHandler {
    type Result = UpdateStreakResult;

    async fn handle(&self, cmd: UpdateStreakCommand) -> Result<Self::Result, DomainError> {
        let UpdateStreakCommand {
            user_id,
            all_on_time,
            today,
        } = cmd;

        let (transition_tx, transition_rx) = oneshot::channel();
        let streak = self
            .streak_repo
            .update_atomically(
                &user_id,
                Box::new(move |current: UserStreak| {
                    let (next, transition) = current.advance(all_on_time, today);
                    let _ = transition_tx.send(transition);
                    next
                }),
            )
            .await?;

        let transition = transition_rx.await.map_err(|_| {
            DomainError::Infrastructure(format!(
                "Streak store for {} committed without applying the update",
                user_id
            ))
        })?;

        info!(
            "Streak for {} on {}: {:?} -> current={} longest={}",
            user_id,
            today,
            transition,
            streak.current_streak(),
            streak.longest_streak()
        );

        self.event_bus
            .publish(Box::new(StreakUpdated {
                user_id,
                current_streak: streak.current_streak(),
                longest_streak: streak.longest_streak(),
                last_adherence_date: today,
                streak_start_date: streak.streak_start_date(),
                transition,
                occurred_at: Utc::now(),
            }))
            .await?;

        Ok(UpdateStreakResult { streak, transition })
    }
}
