use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::application::commands::adherence_commands::*;
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::handlers::UpdateStreakCommandHandler;
use crate::application::services::UserSession;
use medisort_domain::adherence::{AdherenceRecord, AdherenceRepository, DailyStatusStore};
use medisort_domain::events::adherence_events::AdherenceRecorded;
use medisort_domain::events::EventBus;
use medisort_domain::shared::{Clock, DomainError};

/// Appends an adherence record, folds it into today's first-try map and
/// hands the day's outcome to the streak updater.
pub struct RecordAdherenceCommandHandler {
    adherence_repo: Arc<dyn AdherenceRepository>,
    daily_status: Arc<dyn DailyStatusStore>,
    update_streak: Arc<UpdateStreakCommandHandler>,
    session: Arc<UserSession>,
    clock: Arc<dyn Clock>,
    event_bus: Arc<dyn EventBus>,
}

impl RecordAdherenceCommandHandler {
    pub fn new(
        adherence_repo: Arc<dyn AdherenceRepository>,
        daily_status: Arc<dyn DailyStatusStore>,
        update_streak: Arc<UpdateStreakCommandHandler>,
        session: Arc<UserSession>,
        clock: Arc<dyn Clock>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            adherence_repo,
            daily_status,
            update_streak,
            session,
            clock,
            event_bus,
        }
    }
}

#[async_trait]
impl CommandHandler<RecordAdherenceCommand> for RecordAdherenceCommandHandler {
    type Result = RecordAdherenceResult;

    async fn handle(&self, cmd: RecordAdherenceCommand) -> Result<Self::Result, DomainError> {
        let user_id = self.session.require_user().await?;
        let now = self.clock.now();
        let today = now.date_naive();

        info!(
            "Recording {} for reminder {} (medication {}) user {}",
            cmd.status, cmd.reminder_id, cmd.medication_id, user_id
        );

        // 1. Append the record
        let record = AdherenceRecord::new(
            cmd.reminder_id.clone(),
            cmd.medication_id,
            cmd.medication_name,
            user_id.clone(),
            cmd.status,
            cmd.scheduled_for,
            now.with_timezone(&Utc),
        )?;
        self.adherence_repo.save(&record).await?;

        self.event_bus
            .publish(Box::new(AdherenceRecorded {
                adherence_id: record.id().clone(),
                user_id: user_id.clone(),
                reminder_id: record.reminder_id().clone(),
                medication_id: record.medication_id().clone(),
                status: record.status(),
                occurred_at: Utc::now(),
            }))
            .await?;

        // 2. Fold into today's first-try map
        let summary = self
            .daily_status
            .apply(&user_id, today, &cmd.reminder_id, cmd.status)
            .await?;

        // 3. Streak
        let UpdateStreakResult { streak, transition } = self
            .update_streak
            .handle(UpdateStreakCommand {
                user_id: user_id.clone(),
                all_on_time: summary.all_on_time(),
                today,
            })
            .await?;

        Ok(RecordAdherenceResult {
            adherence_id: record.id().clone(),
            user_id,
            day: today,
            summary,
            streak,
            transition,
        })
    }
}
