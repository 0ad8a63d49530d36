use log::{error, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::application::commands::adherence_commands::{
    RecordAdherenceCommand, RecordAdherenceResult,
};
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::handlers::RecordAdherenceCommandHandler;
use crate::application::services::UserSession;
use medisort_domain::adherence::{
    AdherenceReport, AdherenceRepository, DailyReminderStatus, DailyStatusStore,
};
use medisort_domain::shared::{day_bounds, Clock, DomainError, UserId};

/// Best-effort entry points around the recorder plus the daily-status
/// lifecycle tied to the signed-in user.
pub struct AdherenceService {
    record_handler: Arc<RecordAdherenceCommandHandler>,
    adherence_repo: Arc<dyn AdherenceRepository>,
    daily_status: Arc<dyn DailyStatusStore>,
    session: Arc<UserSession>,
    clock: Arc<dyn Clock>,
}

impl AdherenceService {
    pub fn new(
        record_handler: Arc<RecordAdherenceCommandHandler>,
        adherence_repo: Arc<dyn AdherenceRepository>,
        daily_status: Arc<dyn DailyStatusStore>,
        session: Arc<UserSession>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            record_handler,
            adherence_repo,
            daily_status,
            session,
            clock,
        }
    }

    /// Record on a background task; the caller never waits.
    pub fn record_adherence(self: &Arc<Self>, report: AdherenceReport) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.record_adherence_best_effort(report).await;
        })
    }

    /// Record and log the outcome. Failures are logged and dropped, never
    /// retried.
    pub async fn record_adherence_best_effort(
        &self,
        report: AdherenceReport,
    ) -> Option<RecordAdherenceResult> {
        let reminder_id = report.reminder_id.clone();
        match self
            .record_handler
            .handle(RecordAdherenceCommand::from(report))
            .await
        {
            Ok(result) => {
                info!(
                    "Adherence recorded for reminder {}: streak {} ({:?})",
                    reminder_id,
                    result.streak.current_streak(),
                    result.transition
                );
                Some(result)
            }
            Err(e @ DomainError::Unauthenticated(_)) => {
                warn!("Adherence for reminder {} dropped: {}", reminder_id, e);
                None
            }
            Err(e) => {
                error!(
                    "Failed to record adherence for reminder {}: {}",
                    reminder_id,
                    e.format_with_code()
                );
                None
            }
        }
    }

    /// Switch the active user. The previous user's daily maps are dropped and
    /// the new user's map for today is rebuilt from stored records.
    pub async fn switch_user(&self, user: Option<UserId>) -> Result<(), DomainError> {
        let previous = self.session.set(user.clone()).await;

        if let Some(previous) = previous {
            if Some(&previous) != user.as_ref() {
                self.daily_status.clear_user(&previous).await?;
            }
        }

        match user {
            Some(user) => {
                let status = self.rebuild_daily_status(&user).await?;
                info!(
                    "Active user is now {} ({} reminders tracked today)",
                    user,
                    status.summary().tracked
                );
            }
            None => info!("Signed out; adherence recording paused"),
        }
        Ok(())
    }

    /// Replay today's records into the daily-status store
    pub async fn rebuild_daily_status(
        &self,
        user: &UserId,
    ) -> Result<DailyReminderStatus, DomainError> {
        let today = self.clock.today();
        let (start, end) = day_bounds(today, self.clock.offset());

        let records = self
            .adherence_repo
            .find_by_user_in_range(user, start, end)
            .await?;
        let status = DailyReminderStatus::replay(&records);

        self.daily_status.evict_before(today).await?;
        self.daily_status
            .replace(user, today, status.clone())
            .await?;

        Ok(status)
    }
}
