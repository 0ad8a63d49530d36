use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::commands::handlers::{
    RecordAdherenceCommandHandler, UpdateStreakCommandHandler,
};
use crate::application::config::AppConfig;
use crate::application::dtos::StreakDto;
use crate::application::event_handlers::StreakSnapshotHandler;
use crate::application::queries::AdherenceQueries;
use crate::application::services::{
    AdherenceService, BroadcastSender, ReminderActionHandler, ReminderScheduler, UserSession,
};
use medisort_domain::adherence::{AdherenceRepository, DailyStatusStore};
use medisort_domain::reminder::ReminderRepository;
use medisort_domain::shared::{Clock, DomainError, UserId};
use medisort_domain::streak::StreakRepository;
use medisort_infrastructure::events::InMemoryEventBus;
use medisort_infrastructure::persistence::Database;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Command handlers container
pub struct CommandHandlers {
    pub record_adherence: Arc<RecordAdherenceCommandHandler>,
    pub update_streak: Arc<UpdateStreakCommandHandler>,
}

pub struct Runtime {
    pub pool: Arc<SqlitePool>,
    pub db: Arc<Database>,
    pub event_bus: Arc<InMemoryEventBus>,
    pub clock: Arc<dyn Clock>,
    /// Sending side of the adherence broadcast bridge
    pub bridge: BroadcastSender,
    pub bridge_task: JoinHandle<()>,
}

pub struct Repositories {
    pub adherence: Arc<dyn AdherenceRepository>,
    pub streak: Arc<dyn StreakRepository>,
    pub reminder: Arc<dyn ReminderRepository>,
    pub daily_status: Arc<dyn DailyStatusStore>,
}

pub struct Services {
    pub session: Arc<UserSession>,
    pub adherence: Arc<AdherenceService>,
    pub reminder_actions: Arc<ReminderActionHandler>,
    pub scheduler: Arc<ReminderScheduler>,
    pub streak_snapshot: StreakSnapshotHandler,
}

pub struct Queries {
    pub adherence: Arc<AdherenceQueries>,
}

pub struct AppState {
    pub runtime: Runtime,
    pub repositories: Repositories,
    pub services: Services,
    pub queries: Queries,
    pub command_handlers: CommandHandlers,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        crate::presentation::bootstrap::build_app_state(config).await
    }

    /// Make `user` the active user: rebuild today's status, reschedule their
    /// reminders and reseed the streak snapshot.
    pub async fn switch_user(&self, user: Option<UserId>) -> Result<(), DomainError> {
        self.services.adherence.switch_user(user.clone()).await?;
        self.services.reminder_actions.cancel_all().await;

        match user {
            Some(user) => {
                let scheduled = self
                    .services
                    .scheduler
                    .reload_for_user(self.repositories.reminder.clone(), &user)
                    .await?;
                let streak = self.queries.adherence.streak(&user).await?;
                info!(
                    "User {} active: {} reminders scheduled, streak {}",
                    user, scheduled, streak.current_streak
                );
                self.services.streak_snapshot.reset(Some(streak));
            }
            None => {
                self.services.scheduler.unschedule_all().await;
                self.services.streak_snapshot.reset(None);
            }
        }
        Ok(())
    }

    pub fn streak_updates(&self) -> watch::Receiver<Option<StreakDto>> {
        self.services.streak_snapshot.subscribe()
    }

    /// Stop background work. Queued broadcasts get a short grace period to
    /// drain once every sender is gone.
    pub async fn shutdown(self) {
        info!("Shutting down");
        self.services.scheduler.unschedule_all().await;
        self.services.reminder_actions.cancel_all().await;

        let Runtime {
            bridge,
            bridge_task,
            ..
        } = self.runtime;
        drop(bridge);
        drop(self.services);
        match tokio::time::timeout(SHUTDOWN_GRACE, bridge_task).await {
            Ok(Ok(())) => info!("Adherence bridge drained"),
            Ok(Err(e)) => warn!("Adherence bridge task ended abnormally: {}", e),
            Err(_) => warn!("Adherence bridge still busy after shutdown grace period"),
        }
    }
}
