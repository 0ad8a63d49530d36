use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::commands::handlers::{
    RecordAdherenceCommandHandler, UpdateStreakCommandHandler,
};
use crate::application::config::AppConfig;
use crate::application::event_handlers::StreakSnapshotHandler;
use crate::application::queries::AdherenceQueries;
use crate::application::services::{
    AdherenceBroadcastReceiver, AdherenceService, ReminderActionHandler, ReminderScheduler,
    UserSession,
};
use crate::presentation::state::{
    AppState, CommandHandlers, Queries, Repositories, Runtime, Services,
};
use medisort_domain::adherence::{AdherenceRepository, DailyStatusStore};
use medisort_domain::events::adherence_events::StreakUpdated;
use medisort_domain::events::{EventBus, TypedEventHandlerWrapper};
use medisort_domain::reminder::{ReminderNotifier, ReminderRepository};
use medisort_domain::shared::{Clock, SystemClock};
use medisort_domain::streak::StreakRepository;
use medisort_infrastructure::daily_status::InMemoryDailyStatusStore;
use medisort_infrastructure::events::InMemoryEventBus;
use medisort_infrastructure::notification::LogReminderNotifier;
use medisort_infrastructure::persistence::{
    repositories::{SqliteAdherenceRepository, SqliteReminderRepository, SqliteStreakRepository},
    Database,
};

type BootstrapError = Box<dyn std::error::Error + Send + Sync>;

pub async fn build_app_state(config: &AppConfig) -> Result<AppState, BootstrapError> {
    build_app_state_with(
        config,
        Arc::new(SystemClock),
        Arc::new(LogReminderNotifier::new()),
    )
    .await
}

/// Wire the application around an explicit clock and notifier
pub async fn build_app_state_with(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn ReminderNotifier>,
) -> Result<AppState, BootstrapError> {
    let startup_started_at = Instant::now();

    std::fs::create_dir_all(&config.data_dir)
        .map_err(|e| format!("Failed to create data directory: {}", e))?;

    let db_path = config.database_path();
    let db_path_str = db_path.to_str().ok_or("Invalid database path")?;
    info!("Database path: {}", db_path_str);

    let started_at = Instant::now();
    let database = Database::with_config(db_path_str, &config.store).await?;
    database.run_migrations().await?;
    info!(
        "Database ready, migrations applied ({}ms)",
        started_at.elapsed().as_millis()
    );

    let pool = Arc::new(database.pool().clone());

    let adherence_repo =
        Arc::new(SqliteAdherenceRepository::new(pool.clone())) as Arc<dyn AdherenceRepository>;
    let streak_repo =
        Arc::new(SqliteStreakRepository::new(pool.clone())) as Arc<dyn StreakRepository>;
    let reminder_repo =
        Arc::new(SqliteReminderRepository::new(pool.clone())) as Arc<dyn ReminderRepository>;
    let daily_status = Arc::new(InMemoryDailyStatusStore::new()) as Arc<dyn DailyStatusStore>;

    let session = Arc::new(UserSession::new(None));

    let event_bus = Arc::new(InMemoryEventBus::new());
    let streak_snapshot = StreakSnapshotHandler::new(session.clone());
    event_bus
        .subscribe::<StreakUpdated>(Arc::new(
            TypedEventHandlerWrapper::<StreakUpdated, _>::new(streak_snapshot.clone()),
        ))
        .await?;
    let bus = event_bus.clone() as Arc<dyn EventBus>;
    info!("Event bus initialized and handlers registered");

    let update_streak = Arc::new(UpdateStreakCommandHandler::new(
        streak_repo.clone(),
        bus.clone(),
    ));
    let record_adherence = Arc::new(RecordAdherenceCommandHandler::new(
        adherence_repo.clone(),
        daily_status.clone(),
        update_streak.clone(),
        session.clone(),
        clock.clone(),
        bus,
    ));

    let adherence_service = Arc::new(AdherenceService::new(
        record_adherence.clone(),
        adherence_repo.clone(),
        daily_status.clone(),
        session.clone(),
        clock.clone(),
    ));
    let (bridge, bridge_task) =
        AdherenceBroadcastReceiver::spawn(adherence_service.clone(), config.broadcast_capacity);

    let reminder_actions = Arc::new(ReminderActionHandler::new(
        bridge.clone(),
        notifier.clone(),
        session.clone(),
        config.snooze_delay,
    ));
    let scheduler = Arc::new(ReminderScheduler::new(notifier, clock.clone()));

    let adherence_queries = Arc::new(AdherenceQueries::new(
        adherence_repo.clone(),
        streak_repo.clone(),
        clock.clone(),
    ));

    info!(
        "AppState ready ({}ms)",
        startup_started_at.elapsed().as_millis()
    );

    Ok(AppState {
        runtime: Runtime {
            pool,
            db: Arc::new(database),
            event_bus,
            clock,
            bridge,
            bridge_task,
        },
        repositories: Repositories {
            adherence: adherence_repo,
            streak: streak_repo,
            reminder: reminder_repo,
            daily_status,
        },
        services: Services {
            session,
            adherence: adherence_service,
            reminder_actions,
            scheduler,
            streak_snapshot,
        },
        queries: Queries {
            adherence: adherence_queries,
        },
        command_handlers: CommandHandlers {
            record_adherence,
            update_streak,
        },
    })
}
