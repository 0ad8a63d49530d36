use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use medisort_lib::application::config::AppConfig;
use medisort_lib::presentation::ipc::{dispatch, error_reply, parse_line};
use medisort_lib::presentation::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    match medisort_infrastructure::logging::init_logger(config.log_dir.clone()) {
        Ok(_) => {
            tracing::info!("MediSort starting...");
            tracing::info!("File logging initialized at: {}", config.log_dir.display());
        }
        Err(e) => {
            eprintln!("Failed to initialize file logging: {}", e);
            eprintln!("Falling back to console logging only");

            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .with_target(true)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }

    let state = AppState::new(&config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize app state")?;
    tracing::info!("App state initialized");

    if let Some(user) = config.user_id.clone() {
        state
            .switch_user(Some(user))
            .await
            .context("Failed to activate configured user")?;
    }

    let mut streak_rx = state.streak_updates();
    let streak_watcher = tokio::spawn(async move {
        while streak_rx.changed().await.is_ok() {
            if let Some(streak) = streak_rx.borrow_and_update().clone() {
                tracing::info!(
                    "Streak for {}: current {}, longest {}",
                    streak.user_id,
                    streak.current_streak,
                    streak.longest_streak
                );
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    tracing::info!("Input closed");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let reply = match parse_line(line) {
                    Ok(request) => match dispatch(&state, request).await {
                        Ok(Some(value)) => Some(value.to_string()),
                        Ok(None) => None,
                        Err(e) => {
                            tracing::warn!("Request failed: {}", e);
                            Some(error_reply(&e))
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Unreadable request: {}", e);
                        Some(error_reply(&e))
                    }
                };

                if let Some(reply) = reply {
                    stdout.write_all(reply.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
            }
        }
    }

    state.shutdown().await;
    streak_watcher.abort();
    Ok(())
}
