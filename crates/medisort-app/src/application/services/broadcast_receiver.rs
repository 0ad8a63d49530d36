use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::services::AdherenceService;
use medisort_domain::adherence::AdherenceBroadcast;
use medisort_domain::shared::DomainError;

/// Sending half of the adherence broadcast bridge. Never blocks.
#[derive(Clone)]
pub struct BroadcastSender {
    tx: mpsc::Sender<AdherenceBroadcast>,
}

impl BroadcastSender {
    /// Bounded bridge; the receiver is handed to whoever drains it
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AdherenceBroadcast>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn send(&self, broadcast: AdherenceBroadcast) -> Result<(), DomainError> {
        self.tx.try_send(broadcast).map_err(|e| match e {
            mpsc::error::TrySendError::Full(b) => DomainError::Infrastructure(format!(
                "Adherence bridge is full, dropped broadcast for reminder {}",
                b.reminder_id
            )),
            mpsc::error::TrySendError::Closed(b) => DomainError::Infrastructure(format!(
                "Adherence bridge is closed, dropped broadcast for reminder {}",
                b.reminder_id
            )),
        })
    }
}

/// Receiving side of the bridge: decodes broadcasts and records them one at
/// a time, in arrival order.
pub struct AdherenceBroadcastReceiver;

impl AdherenceBroadcastReceiver {
    pub fn spawn(
        service: Arc<AdherenceService>,
        capacity: usize,
    ) -> (BroadcastSender, JoinHandle<()>) {
        let (sender, mut rx) = BroadcastSender::channel(capacity);

        let handle = tokio::spawn(async move {
            while let Some(broadcast) = rx.recv().await {
                debug!("Received adherence broadcast: {:?}", broadcast);
                match broadcast.into_report() {
                    Ok(report) => {
                        service.record_adherence_best_effort(report).await;
                    }
                    Err(e) => warn!("Dropping adherence broadcast: {}", e),
                }
            }
            debug!("Adherence bridge closed");
        });

        (sender, handle)
    }
}
