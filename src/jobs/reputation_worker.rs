// ==================== REPUTATION OUTBOX WORKER ====================
// Applies pending reputation events to user documents. Handlers only
// append to the outbox; this worker is the single writer of the
// `reputation` counter.

use crate::{database::MongoDB, services::reputation_service};
use tokio::time::{interval, Duration};

const POLL_INTERVAL_SECS: u64 = 5;

/// Spawns the background consumer. Runs once immediately so awards
/// enqueued before a restart are not delayed a full poll interval.
pub async fn start_reputation_worker(db: MongoDB) {
    log::info!(
        "Starting reputation outbox worker (polls every {}s)",
        POLL_INTERVAL_SECS
    );

    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(POLL_INTERVAL_SECS));

        loop {
            interval.tick().await;

            match reputation_service::apply_pending(&db).await {
                Ok(report) if report.pending > 0 => {
                    log::info!(
                        "Reputation outbox: {} pending, {} applied, {} failed",
                        report.pending,
                        report.applied,
                        report.failed
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("Reputation outbox pass failed: {}", e);
                }
            }
        }
    });

    log::info!("Reputation outbox worker started");
}
