//! Background retention for long-running hosts.
//!
//! The aggregator never prunes on its own. Hosts that want periodic pruning
//! spawn this task next to their server loop and abort the handle on
//! shutdown.

use crate::analytics::ChatAnalytics;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest pause between retention passes.
pub const MIN_RETENTION_INTERVAL: Duration = Duration::from_millis(1);

/// Run [`ChatAnalytics::clean_old_data`] every `every`, starting after the
/// first full interval. Intervals shorter than [`MIN_RETENTION_INTERVAL`],
/// including zero, are raised to it.
///
/// Must be called from within a tokio runtime.
pub fn spawn_retention_task(
    analytics: Arc<ChatAnalytics>,
    every: Duration,
    days_to_keep: u32,
) -> JoinHandle<()> {
    let every = every.max(MIN_RETENTION_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let report = analytics.clean_old_data(days_to_keep);
            tracing::debug!(
                buckets_removed = report.buckets_removed,
                feedback_removed = report.feedback_removed,
                "Retention pass finished"
            );
        }
    })
}
