use std::time::Duration;

use log::*;
use seatwise_engine::{AbuseThrottle, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the abuse throttle worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_throttle_worker(mut throttle: AbuseThrottle<SqliteDatabase>, period: Duration) -> JoinHandle<()> {
    let period = period.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        info!("🚫️ Abuse throttle worker started. Threshold: {} strikes", throttle.threshold());
        loop {
            timer.tick().await;
            let result = throttle.drain().await;
            if result.processed + result.failed > 0 {
                debug!("🚫️ Processed {} spam signals. {} failed", result.processed, result.failed);
            }
            if !result.blacklisted.is_empty() {
                info!("🚫️ Blacklisted accounts: {:?}", result.blacklisted);
            }
        }
    })
}
