use std::time::Duration;

use log::*;
use seatwise_engine::{ExpiryReconciler, SqliteDatabase};
use tokio::task::JoinHandle;

use crate::integrations::HttpGatewayClient;

/// Starts the auto-expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_expiry_worker(
    reconciler: ExpiryReconciler<SqliteDatabase, HttpGatewayClient>,
    period: Duration,
) -> JoinHandle<()> {
    let period = period.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        info!("🕰️ Pending booking expiry worker started. Sweeping every {}s", period.as_secs());
        loop {
            timer.tick().await;
            debug!("🕰️ Running pending booking sweep");
            match reconciler.run_sweep().await {
                Ok(result) => {
                    info!("🕰️ {} pending bookings resolved", result.confirmed_count() + result.canceled_count());
                    debug!("🕰️ {} confirmed: {}", result.confirmed_count(), id_list(&result.confirmed));
                    debug!("🕰️ {} canceled: {}", result.canceled_count(), id_list(&result.canceled));
                    if result.failed_count() > 0 {
                        let failed = id_list(&result.failed);
                        warn!("🕰️ {} bookings could not be resolved: {failed}", result.failed_count());
                    }
                },
                Err(e) => {
                    error!("🕰️ Error running pending booking sweep: {e}");
                },
            }
        }
    })
}

fn id_list(ids: &[i64]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<String>>().join(", ")
}
