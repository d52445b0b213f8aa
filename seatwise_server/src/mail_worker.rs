use std::time::Duration;

use log::*;
use seatwise_engine::NotificationRelay;
use tokio::task::JoinHandle;

use crate::integrations::MailBackend;

/// Starts the mail relay worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_mail_worker(mut relay: NotificationRelay<MailBackend>, period: Duration) -> JoinHandle<()> {
    let period = period.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        info!("📬️ Mail relay worker started");
        loop {
            timer.tick().await;
            let result = relay.drain().await;
            if result.sent + result.failed > 0 {
                debug!("📬️ {} messages sent, {} failed", result.sent, result.failed);
            }
        }
    })
}
