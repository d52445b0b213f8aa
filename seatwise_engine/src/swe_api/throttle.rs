use std::fmt::Debug;

use log::*;

use crate::{
    db_types::AccountStatus,
    queues::{QueueConsumer, SpamSignal},
    traits::{AccountManagement, StorageError, ThrottleResult},
};

pub const DEFAULT_SPAM_THRESHOLD: i64 = 3;

/// `AbuseThrottle` counts suspicious-activity signals per account and blacklists accounts that reach the threshold.
///
/// Counters only ever go up, and the throttle never lifts a blacklisting.
pub struct AbuseThrottle<B> {
    db: B,
    signals: QueueConsumer<SpamSignal>,
    threshold: i64,
}

impl<B> Debug for AbuseThrottle<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AbuseThrottle(threshold: {})", self.threshold)
    }
}

impl<B: AccountManagement> AbuseThrottle<B> {
    pub fn new(db: B, signals: QueueConsumer<SpamSignal>) -> Self {
        Self { db, signals, threshold: DEFAULT_SPAM_THRESHOLD }
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold.max(1);
        self
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Processes every signal currently in the queue.
    pub async fn drain(&mut self) -> ThrottleResult {
        let mut result = ThrottleResult::default();
        while let Some(signal) = self.signals.pop() {
            match process(&self.db, self.threshold, &signal).await {
                Ok(blacklisted) => {
                    result.processed += 1;
                    if blacklisted {
                        result.blacklisted.push(signal.account_id);
                    }
                },
                Err(e) => {
                    warn!("🚫️ Could not process spam signal for account {}. {e}", signal.account_id);
                    result.failed += 1;
                },
            }
        }
        result
    }
}

/// Returns true if this signal tipped the account over the threshold.
async fn process<B: AccountManagement>(db: &B, threshold: i64, signal: &SpamSignal) -> Result<bool, StorageError> {
    let counter = db.increment_spam_counter(signal.account_id).await?;
    trace!("🚫️ Account {} has {} strikes ({:?})", signal.account_id, counter.count, signal.reason);
    if counter.count < threshold {
        return Ok(false);
    }
    let account = db.fetch_account(signal.account_id).await?.ok_or(StorageError::AccountNotFound(signal.account_id))?;
    if account.status == AccountStatus::Blacklisted {
        return Ok(false);
    }
    db.set_account_status(account.id, AccountStatus::Blacklisted).await?;
    warn!("🚫️ Account {} ({}) was blacklisted after {} strikes", account.id, account.username, counter.count);
    Ok(true)
}
