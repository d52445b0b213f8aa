//! The auto-expiry reconciler.
//!
//! Every sweep walks the `PENDING` bookings and resolves each one against the state of its payment. A booking is
//! resolved at most once: after a sweep it is either `BOOKED`, `CANCELED` or still pending behind a payment that
//! could not be processed, so running the sweep twice is harmless.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Booking, PaymentStatus},
    queues::{MailMessage, QueueProducer, SpamReason, SpamSignal},
    swe_api::notifications::payment_receipt,
    traits::{
        AccountManagement,
        ExpiryResult,
        GatewayClient,
        GatewayOutcome,
        PaymentManagement,
        ShowCatalog,
        StorageError,
    },
};

enum Resolution {
    Confirmed,
    Canceled,
    /// Somebody else resolved the booking while the sweep was looking at it.
    Unchanged,
}

pub struct ExpiryReconciler<B, G> {
    db: B,
    gateway: G,
    mail: QueueProducer<MailMessage>,
    spam: QueueProducer<SpamSignal>,
    hold_timeout_secs: Option<i64>,
}

impl<B, G> Debug for ExpiryReconciler<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExpiryReconciler(hold timeout: {:?})", self.hold_timeout_secs)
    }
}

impl<B, G> ExpiryReconciler<B, G>
where
    B: PaymentManagement + AccountManagement + ShowCatalog,
    G: GatewayClient,
{
    pub fn new(db: B, gateway: G, mail: QueueProducer<MailMessage>, spam: QueueProducer<SpamSignal>) -> Self {
        Self { db, gateway, mail, spam, hold_timeout_secs: None }
    }

    /// Only bookings that have been pending for at least this many seconds are swept. Zero sweeps everything.
    pub fn with_hold_timeout(mut self, secs: i64) -> Self {
        self.hold_timeout_secs = (secs > 0).then_some(secs);
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Runs a single sweep. A booking that cannot be resolved is recorded in [`ExpiryResult::failed`] and picked up
    /// again by the next sweep.
    pub async fn run_sweep(&self) -> Result<ExpiryResult, StorageError> {
        let pending = self.db.fetch_pending_bookings(self.hold_timeout_secs).await?;
        trace!("🕰️ {} pending bookings to reconcile", pending.len());
        let mut result = ExpiryResult::default();
        for booking in pending {
            match self.resolve(&booking).await {
                Ok(Resolution::Confirmed) => result.confirmed.push(booking.id),
                Ok(Resolution::Canceled) => result.canceled.push(booking.id),
                Ok(Resolution::Unchanged) => {
                    debug!("🕰️ Booking {} was resolved elsewhere during the sweep", booking.id)
                },
                Err(e) => {
                    error!("🕰️ Could not reconcile booking {}. It will be retried. {e}", booking.id);
                    result.failed.push(booking.id);
                },
            }
        }
        if result.total_count() > 0 {
            info!(
                "🕰️ Sweep complete. {} confirmed, {} canceled, {} failed",
                result.confirmed_count(),
                result.canceled_count(),
                result.failed_count()
            );
        }
        Ok(result)
    }

    async fn resolve(&self, booking: &Booking) -> Result<Resolution, StorageError> {
        let payment = match self.db.fetch_payment_for_booking(booking.id).await? {
            Some(p) => p,
            None => {
                let resolution = self.cancel(booking.id).await?;
                if matches!(resolution, Resolution::Canceled) {
                    debug!("🕰️ Booking {} was abandoned without a payment", booking.id);
                    self.spam.push(SpamSignal::new(booking.account_id, SpamReason::AbandonedHold));
                }
                return Ok(resolution);
            },
        };
        match payment.status {
            PaymentStatus::Paid => {
                unchanged_on_conflict(self.db.confirm_booking(booking.id).await, Resolution::Confirmed)
            },
            PaymentStatus::Canceled | PaymentStatus::Returned => self.cancel(booking.id).await,
            PaymentStatus::Pending => {
                let outcome = match self.gateway.verify_payment(&payment).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("🕰️ Gateway could not verify payment {}. Treating it as unpaid. {e}", payment.id);
                        GatewayOutcome::Failed
                    },
                };
                if outcome != GatewayOutcome::Paid {
                    let canceled = self.db.cancel_payment_and_booking(payment.id).await;
                    return unchanged_on_conflict(canceled, Resolution::Canceled);
                }
                let settled = match self.db.settle_paid_payment(payment.id).await {
                    Ok(s) => s,
                    Err(StorageError::PaymentStatusConflict { .. }) => return Ok(Resolution::Unchanged),
                    Err(e) => return Err(e),
                };
                if settled.payment.status != PaymentStatus::Paid {
                    return Ok(Resolution::Unchanged);
                }
                match payment_receipt(&self.db, &settled.payment).await {
                    Ok(msg) => self.mail.push(msg),
                    Err(e) => error!("🕰️ Could not build the receipt for payment {}. {e}", payment.id),
                }
                Ok(Resolution::Confirmed)
            },
        }
    }

    async fn cancel(&self, booking_id: i64) -> Result<Resolution, StorageError> {
        unchanged_on_conflict(self.db.cancel_booking(booking_id).await, Resolution::Canceled)
    }
}

fn unchanged_on_conflict<T>(
    result: Result<T, StorageError>,
    on_success: Resolution,
) -> Result<Resolution, StorageError> {
    match result {
        Ok(_) => Ok(on_success),
        Err(StorageError::BookingStatusConflict { .. }) | Err(StorageError::PaymentStatusConflict { .. }) => {
            Ok(Resolution::Unchanged)
        },
        Err(e) => Err(e),
    }
}
