use std::fmt::Debug;

use log::*;
use sw_common::{Money, Secret};

use crate::{
    db_types::{Booking, BookingStatus, NewPayment, Payment, PaymentStatus},
    helpers::{card_hash, CardHashRequest},
    queues::{MailMessage, QueueProducer},
    swe_api::{
        booking_objects::{PaymentCreated, StatusReport, NO_PAYMENT_URL},
        errors::ReservationError,
        notifications::payment_receipt,
    },
    traits::{AccountManagement, GatewayClient, GatewayOutcome, PaymentManagement, ShowCatalog},
};

pub const ALREADY_SETTLED_MESSAGE: &str = "This ticket has already been paid or canceled.";

/// `PaymentApi` manages the single payment record of a booking and drives the payment gateway.
pub struct PaymentApi<B, G> {
    db: B,
    gateway: G,
    mail: QueueProducer<MailMessage>,
    hash_key: Secret<String>,
}

impl<B, G> Debug for PaymentApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentApi")
    }
}

impl<B, G> PaymentApi<B, G> {
    pub fn new(db: B, gateway: G, mail: QueueProducer<MailMessage>, hash_key: Secret<String>) -> Self {
        Self { db, gateway, mail, hash_key }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> PaymentApi<B, G>
where
    B: PaymentManagement + AccountManagement + ShowCatalog,
    G: GatewayClient,
{
    /// Opens a payment for a `PENDING` booking and registers it with the gateway.
    ///
    /// The amount is the sum of the seat prices at this moment and is never recalculated. If the gateway cannot be
    /// reached the payment is stored as `CANCELED` and the returned URL is [`NO_PAYMENT_URL`].
    pub async fn create_payment(
        &self,
        account_id: i64,
        booking_id: i64,
        method: &str,
        client_ip: &str,
    ) -> Result<PaymentCreated, ReservationError> {
        let booking = self.fetch_owned_booking(account_id, booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(ReservationError::BadRequest(ALREADY_SETTLED_MESSAGE.to_string()));
        }
        if self.db.fetch_payment_for_booking(booking.id).await?.is_some() {
            return Err(ReservationError::BadRequest("This ticket has already been submitted for payment.".into()));
        }
        let seats = self.db.fetch_seats(&booking.seat_ids).await?;
        let amount: Money = seats.iter().map(|s| s.price).sum();
        let new_payment =
            NewPayment { booking_id: booking.id, account_id, amount, method: method.to_string() };
        let payment = self.db.insert_payment(new_payment).await?;
        info!("💳️ Payment {} for booking {booking_id} created. Amount: {amount}", payment.id);
        match self.gateway.create_payment(&payment, method, client_ip).await {
            Ok(payment_url) => {
                debug!("💳️ Gateway accepted payment {}", payment.id);
                Ok(PaymentCreated { payment, payment_url })
            },
            Err(e) => {
                warn!("💳️ Gateway could not register payment {}. It will be canceled. {e}", payment.id);
                let payment = self.db.update_payment_status(payment.id, PaymentStatus::Canceled).await?;
                Ok(PaymentCreated { payment, payment_url: NO_PAYMENT_URL.to_string() })
            },
        }
    }

    /// Asks the gateway for the status of a pending payment and applies the answer.
    ///
    /// A paid payment confirms its booking in the same transaction and queues a receipt. Payments that are already
    /// settled are reported without contacting the gateway.
    pub async fn verify_payment(&self, account_id: i64, payment_id: i64) -> Result<StatusReport, ReservationError> {
        let payment = self.get_payment(account_id, payment_id).await?;
        if payment.status.is_terminal() {
            return Ok(StatusReport::new(payment.status.to_string(), ALREADY_SETTLED_MESSAGE));
        }
        let outcome = self.gateway.verify_payment(&payment).await?;
        debug!("💳️ Gateway reports payment {payment_id} as {outcome:?}");
        let report = match outcome {
            GatewayOutcome::Paid => {
                let settled = self.db.settle_paid_payment(payment_id).await?;
                if settled.payment.status == PaymentStatus::Paid {
                    self.add_payment_mail(&settled.payment).await;
                    StatusReport::new("PAID", "Ticket is paid. You will receive a receipt by email.")
                } else {
                    StatusReport::new(
                        settled.payment.status.to_string(),
                        "The booking was released before the payment arrived. The payment will be returned.",
                    )
                }
            },
            GatewayOutcome::Failed => {
                self.db.update_payment_status(payment_id, PaymentStatus::Canceled).await?;
                StatusReport::new("UNPAID", "Ticket is unpaid")
            },
            GatewayOutcome::Pending => StatusReport::new("PENDING", "Ticket is pending"),
        };
        Ok(report)
    }

    pub async fn get_payment(&self, account_id: i64, payment_id: i64) -> Result<Payment, ReservationError> {
        match self.db.fetch_payment(payment_id).await? {
            Some(p) if p.account_id == account_id => Ok(p),
            _ => Err(ReservationError::payment_not_found(payment_id)),
        }
    }

    pub async fn list_payments(&self, account_id: i64) -> Result<Vec<Payment>, ReservationError> {
        let payments = self.db.fetch_payments_for_account(account_id).await?;
        Ok(payments)
    }

    /// Queues the receipt email for a payment. Failures to assemble the receipt are logged and otherwise ignored.
    pub async fn add_payment_mail(&self, payment: &Payment) {
        match payment_receipt(&self.db, payment).await {
            Ok(msg) => {
                trace!("💳️ Receipt for payment {} queued for {}", payment.id, msg.to);
                self.mail.push(msg);
            },
            Err(e) => error!("💳️ Could not build the receipt for payment {}. {e}", payment.id),
        }
    }

    /// Signs card details for submission to the gateway.
    pub fn card_hash(&self, request: &CardHashRequest) -> Result<String, ReservationError> {
        card_hash(self.hash_key.reveal(), request).map_err(|e| ReservationError::BadRequest(e.to_string()))
    }

    async fn fetch_owned_booking(&self, account_id: i64, booking_id: i64) -> Result<Booking, ReservationError> {
        match self.db.fetch_booking(booking_id).await? {
            Some(b) if b.account_id == account_id => Ok(b),
            _ => Err(ReservationError::booking_not_found(booking_id)),
        }
    }
}
