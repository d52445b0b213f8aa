//! Best-effort email delivery.
//!
//! Messages are queued by the payment flows and delivered by a periodic drain. Delivery failures are logged and
//! never surface to the flow that queued the message.
use log::*;

use crate::{
    db_types::Payment,
    queues::{MailMessage, QueueConsumer, ReceiptDetails},
    traits::{AccountManagement, BookingManagement, MailTransport, RelayResult, ShowCatalog, StorageError},
};

/// Builds the receipt email for a payment from the payment's account, booking and showing.
pub async fn payment_receipt<B>(db: &B, payment: &Payment) -> Result<MailMessage, StorageError>
where B: AccountManagement + BookingManagement + ShowCatalog {
    let account =
        db.fetch_account(payment.account_id).await?.ok_or(StorageError::AccountNotFound(payment.account_id))?;
    let booking =
        db.fetch_booking(payment.booking_id).await?.ok_or(StorageError::BookingNotFound(payment.booking_id))?;
    let showing =
        db.fetch_showing(booking.showing_id).await?.ok_or(StorageError::ShowingNotFound(booking.showing_id))?;
    let seats = db.fetch_seats(&booking.seat_ids).await?;
    let receipt = ReceiptDetails {
        payment_id: payment.id,
        amount: payment.amount,
        created_at: payment.created_at,
        movie_name: showing.movie_name,
        hall_name: showing.hall_name,
        start_time: showing.start_time,
        seats: seats.into_iter().map(|s| s.name).collect(),
    };
    Ok(MailMessage::payment_receipt(&account.email, &receipt))
}

/// Drains the mail queue into a [`MailTransport`].
pub struct NotificationRelay<M> {
    transport: M,
    queue: QueueConsumer<MailMessage>,
}

impl<M: MailTransport> NotificationRelay<M> {
    pub fn new(transport: M, queue: QueueConsumer<MailMessage>) -> Self {
        Self { transport, queue }
    }

    /// Sends every message that is currently queued. A failed message is logged and dropped; the drain carries on
    /// with the rest.
    pub async fn drain(&mut self) -> RelayResult {
        let mut result = RelayResult::default();
        while let Some(msg) = self.queue.pop() {
            match self.transport.send(&msg.to, &msg.subject, &msg.body).await {
                Ok(()) => {
                    trace!("📬️ Mail '{}' sent to {}", msg.subject, msg.to);
                    result.sent += 1;
                },
                Err(e) => {
                    warn!("📬️ Could not send mail '{}' to {}. {e}", msg.subject, msg.to);
                    result.failed += 1;
                },
            }
        }
        result
    }
}

#[cfg(test)]
mod test {
    use mockall::{mock, predicate::eq, Sequence};

    use super::*;
    use crate::{queues::work_queue, traits::MailError};

    mock! {
        pub Mailer {}
        impl MailTransport for Mailer {
            async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
        }
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_drain() {
        let _ = env_logger::try_init();
        let mut mailer = MockMailer::new();
        let mut seq = Sequence::new();
        mailer
            .expect_send()
            .with(eq("a@example.com"), eq("one"), eq("1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        mailer.expect_send().with(eq("b@example.com"), eq("two"), eq("2")).times(1).in_sequence(&mut seq).returning(
            |to, _, _| Err(MailError::DeliveryFailed { to: to.to_string(), reason: "mailbox full".into() }),
        );
        mailer
            .expect_send()
            .with(eq("c@example.com"), eq("three"), eq("3"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        let (producer, consumer) = work_queue();
        producer.push(MailMessage::new("a@example.com", "one", "1"));
        producer.push(MailMessage::new("b@example.com", "two", "2"));
        producer.push(MailMessage::new("c@example.com", "three", "3"));
        let mut relay = NotificationRelay::new(mailer, consumer);
        let result = relay.drain().await;
        assert_eq!(result.sent, 2);
        assert_eq!(result.failed, 1);
        let result = relay.drain().await;
        assert_eq!(result.sent + result.failed, 0);
    }
}
