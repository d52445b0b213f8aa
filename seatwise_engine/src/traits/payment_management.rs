use crate::{
    db_types::{NewPayment, Payment, PaymentStatus},
    traits::{data_objects::PaymentSettled, BookingManagement, StorageError},
};

#[allow(async_fn_in_trait)]
pub trait PaymentManagement: Clone + BookingManagement {
    /// Stores a new `PENDING` payment.
    ///
    /// Fails with [`StorageError::PaymentAlreadyExists`] if the booking already has a payment. The check and the insert
    /// are a single statement, so two concurrent calls for the same booking cannot both succeed.
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, StorageError>;

    async fn fetch_payment(&self, payment_id: i64) -> Result<Option<Payment>, StorageError>;

    /// The most recent payment recorded against the booking, if any.
    async fn fetch_payment_for_booking(&self, booking_id: i64) -> Result<Option<Payment>, StorageError>;

    async fn fetch_payments_for_account(&self, account_id: i64) -> Result<Vec<Payment>, StorageError>;

    /// Moves a `PENDING` payment to `new_status`.
    ///
    /// Fails with [`StorageError::PaymentStatusConflict`] if the payment is no longer pending.
    async fn update_payment_status(&self, payment_id: i64, new_status: PaymentStatus) -> Result<Payment, StorageError>;

    /// Marks a `PENDING` payment as `PAID` and confirms its booking in the same transaction.
    ///
    /// If the booking was canceled in the meantime, the money is handed back instead: the payment becomes `RETURNED`
    /// and the booking is left alone.
    async fn settle_paid_payment(&self, payment_id: i64) -> Result<PaymentSettled, StorageError>;

    /// Cancels a `PENDING` payment and its booking (releasing the seats) in the same transaction.
    async fn cancel_payment_and_booking(&self, payment_id: i64) -> Result<PaymentSettled, StorageError>;
}
