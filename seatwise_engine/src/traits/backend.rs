use crate::traits::{AccountManagement, PaymentManagement, ShowCatalog};

/// Everything the booking and payment APIs need from a storage backend.
///
/// This is implemented automatically for any type that implements the individual storage traits.
pub trait SeatwiseBackend: PaymentManagement + AccountManagement + ShowCatalog {}

impl<T> SeatwiseBackend for T where T: PaymentManagement + AccountManagement + ShowCatalog {}
