//! # Backend contracts
//!
//! This module defines the behaviour that storage backends and external collaborators must expose in order to be
//! driven by the Seatwise engine.
//!
//! ## Storage
//! * [`SeatInventory`] owns per-showing seat records. A seat is reserved with a single atomic compare-and-set on its
//!   status, so at most one concurrent reservation for a seat can ever succeed.
//! * [`BookingManagement`] persists bookings and performs the multi-row status transitions (cancel, confirm, re-open)
//!   atomically.
//! * [`PaymentManagement`] persists the single payment record of a booking and settles it together with its booking.
//! * [`AccountManagement`] resolves accounts and maintains the abuse counters.
//! * [`ShowCatalog`] exposes the showings (and the hall capacity) that seats belong to.
//!
//! [`SeatwiseBackend`] bundles all of the above.
//!
//! ## External services
//! * [`GatewayClient`] is the payment gateway.
//! * [`MailTransport`] delivers email.
mod account_management;
mod backend;
mod booking_management;
mod catalog;
mod data_objects;
mod errors;
mod gateway;
mod mail;
mod payment_management;
mod seat_inventory;

pub use account_management::AccountManagement;
pub use backend::SeatwiseBackend;
pub use booking_management::BookingManagement;
pub use catalog::ShowCatalog;
pub use data_objects::{BookingReopened, ExpiryResult, PaymentSettled, RelayResult, ThrottleResult};
pub use errors::StorageError;
pub use gateway::{GatewayClient, GatewayError, GatewayOutcome};
pub use mail::{MailError, MailTransport};
pub use payment_management::PaymentManagement;
pub use seat_inventory::SeatInventory;
