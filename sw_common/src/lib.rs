//! Primitives shared by the Seatwise engine and server crates.
mod money;

mod secret;

pub use money::{Money, DEFAULT_CURRENCY_CODE};
pub use secret::Secret;
