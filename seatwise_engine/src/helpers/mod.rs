mod payment_hash;

pub use payment_hash::{calculate_hmac, card_hash, CardHashRequest};
