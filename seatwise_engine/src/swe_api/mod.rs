//! The public engine API.
//!
//! Each API object wraps a storage backend (and, where needed, an external collaborator) and enforces the business
//! rules on top of the atomic operations that the backend provides.
pub mod booking_api;
pub mod booking_objects;
pub mod errors;
pub mod notifications;
pub mod payment_api;
pub mod reconciler;
pub mod throttle;
