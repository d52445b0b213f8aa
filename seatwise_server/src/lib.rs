//! # Seatwise server
//! This crate hosts the HTTP server and background workers for the Seatwise engine. It is responsible for:
//! * Accepting booking and payment requests and passing them to the engine.
//! * Running the auto-expiry sweep, the abuse throttle and the mail relay on their own timers.
//! * Talking to the payment gateway and the mail service over HTTP.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Identity
//! The server sits behind an identity provider that sets the caller's username in a request header (`sw_username` by
//! default). Requests without the header are rejected, as are requests from blacklisted accounts.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/bookings`, `/api/bookings/{id}`, `/api/bookings/{id}/status`: Booking management.
//! * `/api/showings/{id}/seats`: The seat map of a showing.
//! * `/api/payments`, `/api/payments/{id}`, `/api/payments/{id}/verify`, `/api/payments/hash`: Payments.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod routes;
pub mod server;

pub mod expiry_worker;
pub mod mail_worker;
pub mod throttle_worker;

#[cfg(test)]
mod endpoint_tests;
