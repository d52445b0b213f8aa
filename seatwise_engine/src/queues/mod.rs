//! Work queues that connect the request path to the background workers.
//!
//! The engine never keeps queue state in globals. Each queue is created with [`work_queue`]: the producer half is
//! cloned into every API that emits work, and the single consumer half is owned by the worker that drains it.
mod channel;
mod messages;

pub use channel::{work_queue, QueueConsumer, QueueProducer};
pub use messages::{MailMessage, ReceiptDetails, SpamReason, SpamSignal, RECEIPT_SUBJECT, VERIFICATION_SUBJECT};
