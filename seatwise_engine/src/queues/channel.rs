use log::*;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Creates a connected producer/consumer pair.
pub fn work_queue<T: Send + 'static>() -> (QueueProducer<T>, QueueConsumer<T>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (QueueProducer { sender }, QueueConsumer { receiver })
}

pub struct QueueProducer<T> {
    sender: mpsc::UnboundedSender<T>,
}

impl<T> Clone for QueueProducer<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Send + 'static> QueueProducer<T> {
    /// Enqueues an item. Never blocks. If the consumer has gone away the item is dropped and the failure is logged.
    pub fn push(&self, item: T) {
        if self.sender.send(item).is_err() {
            error!("📬️ Queue consumer has shut down. Item dropped.");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

pub struct QueueConsumer<T> {
    receiver: mpsc::UnboundedReceiver<T>,
}

impl<T: Send + 'static> QueueConsumer<T> {
    /// Pops the next item without waiting. Returns `None` when the queue is currently empty.
    pub fn pop(&mut self) -> Option<T> {
        match self.receiver.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                trace!("📬️ All queue producers have been dropped");
                None
            },
        }
    }

    /// Removes everything currently in the queue.
    pub fn drain(&mut self) -> Vec<T> {
        let mut items = Vec::new();
        while let Some(item) = self.pop() {
            items.push(item);
        }
        items
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn producers_feed_a_single_consumer() {
        let _ = env_logger::try_init();
        let (producer, mut consumer) = work_queue::<u64>();
        let p2 = producer.clone();
        let a = tokio::spawn(async move {
            for i in 0..5 {
                producer.push(i * 2 + 1);
            }
        });
        let b = tokio::spawn(async move {
            for i in 0..5 {
                p2.push(i * 2);
            }
        });
        a.await.unwrap();
        b.await.unwrap();
        let items = consumer.drain();
        assert_eq!(items.len(), 10);
        assert_eq!(items.iter().sum::<u64>(), 45);
        assert!(consumer.pop().is_none());
    }

    #[tokio::test]
    async fn push_after_consumer_dropped_does_not_panic() {
        let _ = env_logger::try_init();
        let (producer, consumer) = work_queue::<&'static str>();
        drop(consumer);
        assert!(producer.is_closed());
        producer.push("lost");
    }
}
