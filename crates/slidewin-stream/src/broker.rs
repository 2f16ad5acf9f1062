use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

type Subscribers = HashMap<String, Vec<UnboundedSender<String>>>;

/// An in-process publish/subscribe broker
///
/// Topics are created on first use. Every subscriber of a topic receives every payload
/// published after it subscribed, in publish order. The handle is cheap to clone and may be
/// shared across tasks.
///
/// # Example
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// use slidewin_stream::Broker;
///
/// let broker = Broker::new();
/// let mut sub = broker.subscribe("window_sum");
/// assert_eq!(broker.publish("window_sum", "10"), 1);
/// assert_eq!(sub.recv().await.as_deref(), Some("10"));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Broker {
    topics: Arc<Mutex<Subscribers>>,
}

impl Broker {
    /// Creates a broker without any topics
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `topic`
    pub fn subscribe(&self, topic: impl Into<String>) -> Subscription {
        let topic = topic.into();
        let (tx, rx) = unbounded_channel();
        self.topics.lock().entry(topic.clone()).or_default().push(tx);
        log::debug!("subscribed to topic {topic}");
        Subscription { topic, rx }
    }

    /// Publishes `payload` on `topic`
    ///
    /// Returns the number of subscribers that received the payload. Subscriptions that have
    /// been dropped are pruned.
    pub fn publish(&self, topic: &str, payload: impl Into<String>) -> usize {
        let payload = payload.into();
        let mut topics = self.topics.lock();
        let Some(subscribers) = topics.get_mut(topic) else {
            return 0;
        };
        subscribers.retain(|tx| tx.send(payload.clone()).is_ok());
        subscribers.len()
    }

    /// Returns the number of live subscribers on `topic`
    pub fn subscribers(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .get(topic)
            .map(|subs| subs.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Drops every subscriber of `topic`
    ///
    /// Pending payloads are still delivered; afterwards the subscriptions observe a closed
    /// channel.
    pub fn close(&self, topic: &str) {
        self.topics.lock().remove(topic);
    }
}

/// A subscription to a single topic
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    rx: UnboundedReceiver<String>,
}

impl Subscription {
    /// Returns the subscribed topic
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for the next payload
    ///
    /// Returns `None` once the broker side of the subscription is gone and every pending
    /// payload has been received.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
