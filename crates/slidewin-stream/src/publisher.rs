use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::{broker::Broker, conf::PublisherConf, message::Message};

/// Publishes random values to every configured topic at a fixed rate
///
/// Once the send duration has elapsed, the end-of-stream sentinel is published to every
/// topic. Values are published from a single task so each topic observes them in order.
#[derive(Debug)]
pub struct Publisher {
    broker: Broker,
    conf: PublisherConf,
    rng: fastrand::Rng,
}

impl Publisher {
    /// Creates a publisher on `broker`
    pub fn new(broker: Broker, conf: PublisherConf) -> Self {
        let rng = match conf.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { broker, conf, rng }
    }

    /// Publishes until the send duration has elapsed and returns the number of values sent
    pub async fn run(mut self) -> u64 {
        log::info!(
            "Started to send random integers to subscribers for {:?}",
            self.conf.send_duration
        );
        let mut ticker = interval(self.conf.period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let start = Instant::now();
        let mut sent = 0u64;
        loop {
            ticker.tick().await;
            let elapsed = start.elapsed();
            if elapsed > self.conf.send_duration {
                log::info!("Sent {sent} messages in total, elapsed time {elapsed:?}.");
                break;
            }

            let value = self.rng.i64(0..self.conf.max_value);
            self.publish(Message::Value(value));
            sent += 1;

            if sent % 100 == 0 {
                log::info!("Sent {sent} messages, elapsed time {elapsed:?}.");
            }
        }

        self.publish(Message::Done);
        sent
    }

    fn publish(&self, message: Message) {
        let payload = message.encode();
        for topic in self.conf.topics.iter() {
            if self.broker.publish(topic, payload.as_str()) == 0 {
                log::warn!("no subscriber on topic {topic} for {payload}");
            }
        }
    }
}
