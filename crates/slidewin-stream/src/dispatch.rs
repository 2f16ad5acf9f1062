use std::time::Instant;

use slidewin::SlidingWindow;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{
    broker::Subscription,
    clock::{to_nanos, Clock},
    error::{Error, Result},
    format::{render_line, Render},
    message::Message,
    stats::{Latency, LatencySummary},
};

/// Outcome of a finished dispatch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// The consumed topic
    pub topic: String,
    /// Number of values received before the end-of-stream sentinel
    pub received: u64,
    /// Latency of the window updates
    pub latency: LatencySummary,
}

/// Consumes `subscription` until the end-of-stream sentinel
///
/// Every value is stamped with `clock`, handed to `window` and the resulting output line is
/// written to `sink`. The sentinel itself never reaches the window. The sink is flushed
/// before returning and the subscription is released.
///
/// # Errors
///
/// Fails on the first malformed payload, on a subscription that closes before the
/// sentinel, on a timestamp outside the nanosecond range and on sink write errors.
pub async fn run<A, W, C>(
    mut subscription: Subscription,
    mut window: SlidingWindow<A>,
    sink: &mut W,
    clock: &C,
) -> Result<DispatchReport>
where
    A: Render,
    W: AsyncWrite + Unpin,
    C: Clock + ?Sized,
{
    log::info!(
        "consuming topic {} with a {} window",
        subscription.topic(),
        window.range()
    );
    let mut received = 0u64;
    let mut latency = Latency::default();

    let consumed = consume(
        &mut subscription,
        &mut window,
        sink,
        clock,
        &mut received,
        &mut latency,
    )
    .await;
    // lines written before a failure must reach the sink
    sink.flush().await?;
    consumed?;

    let latency = latency.summary();
    log::info!(
        "Topic {} received {} messages in total.",
        subscription.topic(),
        received
    );
    log::debug!("topic {} update latency {}", subscription.topic(), latency);

    Ok(DispatchReport {
        topic: subscription.topic().to_string(),
        received,
        latency,
    })
}

async fn consume<A, W, C>(
    subscription: &mut Subscription,
    window: &mut SlidingWindow<A>,
    sink: &mut W,
    clock: &C,
    received: &mut u64,
    latency: &mut Latency,
) -> Result<()>
where
    A: Render,
    W: AsyncWrite + Unpin,
    C: Clock + ?Sized,
{
    loop {
        let Some(payload) = subscription.recv().await else {
            return Err(Error::Disconnected {
                topic: subscription.topic().to_string(),
            });
        };
        let value = match Message::parse(&payload)? {
            Message::Done => return Ok(()),
            Message::Value(value) => value,
        };

        let at = clock.now();
        let now = to_nanos(&at)?;

        let started = Instant::now();
        let aggregate = window.receive(value, now);
        latency.record(started.elapsed());

        let mut line = render_line::<A>(value, &at, &aggregate);
        line.push('\n');
        sink.write_all(line.as_bytes()).await?;
        *received += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{broker::Broker, clock::ManualClock, message::DONE};
    use chrono::{DateTime, TimeDelta, Utc};
    use slidewin::{MedianWindow, NumericalDuration, SumWindow};

    fn clock() -> ManualClock {
        ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }

    /// A clock that moves forward by `step` after every reading
    struct StepClock {
        clock: ManualClock,
        step: TimeDelta,
    }

    impl StepClock {
        fn seconds(clock: ManualClock, step: i64) -> Self {
            Self {
                clock,
                step: TimeDelta::seconds(step),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let now = self.clock.now();
            self.clock.advance(self.step);
            now
        }
    }

    #[tokio::test]
    async fn sum_scenario_test() {
        let broker = Broker::new();
        let sub = broker.subscribe("window_sum");
        for payload in ["10", "20", "30", DONE] {
            broker.publish("window_sum", payload);
        }

        let mut sink = Vec::new();
        let report = run(sub, SumWindow::new(5.seconds()), &mut sink, &StepClock::seconds(clock(), 1))
            .await
            .unwrap();

        assert_eq!(report.received, 3);
        assert_eq!(report.topic, "window_sum");
        assert_eq!(report.latency.count, 3);
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "Received 10 at 2023-11-14T22:13:20.000000000Z, Sum 10.\n\
             Received 20 at 2023-11-14T22:13:21.000000000Z, Sum 30.\n\
             Received 30 at 2023-11-14T22:13:22.000000000Z, Sum 60.\n"
        );
    }

    #[tokio::test]
    async fn median_scenario_test() {
        let broker = Broker::new();
        let sub = broker.subscribe("window_median");
        for payload in ["10", "20", "30", DONE] {
            broker.publish("window_median", payload);
        }

        let mut sink = Vec::new();
        run(sub, MedianWindow::new(5.seconds()), &mut sink, &StepClock::seconds(clock(), 1))
            .await
            .unwrap();

        let text = String::from_utf8(sink).unwrap();
        let aggregates: Vec<&str> = text
            .lines()
            .map(|l| l.rsplit(' ').next().unwrap())
            .collect();
        assert_eq!(aggregates, vec!["10.0.", "15.0.", "20.0."]);
    }

    #[tokio::test]
    async fn eviction_uses_clock_test() {
        let broker = Broker::new();
        let sub = broker.subscribe("t");
        for payload in ["5", "7", DONE] {
            broker.publish("t", payload);
        }

        let clock = clock();
        let mut sink = Vec::new();
        run(
            sub,
            SumWindow::new(5.seconds()),
            &mut sink,
            &StepClock::seconds(clock.clone(), 6),
        )
        .await
        .unwrap();

        let text = String::from_utf8(sink).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with("Sum 7."));
        assert_eq!(clock.now(), DateTime::from_timestamp(1_700_000_012, 0).unwrap());
    }

    #[tokio::test]
    async fn overflowing_sum_test() {
        let broker = Broker::new();
        let sub = broker.subscribe("t");
        let max = i64::MAX.to_string();
        for payload in [max.as_str(), "1", DONE] {
            broker.publish("t", payload);
        }

        let mut sink = Vec::new();
        let report = run(sub, SumWindow::new(5.seconds()), &mut sink, &clock())
            .await
            .unwrap();
        assert_eq!(report.received, 2);
        let text = String::from_utf8(sink).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with("Sum -9223372036854775808."));
    }

    #[tokio::test]
    async fn done_stops_consuming_test() {
        let broker = Broker::new();
        let sub = broker.subscribe("t");
        for payload in ["1", DONE, "2"] {
            broker.publish("t", payload);
        }

        let mut sink = Vec::new();
        let report = run(sub, SumWindow::new(5.seconds()), &mut sink, &clock())
            .await
            .unwrap();
        assert_eq!(report.received, 1);
        assert_eq!(String::from_utf8(sink).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn malformed_payload_test() {
        let broker = Broker::new();
        let sub = broker.subscribe("t");
        broker.publish("t", "1");
        broker.publish("t", "one");

        let mut sink = Vec::new();
        let err = run(sub, SumWindow::new(5.seconds()), &mut sink, &clock())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { payload } if payload == "one"));
        assert_eq!(String::from_utf8(sink).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn disconnect_test() {
        let broker = Broker::new();
        let sub = broker.subscribe("t");
        broker.publish("t", "1");
        broker.close("t");

        let mut sink = Vec::new();
        let err = run(sub, SumWindow::new(5.seconds()), &mut sink, &clock())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Disconnected { topic } if topic == "t"));
    }
}
