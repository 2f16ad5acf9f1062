//! Streaming pipeline around [slidewin] windows
//!
//! A [Publisher] emits random integers on a SUM and a MEDIAN topic of an in-process [Broker].
//! A [Pipeline] subscribes both topics, stamps every value with its arrival time, feeds it to
//! the matching sliding window and appends one line per value to `<topic>_result.txt`.
//! The [validate] module re-checks such a file offline.
//!
//! ```
//! use slidewin_stream::{AggregateKind, Broker, Message};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let broker = Broker::new();
//! let mut sub = broker.subscribe(AggregateKind::Sum.default_topic());
//! broker.publish("window_sum", Message::Value(42).encode());
//! assert_eq!(sub.recv().await.as_deref(), Some("42"));
//! # });
//! ```
#![deny(nonstandard_style, missing_docs)]
#![forbid(unsafe_code)]

/// In-process publish/subscribe transport
pub mod broker;
/// Wall-clock abstraction used to stamp arriving values
pub mod clock;
/// Pipeline and publisher configuration
pub mod conf;
/// Per-topic consumer loop
pub mod dispatch;
mod error;
/// Result line rendering and parsing
pub mod format;
mod kind;
/// Transport payloads
pub mod message;
/// Consumer tasks for both aggregates
pub mod pipeline;
/// Synthetic value publisher
pub mod publisher;
/// Window update latency statistics
pub mod stats;
/// Offline validation of result logs
pub mod validate;

pub use broker::{Broker, Subscription};
pub use clock::{Clock, ManualClock, SystemClock};
pub use conf::{PipelineConf, PublisherConf};
pub use dispatch::DispatchReport;
pub use error::{Error, Result};
pub use kind::AggregateKind;
pub use message::{Message, DONE};
pub use pipeline::{Pipeline, RunningPipeline};
pub use publisher::Publisher;
pub use validate::ValidationReport;
