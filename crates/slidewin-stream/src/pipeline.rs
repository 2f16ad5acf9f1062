use std::sync::Arc;

use slidewin::{MedianAggregator, MedianWindow, SlidingWindow, SumWindow};
use tokio::{
    fs::{self, File},
    io::BufWriter,
    task::JoinSet,
};

use crate::{
    broker::{Broker, Subscription},
    clock::{Clock, SystemClock},
    conf::PipelineConf,
    dispatch::{self, DispatchReport},
    error::Result,
    format::Render,
    kind::AggregateKind,
};

/// The consumer side: one independent task per aggregate kind
///
/// Each task owns its window exclusively and writes to its own result file, so the SUM and
/// MEDIAN streams never share state.
pub struct Pipeline {
    conf: PipelineConf,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    /// Creates a pipeline stamping events with the system clock
    pub fn new(conf: PipelineConf) -> Self {
        Self {
            conf,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used to stamp events
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the pipeline configuration
    pub fn conf(&self) -> &PipelineConf {
        &self.conf
    }

    /// Subscribes both topics, creates the result files and spawns the consumers
    ///
    /// Subscriptions are in place when this returns, so a publisher started afterwards
    /// loses no values.
    pub async fn start(&self, broker: &Broker) -> Result<RunningPipeline> {
        let folder = &self.conf.output_folder;
        fs::create_dir_all(folder).await?;
        log::info!("Output folder: {}", folder.display());

        let mut tasks = JoinSet::new();
        for kind in AggregateKind::ALL {
            let subscription = broker.subscribe(self.conf.topic(kind));
            let sink = BufWriter::new(File::create(self.conf.output_path(kind)).await?);
            match kind {
                AggregateKind::Sum => spawn_consumer(
                    &mut tasks,
                    kind,
                    subscription,
                    SumWindow::new(self.conf.window_range),
                    sink,
                    self.clock.clone(),
                ),
                AggregateKind::Median => spawn_consumer(
                    &mut tasks,
                    kind,
                    subscription,
                    MedianWindow::with_aggregator(
                        self.conf.window_range,
                        MedianAggregator::new(self.conf.median_index),
                    ),
                    sink,
                    self.clock.clone(),
                ),
            }
        }
        Ok(RunningPipeline { tasks })
    }

    /// Starts the consumers and waits for both of them to finish
    ///
    /// Values published before the subscriptions exist are lost, use [Pipeline::start] when
    /// the publisher runs concurrently.
    pub async fn run(&self, broker: &Broker) -> Result<Vec<(AggregateKind, DispatchReport)>> {
        self.start(broker).await?.join().await
    }
}

type ConsumerTasks = JoinSet<(AggregateKind, Result<DispatchReport>)>;

fn spawn_consumer<A>(
    tasks: &mut ConsumerTasks,
    kind: AggregateKind,
    subscription: Subscription,
    window: SlidingWindow<A>,
    mut sink: BufWriter<File>,
    clock: Arc<dyn Clock>,
) where
    A: Render + Send,
{
    tasks.spawn(async move {
        let outcome = dispatch::run(subscription, window, &mut sink, clock.as_ref()).await;
        (kind, outcome)
    });
}

/// Handle to the spawned consumers
pub struct RunningPipeline {
    tasks: ConsumerTasks,
}

impl RunningPipeline {
    /// Waits for both consumers to observe the end-of-stream sentinel
    ///
    /// Returns the reports in [AggregateKind::ALL] order. On the first consumer failure the
    /// remaining consumers are aborted and awaited before the error is returned, so no task
    /// keeps writing its result file.
    pub async fn join(mut self) -> Result<Vec<(AggregateKind, DispatchReport)>> {
        let mut reports = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            let failure = match joined {
                Ok((kind, Ok(report))) => {
                    reports.push((kind, report));
                    continue;
                }
                Ok((kind, Err(err))) => {
                    log::error!("{kind} consumer failed: {err}");
                    err
                }
                Err(err) => {
                    log::error!("consumer task failed: {err}");
                    err.into()
                }
            };
            self.tasks.abort_all();
            while self.tasks.join_next().await.is_some() {}
            return Err(failure);
        }
        reports.sort_by_key(|(kind, _)| AggregateKind::ALL.iter().position(|k| k == kind));
        Ok(reports)
    }
}
