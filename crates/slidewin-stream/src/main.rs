use std::{path::PathBuf, process, time::Duration as StdDuration};

use clap::{Parser, Subcommand};
use slidewin::NumericalDuration;
use slidewin_stream::{
    validate,
    AggregateKind,
    Broker,
    Error,
    Pipeline,
    PipelineConf,
    Publisher,
    PublisherConf,
    Result,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish random values and aggregate them into SUM and MEDIAN result files
    Run {
        /// Folder for the result files
        #[clap(short, long, default_value = slidewin_stream::conf::DEFAULT_OUTPUT_FOLDER)]
        output: PathBuf,
        /// Window range in seconds
        #[clap(short, long, value_parser = clap::value_parser!(i64).range(1..), default_value_t = 5)]
        window_secs: i64,
        /// Values published per second
        #[clap(short, long, value_parser = clap::value_parser!(u32).range(1..), default_value_t = 20)]
        rate: u32,
        /// How long to publish before sending the end-of-stream sentinel
        #[clap(short, long, value_parser, default_value_t = 60)]
        duration_secs: u64,
        /// Exclusive upper bound for published values
        #[clap(short, long, value_parser = clap::value_parser!(i64).range(1..), default_value_t = 10000)]
        max_value: i64,
        /// Fixed seed for reproducible values
        #[clap(short, long)]
        seed: Option<u64>,
    },
    /// Check a result file by recomputing every aggregate
    Validate {
        /// Result file to check
        file: PathBuf,
        /// Aggregate the file was written with
        kind: AggregateKind,
        /// Window range in seconds the file was written with
        #[clap(short, long, value_parser = clap::value_parser!(i64).range(1..), default_value_t = 5)]
        window_secs: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let result = match args.command {
        Command::Run {
            output,
            window_secs,
            rate,
            duration_secs,
            max_value,
            seed,
        } => {
            let pipeline = PipelineConf::default()
                .with_output_folder(output)
                .with_window_range(window_secs.seconds());
            let mut publisher = PublisherConf::default()
                .with_rate(rate)
                .with_send_duration(StdDuration::from_secs(duration_secs))
                .with_max_value(max_value);
            if let Some(seed) = seed {
                publisher = publisher.with_seed(seed);
            }
            run(pipeline, publisher).await
        }
        Command::Validate {
            file,
            kind,
            window_secs,
        } => tokio::task::spawn_blocking(move || {
            validate::check_file(file, kind, window_secs.seconds()).map(|_| ())
        })
        .await
        .map_err(Error::from)
        .and_then(|r| r),
    };

    if let Err(err) = result {
        log::error!("{err}");
        process::exit(1);
    }
}

async fn run(pipeline: PipelineConf, publisher: PublisherConf) -> Result<()> {
    let publisher = publisher.with_topics(AggregateKind::ALL.map(|k| pipeline.topic(k).to_string()));
    let broker = Broker::new();

    let running = Pipeline::new(pipeline).start(&broker).await?;
    let sent = Publisher::new(broker, publisher).run().await;
    for (kind, report) in running.join().await? {
        log::info!(
            "{kind}: {} of {sent} values aggregated, receive latency {}",
            report.received,
            report.latency
        );
    }
    Ok(())
}
