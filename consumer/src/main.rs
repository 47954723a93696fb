use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pubsub_consumer::config::Config;
use pubsub_consumer::consumer::Consumer;
use pubsub_consumer::error::Error;
use pubsub_consumer::message::PrintAndAck;
use pubsub_consumer::pubsub::PubSubBroker;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    tracing::info!(
        "topic={} project={} subscription={} window={:?} pause={:?}",
        config.topic,
        config.project,
        config.subscription,
        config.window,
        config.pause
    );

    let broker = PubSubBroker::connect(&config).await?;
    let mut consumer = Consumer::new(broker, PrintAndAck::default(), &config);

    // No shutdown signal is wired: the process runs until it is killed or a session fails.
    consumer.run(CancellationToken::new()).await
}
