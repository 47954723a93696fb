use std::io::Write;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serial_test::serial;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use google_cloud_googleapis::pubsub::v1::PubsubMessage;
use google_cloud_pubsub::client::{Client, ClientConfig};
use google_cloud_pubsub::subscription::SubscriptionConfig;
use pubsub_consumer::broker::Broker;
use pubsub_consumer::config::Config;
use pubsub_consumer::console::Console;
use pubsub_consumer::consumer::Consumer;
use pubsub_consumer::error::Error;
use pubsub_consumer::message::{Handler, Message, PrintAndAck};
use pubsub_consumer::pubsub::PubSubBroker;

const PROJECT_NAME: &str = "local-project";

#[ctor::ctor]
fn init() {
    let _ = tracing_subscriber::fmt().try_init();
}

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn lines(&self) -> Vec<String> {
        let data = self.0.lock().unwrap().clone();
        String::from_utf8(data).unwrap().lines().map(|v| v.to_string()).collect()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct FailingHandler {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Handler for FailingHandler {
    async fn handle<M: Message + 'static>(&self, _message: M) -> Result<(), Error> {
        self.calls.fetch_add(1, SeqCst);
        Err(Error::Output(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
    }
}

/// create_subscription creates a fresh topic and subscription on the emulator,
/// publishes `payloads` and returns the consumer config pointing at them.
/// Returns None when no emulator is configured.
async fn create_subscription(payloads: &[&str]) -> Option<Config> {
    if std::env::var("PUBSUB_EMULATOR_HOST").is_err() {
        tracing::warn!("PUBSUB_EMULATOR_HOST is not set, skip emulator test");
        return None;
    }
    let client = Client::new(ClientConfig {
        project_id: Some(PROJECT_NAME.to_string()),
        ..Default::default()
    })
    .await
    .unwrap();

    let uuid = Uuid::new_v4().hyphenated().to_string();
    let topic_id = format!("t{uuid}");
    let subscription_id = format!("s{uuid}");
    let topic = client.create_topic(&topic_id, None, None).await.unwrap();
    client
        .create_subscription(&subscription_id, &topic_id, SubscriptionConfig::default(), None)
        .await
        .unwrap();

    let mut publisher = topic.new_publisher(None);
    for payload in payloads {
        let awaiter = publisher
            .publish(PubsubMessage {
                data: payload.to_string().into(),
                ..Default::default()
            })
            .await;
        tracing::info!("sent message_id = {}", awaiter.get().await.unwrap());
    }
    publisher.shutdown().await;

    Some(Config::new(&topic_id, PROJECT_NAME, &subscription_id))
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_message_is_received_once_across_sessions() {
    let Some(config) = create_subscription(&["hello"]).await else {
        return;
    };
    let config = config
        .with_window(Duration::from_secs(5))
        .with_pause(Duration::from_secs(1));
    let buffer = Buffer::default();
    let broker = PubSubBroker::connect(&config).await.unwrap();
    let mut consumer = Consumer::new(broker, PrintAndAck::new(Console::new(buffer.clone())), &config)
        .with_console(Console::new(buffer.clone()));

    // sessions open at 0s and 6s, shutdown inside the second one
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(9)).await;
        token.cancel();
    });
    consumer.run(shutdown).await.unwrap();

    assert_eq!(consumer.sessions(), 2);
    let lines = buffer.lines();
    let received: Vec<&String> = lines.iter().filter(|l| l.starts_with("Received")).collect();
    assert_eq!(received, vec!["Received b\"hello\"."]);
    let listening = format!("Listening for messages on {}", config.fully_qualified_subscription_name());
    assert_eq!(lines.iter().filter(|l| **l == listening).count(), 2);
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_handler_error_ends_session() {
    let Some(config) = create_subscription(&["hello"]).await else {
        return;
    };
    let broker = PubSubBroker::connect(&config).await.unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(FailingHandler { calls: calls.clone() });

    // the session must end on the handler error, long before this fallback fires
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        token.cancel();
    });
    let result = broker.listen(handler, cancel.clone()).await;

    match result {
        Err(Error::Output(err)) => assert_eq!(err.to_string(), "disk full"),
        other => panic!("unexpected result {other:?}"),
    }
    assert!(!cancel.is_cancelled());
    assert_eq!(calls.load(SeqCst), 1);
}
