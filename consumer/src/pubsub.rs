use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use google_cloud_pubsub::client::{Client, ClientConfig};
use google_cloud_pubsub::subscriber::ReceivedMessage;
use google_cloud_pubsub::subscription::{MessageStream, Subscription};

use crate::broker::Broker;
use crate::config::Config;
use crate::error::Error;
use crate::message::{Handler, Message};

/// PubSubBroker pulls from a Google Cloud Pub/Sub subscription.
pub struct PubSubBroker {
    subscription: Subscription,
}

impl PubSubBroker {
    /// connect creates a client for the configured project.
    /// The client targets the emulator when PUBSUB_EMULATOR_HOST is set, and uses Application Default Credentials otherwise.
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let client_config = ClientConfig {
            project_id: Some(config.project.clone()),
            ..Default::default()
        };
        let client = Client::new(client_config.with_auth().await?).await?;
        let subscription = client.subscription(&config.subscription);
        tracing::debug!("subscription resolved: {}", subscription.fully_qualified_name());
        Ok(Self::new(subscription))
    }

    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }
}

#[async_trait]
impl Broker for PubSubBroker {
    fn subscription_path(&self) -> &str {
        self.subscription.fully_qualified_name()
    }

    async fn listen<H: Handler>(&self, handler: Arc<H>, cancel: CancellationToken) -> Result<(), Error> {
        let mut stream = self.subscription.subscribe(None).await?;
        let result = dispatch(&mut stream, handler.as_ref(), &cancel).await;
        if let Err(err) = &result {
            tracing::error!("failed to handle message on {}: {}", self.subscription_path(), err);
        }
        // Stops the streaming pull and nacks whatever is still queued.
        stream.dispose().await;
        result
    }
}

async fn dispatch<H: Handler>(stream: &mut MessageStream, handler: &H, cancel: &CancellationToken) -> Result<(), Error> {
    loop {
        let message = tokio::select! {
            v = stream.next() => v,
            _ = cancel.cancelled() => None,
        };
        match message {
            Some(message) => handler.handle(Delivery(message)).await?,
            None => return Ok(()),
        }
    }
}

/// Delivery adapts a message pulled through the streaming pull API.
pub struct Delivery(pub ReceivedMessage);

#[async_trait]
impl Message for Delivery {
    fn message_id(&self) -> &str {
        &self.0.message.message_id
    }

    fn payload(&self) -> &[u8] {
        &self.0.message.data
    }

    async fn ack(&self) -> Result<(), Error> {
        self.0.ack().await.map_err(|source| Error::Ack {
            message_id: self.0.message.message_id.clone(),
            source,
        })
    }
}
