//! # pubsub-consumer
//!
//! Streaming pull consumer for a single Google Cloud Pub/Sub subscription.
//!
//! The consumer listens for a short window, cancels the session, pauses and
//! starts over, forever. Every received message is printed and acknowledged.
//! It produces a steady, horizontally scalable workload whose backlog an
//! external autoscaler can react to.
//!
//! ## Quick Start
//!
//! ```
//! use pubsub_consumer::config::Config;
//! use pubsub_consumer::consumer::Consumer;
//! use pubsub_consumer::error::Error;
//! use pubsub_consumer::message::PrintAndAck;
//! use pubsub_consumer::pubsub::PubSubBroker;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     // PUB_SUB_TOPIC, PUB_SUB_PROJECT and PUB_SUB_SUBSCRIPTION are required.
//!     let config = Config::from_env()?;
//!
//!     let broker = PubSubBroker::connect(&config).await?;
//!     let mut consumer = Consumer::new(broker, PrintAndAck::default(), &config);
//!
//!     // Runs until the token is cancelled or a session fails.
//!     consumer.run(CancellationToken::new()).await
//! }
//! ```
pub mod broker;
pub mod config;
pub mod console;
pub mod consumer;
pub mod error;
pub mod message;
pub mod pubsub;
