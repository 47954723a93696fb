use google_cloud_gax::grpc::Status;

use crate::config::ConfigError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load credentials: {0}")]
    Auth(#[from] google_cloud_auth::error::Error),

    #[error("failed to create client: {0}")]
    Client(#[from] google_cloud_pubsub::client::Error),

    #[error("streaming pull failed: {0}")]
    Session(#[from] Status),

    #[error("failed to ack message messageId={message_id}: {source}")]
    Ack {
        message_id: String,
        #[source]
        source: Status,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
