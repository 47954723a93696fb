use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::message::Handler;

/// Broker opens streaming pull sessions against a single subscription.
#[async_trait]
pub trait Broker: Send + Sync {
    /// subscription_path returns the fully qualified name of the subscription.
    fn subscription_path(&self) -> &str;

    /// listen opens one streaming pull session and passes every delivered message to `handler`.
    /// It blocks until `cancel` is cancelled, or the session fails.
    /// Resources held by the session are released before it returns, whatever the outcome.
    async fn listen<H: Handler>(&self, handler: Arc<H>, cancel: CancellationToken) -> Result<(), Error>;
}
