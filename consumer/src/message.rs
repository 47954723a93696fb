use async_trait::async_trait;

use crate::console::Console;
use crate::error::Error;

/// Message is one delivery from the broker: an opaque payload plus the handle
/// used to acknowledge it.
#[async_trait]
pub trait Message: Send + Sync {
    fn message_id(&self) -> &str;

    fn payload(&self) -> &[u8];

    async fn ack(&self) -> Result<(), Error>;
}

/// Handler is invoked once per delivered message. The broker may run several
/// invocations at the same time, so implementations must not rely on being
/// called serially.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle<M: Message + 'static>(&self, message: M) -> Result<(), Error>;
}

/// PrintAndAck prints the payload of each message and acknowledges it right away.
#[derive(Clone, Debug)]
pub struct PrintAndAck {
    console: Console,
}

impl PrintAndAck {
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

impl Default for PrintAndAck {
    fn default() -> Self {
        Self::new(Console::stdout())
    }
}

#[async_trait]
impl Handler for PrintAndAck {
    async fn handle<M: Message + 'static>(&self, message: M) -> Result<(), Error> {
        tracing::debug!("message received: {}", message.message_id());
        self.console.line(&received_line(message.payload()))?;
        message.ack().await
    }
}

/// received_line renders a payload the way Rust prints a byte string literal.
pub fn received_line(payload: &[u8]) -> String {
    format!("Received b\"{}\".", payload.escape_ascii())
}
