use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::broker::Broker;
use crate::config::Config;
use crate::console::Console;
use crate::error::Error;
use crate::message::Handler;

/// State of the consumer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// A streaming pull session is open for at most one window.
    Listening,
    /// Waiting out the pause before the next session.
    Idle,
    /// The shutdown token was cancelled. Terminal.
    Shutdown,
}

enum Wake {
    Ended(Result<(), Error>),
    Expired,
    Shutdown,
}

/// Consumer repeatedly opens a session, listens for one window, cancels the
/// session and pauses before opening the next one.
/// Sessions never overlap.
pub struct Consumer<B, H> {
    broker: B,
    handler: Arc<H>,
    console: Console,
    window: Duration,
    pause: Duration,
    sessions: usize,
}

impl<B, H> Consumer<B, H>
where
    B: Broker,
    H: Handler,
{
    pub fn new(broker: B, handler: H, config: &Config) -> Self {
        Self {
            broker,
            handler: Arc::new(handler),
            console: Console::stdout(),
            window: config.window,
            pause: config.pause,
            sessions: 0,
        }
    }

    pub fn with_console(mut self, v: Console) -> Self {
        self.console = v;
        self
    }

    /// sessions returns the number of sessions opened so far.
    pub fn sessions(&self) -> usize {
        self.sessions
    }

    /// run loops until `shutdown` is cancelled or an error occurs.
    /// Window expiry is not an error. Any session or handler failure is returned as is, without retry.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<(), Error> {
        let mut state = State::Listening;
        loop {
            tracing::trace!("consumer state: {:?}", state);
            state = match state {
                State::Listening => self.listen(&shutdown).await?,
                State::Idle => self.idle(&shutdown).await,
                State::Shutdown => {
                    tracing::info!("consumer stopped after {} sessions", self.sessions);
                    return Ok(());
                }
            };
        }
    }

    async fn listen(&mut self, shutdown: &CancellationToken) -> Result<State, Error> {
        if shutdown.is_cancelled() {
            return Ok(State::Shutdown);
        }
        let path = self.broker.subscription_path();
        self.console.line(&format!("Listening for messages on {path}"))?;
        self.sessions += 1;
        tracing::info!("open streaming pull session #{} on {}", self.sessions, path);

        let cancel = CancellationToken::new();
        let session = self.broker.listen(self.handler.clone(), cancel.clone());
        tokio::pin!(session);

        let wake = tokio::select! {
            result = &mut session => Wake::Ended(result),
            _ = tokio::time::sleep(self.window) => Wake::Expired,
            _ = shutdown.cancelled() => Wake::Shutdown,
        };
        let result = match wake {
            Wake::Ended(result) => result,
            Wake::Expired => {
                tracing::debug!("listening window expired, cancel session");
                cancel.cancel();
                session.await
            }
            Wake::Shutdown => {
                tracing::debug!("shutdown requested, cancel session");
                cancel.cancel();
                session.await
            }
        };
        if let Err(err) = result {
            tracing::error!("session on {} failed: {}", self.broker.subscription_path(), err);
            return Err(err);
        }
        if shutdown.is_cancelled() {
            Ok(State::Shutdown)
        } else {
            Ok(State::Idle)
        }
    }

    async fn idle(&self, shutdown: &CancellationToken) -> State {
        tokio::select! {
            _ = tokio::time::sleep(self.pause) => State::Listening,
            _ = shutdown.cancelled() => State::Shutdown,
        }
    }
}
