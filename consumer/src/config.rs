use std::time::Duration;

pub const TOPIC_ENV: &str = "PUB_SUB_TOPIC";
pub const PROJECT_ENV: &str = "PUB_SUB_PROJECT";
pub const SUBSCRIPTION_ENV: &str = "PUB_SUB_SUBSCRIPTION";

/// Length of one streaming pull session.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3);
/// Pause between two sessions.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(3);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Config is sourced once at process start and handed to the consumer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub topic: String,
    pub project: String,
    pub subscription: String,
    pub window: Duration,
    pub pause: Duration,
}

impl Config {
    pub fn new(topic: &str, project: &str, subscription: &str) -> Self {
        Self {
            topic: topic.to_string(),
            project: project.to_string(),
            subscription: subscription.to_string(),
            window: DEFAULT_WINDOW,
            pause: DEFAULT_PAUSE,
        }
    }

    /// from_env reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// from_lookup resolves every variable through `lookup`.
    /// Values are trimmed, and blank values are treated the same as absent ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| match lookup(key) {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(ConfigError::Missing(key)),
        };
        let topic = required(TOPIC_ENV)?;
        let project = required(PROJECT_ENV)?;
        let subscription = required(SUBSCRIPTION_ENV)?;
        Ok(Self::new(&topic, &project, &subscription))
    }

    pub fn with_window(mut self, v: Duration) -> Self {
        self.window = v;
        self
    }

    pub fn with_pause(mut self, v: Duration) -> Self {
        self.pause = v;
        self
    }

    pub fn fully_qualified_subscription_name(&self) -> String {
        format!("projects/{}/subscriptions/{}", self.project, self.subscription)
    }
}
