//! Order notification channel.
//!
//! Checkout publishes one human-readable message per completed order through
//! a [`Notifier`]. Delivery is best effort: the caller logs failures and
//! carries on.
//!
//! # Implementations
//!
//! - [`SlackNotifier`] - posts to a Slack channel via `chat.postMessage`
//! - [`LogNotifier`] - writes the message to the log (no Slack configured)
//! - [`RecordingNotifier`] - keeps messages in memory, for tests

mod slack;

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

pub use slack::SlackNotifier;

use crate::config::NotificationConfig;

/// Errors that can occur when publishing a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("notification request failed: {0}")]
    Request(String),

    /// Failed to parse the channel's response.
    #[error("notification response error: {0}")]
    Response(String),

    /// The channel rejected the message.
    #[error("notification channel error: {0}")]
    Api(String),

    /// The notifier could not be constructed.
    #[error("notifier configuration error: {0}")]
    Config(String),
}

/// Fire-and-forget publisher of subject + message pairs.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish one message.
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError>;
}

/// Pick the notification channel for this configuration: Slack when it is
/// configured, the log otherwise.
///
/// # Errors
///
/// Returns `NotifyError::Config` if the Slack client cannot be built.
pub fn from_config(config: &NotificationConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match &config.slack {
        Some(slack) => {
            info!(channel = %slack.channel, "Order notifications go to Slack");
            Ok(Arc::new(SlackNotifier::new(slack)?))
        }
        None => {
            warn!("Slack not configured, order notifications are only logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

/// Notifier that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        info!(subject, message, "Order notification (no channel configured)");
        Ok(())
    }
}

/// A message captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub subject: String,
    pub message: String,
}

/// Notifier that records every message and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    published: Mutex<Vec<PublishedMessage>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// A notifier that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Messages published so far, oldest first.
    #[must_use]
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Request("recording notifier set to fail".to_string()));
        }

        let mut published = self
            .published
            .lock()
            .map_err(|_| NotifyError::Api("recording notifier poisoned".to_string()))?;
        published.push(PublishedMessage {
            subject: subject.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}
