//! Notification sinks. Two priorities: `Alert` for trade alerts, `Log` for
//! routine messages (rejections, no-setup verdicts).

pub mod console;
pub mod webhook;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use console::{alert_message, ConsoleNotifier};
pub use webhook::{WebhookConfig, WebhookNotifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Alert,
    Log,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Alert => "alert",
            Priority::Log => "log",
        })
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification endpoint returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("notifier setup failed: {0}")]
    Setup(String),
}

pub trait Notifier: Send {
    fn notify(&mut self, priority: Priority, message: &str) -> Result<(), NotifyError>;
}

/// Fan out to several sinks. Every sink is attempted; the first error is returned.
#[derive(Default)]
pub struct NotifierSet {
    sinks: Vec<Box<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn Notifier>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Notifier for NotifierSet {
    fn notify(&mut self, priority: Priority, message: &str) -> Result<(), NotifyError> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.notify(priority, message) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
