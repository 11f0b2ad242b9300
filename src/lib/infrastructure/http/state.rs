//! Application state module

use std::{fmt, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::domain::communication::mailer::{Deadline, Mailer};

/// Mail configuration
#[derive(Clone, Debug, Parser)]
pub struct MailConfig {
    /// The sender email address
    #[clap(long, env = "MAIL_SENDER", default_value = "no-reply@example.net")]
    pub sender: String,

    /// The recipient of notices
    #[clap(long, env = "MAIL_RECIPIENT", default_value = "user@example.net")]
    pub recipient: String,

    /// Footer text rendered under every notice
    #[clap(long, env = "MAIL_FOOTER", default_value = "This is a footer")]
    pub footer: String,

    /// Seconds to wait for a background send, unbounded if unset
    #[clap(long, env = "SEND_TIMEOUT_SECS")]
    pub send_timeout_secs: Option<u64>,
}

impl MailConfig {
    /// The deadline for a send starting now
    pub fn deadline(&self) -> Option<Deadline> {
        self.send_timeout_secs
            .map(|secs| Deadline::after(Duration::from_secs(secs)))
    }
}

/// Global application state
#[derive(Clone)]
pub struct AppState<M: Mailer> {
    /// The time the server started
    pub start_time: DateTime<Utc>,

    /// The mail configuration
    pub config: MailConfig,

    /// Mailer
    pub mailer: Arc<M>,
}

impl<M: Mailer> AppState<M> {
    /// Create a new application state
    pub fn new(config: MailConfig, mailer: M) -> Self {
        Self {
            start_time: Utc::now(),
            config,
            mailer: Arc::new(mailer),
        }
    }
}

impl<M: Mailer> fmt::Debug for AppState<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("start_time", &self.start_time)
            .field("config", &self.config)
            .field("mailer", &"Mailer")
            .finish()
    }
}
