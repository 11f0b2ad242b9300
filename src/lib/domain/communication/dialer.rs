//! SMTP dialer
//!
//! A [`Dialer`] owns the connection parameters for one mail server and turns [`Message`]s into
//! transport attempts. Every attempt runs on the blocking thread pool and reports back through its
//! own single-slot channel, so concurrent sends never share mutable state.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

use super::{
    mailer::{ConnectionParams, Deadline, DispatchError, Mailer, Message, Transport},
    telemetry::{Stats, StatsSink, StopSignal},
};

/// A dialer to an SMTP server
pub struct Dialer<T: Transport> {
    params: Arc<ConnectionParams>,
    transport: Arc<T>,
    stats: StatsSink,
    stop: Arc<watch::Sender<bool>>,
}

impl<T: Transport> Dialer<T> {
    /// Creates a new dialer. Nothing is connected until a message is sent.
    pub fn new(params: ConnectionParams, transport: T) -> Self {
        let (stop, _) = watch::channel(false);

        Self {
            params: Arc::new(params),
            transport: Arc::new(transport),
            stats: StatsSink::default(),
            stop: Arc::new(stop),
        }
    }

    /// The connection parameters used for every attempt
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Sends `message`, waiting at most until `deadline`.
    ///
    /// The transport attempt is not cancelled when the deadline passes: it keeps running on the
    /// blocking pool until the server exchange finishes, holding its connection open, and its
    /// result is discarded.
    ///
    /// # Arguments
    /// * `deadline` - When to stop waiting; [`None`] waits indefinitely.
    /// * `message` - The [`Message`] to send.
    ///
    /// # Returns
    /// - [`Ok`] if the server accepted the message before the deadline.
    /// - [`Err`] with [`DispatchError::DeadlineExceeded`] if the deadline passed first.
    /// - [`Err`] with [`DispatchError::Transport`] if the attempt failed first.
    pub async fn send(
        &self,
        deadline: Option<Deadline>,
        message: Message,
    ) -> Result<(), DispatchError> {
        if *self.stop.borrow() {
            warn!(to = message.to(), "send requested after the dialer was stopped");
        }

        debug!(
            host = %self.params.host,
            port = self.params.port,
            to = message.to(),
            subject = message.subject(),
            time_left = ?deadline.map(|deadline| deadline.remaining()),
            "dispatching message"
        );

        let (tx, rx) = oneshot::channel();
        let params = Arc::clone(&self.params);
        let transport = Arc::clone(&self.transport);

        tokio::task::spawn_blocking(move || {
            // the receiver is gone if the caller's deadline already passed
            let _ = tx.send(transport.dial_and_send(&params, &message));
        });

        let expired = async {
            match deadline {
                Some(deadline) => deadline.expired().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = expired => {
                warn!(host = %self.params.host, "deadline exceeded, abandoning transport attempt");

                Err(DispatchError::DeadlineExceeded)
            }
            result = rx => match result {
                Ok(result) => result.map_err(DispatchError::from),
                Err(_) => Err(DispatchError::Abandoned),
            },
        }
    }

    /// Sends `message` in the background and returns immediately.
    ///
    /// A failure is offered to the [`Stats`] stream and dropped if no consumer is waiting.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn send_async(&self, deadline: Option<Deadline>, message: Message) {
        let dialer = self.clone();

        tokio::spawn(async move {
            let Err(err) = dialer.send(deadline, message).await else {
                return;
            };

            if let Err(err) = dialer.stats.offer(err) {
                debug!(error = %err, "no telemetry consumer waiting, dropping failure");
            }
        });
    }

    /// The stream of background send failures
    pub fn stats(&self) -> Stats {
        self.stats.subscribe(self.stop_signal())
    }

    /// Observer for [`Dialer::stop`]
    pub fn stop_signal(&self) -> StopSignal {
        StopSignal::new(self.stop.subscribe())
    }

    /// Signals shutdown.
    ///
    /// Ends every [`Stats`] stream and completes [`StopSignal::stopped`]. In-flight and later
    /// sends are unaffected. Calling this more than once has no further effect.
    pub fn stop(&self) {
        if self.stop.send_replace(true) {
            debug!("dialer already stopped");
        } else {
            debug!(host = %self.params.host, "dialer stopped");
        }
    }
}

impl<T: Transport> Clone for Dialer<T> {
    fn clone(&self) -> Self {
        Self {
            params: Arc::clone(&self.params),
            transport: Arc::clone(&self.transport),
            stats: self.stats.clone(),
            stop: Arc::clone(&self.stop),
        }
    }
}

impl<T: Transport> fmt::Debug for Dialer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialer")
            .field("params", &self.params)
            .field("transport", &std::any::type_name::<T>())
            .field("stopped", &*self.stop.borrow())
            .finish()
    }
}

#[async_trait]
impl<T: Transport> Mailer for Dialer<T> {
    async fn send(
        &self,
        deadline: Option<Deadline>,
        message: Message,
    ) -> Result<(), DispatchError> {
        Dialer::send(self, deadline, message).await
    }

    fn send_async(&self, deadline: Option<Deadline>, message: Message) {
        Dialer::send_async(self, deadline, message)
    }
}
