//! Mailer module

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

mod connection;
mod deadline;
mod errors;
mod message;

pub use connection::ConnectionParams;
pub use deadline::Deadline;
pub use errors::{DispatchError, TransportError};
pub use message::Message;

/// Performs the actual protocol exchange with a mail server.
///
/// One call is one complete connect, authenticate, transmit and disconnect cycle. Implementations
/// block for the whole exchange and offer no way to interrupt it.
pub trait Transport: Send + Sync + 'static {
    /// Deliver `message` to the server described by `params`.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] once the server accepted the message.
    fn dial_and_send(
        &self,
        params: &ConnectionParams,
        message: &Message,
    ) -> Result<(), TransportError>;
}

/// Sends messages on behalf of callers
#[async_trait]
pub trait Mailer: Clone + Send + Sync + 'static {
    /// Send a message, waiting at most until `deadline`.
    ///
    /// # Arguments
    /// * `deadline` - When to stop waiting; [`None`] waits for the transport indefinitely.
    /// * `message` - The [`Message`] to send.
    ///
    /// # Returns
    /// A [`Result`] indicating success or the [`DispatchError`] that ended the attempt.
    async fn send(&self, deadline: Option<Deadline>, message: Message)
        -> Result<(), DispatchError>;

    /// Send a message in the background without waiting for the outcome.
    fn send_async(&self, deadline: Option<Deadline>, message: Message);
}

#[cfg(test)]
mock! {
    pub Transport {}

    impl Transport for Transport {
        fn dial_and_send(&self, params: &ConnectionParams, message: &Message) -> Result<(), TransportError>;
    }
}

#[cfg(test)]
mock! {
    pub Mailer {}

    impl Clone for Mailer {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl Mailer for Mailer {
        async fn send(&self, deadline: Option<Deadline>, message: Message) -> Result<(), DispatchError>;
        fn send_async(&self, deadline: Option<Deadline>, message: Message);
    }
}
