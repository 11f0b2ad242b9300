//! Failure telemetry for background sends
//!
//! The sink is a rendezvous channel: an event is handed over only if a consumer is already
//! waiting in [`Stats::recv`]. Producers never block and nothing is buffered, so a slow or absent
//! consumer loses events.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{oneshot, watch};
use tracing::debug;

use super::mailer::DispatchError;

type Waiters = Arc<Mutex<VecDeque<oneshot::Sender<DispatchError>>>>;

/// Hand `event` to the first live waiter, or give it back if none is waiting.
fn hand_off(waiters: &Waiters, mut event: DispatchError) -> Result<(), DispatchError> {
    loop {
        let waiter = waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match waiter {
            Some(waiter) => match waiter.send(event) {
                Ok(()) => return Ok(()),
                // consumer gave up waiting
                Err(returned) => event = returned,
            },
            None => return Err(event),
        }
    }
}

/// A consumer's registered slot.
///
/// An event can land in the slot after the consumer stopped polling for it. Dropping the slot
/// passes such an event on to the next waiter instead of losing it silently.
struct Slot {
    rx: oneshot::Receiver<DispatchError>,
    waiters: Waiters,
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.rx.close();

        if let Ok(event) = self.rx.try_recv() {
            if let Err(event) = hand_off(&self.waiters, event) {
                debug!(error = %event, "telemetry consumer went away, dropping failure");
            }
        }
    }
}

/// Observes the one-shot stop signal of a [`Dialer`](super::dialer::Dialer)
#[derive(Clone, Debug)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// Whether stop has been signalled
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once stop is signalled or the dialer is gone.
    pub async fn stopped(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

/// Producer end of the telemetry channel
#[derive(Clone, Debug, Default)]
pub(crate) struct StatsSink {
    waiters: Waiters,
}

impl StatsSink {
    /// Hand `event` to a waiting consumer, or give it back if none is waiting.
    pub(crate) fn offer(&self, event: DispatchError) -> Result<(), DispatchError> {
        hand_off(&self.waiters, event)
    }

    pub(crate) fn subscribe(&self, stop: StopSignal) -> Stats {
        Stats {
            waiters: Arc::clone(&self.waiters),
            stop,
        }
    }
}

/// Read-only end of the telemetry channel.
///
/// Yields the errors of failed [`send_async`](super::dialer::Dialer::send_async) calls. Success is
/// never reported.
#[derive(Clone, Debug)]
pub struct Stats {
    waiters: Waiters,
    stop: StopSignal,
}

impl Stats {
    /// Wait for the next failure.
    ///
    /// Returns [`None`] once the dialer has been stopped or dropped. Cancel safe: an event handed
    /// to a `recv` that is dropped before returning it goes to the next waiting consumer.
    pub async fn recv(&mut self) -> Option<DispatchError> {
        if self.stop.is_stopped() {
            return None;
        }

        let (tx, rx) = oneshot::channel();

        {
            let mut waiters = self.waiters.lock().unwrap_or_else(PoisonError::into_inner);
            waiters.retain(|waiter| !waiter.is_closed());
            waiters.push_back(tx);
        }

        let mut slot = Slot {
            rx,
            waiters: Arc::clone(&self.waiters),
        };

        tokio::select! {
            biased;

            event = &mut slot.rx => event.ok(),
            _ = self.stop.stopped() => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::anyhow;
    use testresult::TestResult;
    use tokio::time::timeout;

    use crate::domain::communication::mailer::TransportError;

    use super::*;

    fn failure(text: &str) -> DispatchError {
        DispatchError::from(TransportError::from(anyhow!(text.to_string())))
    }

    fn channel() -> (StatsSink, Stats, watch::Sender<bool>) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let sink = StatsSink::default();
        let stats = sink.subscribe(StopSignal::new(stop_rx));

        (sink, stats, stop_tx)
    }

    #[tokio::test]
    async fn test_offer_without_consumer_is_dropped() -> TestResult {
        let (sink, mut stats, _stop) = channel();

        let result = sink.offer(failure("dropped"));

        assert!(result.is_err());
        assert!(timeout(Duration::from_millis(50), stats.recv())
            .await
            .is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_offer_reaches_waiting_consumer() -> TestResult {
        let (sink, mut stats, _stop) = channel();

        let consumer = tokio::spawn(async move { stats.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(sink.offer(failure("delivered")).is_ok());

        let event = consumer.await?;
        assert_eq!(event.map(|e| e.to_string()), Some("delivered".to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_consumer_does_not_swallow_events() -> TestResult {
        let (sink, mut stats, _stop) = channel();

        assert!(timeout(Duration::from_millis(10), stats.recv())
            .await
            .is_err());

        assert!(sink.offer(failure("nobody")).is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_dropped_recv_passes_event_to_next_consumer() -> TestResult {
        let (sink, mut stats, _stop) = channel();
        let mut other = stats.clone();

        let mut first = Box::pin(stats.recv());
        tokio::select! {
            biased;

            _ = &mut first => panic!("no event was offered yet"),
            _ = std::future::ready(()) => {}
        }

        let second = tokio::spawn(async move { other.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(sink.offer(failure("handed back")).is_ok());
        drop(first);

        let event = timeout(Duration::from_secs(1), second).await??;
        assert_eq!(
            event.map(|e| e.to_string()),
            Some("handed back".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_dropped_recv_without_other_consumer_drops_event() -> TestResult {
        let (sink, mut stats, _stop) = channel();

        let mut first = Box::pin(stats.recv());
        tokio::select! {
            biased;

            _ = &mut first => panic!("no event was offered yet"),
            _ = std::future::ready(()) => {}
        }

        assert!(sink.offer(failure("lost")).is_ok());
        drop(first);

        assert!(sink.offer(failure("nobody")).is_err());
        assert!(timeout(Duration::from_millis(50), stats.recv())
            .await
            .is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_recv_ends_when_stopped() -> TestResult {
        let (_sink, mut stats, stop) = channel();

        let consumer = tokio::spawn(async move { stats.recv().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        stop.send_replace(true);

        assert!(consumer.await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_stop_signal_reports_state() {
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut signal = StopSignal::new(stop_rx);

        assert!(!signal.is_stopped());

        stop_tx.send_replace(true);
        signal.stopped().await;

        assert!(signal.is_stopped());
    }
}
