//! Connectivity gate applied before every network-dependent operation.
//!
//! The monitor polls a lightweight reachability probe (DNS resolution of the
//! backend host) on a fixed interval. Callers block on
//! [`ConnectivityMonitor::wait_for_online`] until a probe succeeds; once the
//! first interval passes without a result, a cancellable prompt gives the
//! user a way out of the wait.

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{self, BoxFuture, Either, FutureExt};
use thiserror::Error;
use tracing::{debug, warn};

use crate::race::{delay, fail_after, first_some};

/// Interval between reachability probes.
/// 2s keeps the gate responsive without hammering the resolver.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Upper bound on a single DNS probe. A lookup that takes longer counts as a
/// failed attempt; the poll loop will already have started another.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// The user declined to keep waiting for connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("offline: the backend is unreachable and the wait was cancelled")]
pub struct OfflineCancelled;

/// Outcome of the offline prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitDecision {
    /// Keep blocking until the backend becomes reachable.
    KeepWaiting,
    /// Abandon the operation that requested the gate.
    Cancel,
}

/// User-visible escape hatch for a wait that has become noticeable.
#[async_trait]
pub trait OfflinePrompt: Send + Sync {
    /// Present `message` with a cancel affordance. Resolves when the user
    /// reacts; dismissing the prompt means [`WaitDecision::KeepWaiting`].
    async fn offer_cancel(&self, message: &str) -> WaitDecision;
}

/// A single reachability check. `Some(())` means the backend looked
/// reachable.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn check(&self) -> Option<()>;
}

/// Probe that resolves the backend host via DNS.
pub struct DnsProbe {
    host: String,
    port: u16,
}

impl DnsProbe {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl Probe for DnsProbe {
    async fn check(&self) -> Option<()> {
        let lookup = tokio::net::lookup_host((self.host.as_str(), self.port));
        match future::select(pin!(lookup), pin!(fail_after::<()>(PROBE_TIMEOUT))).await {
            Either::Left((Ok(mut addrs), _)) => addrs.next().map(|_| ()),
            Either::Left((Err(err), _)) => {
                debug!(host = %self.host, error = %err, "reachability probe failed");
                None
            }
            Either::Right(_) => {
                debug!(host = %self.host, "reachability probe timed out");
                None
            }
        }
    }
}

/// Polls a [`Probe`] until it reports success, surfacing a cancellable
/// prompt once the wait becomes noticeable.
pub struct ConnectivityMonitor {
    probe: Arc<dyn Probe>,
    interval: Duration,
}

impl ConnectivityMonitor {
    pub fn new(probe: Arc<dyn Probe>) -> Self {
        Self {
            probe,
            interval: POLL_INTERVAL,
        }
    }

    /// Override the poll interval. Mainly useful in tests.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Block until the backend looks reachable or the user cancels the wait.
    ///
    /// Cancellation never surfaces from the poll loop itself: declining to
    /// keep waiting resolves to [`OfflineCancelled`], and it is the caller's
    /// job to abort the surrounding operation.
    pub async fn wait_for_online<P>(
        &self,
        prompt: &P,
        message: &str,
    ) -> Result<(), OfflineCancelled>
    where
        P: OfflinePrompt + ?Sized,
    {
        let mut online = pin!(self.poll_until_online());
        // Decoy timer: if the first probe has not succeeded within one
        // interval, the wait is user-visible and deserves a prompt.
        match future::select(online.as_mut(), pin!(delay(self.interval, ()))).await {
            Either::Left(((), _)) => return Ok(()),
            Either::Right(((), _)) => {}
        }
        debug!("still unreachable after one poll interval, offering cancel");
        match future::select(online.as_mut(), pin!(prompt.offer_cancel(message))).await {
            Either::Left(((), _)) => Ok(()),
            Either::Right((WaitDecision::Cancel, _)) => {
                warn!("connectivity wait cancelled by user");
                Err(OfflineCancelled)
            }
            Either::Right((WaitDecision::KeepWaiting, _)) => {
                online.await;
                Ok(())
            }
        }
    }

    /// Poll loop: one probe per interval. A probe that settles negative
    /// early waits out the rest of its tick; a probe still in flight when
    /// the tick elapses keeps racing alongside the fresh one, so a slow
    /// probe never delays the next scheduling decision.
    async fn poll_until_online(&self) {
        let mut in_flight = self.start_probe();
        loop {
            match future::select(in_flight, pin!(delay(self.interval, ()))).await {
                Either::Left((Some(()), _)) => return,
                Either::Left((None, tick)) => {
                    tick.await;
                    in_flight = self.start_probe();
                }
                Either::Right(((), pending)) => {
                    in_flight = Box::pin(first_some(pending, self.start_probe()));
                }
            }
        }
    }

    fn start_probe(&self) -> BoxFuture<'static, Option<()>> {
        let probe = Arc::clone(&self.probe);
        async move { probe.check().await }.boxed()
    }
}
