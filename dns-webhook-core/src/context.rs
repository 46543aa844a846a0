//! Request-scoped context: trace id, tracing span, cancellation

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

/// Passed explicitly to every core operation.
///
/// The span carries the `trace_id` field; tasks spawned for the request are
/// instrumented with it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    trace_id: Uuid,
    span: tracing::Span,
    cancel: CancelSignal,
}

impl RequestContext {
    /// Fresh trace id, no cancellation.
    pub fn new() -> Self {
        Self::with_trace_id(Uuid::new_v4())
    }

    pub fn with_trace_id(trace_id: Uuid) -> Self {
        Self {
            trace_id,
            span: tracing::info_span!("request", trace_id = %trace_id),
            cancel: CancelSignal::never(),
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub fn cancel(&self) -> &CancelSignal {
        &self.cancel
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation observed by record operations: an explicit flag raised
/// through a [`CancelHandle`], a deadline, or both.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    flag: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    /// Fires once `timeout` has elapsed from now.
    pub fn after(timeout: Duration) -> Self {
        Self::never().with_deadline(Instant::now() + timeout)
    }

    /// Add (or tighten) a deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.as_ref().is_some_and(|rx| *rx.borrow())
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the signal fires; pending forever for [`never`](Self::never).
    pub async fn cancelled(&self) {
        let flag = async {
            match self.flag.clone() {
                // A dropped handle can no longer cancel.
                Some(mut rx) => {
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            () = flag => {}
            () = deadline => {}
        }
    }
}

/// Raises the flag of the signals created with it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (
            Self { tx },
            CancelSignal {
                flag: Some(rx),
                deadline: None,
            },
        )
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_is_not_cancelled() {
        assert!(!CancelSignal::never().is_cancelled());
    }

    #[tokio::test]
    async fn handle_fires_signal() {
        let (handle, signal) = CancelHandle::new();
        assert!(!signal.is_cancelled());
        handle.cancel();
        assert!(signal.is_cancelled());
        assert!(handle.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), signal.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fires() {
        let signal = CancelSignal::after(Duration::from_secs(5));
        assert!(!signal.is_cancelled());
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_never_fires() {
        let (handle, signal) = CancelHandle::new();
        drop(handle);
        let res = tokio::time::timeout(Duration::from_secs(60), signal.cancelled()).await;
        assert!(res.is_err());
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn deadline_only_tightens() {
        let now = Instant::now();
        let signal = CancelSignal::never()
            .with_deadline(now + Duration::from_secs(10))
            .with_deadline(now + Duration::from_secs(20));
        assert_eq!(signal.deadline(), Some(now + Duration::from_secs(10)));
    }

    #[test]
    fn context_carries_trace_id() {
        let id = Uuid::new_v4();
        let ctx = RequestContext::with_trace_id(id);
        assert_eq!(ctx.trace_id(), id);
        assert!(!ctx.cancel().is_cancelled());
    }
}
