use crate::core::errors::ExchangeError;
use futures_util::future::select_all;
use std::future::{pending, Future};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation and deadline scope for a call
///
/// Cloning is cheap. A derived context observes every cancellation signal of
/// its parent and the earliest deadline in the chain.
#[derive(Debug, Clone, Default)]
pub struct Context {
    signals: Vec<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels the [`Context`] it was created with, and every context derived from it
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let mut ctx = self.clone();
        ctx.signals.push(rx);
        (ctx, CancelHandle { tx: Arc::new(tx) })
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut ctx = self.clone();
        ctx.deadline = Some(ctx.deadline.map_or(deadline, |d| d.min(deadline)));
        ctx
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.signals.iter().any(|rx| *rx.borrow())
    }

    /// Why this context is done, or `None` while it is still live
    pub fn err(&self) -> Option<ExchangeError> {
        if self.is_cancelled() {
            return Some(ExchangeError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ExchangeError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once any cancellation signal fires; never resolves otherwise
    pub async fn cancelled(&self) {
        if self.signals.is_empty() {
            return pending().await;
        }

        let waits = self.signals.iter().cloned().map(|mut rx| {
            Box::pin(async move {
                // a dropped handle can no longer cancel
                if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                    pending::<()>().await;
                }
            })
        });
        select_all(waits).await;
    }

    /// Drive `fut` to completion unless the context is cancelled or expires first
    ///
    /// A context that is already done never polls `fut`.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ExchangeError>
    where
        F: Future<Output = Result<T, ExchangeError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancelled() => Err(ExchangeError::Cancelled),
            () = deadline => Err(ExchangeError::DeadlineExceeded),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_background_runs_future() {
        let ctx = Context::background();
        let value = ctx.run(async { Ok::<_, ExchangeError>(42) }).await.unwrap();
        assert_eq!(value, 42);
        assert!(ctx.err().is_none());
    }

    #[tokio::test]
    async fn test_pre_cancelled_never_polls() {
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let polled = AtomicBool::new(false);
        let result = ctx
            .run(async {
                polled.store(true, Ordering::SeqCst);
                Ok::<_, ExchangeError>(())
            })
            .await;

        assert!(matches!(result, Err(ExchangeError::Cancelled)));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_during_run() {
        let (ctx, handle) = Context::background().with_cancel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, ExchangeError>(())
            })
            .await;
        assert!(matches!(result, Err(ExchangeError::Cancelled)));
    }

    #[tokio::test]
    async fn test_parent_cancel_reaches_child() {
        let (parent, handle) = Context::background().with_cancel();
        let (child, _child_handle) = parent.with_cancel();
        let child = child.with_timeout(Duration::from_secs(60));
        handle.cancel();
        assert!(child.is_cancelled());
        assert!(matches!(child.err(), Some(ExchangeError::Cancelled)));
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, ExchangeError>(())
            })
            .await;
        assert!(matches!(result, Err(ExchangeError::DeadlineExceeded)));
    }

    #[test]
    fn test_earliest_deadline_wins() {
        let now = Instant::now();
        let ctx = Context::background()
            .with_deadline(now + Duration::from_secs(5))
            .with_deadline(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(5)));
    }
}
