use std::future::Future;

use tokio::sync::watch;

use crate::app::{ArticleError, Result};

/// Lifetime of one article view.
///
/// Work started on behalf of the view holds a [`CancelToken`]; cancelling
/// or dropping the scope makes every token resolve, so results are never
/// delivered to a view that is gone.
pub struct ViewScope {
    tx: watch::Sender<bool>,
}

impl ViewScope {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the owning scope is cancelled or dropped.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Run `fut` unless the scope goes away first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(ArticleError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ArticleError::Cancelled),
            output = fut => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_completes_while_scope_alive() {
        let scope = ViewScope::new();
        let token = scope.token();

        let value = token.run(async { 42 }).await.unwrap();
        assert_eq!(value, 42);
        assert!(!scope.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_work() {
        let scope = ViewScope::new();
        let token = scope.token();

        let handle = tokio::spawn(async move {
            token
                .run(tokio::time::sleep(Duration::from_secs(30)))
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        scope.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ArticleError::Cancelled)));
    }

    #[tokio::test]
    async fn test_dropping_scope_cancels_tokens() {
        let scope = ViewScope::new();
        let token = scope.token();
        drop(scope);

        assert!(token.is_cancelled());
        let result = token.run(async { 1 }).await;
        assert!(matches!(result, Err(ArticleError::Cancelled)));
    }

    #[tokio::test]
    async fn test_token_cloned_before_cancel_sees_it() {
        let scope = ViewScope::new();
        let first = scope.token();
        let second = first.clone();

        scope.cancel();
        tokio::time::timeout(Duration::from_secs(1), second.cancelled())
            .await
            .unwrap();
        assert!(first.is_cancelled());
    }
}
