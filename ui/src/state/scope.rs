//! Liveness of a mounted view.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Tracks whether the view that started some asynchronous work is still
/// mounted.
///
/// Clones share the same liveness. The scope is live from creation until
/// [`ViewScope::tear_down`] is called on any clone.
#[derive(Clone, Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn tear_down(&self) {
        self.token.cancel();
    }

    /// Awaits `work` and yields its output only if the scope is still live
    /// once it resolves.
    ///
    /// The work itself is never aborted; only its result is discarded.
    pub async fn settle<T>(&self, work: impl Future<Output = T>) -> Option<T> {
        let output = work.await;
        self.is_live().then_some(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn live_scope_yields_output() {
        let scope = ViewScope::new();
        assert!(scope.is_live());
        assert_eq!(scope.settle(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn output_after_teardown_is_dropped() {
        let scope = ViewScope::new();
        let (tx, rx) = oneshot::channel::<u32>();

        let teardown = scope.clone();
        let (settled, _) = tokio::join!(scope.settle(async { rx.await.unwrap_or_default() }), async move {
            teardown.tear_down();
            let _ = tx.send(42);
        });

        assert_eq!(settled, None);
        assert!(!scope.is_live());
    }
}
