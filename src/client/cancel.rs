use std::sync::Arc;
use tokio::sync::watch;

/// Cooperative cancellation for an in-flight request.
///
/// Cancelling aborts the pending transport call or backoff sleep of every
/// request holding a clone of this token.
#[derive(Debug, Clone)]
pub struct CancelToken {
  tx: Arc<watch::Sender<bool>>,
  rx: watch::Receiver<bool>,
}

impl Default for CancelToken {
  fn default() -> Self {
    Self::new()
  }
}

impl CancelToken {
  pub fn new() -> Self {
    let (tx, rx) = watch::channel(false);
    Self {
      tx: Arc::new(tx),
      rx,
    }
  }

  pub fn cancel(&self) {
    self.tx.send_replace(true);
  }

  pub fn is_cancelled(&self) -> bool {
    *self.rx.borrow()
  }

  /// Resolves once `cancel` has been called on any clone.
  pub async fn cancelled(&self) {
    let mut rx = self.rx.clone();
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
      // The sender lives as long as any clone, so this never fires in practice.
      std::future::pending::<()>().await;
    }
  }
}
