//! Abort an in-flight request when its component goes away

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{AbortHandle, Abortable};

use crate::error::PortalError;

/// Shared handle to the one request a component may have outstanding
///
/// Clones share state, so a view can keep a clone and call
/// [`Canceller::cancel`] on teardown while the component awaits.
#[derive(Debug, Clone, Default)]
pub struct Canceller {
    slot: Arc<Mutex<Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    handle: Option<AbortHandle>,
}

impl Canceller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive `future` to completion unless cancelled first
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, PortalError> {
        let (handle, registration) = AbortHandle::new_pair();
        let generation = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            slot.handle = Some(handle);
            slot.generation
        };

        let result = Abortable::new(future, registration).await;

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.generation == generation {
            slot.handle = None;
        }
        result.map_err(|_| PortalError::Cancelled)
    }

    /// Abort the outstanding request; `false` when nothing was running
    pub fn cancel(&self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.handle.take() {
            Some(handle) => {
                handle.abort();
                tracing::debug!("Cancelled in-flight request");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let canceller = Canceller::new();
        let value = canceller.run(async { 7 }).await.unwrap();
        assert_eq!(value, 7);
        assert!(!canceller.is_active());
        assert!(!canceller.cancel());
    }

    #[tokio::test]
    async fn test_cancel_aborts_pending_future() {
        let canceller = Canceller::new();
        let remote = canceller.clone();

        let run = canceller.run(future::pending::<()>());
        let cancel = async move {
            tokio::task::yield_now().await;
            assert!(remote.is_active());
            assert!(remote.cancel());
        };

        let (result, ()) = futures::join!(run, cancel);
        assert!(matches!(result, Err(PortalError::Cancelled)));
        assert!(!canceller.is_active());
    }
}
