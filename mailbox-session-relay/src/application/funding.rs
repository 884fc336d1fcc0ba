use crate::infrastructure::{self, MailboxTransport};
use futures::channel::oneshot;
use std::sync::Arc;

/// Pre-provision funding units in the background so a later game-start
/// send pays no extra latency.
///
/// A preparation failure only costs future latency: it is logged and
/// reported on the returned channel, never propagated. The receiver
/// resolves `true` on success, `false` on failure.
pub fn spawn_funding_preparation(transport: Arc<dyn MailboxTransport>) -> oneshot::Receiver<bool> {
    let (done_tx, done_rx) = oneshot::channel();

    infrastructure::spawn_detached(async move {
        let prepared = match transport.prepare_funding().await {
            Ok(()) => {
                tracing::debug!("funding prepared");
                true
            }
            Err(err) => {
                tracing::warn!("funding preparation failed: {}", err);
                false
            }
        };

        let _ = done_tx.send(prepared);
    });

    done_rx
}
