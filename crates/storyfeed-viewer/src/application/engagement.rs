//! Fire-and-forget backend calls.

use std::future::Future;

use storyfeed_core::error::DomainError;
use uuid::Uuid;

/// Runs `work` in the background. Failures are logged and never surface to
/// the viewer.
pub(crate) fn dispatch<F>(action: &'static str, story_id: Uuid, work: F)
where
    F: Future<Output = Result<(), DomainError>> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(error) = work.await {
                    tracing::warn!(%error, %story_id, action, "story engagement not recorded");
                }
            });
        }
        Err(_) => {
            tracing::warn!(%story_id, action, "no async runtime, engagement dropped");
        }
    }
}
