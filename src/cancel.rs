use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::RepositoryError;

/// Runs `operation` until it completes or `cancel` fires.
///
/// A token that is already cancelled fails before `operation` is polled, so
/// nothing reaches the store. Once polled, cancellation only stops the local
/// wait; the store may already have applied the effect.
pub(crate) async fn run_cancellable<T, F>(
    cancel: &CancellationToken,
    operation: F,
) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    if cancel.is_cancelled() {
        return Err(RepositoryError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RepositoryError::Cancelled),
        result = operation => result,
    }
}
