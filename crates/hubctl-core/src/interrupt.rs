use std::future::Future;

#[derive(Debug)]
pub struct InterruptedError;

impl std::fmt::Display for InterruptedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interrupted")
    }
}

impl std::error::Error for InterruptedError {}

/// Runs `task` until it finishes or Ctrl+C arrives.
///
/// Waits on the hub have no upper bound of their own, so this is the only
/// way out of a server that never becomes ready or never stops.
///
/// # Errors
/// Returns [`InterruptedError`] on Ctrl+C, otherwise the task's own error.
pub async fn run_interruptible<F, T>(task: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::select! {
        result = task => result,
        _ = tokio::signal::ctrl_c() => Err(InterruptedError.into()),
    }
}
