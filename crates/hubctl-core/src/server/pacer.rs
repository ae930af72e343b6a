use std::future::Future;
use std::time::Duration;

/// Sleeps between polls.
///
/// Production code uses [`TokioPacer`]; tests substitute a pacer that only
/// records the requested durations.
pub trait Pacer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
