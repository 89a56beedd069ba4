use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// One unit of work added to the event loop's in-flight pool by a ticker.
/// Not `Send`: the loop is single-threaded by design (see the crate's
/// module docs), so nothing here needs to cross a thread boundary.
pub type EndpointFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Whether a ticker has more work ahead of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep this ticker registered; call `tick` again after `period()`.
    Continue,
    /// This ticker is finished; the event loop drops it.
    Done,
}

/// A periodic callback dispatcher running at its own rate against a shared
/// event loop. [`crate::ConnectionDriver`] is the only ticker this crate
/// ships, but the trait is the seam a caller could use to register
/// additional periodic work (a progress reporter, say) on the same loop.
pub trait Ticker {
    /// How often the event loop should poll this ticker.
    fn period(&self) -> Duration;

    /// Called once per period. Returns any new work to add to the pool, and
    /// whether this ticker is done.
    fn tick(&mut self) -> (Vec<EndpointFuture>, TickOutcome);
}
