use std::future::poll_fn;
use std::pin::Pin;
use std::task::Poll;

use futures::stream::{FuturesUnordered, Stream};
use tokio::time::{Interval, MissedTickBehavior};

use crate::ticker::{EndpointFuture, TickOutcome, Ticker};

struct TickerSlot {
    interval: Interval,
    ticker: Box<dyn Ticker>,
}

/// Drives any number of [`Ticker`]s (in practice, one [`crate::ConnectionDriver`]
/// per run) and the pool of in-flight endpoint futures they hand it, until
/// every ticker is done and every endpoint has finished.
///
/// Unlike the original design's lazily-initialized, process-global event
/// base, an `EventLoop` here is an owned value: `connect()` returns one, the
/// caller awaits it, and running two side by side is just running two of
/// them — each still expected to live on its own task, since nothing inside
/// synchronizes across threads.
pub struct EventLoop {
    tickers: Vec<TickerSlot>,
    pool: FuturesUnordered<EndpointFuture>,
}

impl EventLoop {
    pub fn new() -> Self {
        EventLoop { tickers: Vec::new(), pool: FuturesUnordered::new() }
    }

    /// Register a ticker. Its first tick fires after one full period, not
    /// immediately — matching the original's `event_add` semantics.
    pub fn register(&mut self, ticker: impl Ticker + 'static) {
        let mut interval = tokio::time::interval(ticker.period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first `tick()` call on a freshly-created interval resolves
        // immediately; skip it so registration doesn't get a free dispatch.
        interval.reset();
        self.tickers.push(TickerSlot { interval, ticker: Box::new(ticker) });
    }

    /// Run until every registered ticker is done and the in-flight pool is
    /// empty.
    pub async fn run(mut self) {
        loop {
            if self.tickers.is_empty() && self.pool.is_empty() {
                return;
            }

            let fired = poll_fn(|cx| {
                for (i, slot) in self.tickers.iter_mut().enumerate() {
                    if slot.interval.poll_tick(cx).is_ready() {
                        return Poll::Ready(Some(i));
                    }
                }
                if !self.pool.is_empty() {
                    if let Poll::Ready(_) = Pin::new(&mut self.pool).poll_next(cx) {
                        return Poll::Ready(None);
                    }
                }
                Poll::Pending
            })
            .await;

            if let Some(i) = fired {
                let (new_work, outcome) = self.tickers[i].ticker.tick();
                for fut in new_work {
                    self.pool.push(fut);
                }
                if outcome == TickOutcome::Done {
                    self.tickers.remove(i);
                }
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
