//! A rate-paced, single-threaded connection driver.
//!
//! Built on [`fanout_core`]'s address/port enumeration, this crate supplies
//! the other half of a fan-out client: a scheduler that pulls targets from
//! an address spec × port spec, opens a non-blocking socket per target at a
//! capped rate and concurrency, and runs a caller-supplied callback set
//! ([`Client`]'s `on_established`/`on_read`/`on_eof`/`on_timeout`/`on_error`)
//! against each one.
//!
//! The event loop is deliberately single-threaded and cooperative (see
//! [`EventLoop`]): it should run on a `tokio` current-thread runtime. Nothing
//! in [`ConnectionDriver`] or [`Endpoint`] synchronizes across threads, and
//! none of it needs to — that simplicity is the point.

mod client;
mod connection_driver;
mod endpoint;
mod endpoint_task;
mod error;
mod event_loop;
mod in_flight;
mod socket;
mod ticker;

use std::rc::Rc;

pub use client::{Callbacks, Client, Proto, Validation};
pub use connection_driver::ConnectionDriver;
pub use endpoint::{resolve_terminal_event, Endpoint, TerminalEvent};
pub use error::{ConnectError, EndpointError};
pub use event_loop::EventLoop;
pub use ticker::{EndpointFuture, TickOutcome, Ticker};

pub use fanout_core::{AddrSpec, Address, ParseError, PortSpec};

/// Parse `addr_spec`/`port_spec`, build a [`ConnectionDriver`] for `client`,
/// and register it with a fresh [`EventLoop`] at the client's tick rate.
///
/// Mirrors the original two-step API: this call only validates and wires
/// things up; nothing connects until the caller awaits `.run()` on the
/// returned loop.
pub fn connect(client: Rc<Client>, addr_spec: &str, port_spec: &str) -> Result<EventLoop, ConnectError> {
    let driver = ConnectionDriver::new(client, addr_spec, port_spec)?;
    let mut event_loop = EventLoop::new();
    event_loop.register(driver);
    Ok(event_loop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::net::TcpListener as StdTcpListener;
    use std::rc::Rc;
    use std::time::Duration;

    /// Scenario 4 from the spec: a local listener answers on one port, a
    /// second port is never listened on, and the driver reports exactly one
    /// `on_established` and one terminal callback for the other.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("fanout_driver=trace").try_init();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn established_fires_once_for_open_port_other_port_times_out_or_errors() {
        init_tracing();
        let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let open_port = listener.local_addr().unwrap().port();
        // accept connections in the background so the handshake completes
        let tokio_listener = tokio::net::TcpListener::from_std(listener).unwrap();
        tokio::task::spawn_local(async move {
            loop {
                if tokio_listener.accept().await.is_err() {
                    break;
                }
            }
        });

        // pick a second port that is very unlikely to be listening
        let closed_port = {
            let probe = StdTcpListener::bind("127.0.0.1:0").unwrap();
            let p = probe.local_addr().unwrap().port();
            drop(probe);
            p
        };

        let established: Rc<RefCell<Vec<u16>>> = Rc::new(RefCell::new(Vec::new()));
        let terminal: Rc<RefCell<Vec<u16>>> = Rc::new(RefCell::new(Vec::new()));

        let established_cb = established.clone();
        let terminal_err = terminal.clone();
        let terminal_eof = terminal.clone();
        let terminal_timeout = terminal.clone();

        let client = Rc::new(
            Client::new(Proto::Tcp)
                .tick_rate(20)
                .io_timeout(Duration::from_millis(300))
                .on_established(move |ep| established_cb.borrow_mut().push(ep.port()))
                .on_error(move |ep, _e| terminal_err.borrow_mut().push(ep.port()))
                .on_eof(move |ep| terminal_eof.borrow_mut().push(ep.port()))
                .on_timeout(move |ep| terminal_timeout.borrow_mut().push(ep.port())),
        );

        let port_spec = format!("{open_port},{closed_port}");
        let event_loop = connect(client, "127.0.0.1", &port_spec).unwrap();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                tokio::time::timeout(Duration::from_secs(5), event_loop.run()).await.unwrap();
            })
            .await;

        assert_eq!(*established.borrow(), vec![open_port]);
        assert_eq!(*terminal.borrow(), vec![closed_port]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rejects_bad_specs_before_any_dispatch() {
        let client = Rc::new(Client::new(Proto::Tcp));
        assert!(connect(client.clone(), "not-an-address", "80").is_err());
        assert!(connect(client, "10.0.0.1", "not-a-port").is_err());
    }
}
