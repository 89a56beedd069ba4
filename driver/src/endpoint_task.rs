use std::rc::Rc;
use std::time::Duration;

use fanout_core::Address;
use tracing::{debug, trace, warn};

use crate::client::{Client, Validation};
use crate::endpoint::{resolve_terminal_event, Endpoint, TerminalEvent};
use crate::error::EndpointError;
use crate::in_flight::InFlightGuard;
use crate::socket::Conn;

const READ_CHUNK: usize = 8192;

/// Runs one endpoint from dial to close. This is the unit of work the event
/// loop's `FuturesUnordered` pool holds; dropping it (on completion, or on
/// `Endpoint::terminate`) is the only "free" this design ever needs.
pub(crate) async fn run_endpoint(client: Rc<Client>, address: Address, port: u16, _guard: InFlightGuard) {
    let target = address.to_socket_addr(port);
    let mut ep = Endpoint::new(address, port);

    let mut conn = match with_timeout(client.io_timeout, Conn::connect(client.proto, target)).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            ep.set_last_error(e.to_string());
            fire_on_error(&client, &mut ep, EndpointError::Io(e.to_string()));
            return;
        }
        Err(_) => {
            ep.set_last_error("connect timed out");
            fire_on_timeout(&client, &mut ep);
            return;
        }
    };

    trace!(%address, port, "established");
    fire_on_established(&client, &mut ep);
    if ep.is_terminated() {
        return;
    }

    let wants_reads = client.wants_reads();

    loop {
        if ep.has_pending_write() {
            let data = ep.take_write();
            match with_timeout(client.io_timeout, conn.write_all(&data)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    ep.set_last_error(e.to_string());
                    terminal(&client, &mut ep, TerminalEvent::Error, Some(EndpointError::Io(e.to_string())));
                    return;
                }
                Err(_) => {
                    ep.set_last_error("write timed out");
                    terminal(&client, &mut ep, TerminalEvent::Timeout, None);
                    return;
                }
            }
        }

        if !wants_reads {
            if ep.has_pending_write() {
                continue;
            }
            return;
        }

        let mut buf = [0u8; READ_CHUNK];
        match with_timeout(client.io_timeout, conn.read(&mut buf)).await {
            Ok(Ok(0)) => {
                terminal(&client, &mut ep, TerminalEvent::Eof, None);
                return;
            }
            Ok(Ok(n)) => {
                ep.push_read(&buf[..n]);
                match run_validator(&client, ep.read()) {
                    Validation::Incorrect => {
                        debug!(%address, port, "read validator rejected response");
                        fire_on_error(&client, &mut ep, EndpointError::ValidatorRejected);
                        return;
                    }
                    Validation::Incomplete => continue,
                    Validation::Ok => {
                        fire_on_read(&client, &mut ep);
                        ep.drain_read();
                        if ep.is_terminated() {
                            return;
                        }
                    }
                }
            }
            Ok(Err(e)) => {
                ep.set_last_error(e.to_string());
                terminal(&client, &mut ep, TerminalEvent::Error, Some(EndpointError::Io(e.to_string())));
                return;
            }
            Err(_) => {
                ep.set_last_error("read timed out");
                terminal(&client, &mut ep, TerminalEvent::Timeout, None);
                return;
            }
        }
    }
}

async fn with_timeout<F, T>(io_timeout: Duration, fut: F) -> Result<T, tokio::time::error::Elapsed>
where
    F: std::future::Future<Output = T>,
{
    if io_timeout.is_zero() {
        Ok(fut.await)
    } else {
        tokio::time::timeout(io_timeout, fut).await
    }
}

fn run_validator(client: &Client, buf: &[u8]) -> Validation {
    match &client.read_validator {
        Some(v) => (v.borrow_mut())(buf),
        None => Validation::Ok,
    }
}

fn fire_on_established(client: &Client, ep: &mut Endpoint) {
    if let Some(cb) = client.callbacks.borrow_mut().on_established.as_mut() {
        cb(ep);
    }
}

fn fire_on_read(client: &Client, ep: &mut Endpoint) {
    if let Some(cb) = client.callbacks.borrow_mut().on_read.as_mut() {
        cb(ep);
    }
}

fn fire_on_eof(client: &Client, ep: &mut Endpoint) {
    if let Some(cb) = client.callbacks.borrow_mut().on_eof.as_mut() {
        cb(ep);
    }
}

fn fire_on_timeout(client: &Client, ep: &mut Endpoint) {
    if let Some(cb) = client.callbacks.borrow_mut().on_timeout.as_mut() {
        cb(ep);
    }
}

fn fire_on_error(client: &Client, ep: &mut Endpoint, err: EndpointError) {
    if let Some(cb) = client.callbacks.borrow_mut().on_error.as_mut() {
        cb(ep, &err);
    } else {
        warn!(address = %ep.address(), port = ep.port(), "{err}");
    }
}

/// Dispatch the user callback matching the resolved terminal event,
/// preserving `error > eof > timeout` when a caller ever needs to resolve
/// more than one flag at a time (see [`resolve_terminal_event`]).
fn terminal(client: &Client, ep: &mut Endpoint, event: TerminalEvent, err: Option<EndpointError>) {
    debug_assert_eq!(
        resolve_terminal_event(
            matches!(event, TerminalEvent::Error),
            matches!(event, TerminalEvent::Eof),
            matches!(event, TerminalEvent::Timeout),
        ),
        Some(event)
    );
    match event {
        TerminalEvent::Error => fire_on_error(client, ep, err.unwrap_or(EndpointError::Timeout)),
        TerminalEvent::Eof => fire_on_eof(client, ep),
        TerminalEvent::Timeout => fire_on_timeout(client, ep),
    }
}
