use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use fanout_core::{Address, AddrSpec, PortSpec};

use crate::client::Client;
use crate::endpoint_task::run_endpoint;
use crate::error::ConnectError;
use crate::in_flight::InFlightGuard;
use crate::ticker::{EndpointFuture, TickOutcome, Ticker};

const DEFAULT_TICK_HZ: u32 = 2;
const MAX_TICK_HZ: u32 = 1_000_000;

/// Owns an address spec × port spec and, once per tick, dispatches new
/// connection attempts subject to the client's rate and concurrency caps.
///
/// This is the scheduler: it never touches a socket itself, it only decides
/// *when* and *how many* new [`crate::Endpoint`] futures to hand to the
/// event loop.
pub struct ConnectionDriver {
    client: Rc<Client>,
    addr_spec: AddrSpec,
    port_spec: PortSpec,
    current_address: Address,
    in_flight: Rc<Cell<usize>>,
    finished_dispatching: bool,
}

impl ConnectionDriver {
    pub fn new(client: Rc<Client>, addr_spec_str: &str, port_spec_str: &str) -> Result<Self, ConnectError> {
        let mut addr_spec = AddrSpec::new(addr_spec_str).map_err(ConnectError::AddrSpec)?;
        let port_spec = PortSpec::new(port_spec_str).map_err(ConnectError::PortSpec)?;
        let current_address = addr_spec.next().ok_or(ConnectError::EmptyEnumeration)?;

        Ok(ConnectionDriver {
            client,
            addr_spec,
            port_spec,
            current_address,
            in_flight: Rc::new(Cell::new(0)),
            finished_dispatching: false,
        })
    }

    /// Number of endpoints currently alive under this driver.
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    pub fn is_done(&self) -> bool {
        self.finished_dispatching && self.in_flight.get() == 0
    }

    fn tick_hz(&self) -> u32 {
        if self.client.tick_rate == 0 || self.client.tick_rate > MAX_TICK_HZ {
            DEFAULT_TICK_HZ
        } else {
            self.client.tick_rate
        }
    }

    /// Maximum number of connections this tick may open, per the client's
    /// tick-rate / connects-per-tick / max-concurrent caps.
    fn budget(&self) -> usize {
        let cpt = self.client.connects_per_tick as usize;
        let ncc = self.client.max_concurrent as usize;
        let tr = self.client.tick_rate;

        if tr == 0 && cpt == 0 && ncc == 0 {
            return usize::MAX;
        }
        if cpt > 0 && ncc > 0 {
            cpt.min(ncc.saturating_sub(self.in_flight.get()))
        } else if cpt > 0 {
            cpt
        } else {
            ncc.saturating_sub(self.in_flight.get())
        }
    }

    /// Advance the port spec (and, on its exhaustion, the address spec) and
    /// return the next `(address, port)` target, or `None` once both specs
    /// are exhausted.
    fn next_target(&mut self) -> Option<(Address, u16)> {
        loop {
            if let Some(port) = self.port_spec.next() {
                return Some((self.current_address, port));
            }
            match self.addr_spec.next() {
                Some(addr) => {
                    self.current_address = addr;
                    self.port_spec.reset();
                }
                None => return None,
            }
        }
    }

    /// Open up to this tick's budget worth of new connections.
    fn dispatch(&mut self) -> Vec<EndpointFuture> {
        if self.finished_dispatching {
            return Vec::new();
        }

        let mut budget = self.budget();
        let mut out = Vec::new();
        while budget > 0 {
            let Some((address, port)) = self.next_target() else {
                self.finished_dispatching = true;
                break;
            };

            let guard = InFlightGuard::new(self.in_flight.clone());
            out.push(Box::pin(run_endpoint(self.client.clone(), address, port, guard)) as EndpointFuture);
            budget -= 1;
        }
        out
    }
}

impl Ticker for ConnectionDriver {
    fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz() as f64)
    }

    fn tick(&mut self) -> (Vec<EndpointFuture>, TickOutcome) {
        let new_work = self.dispatch();
        let outcome = if self.is_done() { TickOutcome::Done } else { TickOutcome::Continue };
        (new_work, outcome)
    }
}
