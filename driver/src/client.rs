use std::cell::RefCell;
use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::error::EndpointError;

/// Socket type to dial for every target in a run. TLS, and anything above
/// raw TCP/UDP, is out of scope — see the crate's read validator for the
/// one hook this library gives a caller into the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proto {
    Tcp,
    Udp,
}

/// What a [`crate::Client`]'s `read_validator` decides about the bytes
/// buffered so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Terminate the connection without ever calling `on_read`.
    Incorrect,
    /// Wait for more bytes; `on_read` is not called yet.
    Incomplete,
    /// Hand the buffered bytes to `on_read`.
    Ok,
}

type EndpointCallback = Box<dyn FnMut(&mut Endpoint)>;
type ErrorCallback = Box<dyn FnMut(&mut Endpoint, &EndpointError)>;
type ReadValidatorFn = Box<dyn FnMut(&[u8]) -> Validation>;

/// Protocol callback set. Every field is optional; an endpoint that has no
/// reason to read anything simply never sets `on_read`, and the driver skips
/// the read loop for it entirely.
#[derive(Default)]
pub struct Callbacks {
    pub on_established: Option<EndpointCallback>,
    pub on_read: Option<EndpointCallback>,
    pub on_eof: Option<EndpointCallback>,
    pub on_timeout: Option<EndpointCallback>,
    pub on_error: Option<ErrorCallback>,
}

/// A fan-out run's behavior: protocol, pacing, and the callbacks that see
/// every endpoint through its lifecycle.
///
/// Callbacks live behind a `RefCell` because every in-flight endpoint future
/// shares the same `Client` (via `Rc`) and calls into them one at a time —
/// the event loop is single-threaded and cooperative, so there is never a
/// concurrent borrow, only a re-entrant one if a callback itself tried to
/// call back into the client, which none of them have a reason to do.
pub struct Client {
    pub proto: Proto,
    /// Ticks per second the driver wakes to dispatch new connections.
    /// `0` means unlimited (paced only by `connects_per_tick`/`max_concurrent`,
    /// or not at all if those are also `0`).
    pub tick_rate: u32,
    /// Max `connect` calls issued per tick. `0` means unlimited.
    pub connects_per_tick: u32,
    /// Max number of endpoints alive at once. `0` means unlimited.
    pub max_concurrent: u32,
    /// Inactivity timeout applied to connect, read, and write. `Duration::ZERO` disables it.
    pub io_timeout: Duration,
    pub callbacks: RefCell<Callbacks>,
    pub read_validator: Option<RefCell<ReadValidatorFn>>,
}

impl Client {
    pub fn new(proto: Proto) -> Self {
        Client {
            proto,
            tick_rate: 0,
            connects_per_tick: 0,
            max_concurrent: 0,
            io_timeout: Duration::ZERO,
            callbacks: RefCell::new(Callbacks::default()),
            read_validator: None,
        }
    }

    pub fn tick_rate(mut self, hz: u32) -> Self {
        self.tick_rate = hz;
        self
    }

    pub fn connects_per_tick(mut self, n: u32) -> Self {
        self.connects_per_tick = n;
        self
    }

    pub fn max_concurrent(mut self, n: u32) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn on_established(self, cb: impl FnMut(&mut Endpoint) + 'static) -> Self {
        self.callbacks.borrow_mut().on_established = Some(Box::new(cb));
        self
    }

    pub fn on_read(self, cb: impl FnMut(&mut Endpoint) + 'static) -> Self {
        self.callbacks.borrow_mut().on_read = Some(Box::new(cb));
        self
    }

    pub fn on_eof(self, cb: impl FnMut(&mut Endpoint) + 'static) -> Self {
        self.callbacks.borrow_mut().on_eof = Some(Box::new(cb));
        self
    }

    pub fn on_timeout(self, cb: impl FnMut(&mut Endpoint) + 'static) -> Self {
        self.callbacks.borrow_mut().on_timeout = Some(Box::new(cb));
        self
    }

    pub fn on_error(self, cb: impl FnMut(&mut Endpoint, &EndpointError) + 'static) -> Self {
        self.callbacks.borrow_mut().on_error = Some(Box::new(cb));
        self
    }

    pub fn read_validator(mut self, validator: impl FnMut(&[u8]) -> Validation + 'static) -> Self {
        self.read_validator = Some(RefCell::new(Box::new(validator)));
        self
    }

    pub(crate) fn wants_reads(&self) -> bool {
        self.callbacks.borrow().on_read.is_some()
    }
}
