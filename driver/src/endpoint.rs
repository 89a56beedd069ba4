use std::any::Any;
use std::borrow::Cow;
use std::net::SocketAddr;

use fanout_core::Address;

/// Which terminal event wins when more than one condition is observed on the
/// same poll. The original design only ever asserted this precedence; this
/// reimplementation makes it an explicit, independently testable function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    Error,
    Eof,
    Timeout,
}

/// `error` beats `eof` beats `timeout` when more than one flag is set at once.
pub fn resolve_terminal_event(error: bool, eof: bool, timeout: bool) -> Option<TerminalEvent> {
    if error {
        Some(TerminalEvent::Error)
    } else if eof {
        Some(TerminalEvent::Eof)
    } else if timeout {
        Some(TerminalEvent::Timeout)
    } else {
        None
    }
}

/// One outbound connection attempt and its lifecycle, as seen by the
/// protocol callbacks.
///
/// Closing an endpoint is never a two-step "free the handle, then free the
/// endpoint" dance: a callback calls [`Endpoint::terminate`], which just
/// flips a flag the driving future checks right after the callback returns.
/// There is nothing left to double-free.
pub struct Endpoint {
    address: Address,
    port: u16,
    read_buf: Vec<u8>,
    write_buf: Vec<u8>,
    closed: bool,
    user_data: Option<Box<dyn Any>>,
    last_error: Option<String>,
}

impl Endpoint {
    pub(crate) fn new(address: Address, port: u16) -> Self {
        Endpoint {
            address,
            port,
            read_buf: Vec::new(),
            write_buf: Vec::new(),
            closed: false,
            user_data: None,
            last_error: None,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.address.to_socket_addr(self.port)
    }

    /// A view of all currently buffered, unconsumed input bytes. The
    /// framework drains them after `on_read` returns.
    pub fn read(&self) -> &[u8] {
        &self.read_buf
    }

    /// Queue bytes for the runtime to flush asynchronously.
    pub fn write(&mut self, data: &[u8]) {
        self.write_buf.extend_from_slice(data);
    }

    /// Close this endpoint once the current callback returns.
    pub fn terminate(&mut self) {
        self.closed = true;
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.closed
    }

    pub(crate) fn push_read(&mut self, data: &[u8]) {
        self.read_buf.extend_from_slice(data);
    }

    pub(crate) fn drain_read(&mut self) {
        self.read_buf.clear();
    }

    pub(crate) fn take_write(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.write_buf)
    }

    pub(crate) fn has_pending_write(&self) -> bool {
        !self.write_buf.is_empty()
    }

    /// Attach arbitrary per-endpoint state. Replaces any previously set data.
    /// Dropped automatically (by `T`'s own `Drop`) when the endpoint is
    /// dropped — the idiomatic replacement for an explicit free callback.
    pub fn set_user_data<T: 'static>(&mut self, data: T) {
        self.user_data = Some(Box::new(data));
    }

    pub fn user_data<T: 'static>(&self) -> Option<&T> {
        self.user_data.as_ref().and_then(|d| d.downcast_ref())
    }

    pub fn user_data_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.user_data.as_mut().and_then(|d| d.downcast_mut())
    }

    pub(crate) fn set_last_error(&mut self, msg: impl Into<String>) {
        self.last_error = Some(msg.into());
    }

    /// A short description of the last socket error, or `"connection
    /// failed"` if none has been recorded yet (e.g. the socket was never
    /// even created).
    pub fn last_error_message(&self) -> Cow<'static, str> {
        match &self.last_error {
            Some(msg) => Cow::Owned(msg.clone()),
            None => Cow::Borrowed("connection failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_beats_eof_and_timeout() {
        assert_eq!(resolve_terminal_event(true, true, true), Some(TerminalEvent::Error));
        assert_eq!(resolve_terminal_event(true, false, true), Some(TerminalEvent::Error));
    }

    #[test]
    fn eof_beats_timeout() {
        assert_eq!(resolve_terminal_event(false, true, true), Some(TerminalEvent::Eof));
    }

    #[test]
    fn timeout_alone() {
        assert_eq!(resolve_terminal_event(false, false, true), Some(TerminalEvent::Timeout));
    }

    #[test]
    fn none_set_is_none() {
        assert_eq!(resolve_terminal_event(false, false, false), None);
    }

    #[test]
    fn user_data_roundtrip() {
        let mut ep = Endpoint::new(Address::parse("10.0.0.1").unwrap(), 80);
        ep.set_user_data(42u32);
        assert_eq!(ep.user_data::<u32>(), Some(&42));
        assert_eq!(ep.user_data::<String>(), None);
        *ep.user_data_mut::<u32>().unwrap() += 1;
        assert_eq!(ep.user_data::<u32>(), Some(&43));
    }

    #[test]
    fn errmsg_defaults_before_any_error_recorded() {
        let ep = Endpoint::new(Address::parse("10.0.0.1").unwrap(), 80);
        assert_eq!(ep.last_error_message(), "connection failed");
    }

    #[test]
    fn terminate_flips_flag() {
        let mut ep = Endpoint::new(Address::parse("10.0.0.1").unwrap(), 80);
        assert!(!ep.is_terminated());
        ep.terminate();
        assert!(ep.is_terminated());
    }
}
