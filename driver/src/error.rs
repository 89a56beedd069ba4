use thiserror::Error;

/// Fatal to the whole [`crate::connect`] call: the run never starts.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("address spec: {0}")]
    AddrSpec(#[source] fanout_core::ParseError),

    #[error("port spec: {0}")]
    PortSpec(#[source] fanout_core::ParseError),

    #[error("address or port spec enumerates zero targets")]
    EmptyEnumeration,
}

/// Per-endpoint, asynchronous failure. Never stops the driver — only the
/// one endpoint it belongs to.
#[derive(Debug, Error, Clone)]
pub enum EndpointError {
    #[error("i/o error: {0}")]
    Io(String),

    #[error("timed out")]
    Timeout,

    #[error("read validator rejected the response")]
    ValidatorRejected,
}

impl From<std::io::Error> for EndpointError {
    fn from(e: std::io::Error) -> Self {
        EndpointError::Io(e.to_string())
    }
}
