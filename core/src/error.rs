use thiserror::Error;

/// Failures that can occur while parsing an address or port spec.
///
/// A single bad token fails the whole spec — there is no partial parse.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("not a numeric IPv4/IPv6 address: {0:?}")]
    InvalidAddress(String),

    #[error("IPv6 zone id must be numeric: {0:?}")]
    InvalidScopeId(String),

    #[error("prefix length {0} is out of range for this address family")]
    MaskOutOfRange(u32),

    #[error("trailing characters after prefix length in {0:?}")]
    TrailingMaskChars(String),

    #[error("range endpoints are not comparable (different family or scope id): {0:?}")]
    Incomparable(String),

    #[error("address spec has no valid ranges")]
    EmptyAddrSpec,

    #[error("not a valid port (must be 0-65535): {0:?}")]
    InvalidPort(String),

    #[error("invalid port range: {0:?}")]
    InvalidPortRange(String),

    #[error("port spec has no valid ranges")]
    EmptyPortSpec,
}
