//! Lazy, restartable address and port range enumeration.
//!
//! This crate implements the "target enumeration" half of a rate-paced
//! fan-out client: parsing compact textual specs like `10.0.0.0/24` or
//! `22,80,8000-8100` into iterators that, together, walk the Cartesian
//! product of addresses and ports in a fixed, predictable order — addresses
//! as the outer loop, ports as the inner loop — without ever materializing
//! more than one range's worth of state at a time.

mod addr;
mod addr_iter;
mod addr_spec;
mod error;
mod port;
mod port_spec;

pub use addr::{Address, Direction};
pub use addr_iter::AddrRange;
pub use addr_spec::AddrSpec;
pub use error::ParseError;
pub use port::{parse_port, PortRange};
pub use port_spec::PortSpec;
