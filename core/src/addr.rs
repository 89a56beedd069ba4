use std::cmp::Ordering;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::ParseError;

/// Direction to step an address in, toward some target endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// A parsed, numeric IPv4 or IPv6 address.
///
/// Two addresses are only ever comparable (ordered, steppable toward one
/// another) when they share a family and, for V6, a scope id. Addresses of
/// different families or scopes are not an error to hold side by side, they
/// simply can't be placed on the same number line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    V4(Ipv4Addr),
    V6 { addr: Ipv6Addr, scope_id: u32 },
}

impl Address {
    /// Parse a numeric address, optionally with an IPv6 zone id (`addr%scope`).
    /// No DNS resolution is ever performed.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        if let Some((addr_part, scope_part)) = s.split_once('%') {
            let addr: Ipv6Addr = addr_part
                .parse()
                .map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
            let scope_id: u32 = scope_part
                .parse()
                .map_err(|_| ParseError::InvalidScopeId(scope_part.to_string()))?;
            return Ok(Address::V6 { addr, scope_id });
        }

        if let Ok(addr) = s.parse::<Ipv4Addr>() {
            return Ok(Address::V4(addr));
        }
        if let Ok(addr) = s.parse::<Ipv6Addr>() {
            return Ok(Address::V6 { addr, scope_id: 0 });
        }
        Err(ParseError::InvalidAddress(s.to_string()))
    }

    pub fn is_v4(&self) -> bool {
        matches!(self, Address::V4(_))
    }

    pub fn is_v6(&self) -> bool {
        matches!(self, Address::V6 { .. })
    }

    pub fn scope_id(&self) -> Option<u32> {
        match self {
            Address::V4(_) => None,
            Address::V6 { scope_id, .. } => Some(*scope_id),
        }
    }

    /// Bit width of this family's address space: 32 for V4, 128 for V6.
    pub fn width(&self) -> u32 {
        match self {
            Address::V4(_) => 32,
            Address::V6 { .. } => 128,
        }
    }

    fn bits(&self) -> u128 {
        match self {
            Address::V4(a) => u32::from(*a) as u128,
            Address::V6 { addr, .. } => u128::from(*addr),
        }
    }

    fn with_bits(&self, bits: u128) -> Self {
        match self {
            Address::V4(_) => Address::V4(Ipv4Addr::from(bits as u32)),
            Address::V6 { scope_id, .. } => Address::V6 {
                addr: Ipv6Addr::from(bits),
                scope_id: *scope_id,
            },
        }
    }

    /// True if `self` and `other` share a family (and, for V6, a scope id)
    /// and can therefore be ordered and stepped toward one another.
    pub fn is_comparable_to(&self, other: &Self) -> bool {
        match (self, other) {
            (Address::V4(_), Address::V4(_)) => true,
            (Address::V6 { scope_id: a, .. }, Address::V6 { scope_id: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Ordering between comparable addresses, `None` otherwise.
    pub fn partial_cmp_comparable(&self, other: &Self) -> Option<Ordering> {
        if !self.is_comparable_to(other) {
            return None;
        }
        Some(self.bits().cmp(&other.bits()))
    }

    /// Step one address in `dir`, wrapping at the family's bit width.
    pub fn step(&self, dir: Direction) -> Self {
        let bits = self.bits();
        let width = self.width();
        let mask: u128 = if width == 128 { u128::MAX } else { (1u128 << width) - 1 };
        let stepped = match dir {
            Direction::Up => bits.wrapping_add(1) & mask,
            Direction::Down => bits.wrapping_sub(1) & mask,
        };
        self.with_bits(stepped)
    }

    /// Clear the low `(width - prefix)` bits: the network address of a CIDR block.
    pub fn network(&self, prefix: u32) -> Self {
        let width = self.width();
        let host_bits = width.saturating_sub(prefix.min(width));
        let mask: u128 = if host_bits >= 128 {
            0
        } else {
            !((1u128 << host_bits) - 1)
        };
        self.with_bits(self.bits() & mask)
    }

    /// Set the low `(width - prefix)` bits: the broadcast address of a CIDR block.
    pub fn broadcast(&self, prefix: u32) -> Self {
        let width = self.width();
        let host_bits = width.saturating_sub(prefix.min(width));
        let host_mask: u128 = if host_bits >= 128 {
            u128::MAX
        } else {
            (1u128 << host_bits) - 1
        };
        self.with_bits(self.bits() | host_mask)
    }

    /// Socket-address form at the given port. `scope_id` is preserved for V6.
    pub fn to_socket_addr(&self, port: u16) -> std::net::SocketAddr {
        match self {
            Address::V4(a) => std::net::SocketAddr::from((*a, port)),
            Address::V6 { addr, scope_id } => {
                std::net::SocketAddr::V6(std::net::SocketAddrV6::new(*addr, port, 0, *scope_id))
            }
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::V4(a) => write!(f, "{a}"),
            Address::V6 { addr, scope_id: 0 } => write!(f, "{addr}"),
            Address::V6 { addr, scope_id } => write!(f, "{addr}%{scope_id}"),
        }
    }
}
