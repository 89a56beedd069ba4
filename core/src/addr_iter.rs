use crate::addr::{Address, Direction};
use crate::error::ParseError;

/// Walks a single address range (`A`, `A-B`, or `A/mask`) from its low end
/// toward its high end — or, for a reversed dash range, in whatever
/// direction its two endpoints imply.
///
/// Not cloned or cached by [`crate::AddrSpec`]: tokens are re-parsed into a
/// fresh iterator every time the spec advances past one, so a `/8` doesn't
/// need its 16 million addresses in memory at once.
#[derive(Debug, Clone)]
pub struct AddrRange {
    current: Address,
    end: Address,
    expired: bool,
}

impl AddrRange {
    /// Parse one range token: CIDR (`X/M`), dash range (`X-Y`), or singleton (`X`).
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        if let Some((addr_part, mask_part)) = token.split_once('/') {
            return Self::parse_cidr(addr_part, mask_part, token);
        }
        if let Some((low, high)) = token.split_once('-') {
            return Self::parse_dash(low, high, token);
        }
        let addr = Address::parse(token)?;
        Ok(AddrRange { current: addr, end: addr, expired: false })
    }

    fn parse_cidr(addr_part: &str, mask_part: &str, whole: &str) -> Result<Self, ParseError> {
        if mask_part.is_empty() {
            return Err(ParseError::InvalidAddress(whole.to_string()));
        }
        let mask: u32 = mask_part
            .parse()
            .map_err(|_| ParseError::TrailingMaskChars(whole.to_string()))?;
        let addr = Address::parse(addr_part)?;
        if mask > addr.width() {
            return Err(ParseError::MaskOutOfRange(mask));
        }
        Ok(AddrRange {
            current: addr.network(mask),
            end: addr.broadcast(mask),
            expired: false,
        })
    }

    fn parse_dash(low: &str, high: &str, whole: &str) -> Result<Self, ParseError> {
        if low.is_empty() || high.is_empty() {
            return Err(ParseError::InvalidAddress(whole.to_string()));
        }
        let start = Address::parse(low)?;
        let end = Address::parse(high)?;
        if !start.is_comparable_to(&end) {
            return Err(ParseError::Incomparable(whole.to_string()));
        }
        Ok(AddrRange { current: start, end, expired: false })
    }

    fn step_towards(&mut self) -> bool {
        match self.current.partial_cmp_comparable(&self.end) {
            Some(std::cmp::Ordering::Equal) => false,
            Some(std::cmp::Ordering::Less) => {
                self.current = self.current.step(Direction::Up);
                true
            }
            Some(std::cmp::Ordering::Greater) => {
                self.current = self.current.step(Direction::Down);
                true
            }
            None => unreachable!("AddrRange endpoints are validated comparable at construction"),
        }
    }
}

impl Iterator for AddrRange {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        if self.expired {
            return None;
        }
        let out = self.current;
        if !self.step_towards() {
            self.expired = true;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton() {
        let v: Vec<_> = AddrRange::parse("10.0.0.1").unwrap().collect();
        assert_eq!(v, vec![Address::parse("10.0.0.1").unwrap()]);
    }

    #[test]
    fn cidr_slash_30_has_four_addresses_ascending() {
        let v: Vec<_> = AddrRange::parse("10.0.0.0/30").unwrap().map(|a| a.to_string()).collect();
        assert_eq!(v, vec!["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn cidr_slash_m_yields_2_pow_32_minus_m_addresses() {
        for m in [24u32, 28, 30, 32] {
            let count = AddrRange::parse(&format!("192.168.1.0/{m}")).unwrap().count();
            assert_eq!(count as u128, 1u128 << (32 - m));
        }
    }

    #[test]
    fn mask_zero_is_whole_v4_space_boundaries() {
        let mut it = AddrRange::parse("10.0.0.1/0").unwrap();
        assert_eq!(it.next().unwrap().to_string(), "0.0.0.0");
        // don't materialize all 2^32 — just check the iterator didn't expire immediately
        assert!(!it.expired);
    }

    #[test]
    fn dash_range_ascending() {
        let v: Vec<_> = AddrRange::parse("192.168.0.1-192.168.0.3").unwrap().map(|a| a.to_string()).collect();
        assert_eq!(v, vec!["192.168.0.1", "192.168.0.2", "192.168.0.3"]);
    }

    #[test]
    fn dash_range_symmetry() {
        let fwd: Vec<_> = AddrRange::parse("10.0.0.1-10.0.0.5").unwrap().collect();
        let mut rev: Vec<_> = AddrRange::parse("10.0.0.5-10.0.0.1").unwrap().collect();
        rev.sort_by(|a, b| a.partial_cmp_comparable(b).unwrap());
        let mut fwd_sorted = fwd.clone();
        fwd_sorted.sort_by(|a, b| a.partial_cmp_comparable(b).unwrap());
        assert_eq!(fwd_sorted, rev);
        assert_eq!(fwd.len(), 5);
    }

    #[test]
    fn invalid_mask_rejected() {
        assert!(AddrRange::parse("10.0.0.1/33").is_err());
        assert!(AddrRange::parse("fe80::1/129").is_err());
        assert!(AddrRange::parse("10.0.0.1/abc").is_err());
        assert!(AddrRange::parse("10.0.0.1/24x").is_err());
    }

    #[test]
    fn incomparable_dash_range_rejected() {
        assert!(AddrRange::parse("10.0.0.1-::1").is_err());
        assert!(AddrRange::parse("fe80::1%1-fe80::2%2").is_err());
    }

    #[test]
    fn v6_cidr_small_prefix() {
        let v: Vec<_> = AddrRange::parse("ff02::/126").unwrap().map(|a| a.to_string()).collect();
        assert_eq!(v, vec!["ff02::", "ff02::1", "ff02::2", "ff02::3"]);
    }
}
