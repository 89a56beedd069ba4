use crate::error::ParseError;
use crate::port::PortRange;

const SEPARATORS: [char; 4] = [' ', ',', '\t', '\r'];

fn is_separator(c: char) -> bool {
    SEPARATORS.contains(&c) || c == '\n'
}

/// A comma/whitespace-separated list of port ranges.
///
/// Unlike [`crate::AddrSpec`], every range here is materialized up front and
/// the whole spec is resettable: the connection driver walks the full port
/// spec once per address, so rewinding it has to be cheap and exact.
#[derive(Debug, Clone)]
pub struct PortSpec {
    ranges: Vec<PortRange>,
    range_ix: usize,
}

impl PortSpec {
    pub fn new(specstr: &str) -> Result<Self, ParseError> {
        let mut ranges = Vec::new();
        for token in specstr.split(is_separator) {
            if token.is_empty() {
                continue;
            }
            ranges.push(PortRange::parse(token)?);
        }
        if ranges.is_empty() {
            return Err(ParseError::EmptyPortSpec);
        }
        Ok(PortSpec { ranges, range_ix: 0 })
    }

    pub fn is_expired(&self) -> bool {
        self.range_ix >= self.ranges.len()
    }

    /// Rewind every range to its first value and restart from the first range.
    pub fn reset(&mut self) {
        self.range_ix = 0;
        for r in &mut self.ranges {
            r.reset();
        }
    }

    /// Emit the next port, advancing across range boundaries as needed.
    pub fn next(&mut self) -> Option<u16> {
        if self.is_expired() {
            return None;
        }
        if let Some(p) = self.ranges[self.range_ix].next() {
            return Some(p);
        }
        self.range_ix += 1;
        if self.range_ix >= self.ranges.len() {
            return None;
        }
        self.ranges[self.range_ix].next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_range() {
        let mut s = PortSpec::new("22-24").unwrap();
        let mut out = Vec::new();
        while let Some(p) = s.next() {
            out.push(p);
        }
        assert_eq!(out, vec![22, 23, 24]);
    }

    #[test]
    fn list_of_ranges_and_singletons() {
        let mut s = PortSpec::new("80,80-80").unwrap();
        let mut out = Vec::new();
        while let Some(p) = s.next() {
            out.push(p);
        }
        assert_eq!(out, vec![80, 80]);
    }

    #[test]
    fn reset_replays_identical_sequence() {
        let mut s = PortSpec::new("22,100-102,8080").unwrap();
        let first: Vec<_> = std::iter::from_fn(|| s.next()).collect();
        s.reset();
        let second: Vec<_> = std::iter::from_fn(|| s.next()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![22, 100, 101, 102, 8080]);
    }

    #[test]
    fn empty_spec_is_error() {
        assert!(PortSpec::new("").is_err());
        assert!(PortSpec::new(" ,\t").is_err());
    }

    #[test]
    fn bad_token_fails_whole_spec() {
        assert!(PortSpec::new("22,99999").is_err());
        assert!(PortSpec::new("22,abc").is_err());
    }

    #[test]
    fn is_expired_tracks_exhaustion() {
        let mut s = PortSpec::new("1-2").unwrap();
        assert!(!s.is_expired());
        s.next();
        assert!(!s.is_expired());
        s.next();
        assert!(s.next().is_none());
        assert!(s.is_expired());
    }
}
