use crate::addr::Address;
use crate::addr_iter::AddrRange;
use crate::error::ParseError;

const SEPARATORS: [char; 4] = [' ', ',', '\t', '\r'];

fn is_separator(c: char) -> bool {
    SEPARATORS.contains(&c) || c == '\n'
}

/// A comma/whitespace-separated list of address ranges, enumerated lazily
/// and in order.
///
/// Tokens are recorded as byte offsets into one owned copy of the input
/// string rather than materialized iterators, on purpose: a spec may
/// describe billions of addresses (a `/8`), and only one range's worth of
/// iterator state is ever live at a time.
#[derive(Debug, Clone)]
pub struct AddrSpec {
    source: String,
    tokens: Vec<(usize, usize)>,
    token_ix: usize,
    current: AddrRange,
}

impl AddrSpec {
    /// Parse and validate every token up front; the spec owns a copy of `specstr`.
    pub fn new(specstr: &str) -> Result<Self, ParseError> {
        let source = specstr.to_string();
        let mut tokens = Vec::new();
        let mut start = None;
        for (i, c) in source.char_indices() {
            if is_separator(c) {
                if let Some(s) = start.take() {
                    tokens.push((s, i));
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            tokens.push((s, source.len()));
        }

        // Validate every token eagerly (re-parsed lazily later, but a bad
        // token anywhere fails the whole spec up front).
        for &(s, e) in &tokens {
            AddrRange::parse(&source[s..e])?;
        }

        if tokens.is_empty() {
            return Err(ParseError::EmptyAddrSpec);
        }

        let first = AddrRange::parse(&source[tokens[0].0..tokens[0].1])?;
        tracing::debug!(tokens = tokens.len(), "parsed address spec");
        Ok(AddrSpec { source, tokens, token_ix: 0, current: first })
    }

    /// True once every token has been fully enumerated.
    pub fn is_expired(&self) -> bool {
        self.token_ix >= self.tokens.len()
    }

    fn token_str(&self, ix: usize) -> &str {
        let (s, e) = self.tokens[ix];
        &self.source[s..e]
    }
}

impl Iterator for AddrSpec {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        loop {
            if self.is_expired() {
                return None;
            }
            if let Some(addr) = self.current.next() {
                return Some(addr);
            }
            self.token_ix += 1;
            if self.is_expired() {
                return None;
            }
            self.current = AddrRange::parse(self.token_str(self.token_ix))
                .expect("token was validated at AddrSpec::new");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_token() {
        let v: Vec<_> = AddrSpec::new("10.0.0.1").unwrap().map(|a| a.to_string()).collect();
        assert_eq!(v, vec!["10.0.0.1"]);
    }

    #[test]
    fn comma_and_whitespace_separated() {
        let v: Vec<_> = AddrSpec::new("10.0.0.1, 10.0.0.2\t10.0.0.3\n10.0.0.4")
            .unwrap()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(v, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"]);
    }

    #[test]
    fn chains_cidr_and_dash_tokens() {
        let v: Vec<_> = AddrSpec::new("10.0.0.0/30,192.168.0.1-192.168.0.2")
            .unwrap()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(
            v,
            vec!["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3", "192.168.0.1", "192.168.0.2"]
        );
    }

    #[test]
    fn mixed_v4_v6() {
        let v: Vec<_> = AddrSpec::new("ff02::1-ff02::2,10.2.1.2-10.2.1.3")
            .unwrap()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(v, vec!["ff02::1", "ff02::2", "10.2.1.2", "10.2.1.3"]);
    }

    #[test]
    fn duplicate_singleton_and_cidr_slash_32_both_iterate() {
        let v: Vec<_> = AddrSpec::new("10.0.0.1/32,10.0.0.1").unwrap().map(|a| a.to_string()).collect();
        assert_eq!(v, vec!["10.0.0.1", "10.0.0.1"]);
    }

    #[test]
    fn empty_spec_is_error() {
        assert!(AddrSpec::new("").is_err());
        assert!(AddrSpec::new("   ,\t\n").is_err());
    }

    #[test]
    fn bad_token_anywhere_fails_whole_spec() {
        assert!(AddrSpec::new("10.0.0.1,not-an-address-at-all-99").is_err());
    }

    #[test]
    fn is_expired_after_full_enumeration() {
        let mut spec = AddrSpec::new("10.0.0.1-10.0.0.2").unwrap();
        assert!(!spec.is_expired());
        assert!(spec.next().is_some());
        assert!(!spec.is_expired());
        assert!(spec.next().is_some());
        assert!(spec.next().is_none());
        assert!(spec.is_expired());
        assert!(spec.next().is_none());
    }
}
