// src/version/mod.rs

//! Version handling and range matching for package dependencies
//!
//! Versions are dotted sequences of non-negative integers ("1", "2.0",
//! "10.4.1"). The total order is tuple comparison: equal-length prefixes
//! compare elementwise, and a shorter version that is a prefix of a longer
//! one compares as less (no zero-padding is assumed).

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// A parsed version: an ordered tuple of non-negative integers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    parts: Vec<u64>,
}

impl Version {
    /// Parse a dotted version string.
    ///
    /// Every dot-separated component must be a non-empty decimal numeral;
    /// anything else is `MalformedVersion`.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::MalformedVersion(s.to_string()));
        }
        let mut parts = Vec::new();
        for component in s.split('.') {
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::MalformedVersion(s.to_string()));
            }
            let n = component
                .parse::<u64>()
                .map_err(|_| Error::MalformedVersion(s.to_string()))?;
            parts.push(n);
        }
        Ok(Self { parts })
    }

    /// The numeric components of this version
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for n in &self.parts {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", n)?;
            first = false;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A name plus optional version bounds with a shared inclusivity flag.
///
/// A range with no bounds matches every version of that name. The literal
/// forms are `name`, `name=V`, `name<V`, `name>V`, `name<=V`, `name>=V`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRange {
    pub name: String,
    pub minimum: Option<Version>,
    pub maximum: Option<Version>,
    pub inclusive: bool,
}

/// Valid characters for a package name
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.'
}

impl PackageRange {
    /// A bare range that matches every version of `name`
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            minimum: None,
            maximum: None,
            inclusive: false,
        }
    }

    /// Parse a range expression.
    ///
    /// Malformed comparator combinations (`=<`, `<>`, `>>`, ...) and empty
    /// names or versions are rejected as `MalformedRange` rather than
    /// guessed at.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let name_end = bytes
            .iter()
            .position(|&b| b == b'<' || b == b'>' || b == b'=')
            .unwrap_or(bytes.len());
        let name = &s[..name_end];
        if name.is_empty() || !name.bytes().all(is_name_byte) {
            return Err(Error::MalformedRange(s.to_string()));
        }

        let rest = &s[name_end..];
        if rest.is_empty() {
            return Ok(Self::any(name));
        }

        // Comparator is the leading run of <, >, = characters; only five
        // combinations are legal.
        let op_len = rest
            .bytes()
            .position(|b| b != b'<' && b != b'>' && b != b'=')
            .unwrap_or(rest.len());
        let (op, version_str) = rest.split_at(op_len);
        let version =
            Version::parse(version_str).map_err(|_| Error::MalformedRange(s.to_string()))?;

        let (minimum, maximum, inclusive) = match op {
            "=" => (Some(version.clone()), Some(version), true),
            "<" => (None, Some(version), false),
            "<=" => (None, Some(version), true),
            ">" => (Some(version), None, false),
            ">=" => (Some(version), None, true),
            _ => return Err(Error::MalformedRange(s.to_string())),
        };

        Ok(Self {
            name: name.to_string(),
            minimum,
            maximum,
            inclusive,
        })
    }

    /// Check whether a version falls inside this range's bounds
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(min) = &self.minimum {
            let ok = if self.inclusive {
                min <= version
            } else {
                min < version
            };
            if !ok {
                return false;
            }
        }
        if let Some(max) = &self.maximum {
            let ok = if self.inclusive {
                version <= max
            } else {
                version < max
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for PackageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match (&self.minimum, &self.maximum) {
            (None, None) => Ok(()),
            (Some(min), Some(_)) => write!(f, "={}", min),
            (Some(min), None) => {
                write!(f, ">{}{}", if self.inclusive { "=" } else { "" }, min)
            }
            (None, Some(max)) => {
                write!(f, "<{}{}", if self.inclusive { "=" } else { "" }, max)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse_simple() {
        assert_eq!(v("1.2.3").parts(), &[1, 2, 3]);
        assert_eq!(v("10").parts(), &[10]);
        assert_eq!(v("0.0").parts(), &[0, 0]);
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        for bad in ["", "1..2", ".1", "1.", "1.a", "a", "1.2-3", "-1"] {
            assert!(
                matches!(Version::parse(bad), Err(Error::MalformedVersion(_))),
                "expected rejection of {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_version_order_is_tuple_order() {
        assert!(v("1.2") < v("1.10"));
        assert!(v("1.2") < v("1.2.0"));
        assert!(v("2") > v("1.99.99"));
        assert_eq!(v("3.0"), v("3.0"));
    }

    #[test]
    fn test_version_order_transitive() {
        let a = v("1.0");
        let b = v("1.0.1");
        let c = v("1.1");
        assert!(a < b && b < c);
        assert!(a < c);
    }

    #[test]
    fn test_version_display_round_trip() {
        for s in ["1", "1.2.3", "0.10.0"] {
            assert_eq!(v(s).to_string(), s);
        }
    }

    #[test]
    fn test_range_parse_bare_name() {
        let r = PackageRange::parse("libfoo").unwrap();
        assert_eq!(r.name, "libfoo");
        assert!(r.minimum.is_none() && r.maximum.is_none());
        assert!(r.contains(&v("0.1")));
        assert!(r.contains(&v("99")));
    }

    #[test]
    fn test_range_parse_exact() {
        let r = PackageRange::parse("a=1.0").unwrap();
        assert!(r.contains(&v("1.0")));
        assert!(!r.contains(&v("1.0.0")));
        assert!(!r.contains(&v("1.1")));
    }

    #[test]
    fn test_range_exclusive_bounds() {
        let gt = PackageRange::parse("a>1.0").unwrap();
        assert!(!gt.contains(&v("1.0")));
        assert!(gt.contains(&v("1.0.1")));

        let lt = PackageRange::parse("a<2.0").unwrap();
        assert!(lt.contains(&v("1.9")));
        assert!(!lt.contains(&v("2.0")));
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let ge = PackageRange::parse("a>=1.0").unwrap();
        assert!(ge.contains(&v("1.0")));
        assert!(!ge.contains(&v("0.9")));

        let le = PackageRange::parse("a<=2.0").unwrap();
        assert!(le.contains(&v("2.0")));
        assert!(!le.contains(&v("2.0.1")));
    }

    #[test]
    fn test_range_rejects_malformed_comparators() {
        for bad in ["a=<1.0", "a<>1.0", "a>>1.0", "a==1.0", "a=", "=1.0", "a<1..0"] {
            assert!(
                matches!(PackageRange::parse(bad), Err(Error::MalformedRange(_))),
                "expected rejection of {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_range_display() {
        assert_eq!(PackageRange::parse("a").unwrap().to_string(), "a");
        assert_eq!(PackageRange::parse("a=1.0").unwrap().to_string(), "a=1.0");
        assert_eq!(PackageRange::parse("a>=1.0").unwrap().to_string(), "a>=1.0");
        assert_eq!(PackageRange::parse("a<2").unwrap().to_string(), "a<2");
    }
}
