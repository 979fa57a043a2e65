use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Semantic version of the versioned-hash string format.
///
/// Rendered as `major.minor.patch`. Parsing is strict: exactly three
/// decimal components, no signs, no leading zeros (other than `0` itself).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FormatVersion {
    /// The format version emitted by this release.
    pub const CURRENT: Self = Self::new(1, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for FormatVersion {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| TypeError::InvalidVersion {
            input: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid("expected major.minor.patch"));
        }
        let mut nums = [0u32; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = parse_decimal(part).ok_or_else(|| invalid("components must be decimal integers"))?;
        }
        Ok(Self::new(nums[0], nums[1], nums[2]))
    }
}

/// Parse a canonical unsigned decimal: ASCII digits only, no leading zero
/// unless the value is zero.
pub(crate) fn parse_decimal(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

impl Serialize for FormatVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FormatVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_is_1_0_0() {
        assert_eq!(FormatVersion::CURRENT.to_string(), "1.0.0");
    }

    #[test]
    fn parse_valid() {
        let v: FormatVersion = "2.10.3".parse().unwrap();
        assert_eq!(v, FormatVersion::new(2, 10, 3));
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "1", "1.0", "1.0.0.0", "1..0", "a.b.c", "1.0.-1", "01.0.0", "1.0.0 "] {
            assert!(bad.parse::<FormatVersion>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn ordering() {
        assert!(FormatVersion::new(1, 0, 0) < FormatVersion::new(1, 0, 1));
        assert!(FormatVersion::new(1, 9, 9) < FormatVersion::new(2, 0, 0));
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&FormatVersion::CURRENT).unwrap();
        assert_eq!(json, "\"1.0.0\"");
        let parsed: FormatVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, FormatVersion::CURRENT);
    }
}
