//! Order creation times.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, serialized as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// A clock set before 1970 reads as the epoch.
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self(elapsed.as_secs())
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }
}

impl TryFrom<String> for UnixTimestamp {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.trim().parse().map(UnixTimestamp)
    }
}

impl From<UnixTimestamp> for String {
    fn from(value: UnixTimestamp) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for UnixTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_as_string() {
        let ts = UnixTimestamp::from_secs(1699999999);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"1699999999\"");
        let back: UnixTimestamp = serde_json::from_str("\"1699999999\"").unwrap();
        assert_eq!(back, ts);
        assert!(serde_json::from_str::<UnixTimestamp>("\"-1\"").is_err());
    }

    #[test]
    fn test_now_is_recent() {
        assert!(UnixTimestamp::now().as_secs() > 1_577_836_800);
    }
}
