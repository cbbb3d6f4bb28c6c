//! Records-per-second throttle hint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Upper bound on records delivered per second during a scan.
///
/// Zero means unlimited. The value is a hint handed to the database client;
/// nothing in the runner enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordsPerSecond(u32);

impl RecordsPerSecond {
    /// No throttling.
    pub const UNLIMITED: Self = Self(0);

    #[inline]
    pub const fn new(rate: u32) -> Self {
        Self(rate)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_unlimited(self) -> bool {
        self.0 == 0
    }

    /// The ceiling, or `None` when unlimited.
    #[inline]
    pub fn limit(self) -> Option<NonZeroU32> {
        NonZeroU32::new(self.0)
    }
}

impl From<u32> for RecordsPerSecond {
    fn from(rate: u32) -> Self {
        Self(rate)
    }
}

impl fmt::Display for RecordsPerSecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit() {
            Some(rate) => write!(f, "{}/s", rate),
            None => write!(f, "unlimited"),
        }
    }
}

impl FromStr for RecordsPerSecond {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| format!("invalid records-per-second value: {}", s))
    }
}
