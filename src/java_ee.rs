//! Java EE platform versions.
//!
//! Only the ordering matters to the assembly engine: a handful of legacy
//! rules switch on whether the target platform predates 1.4 or 5.

use crate::error::{EarError, Result};
use std::fmt;
use std::str::FromStr;

/// A supported Java EE platform version, ordered oldest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JavaEeVersion {
    /// J2EE 1.3.
    V1_3,
    /// J2EE 1.4.
    V1_4,
    /// Java EE 5.
    V5,
    /// Java EE 6.
    V6,
    /// Java EE 7.
    #[default]
    V7,
    /// Java EE 8.
    V8,
    /// Jakarta EE 9.
    V9,
    /// Jakarta EE 10.
    V10,
}

impl JavaEeVersion {
    /// Every supported version, oldest first.
    pub const ALL: [Self; 8] = [
        Self::V1_3,
        Self::V1_4,
        Self::V5,
        Self::V6,
        Self::V7,
        Self::V8,
        Self::V9,
        Self::V10,
    ];

    /// Return the version string as written in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_3 => "1.3",
            Self::V1_4 => "1.4",
            Self::V5 => "5",
            Self::V6 => "6",
            Self::V7 => "7",
            Self::V8 => "8",
            Self::V9 => "9",
            Self::V10 => "10",
        }
    }
}

impl FromStr for JavaEeVersion {
    type Err = EarError;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|version| version.as_str() == value)
            .ok_or_else(|| EarError::InvalidJavaEeVersion {
                value: value.to_owned(),
                supported: Self::ALL.map(Self::as_str).join(", "),
            })
    }
}

impl fmt::Display for JavaEeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
