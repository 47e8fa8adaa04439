//! License tiers and their ordering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level an organization holds for one service.
///
/// Ordered `Disabled < Limited < Full`; comparison is purely by ordinal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LicenseTier {
    /// Organization cannot use any license-gated endpoint of the service.
    #[default]
    Disabled,
    /// Read-only or basic features.
    Limited,
    /// Every feature of the service.
    Full,
}

impl LicenseTier {
    /// All tiers in ascending order.
    pub const ALL: [LicenseTier; 3] = [Self::Disabled, Self::Limited, Self::Full];

    /// Numeric ordinal used for comparisons.
    pub const fn ordinal(&self) -> u8 {
        match self {
            Self::Disabled => 0,
            Self::Limited => 1,
            Self::Full => 2,
        }
    }

    /// Wire name (`"disabled"`, `"limited"`, `"full"`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Limited => "limited",
            Self::Full => "full",
        }
    }

    /// Upper-case name used in denial messages.
    pub const fn as_upper(&self) -> &'static str {
        match self {
            Self::Disabled => "DISABLED",
            Self::Limited => "LIMITED",
            Self::Full => "FULL",
        }
    }

    /// Whether holding `self` satisfies a `required` tier.
    pub fn satisfies(&self, required: LicenseTier) -> bool {
        self.ordinal() >= required.ordinal()
    }
}

impl fmt::Display for LicenseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown license tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for LicenseTier {
    type Err = UnknownTier;

    /// Case-sensitive: issuers always emit lowercase names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(Self::Disabled),
            "limited" => Ok(Self::Limited),
            "full" => Ok(Self::Full),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}
