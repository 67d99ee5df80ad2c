use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EntitlementError;

/// BarberBoss subscription tier, ordered by increasing capability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Starter plan. No card needed.
    #[default]
    Free,
    /// Single barber, unlimited catalog, dashboard and AI reports.
    Pro,
    /// Whole shop: everything in Pro plus team management.
    Business,
}

impl Tier {
    /// Every tier, lowest first.
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Pro, Tier::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Pro => "PRO",
            Self::Business => "BUSINESS",
        }
    }

    /// Position in [`Tier::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Tiers strictly above this one, in ascending order.
    pub fn above(self) -> impl Iterator<Item = Tier> {
        Self::ALL.into_iter().filter(move |t| *t > self)
    }

    pub fn lowest() -> Tier {
        Self::ALL[0]
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FREE" => Ok(Self::Free),
            "PRO" => Ok(Self::Pro),
            "BUSINESS" => Ok(Self::Business),
            _ => Err(EntitlementError::UnknownTier(s.to_string())),
        }
    }
}
