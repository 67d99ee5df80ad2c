use thiserror::Error;

use crate::tier::Tier;

#[derive(Error, Debug)]
pub enum EntitlementError {
    #[error("Configuration error: no limits registered for tier {0}")]
    MissingTier(Tier),

    #[error("Configuration error: tier {0} is configured more than once")]
    DuplicateTier(Tier),

    #[error("Configuration error: commission rate {rate} for tier {tier} is outside 0..=100")]
    CommissionOutOfRange { tier: Tier, rate: f64 },

    #[error("Configuration error: {field} of {higher} is stricter than {field} of {lower}")]
    NotMonotonic {
        lower: Tier,
        higher: Tier,
        field: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    SerializeConfig(#[from] toml::ser::Error),

    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),
}

impl EntitlementError {
    /// True for errors that mean the limits table itself is unusable.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingTier(_)
                | Self::DuplicateTier(_)
                | Self::CommissionOutOfRange { .. }
                | Self::NotMonotonic { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EntitlementError>;
