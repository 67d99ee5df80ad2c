use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{EntitlementError, Result};
use crate::tier::Tier;

/// Sentinel for "unlimited" quotas. Anything at or above it renders as unbounded.
pub const UNBOUNDED: u32 = 9999;

/// Quotas and capability flags attached to one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub max_services: u32,
    pub max_photos: u32,
    /// Percentage taken from each booking. Configuration only.
    pub commission_rate: f64,
    pub has_financial_dashboard: bool,
    pub has_custom_domain: bool,
    pub has_team_management: bool,
    pub has_ai_reports: bool,
}

impl Limits {
    /// Shipped limits for `tier`.
    pub fn builtin(tier: Tier) -> Self {
        match tier {
            Tier::Free => Self {
                max_services: 5,
                max_photos: 10,
                commission_rate: 0.0,
                has_financial_dashboard: false,
                has_custom_domain: false,
                has_team_management: false,
                has_ai_reports: false,
            },
            Tier::Pro => Self {
                max_services: UNBOUNDED,
                max_photos: UNBOUNDED,
                commission_rate: 0.0,
                has_financial_dashboard: true,
                has_custom_domain: true,
                has_team_management: false,
                has_ai_reports: true,
            },
            Tier::Business => Self {
                max_services: UNBOUNDED,
                max_photos: UNBOUNDED,
                commission_rate: 0.0,
                has_financial_dashboard: true,
                has_custom_domain: true,
                has_team_management: true,
                has_ai_reports: true,
            },
        }
    }

    pub fn services_unbounded(&self) -> bool {
        self.max_services >= UNBOUNDED
    }

    pub fn photos_unbounded(&self) -> bool {
        self.max_photos >= UNBOUNDED
    }

    /// Whether this record grants `capability` outright. Quota capabilities
    /// are relative to another tier and are never granted outright.
    pub fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::FinancialDashboard => self.has_financial_dashboard,
            Capability::CustomDomain => self.has_custom_domain,
            Capability::TeamManagement => self.has_team_management,
            Capability::AiReports => self.has_ai_reports,
            Capability::MoreServices | Capability::MorePhotos => false,
        }
    }

    fn flags(&self) -> [(&'static str, bool); 4] {
        [
            ("has_financial_dashboard", self.has_financial_dashboard),
            ("has_custom_domain", self.has_custom_domain),
            ("has_team_management", self.has_team_management),
            ("has_ai_reports", self.has_ai_reports),
        ]
    }
}

/// Something an upgrade can unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    MoreServices,
    MorePhotos,
    FinancialDashboard,
    CustomDomain,
    TeamManagement,
    AiReports,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::MoreServices,
        Capability::MorePhotos,
        Capability::FinancialDashboard,
        Capability::CustomDomain,
        Capability::TeamManagement,
        Capability::AiReports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MoreServices => "more-services",
            Self::MorePhotos => "more-photos",
            Self::FinancialDashboard => "financial-dashboard",
            Self::CustomDomain => "custom-domain",
            Self::TeamManagement => "team-management",
            Self::AiReports => "ai-reports",
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, Self::MoreServices | Self::MorePhotos)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = EntitlementError;

    /// Accepts kebab-case names as well as the record's field names in
    /// camelCase or snake_case (`hasAIReports`, `max_services`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let key = key.strip_prefix("has").unwrap_or(&key);
        match key {
            "moreservices" | "maxservices" | "services" => Ok(Self::MoreServices),
            "morephotos" | "maxphotos" | "photos" => Ok(Self::MorePhotos),
            "financialdashboard" => Ok(Self::FinancialDashboard),
            "customdomain" => Ok(Self::CustomDomain),
            "teammanagement" => Ok(Self::TeamManagement),
            "aireports" => Ok(Self::AiReports),
            _ => Err(EntitlementError::UnknownCapability(s.to_string())),
        }
    }
}

/// Raw tier -> limits mapping as read from configuration. May be incomplete
/// or inconsistent until [`LimitsTable::validate`] passes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Limits>",
    into = "BTreeMap<String, Limits>"
)]
pub struct LimitsTable {
    entries: BTreeMap<Tier, Limits>,
}

impl LimitsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The plan table the product ships with.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for tier in Tier::ALL {
            table.insert(tier, Limits::builtin(tier));
        }
        table
    }

    pub fn insert(&mut self, tier: Tier, limits: Limits) -> Option<Limits> {
        self.entries.insert(tier, limits)
    }

    pub fn remove(&mut self, tier: Tier) -> Option<Limits> {
        self.entries.remove(&tier)
    }

    pub fn limits_for(&self, tier: Tier) -> Result<&Limits> {
        self.entries
            .get(&tier)
            .ok_or(EntitlementError::MissingTier(tier))
    }

    /// Checks totality, commission range and monotonicity, in tier order.
    pub fn validate(&self) -> Result<()> {
        for tier in Tier::ALL {
            let limits = self.limits_for(tier)?;
            let rate = limits.commission_rate;
            if !(0.0..=100.0).contains(&rate) {
                return Err(EntitlementError::CommissionOutOfRange { tier, rate });
            }
        }

        for pair in Tier::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            let lo = self.limits_for(lower)?;
            let hi = self.limits_for(higher)?;

            let not_monotonic = |field| EntitlementError::NotMonotonic {
                lower,
                higher,
                field,
            };
            if hi.max_services < lo.max_services {
                return Err(not_monotonic("max_services"));
            }
            if hi.max_photos < lo.max_photos {
                return Err(not_monotonic("max_photos"));
            }
            for ((field, lo_flag), (_, hi_flag)) in lo.flags().into_iter().zip(hi.flags()) {
                if lo_flag && !hi_flag {
                    return Err(not_monotonic(field));
                }
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, &Limits)> {
        self.entries.iter().map(|(t, l)| (*t, l))
    }
}

impl TryFrom<BTreeMap<String, Limits>> for LimitsTable {
    type Error = EntitlementError;

    fn try_from(raw: BTreeMap<String, Limits>) -> Result<Self> {
        let mut table = Self::new();
        for (name, limits) in raw {
            let tier: Tier = name.parse()?;
            // `FREE` and `free` name the same tier
            if table.insert(tier, limits).is_some() {
                return Err(EntitlementError::DuplicateTier(tier));
            }
        }
        Ok(table)
    }
}

impl From<LimitsTable> for BTreeMap<String, Limits> {
    fn from(table: LimitsTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|(tier, limits)| (tier.to_string(), limits))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        LimitsTable::builtin().validate().unwrap();
    }

    #[test]
    fn test_missing_tier_is_config_error() {
        let mut table = LimitsTable::builtin();
        table.remove(Tier::Pro);
        let err = table.limits_for(Tier::Pro).unwrap_err();
        assert!(matches!(err, EntitlementError::MissingTier(Tier::Pro)));
        assert!(err.is_config());
        assert!(matches!(
            table.validate(),
            Err(EntitlementError::MissingTier(Tier::Pro))
        ));
    }

    #[test]
    fn test_commission_out_of_range() {
        let mut table = LimitsTable::builtin();
        let mut free = table.limits_for(Tier::Free).unwrap().clone();
        free.commission_rate = 120.0;
        table.insert(Tier::Free, free);
        assert!(matches!(
            table.validate(),
            Err(EntitlementError::CommissionOutOfRange { tier: Tier::Free, .. })
        ));
    }

    #[test]
    fn test_nan_commission_rejected() {
        let mut table = LimitsTable::builtin();
        let mut pro = table.limits_for(Tier::Pro).unwrap().clone();
        pro.commission_rate = f64::NAN;
        table.insert(Tier::Pro, pro);
        assert!(table.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_flag_regression_rejected() {
        let mut table = LimitsTable::builtin();
        let mut business = table.limits_for(Tier::Business).unwrap().clone();
        business.has_ai_reports = false;
        table.insert(Tier::Business, business);
        match table.validate() {
            Err(EntitlementError::NotMonotonic { lower, higher, field }) => {
                assert_eq!(lower, Tier::Pro);
                assert_eq!(higher, Tier::Business);
                assert_eq!(field, "has_ai_reports");
            }
            other => panic!("expected NotMonotonic, got {other:?}"),
        }
    }

    #[test]
    fn test_quota_regression_rejected() {
        let mut table = LimitsTable::builtin();
        let mut pro = table.limits_for(Tier::Pro).unwrap().clone();
        pro.max_photos = 3;
        table.insert(Tier::Pro, pro);
        assert!(matches!(
            table.validate(),
            Err(EntitlementError::NotMonotonic { field: "max_photos", .. })
        ));
    }

    #[test]
    fn test_duplicate_tier_key_rejected() {
        let mut raw = BTreeMap::new();
        raw.insert("PRO".to_string(), Limits::builtin(Tier::Pro));
        raw.insert("pro".to_string(), Limits::builtin(Tier::Free));
        let err = LimitsTable::try_from(raw).unwrap_err();
        assert!(matches!(err, EntitlementError::DuplicateTier(Tier::Pro)));
        assert!(err.is_config());
    }

    #[test]
    fn test_capability_parsing() {
        assert_eq!(
            "hasFinancialDashboard".parse::<Capability>().unwrap(),
            Capability::FinancialDashboard
        );
        assert_eq!("has_ai_reports".parse::<Capability>().unwrap(), Capability::AiReports);
        assert_eq!("hasAIReports".parse::<Capability>().unwrap(), Capability::AiReports);
        assert_eq!("more-services".parse::<Capability>().unwrap(), Capability::MoreServices);
        assert_eq!("maxPhotos".parse::<Capability>().unwrap(), Capability::MorePhotos);
        assert!("teleportation".parse::<Capability>().is_err());
        for cap in Capability::ALL {
            assert_eq!(cap.as_str().parse::<Capability>().unwrap(), cap);
        }
    }
}
