//! Entitlement resolution over a validated, immutable limits table.
//!
//! Every query is a pure function of (tier, usage). The resolver holds no
//! account state; callers pass a fresh [`AccountSnapshot`] on each call.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EntitlementError, Result};
use crate::limits::{Capability, Limits, LimitsTable, UNBOUNDED};
use crate::tier::Tier;

/// Answer to "may this account add one more X?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    /// Usage after clamping negatives to zero.
    pub used: u64,
}

impl Quota {
    fn evaluate(limit: u32, current: i64) -> Self {
        let used = current.max(0);
        let remaining = (i64::from(limit) - used).max(0);
        Self {
            allowed: used < i64::from(limit),
            // remaining <= limit, so it always fits
            remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
            limit,
            used: used as u64,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit >= UNBOUNDED
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "{} / ∞", self.used)
        } else {
            write!(f, "{} / {}", self.used, self.limit)
        }
    }
}

/// Caller-owned view of an account at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub tier: Tier,
    pub service_count: i64,
    pub photo_count: i64,
}

impl AccountSnapshot {
    pub fn new(tier: Tier, service_count: i64, photo_count: i64) -> Self {
        Self {
            tier,
            service_count,
            photo_count,
        }
    }
}

/// "Upgrade to `tier` to unlock `capability`."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePrompt {
    pub capability: Capability,
    pub tier: Tier,
}

/// Everything the UI needs to gate one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlements {
    pub tier: Tier,
    pub limits: Limits,
    pub services: Quota,
    pub photos: Quota,
    pub financial_dashboard: bool,
    pub custom_domain: bool,
    pub team_management: bool,
    pub ai_reports: bool,
    pub upgrade_prompts: Vec<UpgradePrompt>,
}

/// Top-level areas of the provider app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Dashboard,
    Schedule,
    Services,
    Subscription,
    Team,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Schedule => "schedule",
            Self::Services => "services",
            Self::Subscription => "subscription",
            Self::Team => "team",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated tier -> limits table plus the gating queries over it.
#[derive(Debug, Clone)]
pub struct EntitlementResolver {
    // indexed by position in Tier::ALL
    limits: [Limits; Tier::ALL.len()],
}

impl EntitlementResolver {
    /// Validates `table` and freezes it. An invalid table never yields a resolver.
    pub fn new(table: LimitsTable) -> Result<Self> {
        if let Err(e) = table.validate() {
            tracing::warn!("Rejecting limits table: {}", e);
            return Err(e);
        }
        let limits = Tier::ALL
            .into_iter()
            .map(|tier| table.limits_for(tier).cloned())
            .collect::<Result<Vec<_>>>()?;
        // one entry per tier, so only a shorter Vec can fail here
        let limits: [Limits; Tier::ALL.len()] = limits
            .try_into()
            .map_err(|short: Vec<Limits>| {
                let missing = Tier::ALL.get(short.len()).copied();
                EntitlementError::MissingTier(missing.unwrap_or_else(Tier::lowest))
            })?;
        tracing::debug!("Entitlement resolver ready with {} tiers", limits.len());
        Ok(Self { limits })
    }

    pub fn builtin() -> Self {
        Self {
            limits: Tier::ALL.map(Limits::builtin),
        }
    }

    pub fn limits_for(&self, tier: Tier) -> &Limits {
        &self.limits[tier.index()]
    }

    /// Limits of the lowest tier, for integrators that degrade instead of failing.
    pub fn most_restrictive(&self) -> &Limits {
        self.limits_for(Tier::lowest())
    }

    pub fn can_add_service(&self, tier: Tier, current_service_count: i64) -> Quota {
        Quota::evaluate(self.limits_for(tier).max_services, current_service_count)
    }

    pub fn can_add_photo(&self, tier: Tier, current_photo_count: i64) -> Quota {
        Quota::evaluate(self.limits_for(tier).max_photos, current_photo_count)
    }

    pub fn can_view_financial_dashboard(&self, tier: Tier) -> bool {
        self.limits_for(tier).has_financial_dashboard
    }

    pub fn can_use_ai_reports(&self, tier: Tier) -> bool {
        self.limits_for(tier).has_ai_reports
    }

    pub fn can_manage_team(&self, tier: Tier) -> bool {
        self.limits_for(tier).has_team_management
    }

    pub fn can_use_custom_domain(&self, tier: Tier) -> bool {
        self.limits_for(tier).has_custom_domain
    }

    /// Cheapest tier above `tier` that unlocks `capability`, or `None` when
    /// `tier` already has it or nothing higher does.
    pub fn next_tier_unlocking(&self, tier: Tier, capability: Capability) -> Option<Tier> {
        let current = self.limits_for(tier);
        if current.grants(capability) {
            return None;
        }
        tier.above().find(|candidate| {
            let limits = self.limits_for(*candidate);
            match capability {
                Capability::MoreServices => limits.max_services > current.max_services,
                Capability::MorePhotos => limits.max_photos > current.max_photos,
                _ => limits.grants(capability),
            }
        })
    }

    pub fn entitlements(&self, snapshot: &AccountSnapshot) -> Entitlements {
        let tier = snapshot.tier;
        let services = self.can_add_service(tier, snapshot.service_count);
        let photos = self.can_add_photo(tier, snapshot.photo_count);
        let limits = self.limits_for(tier).clone();

        let upgrade_prompts = Capability::ALL
            .into_iter()
            .filter(|cap| match cap {
                Capability::MoreServices => !services.allowed,
                Capability::MorePhotos => !photos.allowed,
                _ => !limits.grants(*cap),
            })
            .filter_map(|cap| {
                self.next_tier_unlocking(tier, cap)
                    .map(|tier| UpgradePrompt { capability: cap, tier })
            })
            .collect();

        Entitlements {
            tier,
            services,
            photos,
            financial_dashboard: limits.has_financial_dashboard,
            custom_domain: limits.has_custom_domain,
            team_management: limits.has_team_management,
            ai_reports: limits.has_ai_reports,
            limits,
            upgrade_prompts,
        }
    }

    pub fn visible_sections(&self, tier: Tier) -> Vec<Section> {
        let mut sections = vec![
            Section::Dashboard,
            Section::Schedule,
            Section::Services,
            Section::Subscription,
        ];
        if self.can_manage_team(tier) {
            sections.push(Section::Team);
        }
        sections
    }
}

impl Default for EntitlementResolver {
    fn default() -> Self {
        Self::builtin()
    }
}
