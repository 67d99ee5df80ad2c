//! BarberBoss plan entitlements.
//!
//! A fixed table maps each subscription [`Tier`] to its [`Limits`]. The
//! [`EntitlementResolver`] validates that table once and then answers
//! gating questions for the UI: may this account add another service, can
//! it see the financial dashboard, which plan unlocks AI reports.
//!
//! ## Tiers
//! - **FREE** (Starter): 5 services, 10 photos, no dashboard.
//! - **PRO** (R$ 49/mês): unlimited catalog, dashboard, custom link, AI reports.
//! - **BUSINESS** (R$ 129/mês): everything in Pro plus team management.

pub mod catalog;
pub mod config;
pub mod error;
pub mod limits;
pub mod resolver;
pub mod tier;

pub use catalog::{can_purchase, catalog, PlanOffer};
pub use config::Settings;
pub use error::{EntitlementError, Result};
pub use limits::{Capability, Limits, LimitsTable, UNBOUNDED};
pub use resolver::{
    AccountSnapshot, EntitlementResolver, Entitlements, Quota, Section, UpgradePrompt,
};
pub use tier::Tier;
