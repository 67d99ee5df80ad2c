//! Plans page: what each tier is called, what it costs and what it lists.

use serde::{Deserialize, Serialize};

use crate::limits::Limits;
use crate::resolver::EntitlementResolver;
use crate::tier::Tier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOffer {
    pub tier: Tier,
    pub name: String,
    /// Monthly price in cents of `currency`.
    pub monthly_price_cents: u32,
    pub currency: String,
    pub features: Vec<String>,
}

impl PlanOffer {
    /// `"R$ 0"` for free plans, `"R$ 49/mês"` or `"R$ 49,90/mês"` otherwise.
    pub fn price_label(&self) -> String {
        let symbol = currency_symbol(&self.currency);
        let whole = self.monthly_price_cents / 100;
        let cents = self.monthly_price_cents % 100;
        if self.monthly_price_cents == 0 {
            format!("{symbol} 0")
        } else if cents == 0 {
            format!("{symbol} {whole}/mês")
        } else {
            format!("{symbol} {whole},{cents:02}/mês")
        }
    }

    pub fn is_free(&self) -> bool {
        self.monthly_price_cents == 0
    }
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "BRL" => "R$",
        "USD" => "$",
        "EUR" => "€",
        other => other,
    }
}

fn plan_name(tier: Tier) -> &'static str {
    match tier {
        Tier::Free => "Starter",
        Tier::Pro => "Pro",
        Tier::Business => "Business",
    }
}

fn monthly_price_cents(tier: Tier) -> u32 {
    match tier {
        Tier::Free => 0,
        Tier::Pro => 4900,
        Tier::Business => 12900,
    }
}

fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{rate:.0}%")
    } else {
        format!("{rate}%")
    }
}

/// Marketing lines for a plan card. Limit-backed lines are derived from
/// `limits` so a custom table never advertises something it does not grant.
fn features(tier: Tier, limits: &Limits) -> Vec<String> {
    let mut lines = Vec::new();
    if tier > Tier::Pro {
        lines.push("Everything in Pro".to_string());
    }

    lines.push(if limits.services_unbounded() {
        "Unlimited services".to_string()
    } else {
        format!("Up to {} services", limits.max_services)
    });
    lines.push(if limits.photos_unbounded() {
        "Unlimited portfolio photos".to_string()
    } else {
        format!("{} portfolio photos", limits.max_photos)
    });
    lines.push(format!(
        "{} fee per booking",
        format_rate(limits.commission_rate)
    ));

    if limits.has_financial_dashboard {
        lines.push("Financial dashboard".to_string());
    } else {
        lines.push("Basic schedule".to_string());
        lines.push("No financial dashboard".to_string());
    }
    if limits.has_custom_domain {
        lines.push("Custom booking link".to_string());
    }
    if limits.has_ai_reports {
        lines.push("AI reports".to_string());
    }
    if limits.has_team_management {
        lines.push("Multiple barbers".to_string());
        lines.push("Commission management".to_string());
    }
    if tier == Tier::Business {
        lines.push("Priority support".to_string());
        lines.push("API access".to_string());
    }
    lines
}

/// Every plan, lowest tier first.
pub fn catalog(resolver: &EntitlementResolver) -> Vec<PlanOffer> {
    Tier::ALL
        .into_iter()
        .map(|tier| PlanOffer {
            tier,
            name: plan_name(tier).to_string(),
            monthly_price_cents: monthly_price_cents(tier),
            currency: "BRL".to_string(),
            features: features(tier, resolver.limits_for(tier)),
        })
        .collect()
}

/// Any higher plan can be bought, and paid accounts can always drop back to
/// the free plan. Other downgrades go through billing.
pub fn can_purchase(current: Tier, target: Tier) -> bool {
    target != current && (target == Tier::lowest() || target > current)
}
