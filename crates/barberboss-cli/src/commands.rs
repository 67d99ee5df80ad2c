//! Rendering for each subcommand. Pure functions so tests need no process.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

use barberboss_entitlements::{
    catalog, AccountSnapshot, Capability, EntitlementResolver, Limits, Settings, Tier, UNBOUNDED,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Loads and validates the plans at `path`. Every query goes through here, so
/// a broken config stops the binary before it answers anything.
pub fn load_resolver(path: &Path) -> Result<EntitlementResolver> {
    Settings::load_from(path)
        .and_then(Settings::into_resolver)
        .with_context(|| format!("invalid plans config {}", path.display()))
}

fn json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn limit_label(limit: u32) -> String {
    if limit >= UNBOUNDED {
        "∞".to_string()
    } else {
        limit.to_string()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn write_limits(out: &mut String, limits: &Limits) -> std::fmt::Result {
    writeln!(out, "  services:            {}", limit_label(limits.max_services))?;
    writeln!(out, "  photos:              {}", limit_label(limits.max_photos))?;
    writeln!(out, "  commission:          {}%", limits.commission_rate)?;
    writeln!(out, "  financial dashboard: {}", yes_no(limits.has_financial_dashboard))?;
    writeln!(out, "  custom domain:       {}", yes_no(limits.has_custom_domain))?;
    writeln!(out, "  team management:     {}", yes_no(limits.has_team_management))?;
    writeln!(out, "  AI reports:          {}", yes_no(limits.has_ai_reports))
}

/// `barberboss plans`
pub fn render_plans(resolver: &EntitlementResolver, format: OutputFormat) -> Result<String> {
    let plans = catalog(resolver);
    if format == OutputFormat::Json {
        return json(&plans);
    }

    let mut out = String::new();
    for plan in &plans {
        writeln!(out, "{} ({}) - {}", plan.name, plan.tier, plan.price_label())?;
        write_limits(&mut out, resolver.limits_for(plan.tier))?;
        for feature in &plan.features {
            writeln!(out, "  * {}", feature)?;
        }
        out.push('\n');
    }
    Ok(out)
}

/// `barberboss check`
pub fn render_check(
    resolver: &EntitlementResolver,
    snapshot: &AccountSnapshot,
    format: OutputFormat,
) -> Result<String> {
    let entitlements = resolver.entitlements(snapshot);
    if format == OutputFormat::Json {
        return json(&entitlements);
    }

    let mut out = String::new();
    writeln!(out, "Plan {}", entitlements.tier)?;
    writeln!(
        out,
        "  services: {} ({})",
        entitlements.services,
        if entitlements.services.allowed { "can add" } else { "limit reached" }
    )?;
    writeln!(
        out,
        "  photos:   {} ({})",
        entitlements.photos,
        if entitlements.photos.allowed { "can add" } else { "limit reached" }
    )?;
    writeln!(out, "  financial dashboard: {}", yes_no(entitlements.financial_dashboard))?;
    writeln!(out, "  custom domain:       {}", yes_no(entitlements.custom_domain))?;
    writeln!(out, "  team management:     {}", yes_no(entitlements.team_management))?;
    writeln!(out, "  AI reports:          {}", yes_no(entitlements.ai_reports))?;

    let sections: Vec<_> = resolver
        .visible_sections(snapshot.tier)
        .iter()
        .map(|s| s.as_str())
        .collect();
    writeln!(out, "  sections: {}", sections.join(", "))?;

    if !entitlements.upgrade_prompts.is_empty() {
        out.push_str("Upgrades:\n");
        for prompt in &entitlements.upgrade_prompts {
            writeln!(out, "  {} -> upgrade to {}", prompt.capability, prompt.tier)?;
        }
    }
    Ok(out)
}

#[derive(Serialize)]
struct UnlockAnswer {
    tier: Tier,
    capability: Capability,
    unlocked_by: Option<Tier>,
}

/// `barberboss unlock`
pub fn render_unlock(
    resolver: &EntitlementResolver,
    tier: Tier,
    capability: Capability,
    format: OutputFormat,
) -> Result<String> {
    let unlocked_by = resolver.next_tier_unlocking(tier, capability);
    if format == OutputFormat::Json {
        return json(&UnlockAnswer {
            tier,
            capability,
            unlocked_by,
        });
    }

    Ok(match unlocked_by {
        Some(next) => format!("Upgrade to {} to unlock {}\n", next, capability),
        None if resolver.limits_for(tier).grants(capability) => {
            format!("{} already includes {}\n", tier, capability)
        }
        None => format!("No plan above {} unlocks {}\n", tier, capability),
    })
}
