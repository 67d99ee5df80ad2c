use barberboss_cli::{load_resolver, render_check, render_plans, render_unlock, OutputFormat};
use barberboss_entitlements::{AccountSnapshot, Capability, EntitlementResolver, Settings, Tier};

fn resolver() -> EntitlementResolver {
    EntitlementResolver::builtin()
}

// ========================================================================
// plans
// ========================================================================

#[test]
fn test_plans_text_lists_every_tier() {
    let out = render_plans(&resolver(), OutputFormat::Text).unwrap();
    assert!(out.contains("Starter (FREE) - R$ 0"));
    assert!(out.contains("Pro (PRO) - R$ 49/mês"));
    assert!(out.contains("Business (BUSINESS) - R$ 129/mês"));
    assert!(out.contains("services:            ∞"));
    assert!(out.contains("services:            5"));
}

#[test]
fn test_plans_json_parses() {
    let out = render_plans(&resolver(), OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let plans = value.as_array().unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[2]["tier"], "BUSINESS");
    assert_eq!(plans[1]["monthly_price_cents"], 4900);
}

// ========================================================================
// check
// ========================================================================

#[test]
fn test_check_free_at_limit() {
    let snapshot = AccountSnapshot::new(Tier::Free, 5, 3);
    let out = render_check(&resolver(), &snapshot, OutputFormat::Text).unwrap();
    assert!(out.contains("Plan FREE"));
    assert!(out.contains("services: 5 / 5 (limit reached)"));
    assert!(out.contains("photos:   3 / 10 (can add)"));
    assert!(out.contains("more-services -> upgrade to PRO"));
    assert!(out.contains("financial-dashboard -> upgrade to PRO"));
    assert!(out.contains("team-management -> upgrade to BUSINESS"));
    assert!(!out.contains("team\n"));
}

#[test]
fn test_check_negative_counts_clamped() {
    let snapshot = AccountSnapshot::new(Tier::Free, -4, -1);
    let out = render_check(&resolver(), &snapshot, OutputFormat::Text).unwrap();
    assert!(out.contains("services: 0 / 5 (can add)"));
}

#[test]
fn test_check_business_sections_and_no_upgrades() {
    let snapshot = AccountSnapshot::new(Tier::Business, 12, 80);
    let out = render_check(&resolver(), &snapshot, OutputFormat::Text).unwrap();
    assert!(out.contains("sections: dashboard, schedule, services, subscription, team"));
    assert!(!out.contains("Upgrades:"));
}

#[test]
fn test_check_json() {
    let snapshot = AccountSnapshot::new(Tier::Free, 4, 0);
    let out = render_check(&resolver(), &snapshot, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["services"]["allowed"], true);
    assert_eq!(value["services"]["remaining"], 1);
    assert_eq!(value["financial_dashboard"], false);
}

// ========================================================================
// unlock
// ========================================================================

#[test]
fn test_unlock_dashboard_from_free() {
    let out = render_unlock(
        &resolver(),
        Tier::Free,
        Capability::FinancialDashboard,
        OutputFormat::Text,
    )
    .unwrap();
    assert_eq!(out, "Upgrade to PRO to unlock financial-dashboard\n");
}

#[test]
fn test_unlock_already_included() {
    let out = render_unlock(
        &resolver(),
        Tier::Business,
        Capability::TeamManagement,
        OutputFormat::Text,
    )
    .unwrap();
    assert_eq!(out, "BUSINESS already includes team-management\n");
}

#[test]
fn test_unlock_nothing_higher() {
    let out = render_unlock(&resolver(), Tier::Pro, Capability::MorePhotos, OutputFormat::Text)
        .unwrap();
    assert_eq!(out, "No plan above PRO unlocks more-photos\n");
}

#[test]
fn test_unlock_json_null_when_satisfied() {
    let out = render_unlock(
        &resolver(),
        Tier::Business,
        Capability::AiReports,
        OutputFormat::Json,
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(value["unlocked_by"].is_null());
    assert_eq!(value["capability"], "ai-reports");
}

// ========================================================================
// config loading
// ========================================================================

#[test]
fn test_load_missing_file_serves_builtin_plans() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = load_resolver(&dir.path().join("plans.toml")).unwrap();
    assert_eq!(resolver.limits_for(Tier::Free).max_services, 5);
}

#[test]
fn test_load_saved_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plans.toml");
    Settings::default().save(&path).unwrap();
    assert!(load_resolver(&path).unwrap().can_manage_team(Tier::Business));
}

#[test]
fn test_load_refuses_non_monotonic_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plans.toml");
    // FREE now allows more photos than PRO
    let text = Settings::default()
        .to_toml_string()
        .unwrap()
        .replacen("max_photos = 10\n", "max_photos = 10000\n", 1);
    assert!(text.contains("max_photos = 10000"));
    std::fs::write(&path, text).unwrap();

    let err = load_resolver(&path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains(&path.display().to_string()));
    assert!(message.contains("max_photos"));
}

#[test]
fn test_load_refuses_incomplete_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plans.toml");
    let text = Settings::default().to_toml_string().unwrap();
    let free_only = text.split("[plans.PRO]").next().unwrap();
    std::fs::write(&path, free_only).unwrap();

    let err = load_resolver(&path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains(&path.display().to_string()));
    assert!(message.contains("no limits registered for tier PRO"));
}
