//! Built-in check library.
//!
//! Checks read well-known case attributes. Scenarios without an entry here
//! run the generic sequence.

use chrono::NaiveDate;
use serde_json::Value;

use super::check::{CheckContext, CheckOutcome, CheckSpec, ScenarioDefinition, Severity};
use super::errors::CheckExecutionError;
use super::step::StepStatus;
use crate::domain::sop::{DenialCode, SopDocument};

pub const GENERIC_SCENARIO: &str = "generic";
pub const GENERIC_TITLE: &str = "Standard Pre-Screening";

const DEFAULT_STATE_DAY_LIMIT: f64 = 30.0;
const DEFAULT_FILING_WINDOW_DAYS: f64 = 60.0;

/// Ordered checks for a known scenario.
pub fn checks_for(scenario: &str, sop: &SopDocument) -> Option<Vec<CheckSpec>> {
    let checks = match scenario {
        "build-days" => build_days(sop),
        "precertification" => precertification(),
        "cob" => coordination_of_benefits(),
        "provider-eligibility" => provider_eligibility(sop),
        "duplicate-claim-same-day" => duplicate_claim(sop),
        "split-bill-overlap" => split_bill_overlap(sop),
        "timely-filing-appeal" => timely_filing(),
        _ => return None,
    };
    Some(checks)
}

/// Definition used when nothing in the catalog matches a case.
pub fn generic_definition() -> ScenarioDefinition {
    ScenarioDefinition::new(GENERIC_SCENARIO, SopDocument::titled(GENERIC_TITLE), generic_checks())
}

fn code(sop: &SopDocument, code: &str, fallback: &str) -> DenialCode {
    sop.denial_code(code)
        .cloned()
        .unwrap_or_else(|| DenialCode::new(code, fallback))
}

fn parse_date(check: &str, field: &str, raw: &str) -> Result<NaiveDate, CheckExecutionError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        CheckExecutionError::failed(check, format!("{} '{}' is not a YYYY-MM-DD date: {}", field, raw, e))
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Scenario checks
// ════════════════════════════════════════════════════════════════════════════════

fn build_days(sop: &SopDocument) -> Vec<CheckSpec> {
    vec![
        CheckSpec::new(
            "day_comparison",
            "Assess patient days vs. authorized days",
            "Utilization Management API",
            |ctx| {
                let case = ctx.case;
                let (Some(billed), Some(authorized)) =
                    (case.number("build_days"), case.number("authorized_days"))
                else {
                    return Ok(CheckOutcome::advisory(
                        "Billed or authorized day counts unavailable; compare manually",
                    ));
                };
                if billed > authorized {
                    return Ok(CheckOutcome::advisory(format!(
                        "Billed {} days exceed {} authorized days by {}",
                        billed,
                        authorized,
                        billed - authorized
                    ))
                    .with_detail("excess_days", billed - authorized));
                }
                Ok(CheckOutcome::pass("Billed days within authorization")
                    .with_detail("billed_days", billed)
                    .with_detail("authorized_days", authorized))
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "state_day_limit",
            "Verify build-in patient days against state limits",
            "State Regulations Service",
            |ctx| {
                let case = ctx.case;
                let limit = case.number("state_day_limit").unwrap_or(DEFAULT_STATE_DAY_LIMIT);
                match case.number("build_days") {
                    Some(billed) if billed > limit => Ok(CheckOutcome::advisory(format!(
                        "Billed {} days exceed the {}-day state limit",
                        billed, limit
                    ))
                    .with_detail("state_limit", limit)),
                    _ => Ok(CheckOutcome::pass("Within state day limit").with_detail("state_limit", limit)),
                }
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "provider_eligibility",
            "Check provider eligibility and effective dates",
            "Provider Registry",
            |ctx| match ctx.case.flag("provider_eligible") {
                Some(true) => Ok(CheckOutcome::pass("Provider eligible for billed dates")),
                Some(false) => Ok(CheckOutcome::fail("Provider not eligible for billed dates")),
                None => Ok(CheckOutcome::advisory("Provider eligibility not on file; verify manually")),
            },
        )
        .with_denial_code(code(sop, "N24", "Charges covered under a capitation agreement/managed care plan")),
        CheckSpec::new(
            "itemized_bill",
            "Verify itemized bill documentation",
            "Document Service",
            |ctx| match ctx.case.flag("itemized_bill") {
                Some(true) => Ok(CheckOutcome::pass("Itemized bill on file")),
                _ => Ok(CheckOutcome::fail("Itemized bill missing")),
            },
        )
        .with_denial_code(code(sop, "N26", "Missing itemized bill or statement")),
    ]
}

fn precertification() -> Vec<CheckSpec> {
    vec![
        CheckSpec::new(
            "claim_type",
            "Identify claim type and surgery type",
            "Claims Data API",
            |ctx| {
                let case = ctx.case;
                let claim_type = case.text("claim_type");
                let surgery_type = case.text("surgery_type");
                if claim_type.is_none() && surgery_type.is_none() {
                    return Ok(CheckOutcome::advisory("Claim type and surgery type not recorded"));
                }
                let mut outcome = CheckOutcome::pass(format!(
                    "Claim type {}, surgery type {}",
                    claim_type.unwrap_or("unknown"),
                    surgery_type.unwrap_or("none")
                ));
                if let Some(t) = claim_type {
                    outcome = outcome.with_detail("claim_type", t);
                }
                Ok(outcome)
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "admission_type",
            "Check admission type",
            "Claims Data API",
            |ctx| match ctx.case.number("admission_type") {
                Some(t) if t == 1.0 => Ok(CheckOutcome::pass(
                    "Type 1 admission; precertification required",
                )
                .with_detail("required", true)),
                Some(t) => Ok(CheckOutcome::pass(format!(
                    "Type {} admission; precertification not required",
                    t
                ))
                .with_detail("required", false)),
                None => Ok(CheckOutcome::advisory("Admission type not recorded")),
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "revenue_codes",
            "Verify revenue codes (45X or 7BX)",
            "Claims Data API",
            |ctx| {
                let codes = ctx.case.texts("revenue_codes");
                let qualifying: Vec<&String> = codes
                    .iter()
                    .filter(|c| {
                        let upper = c.trim().to_ascii_uppercase();
                        upper.starts_with("45") || upper.starts_with("7B")
                    })
                    .collect();
                if qualifying.is_empty() {
                    return Ok(CheckOutcome::advisory("No 45X or 7BX revenue code on claim"));
                }
                Ok(CheckOutcome::pass(format!(
                    "Qualifying revenue codes: {}",
                    qualifying.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
                )))
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "precert_document",
            "Verify precertification document on file",
            "Document Service",
            |ctx| {
                let required = ctx.prior_detail("admission_type", "required") == Some(&Value::Bool(true));
                if !required {
                    return Ok(CheckOutcome::pass("No precertification needed"));
                }
                match ctx.case.flag("precert_on_file") {
                    Some(true) => Ok(CheckOutcome::pass("Precertification on file")),
                    _ => Ok(CheckOutcome::fail(
                        "Precertification required for Type 1 admission but not on file",
                    )),
                }
            },
        ),
    ]
}

fn coordination_of_benefits() -> Vec<CheckSpec> {
    vec![
        CheckSpec::new(
            "ssn",
            "Verify member SSN availability",
            "Member Eligibility API",
            |ctx| {
                if ctx.case.has("ssn") {
                    Ok(CheckOutcome::pass("Member SSN available for external eligibility query"))
                } else {
                    Ok(CheckOutcome::advisory(
                        "Member SSN unavailable; external eligibility query limited",
                    ))
                }
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "other_coverage",
            "Coordinate with secondary/tertiary payers",
            "COB Registry",
            |ctx| {
                let case = ctx.case;
                match case.text("secondary_payer") {
                    Some(payer) if case.flag("cob_coordinated") != Some(true) => Ok(CheckOutcome::fail(
                        format!("Secondary payer {} on file; coordination of benefits pending", payer),
                    )
                    .with_detail("secondary_payer", payer)),
                    Some(payer) => Ok(CheckOutcome::pass(format!("Benefits coordinated with {}", payer))),
                    None => Ok(CheckOutcome::pass("No other coverage on file")),
                }
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "medicare",
            "Update member profile with Medicare data",
            "Member Eligibility API",
            |ctx| {
                let case = ctx.case;
                if case.flag("medicare_eligible") == Some(true) && !case.has("medicare_id") {
                    return Ok(CheckOutcome::advisory(
                        "Medicare eligibility indicated without MCR identifier",
                    ));
                }
                Ok(CheckOutcome::pass("Medicare data consistent"))
            },
        )
        .with_severity(Severity::Warning),
    ]
}

fn provider_eligibility(sop: &SopDocument) -> Vec<CheckSpec> {
    let n24 = code(sop, "N24", "Charges covered under a capitation agreement/managed care plan");
    vec![
        CheckSpec::new(
            "provider_identified",
            "Identify provider from claim",
            "Provider Registry",
            |ctx| match &ctx.case.provider {
                Some(provider) if !provider.trim().is_empty() => {
                    Ok(CheckOutcome::pass(format!("Provider {} identified", provider)))
                }
                _ => Ok(CheckOutcome::fail("Provider not identified on claim")),
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "eligibility_status",
            "Verify provider eligibility status",
            "Provider Registry",
            |ctx| match ctx.case.flag("provider_eligible") {
                Some(true) => Ok(CheckOutcome::pass("Provider eligible")),
                Some(false) => Ok(CheckOutcome::fail("Provider not eligible")),
                None => Ok(CheckOutcome::advisory("Provider eligibility not on file; verify manually")),
            },
        )
        .with_denial_code(n24.clone()),
        CheckSpec::new(
            "effective_date",
            "Compare date of service against effective date",
            "Provider Registry",
            |ctx| {
                const CHECK: &str = "Compare date of service against effective date";
                let case = ctx.case;
                let (Some(dos), Some(effective)) =
                    (case.text("date_of_service"), case.text("provider_effective_date"))
                else {
                    return Ok(CheckOutcome::advisory(
                        "Date of service or provider effective date unavailable",
                    ));
                };
                let dos = parse_date(CHECK, "date_of_service", dos)?;
                let effective = parse_date(CHECK, "provider_effective_date", effective)?;
                if dos < effective {
                    return Ok(CheckOutcome::fail(format!(
                        "Date of service {} precedes provider effective date {}",
                        dos, effective
                    )));
                }
                Ok(CheckOutcome::pass("Date of service on or after provider effective date"))
            },
        )
        .with_denial_code(n24),
    ]
}

fn duplicate_claim(sop: &SopDocument) -> Vec<CheckSpec> {
    vec![
        CheckSpec::new(
            "duplicate_match",
            "Identify potential duplicate by member, provider, date of service and procedure",
            "Claims History API",
            |ctx| match ctx.case.text("duplicate_of") {
                Some(original) => Ok(CheckOutcome::pass(format!("Potential duplicate of {}", original))
                    .with_detail("duplicate_of", original)),
                None => Ok(CheckOutcome::pass("No matching earlier claim found")),
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "corrected_claim",
            "Check whether the later submission is a corrected claim",
            "Claims History API",
            |ctx| {
                let Some(original) = ctx.case.text("duplicate_of") else {
                    return Ok(CheckOutcome::pass("Not a duplicate submission"));
                };
                if ctx.case.flag("corrected_claim") == Some(true) {
                    return Ok(CheckOutcome::advisory(format!(
                        "Marked as corrected claim; adjust or void original {} and reprocess",
                        original
                    )));
                }
                Ok(CheckOutcome::fail(format!(
                    "True duplicate of {}; maintain denial",
                    original
                )))
            },
        )
        .with_denial_code(code(sop, "CO-18", "Duplicate claim/service")),
    ]
}

fn split_bill_overlap(sop: &SopDocument) -> Vec<CheckSpec> {
    vec![
        CheckSpec::new(
            "overlap",
            "Identify overlapping inpatient dates across related claims",
            "Claims History API",
            |ctx| {
                let case = ctx.case;
                match case.text("overlapping_claim") {
                    Some(other) if case.flag("interim_billing") == Some(true) => {
                        Ok(CheckOutcome::advisory(format!(
                            "Interim billing overlaps {}; confirm against plan policy",
                            other
                        )))
                    }
                    Some(other) => Ok(CheckOutcome::fail(format!("Stay overlaps claim {}", other))
                        .with_detail("overlapping_claim", other)),
                    None => Ok(CheckOutcome::pass("No overlapping stay found")),
                }
            },
        )
        .with_denial_code(code(sop, "CO-18", "Duplicate claim/service")),
        CheckSpec::new(
            "processed_elsewhere",
            "Determine which claim should be paid",
            "Claims History API",
            |ctx| match ctx.case.text("processed_under_claim") {
                Some(other) => Ok(CheckOutcome::fail(format!(
                    "Services already processed under claim {}",
                    other
                ))),
                None => Ok(CheckOutcome::pass("No competing payment found")),
            },
        )
        .with_severity(Severity::Warning)
        .with_denial_code(code(
            sop,
            "N347",
            "Your claim/service has been processed under a more appropriate claim",
        )),
    ]
}

fn timely_filing() -> Vec<CheckSpec> {
    vec![
        CheckSpec::new(
            "filing_window",
            "Verify appeal filed within the filing window",
            "Appeals Tracking API",
            |ctx| {
                let case = ctx.case;
                let window = case.number("filing_window_days").unwrap_or(DEFAULT_FILING_WINDOW_DAYS);
                let Some(elapsed) = case.number("days_since_decision") else {
                    return Ok(CheckOutcome::advisory("Decision date unavailable; filing window unverified"));
                };
                if elapsed > window {
                    return Ok(CheckOutcome::fail(format!(
                        "Appeal filed {} days after decision; exceeds {}-day window",
                        elapsed, window
                    ))
                    .with_detail("days_late", elapsed - window));
                }
                Ok(CheckOutcome::pass(format!("Filed within {}-day window", window)))
            },
        ),
        CheckSpec::new(
            "good_cause",
            "Review good cause for late filing",
            "Appeals Tracking API",
            |ctx| {
                let late = ctx
                    .prior_step("filing_window")
                    .map(|s| s.status == StepStatus::Error)
                    .unwrap_or(false);
                if late && ctx.case.flag("good_cause_documented") == Some(true) {
                    return Ok(CheckOutcome::advisory(
                        "Good cause documented; late filing may be excused",
                    ));
                }
                Ok(CheckOutcome::pass("No good cause review needed"))
            },
        )
        .with_severity(Severity::Warning),
    ]
}

// ════════════════════════════════════════════════════════════════════════════════
// Generic sequence
// ════════════════════════════════════════════════════════════════════════════════

pub fn generic_checks() -> Vec<CheckSpec> {
    vec![
        CheckSpec::new(
            "case_data",
            "Verify case data completeness",
            "Case Record API",
            |ctx| {
                let case = ctx.case;
                let mut missing = Vec::new();
                if case.member.as_deref().map_or(true, |m| m.trim().is_empty()) {
                    missing.push("member");
                }
                if case.provider.as_deref().map_or(true, |p| p.trim().is_empty()) {
                    missing.push("provider");
                }
                if missing.is_empty() {
                    Ok(CheckOutcome::pass("Member and provider present"))
                } else {
                    Ok(CheckOutcome::advisory(format!("Missing {}", missing.join(", "))))
                }
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new("amount", "Validate billed amount", "Case Record API", |ctx| {
            let amount = ctx.case.amount;
            if amount < 0.0 {
                return Ok(CheckOutcome::fail(format!("Billed amount {:.2} is negative", amount)));
            }
            Ok(CheckOutcome::pass(format!("Billed amount {:.2}", amount)).with_detail("amount", amount))
        }),
        CheckSpec::new(
            "line_items",
            "Reconcile line items with billed amount",
            "Claims Data API",
            |ctx| {
                let case = ctx.case;
                if case.line_items.is_empty() {
                    return Ok(CheckOutcome::pass("No line items to reconcile"));
                }
                let total = case.line_item_total();
                if (total - case.amount).abs() > 0.01 {
                    return Ok(CheckOutcome::fail(format!(
                        "Line items total {:.2} but case amount is {:.2}",
                        total, case.amount
                    )));
                }
                Ok(CheckOutcome::pass("Line items reconcile with billed amount"))
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "documentation",
            "Confirm supporting documentation",
            "Document Service",
            |ctx| match ctx.case.flag("documentation_complete") {
                Some(true) => Ok(CheckOutcome::pass("Supporting documentation complete")),
                _ => Ok(CheckOutcome::fail("Supporting documentation missing")),
            },
        )
        .with_severity(Severity::Warning),
        CheckSpec::new(
            "high_value",
            "Escalate high-value undocumented cases",
            "Case Record API",
            |ctx| {
                let undocumented = ctx
                    .prior_step("documentation")
                    .map(|s| s.status != StepStatus::Success)
                    .unwrap_or(false);
                let threshold = ctx.policy.high_value_threshold;
                if undocumented && ctx.case.amount > threshold {
                    return Ok(CheckOutcome::fail(format!(
                        "Amount {:.2} exceeds {:.2} without supporting documentation",
                        ctx.case.amount, threshold
                    )));
                }
                Ok(CheckOutcome::pass("No high-value documentation gap"))
            },
        ),
    ]
}
