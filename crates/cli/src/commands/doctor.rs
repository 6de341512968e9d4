use docquote_core::config::{AppConfig, LoadOptions};
use docquote_core::domain::quote::SectionSelection;
use docquote_core::errors::DomainError;
use docquote_core::pricing::catalog::Catalog;
use docquote_core::pricing::constraints::{validate_form, QuoteForm};
use docquote_core::pricing::{DeterministicPricingEngine, PricingEngine};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = vec![check_catalog_integrity(&Catalog::default())];

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_pricing_sanity(&config));
            checks.push(check_assisted_fill(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["pricing_sanity", "assisted_fill_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // Assisted fill is optional, so a skipped credential check does not fail the run.
    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog_integrity(catalog: &Catalog) -> DoctorCheck {
    let issues = catalog.integrity_issues();
    if issues.is_empty() {
        DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Pass,
            details: format!("{} sections in {} groups", catalog.len(), catalog.groups().len()),
        }
    } else {
        DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Fail,
            details: issues.join("; "),
        }
    }
}

/// Prices a one-section reference quote and checks the numbers hold together.
fn check_pricing_sanity(config: &AppConfig) -> DoctorCheck {
    let engine = DeterministicPricingEngine::new(config.pricing);
    let form = QuoteForm {
        area: Some("100".to_string()),
        object_type: Some("Частный дом".to_string()),
        stage: Some("РД".to_string()),
        urgency: Some("Стандартные сроки".to_string()),
        sections: vec![SectionSelection::enabled("pz")],
    };

    let priced = validate_form(&form)
        .map_err(DomainError::from)
        .and_then(|request| engine.price(&request));
    let quote = match priced {
        Ok(quote) => quote,
        Err(error) => {
            return DoctorCheck {
                name: "pricing_sanity",
                status: CheckStatus::Fail,
                details: format!("reference quote failed: {error}"),
            };
        }
    };

    let rate = config.pricing.full_hourly_rate();
    let totals = quote.totals;
    let consistent = rate > Decimal::ZERO
        && totals.total_client_final >= config.pricing.minimum_price
        && totals.total_client_final >= totals.total_client_before_floor;

    if consistent {
        DoctorCheck {
            name: "pricing_sanity",
            status: CheckStatus::Pass,
            details: format!(
                "full hourly rate {rate}, reference quote {}",
                totals.total_client_final
            ),
        }
    } else {
        DoctorCheck {
            name: "pricing_sanity",
            status: CheckStatus::Fail,
            details: format!(
                "inconsistent reference quote: rate {rate}, before floor {}, final {}",
                totals.total_client_before_floor, totals.total_client_final
            ),
        }
    }
}

fn check_assisted_fill(config: &AppConfig) -> DoctorCheck {
    if config.llm.has_credentials() {
        DoctorCheck {
            name: "assisted_fill_readiness",
            status: CheckStatus::Pass,
            details: format!("credential present for model `{}`", config.llm.model),
        }
    } else {
        DoctorCheck {
            name: "assisted_fill_readiness",
            status: CheckStatus::Skipped,
            details: "no API key configured; assisted fill is disabled".to_string(),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
