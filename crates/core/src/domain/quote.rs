use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::coefficient::{AutomationLevel, Complexity, DetailLevel, ObjectType, Stage, Urgency};

/// Raw per-section choices as submitted by a caller.
///
/// Labels are left as strings: resolving them against the coefficient
/// vocabularies is the pricing engine's job, so an unknown label surfaces as a
/// lookup error naming the section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSelection {
    pub key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub complexity: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub automation: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl SectionSelection {
    pub fn enabled(key: impl Into<String>) -> Self {
        Self { key: key.into(), enabled: true, ..Self::default() }
    }

    pub fn disabled(key: impl Into<String>) -> Self {
        Self { key: key.into(), enabled: false, ..Self::default() }
    }

    pub fn with_complexity(mut self, label: impl Into<String>) -> Self {
        self.complexity = Some(label.into());
        self
    }

    pub fn with_detail(mut self, label: impl Into<String>) -> Self {
        self.detail = Some(label.into());
        self
    }

    pub fn with_automation(mut self, label: impl Into<String>) -> Self {
        self.automation = Some(label.into());
        self
    }
}

/// Validated project parameters plus per-section selections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Floor area in square metres, strictly positive.
    pub area: Decimal,
    pub object_type: String,
    pub stage: String,
    pub urgency: String,
    pub sections: Vec<SectionSelection>,
}

/// Every multiplier that went into a section estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoefficients {
    pub object_type: Decimal,
    pub complexity: Decimal,
    pub detail: Decimal,
    pub automation: Decimal,
    pub stage: Decimal,
    pub urgency: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResult {
    pub key: String,
    pub title: String,
    pub group: String,
    /// `area × base rate × object type multiplier`, unrounded.
    pub raw_hours: Decimal,
    /// Whole hours, rounded up.
    pub adjusted_hours: Decimal,
    pub combined_multiplier: Decimal,
    pub internal_cost: Decimal,
    pub client_cost: Decimal,
    pub complexity: Complexity,
    pub detail: Option<DetailLevel>,
    pub automation: Option<AutomationLevel>,
    pub coefficients: AppliedCoefficients,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub total_hours: Decimal,
    pub total_internal_cost: Decimal,
    pub total_client_before_floor: Decimal,
    pub total_client_final: Decimal,
    pub floor_applied: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub area: Decimal,
    pub object_type: ObjectType,
    pub stage: Stage,
    pub urgency: Urgency,
    pub full_hourly_rate: Decimal,
    pub margin: Decimal,
    pub minimum_price: Decimal,
    pub sections: Vec<SectionResult>,
    pub totals: QuoteTotals,
}
