use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::quote::{QuoteRequest, SectionSelection};
use crate::errors::ValidationError;

/// Largest floor area accepted, m². Keeps decimal arithmetic far from overflow.
pub const MAX_AREA: i64 = 10_000_000;

/// Unvalidated quote input as typed by a user: area is free text, project
/// labels may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteForm {
    #[serde(default, deserialize_with = "deserialize_area")]
    pub area: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionSelection>,
}

/// Checks user-level input and produces a request the engine can price.
///
/// Only presence and shape are checked here. Whether a label exists in its
/// vocabulary is decided by the engine.
pub fn validate_form(form: &QuoteForm) -> Result<QuoteRequest, ValidationError> {
    let area = parse_area(form.area.as_deref())?;
    let object_type = required(form.object_type.as_deref(), ValidationError::MissingObjectType)?;
    let stage = required(form.stage.as_deref(), ValidationError::MissingStage)?;
    let urgency = required(form.urgency.as_deref(), ValidationError::MissingUrgency)?;

    Ok(QuoteRequest { area, object_type, stage, urgency, sections: form.sections.clone() })
}

/// Parses a floor area, accepting `,` as the decimal separator.
pub fn parse_area(raw: Option<&str>) -> Result<Decimal, ValidationError> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingArea);
    }

    let normalized = trimmed.replace(',', ".");
    let area = Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|_| ValidationError::InvalidArea(trimmed.to_string()))?;

    if area <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveArea);
    }
    if area > Decimal::from(MAX_AREA) {
        return Err(ValidationError::AreaTooLarge { max: Decimal::from(MAX_AREA) });
    }

    Ok(area)
}

fn required(value: Option<&str>, missing: ValidationError) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(missing),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AreaInput {
    Text(String),
    Number(f64),
}

fn deserialize_area<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<AreaInput>::deserialize(deserializer)?;
    Ok(value.map(|input| match input {
        AreaInput::Text(text) => text,
        AreaInput::Number(number) => number.to_string(),
    }))
}
