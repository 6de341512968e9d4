use serde::Serialize;
use serde_json::{Map, Value};

use docquote_core::domain::coefficient::{
    AutomationLevel, Coefficient, Complexity, DetailLevel, ObjectType, Stage, Urgency,
};
use docquote_core::domain::quote::SectionSelection;
use docquote_core::domain::section::SectionDefinition;
use docquote_core::pricing::catalog::Catalog;

use crate::llm::AdvisoryError;

/// Normalized model output. Every label is guaranteed to exist in its
/// vocabulary; anything the model made up has already been dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub object_type: Option<ObjectType>,
    pub stage: Option<Stage>,
    pub urgency: Option<Urgency>,
    /// Suggested sections in catalog order.
    pub sections: Vec<SuggestedSection>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SuggestedSection {
    pub key: &'static str,
    pub title: &'static str,
    pub group: &'static str,
    pub enabled: bool,
    pub complexity: Complexity,
    pub detail: Option<DetailLevel>,
    pub automation: Option<AutomationLevel>,
}

impl Suggestion {
    pub fn section(&self, key: &str) -> Option<&SuggestedSection> {
        self.sections.iter().find(|section| section.key == key)
    }

    /// Selections that pre-fill the form. They still go through the strict
    /// engine path, so a missing detail or automation level is reported there.
    pub fn selections(&self) -> Vec<SectionSelection> {
        self.sections
            .iter()
            .map(|section| SectionSelection {
                key: section.key.to_string(),
                enabled: section.enabled,
                complexity: Some(section.complexity.label().to_string()),
                detail: section.detail.map(|detail| detail.label().to_string()),
                automation: section.automation.map(|level| level.label().to_string()),
            })
            .collect()
    }
}

/// Stage 2: the text inside the envelope must itself be a JSON document.
/// A surrounding markdown code fence is tolerated.
pub fn parse_embedded_json(text: &str) -> Result<Value, AdvisoryError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|error| AdvisoryError::EmbeddedJson(error.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (`json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Keeps only what the catalog and vocabularies recognize.
///
/// Project labels are kept when valid, else left unset. Sections are visited
/// in catalog order; unknown keys in the reply are ignored. An unrecognized
/// complexity quietly becomes the base level, while detail and automation are
/// kept only for sections that use them.
///
/// The reply must be an object, and `sections` and each present section entry
/// must be objects too (falsy values count as absent). Anything else is a
/// [`AdvisoryError::Schema`].
pub fn normalize(catalog: &Catalog, raw: &Value) -> Result<Suggestion, AdvisoryError> {
    let Some(reply) = raw.as_object() else {
        return Err(AdvisoryError::Schema(format!(
            "expected a JSON object, got {}",
            kind(raw)
        )));
    };

    let empty = Map::new();
    let sections = match reply.get("sections") {
        Some(Value::Object(sections)) => sections,
        Some(other) if truthy(other) => {
            return Err(AdvisoryError::Schema(format!(
                "`sections` must be an object, got {}",
                kind(other)
            )));
        }
        _ => &empty,
    };

    let mut suggested = Vec::new();
    for section in catalog.sections() {
        match sections.get(section.key) {
            Some(Value::Object(entry)) if !entry.is_empty() => {
                suggested.push(normalize_section(section, entry));
            }
            Some(other) if !other.is_object() && truthy(other) => {
                return Err(AdvisoryError::Schema(format!(
                    "section `{}` must be an object, got {}",
                    section.key,
                    kind(other)
                )));
            }
            _ => {}
        }
    }

    Ok(Suggestion {
        object_type: recognized(reply.get("object_type")),
        stage: recognized(reply.get("stage")),
        urgency: recognized(reply.get("urgency")),
        sections: suggested,
    })
}

fn normalize_section(
    section: &'static SectionDefinition,
    entry: &Map<String, Value>,
) -> SuggestedSection {
    let enabled = entry.get("enabled").map_or(true, truthy);
    let complexity = recognized(entry.get("complexity")).unwrap_or_default();
    let detail = if section.uses_detail { recognized(entry.get("detail")) } else { None };
    let automation =
        if section.uses_automation { recognized(entry.get("automation")) } else { None };

    SuggestedSection {
        key: section.key,
        title: section.title,
        group: section.group,
        enabled,
        complexity,
        detail,
        automation,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn recognized<C: Coefficient>(value: Option<&Value>) -> Option<C> {
    value.and_then(Value::as_str).and_then(C::from_label)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
