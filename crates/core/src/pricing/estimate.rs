use rust_decimal::Decimal;

use crate::domain::coefficient::{
    AutomationLevel, Coefficient, Complexity, DetailLevel, ObjectType, Stage, Urgency,
};
use crate::domain::quote::{AppliedCoefficients, QuoteTotals, SectionResult, SectionSelection};
use crate::domain::section::SectionDefinition;
use crate::errors::{DomainError, ValidationError};
use crate::pricing::rates::FinancialConstants;

/// Estimates one section. `Ok(None)` means the section is not part of this quote.
///
/// `area` must already be validated as positive. Labels are resolved before any
/// arithmetic; choices for axes the section does not use are ignored.
pub fn compute_section_cost(
    section: &SectionDefinition,
    area: Decimal,
    object_type: &str,
    stage: &str,
    urgency: &str,
    selection: &SectionSelection,
    constants: &FinancialConstants,
) -> Result<Option<SectionResult>, DomainError> {
    if !selection.enabled {
        return Ok(None);
    }

    let object_type = ObjectType::resolve(object_type)?;
    let stage = Stage::resolve(stage)?;
    let urgency = Urgency::resolve(urgency)?;

    let complexity = match non_blank(selection.complexity.as_deref()) {
        Some(label) => Complexity::resolve(label).map_err(|error| error.in_section(section.key))?,
        None => Complexity::Base,
    };

    let detail = if section.uses_detail {
        let label = non_blank(selection.detail.as_deref()).ok_or_else(|| {
            ValidationError::MissingDetail {
                key: section.key.to_string(),
                title: section.title.to_string(),
            }
        })?;
        Some(DetailLevel::resolve(label).map_err(|error| error.in_section(section.key))?)
    } else {
        None
    };

    let automation = if section.uses_automation {
        let label = non_blank(selection.automation.as_deref()).ok_or_else(|| {
            ValidationError::MissingAutomation {
                key: section.key.to_string(),
                title: section.title.to_string(),
            }
        })?;
        Some(AutomationLevel::resolve(label).map_err(|error| error.in_section(section.key))?)
    } else {
        None
    };

    let coefficients = AppliedCoefficients {
        object_type: object_type.multiplier(),
        complexity: complexity.multiplier(),
        detail: detail.map_or(Decimal::ONE, Coefficient::multiplier),
        automation: automation.map_or(Decimal::ONE, Coefficient::multiplier),
        stage: stage.multiplier(),
        urgency: urgency.multiplier(),
    };

    let raw_hours = area * section.base_hours_per_area() * coefficients.object_type;
    let combined_multiplier = coefficients.complexity
        * coefficients.detail
        * coefficients.automation
        * coefficients.stage
        * coefficients.urgency;
    let adjusted_hours = (raw_hours * combined_multiplier).ceil();
    let internal_cost = adjusted_hours * constants.full_hourly_rate();
    let client_cost = internal_cost * constants.client_factor();

    Ok(Some(SectionResult {
        key: section.key.to_string(),
        title: section.title.to_string(),
        group: section.group.to_string(),
        raw_hours,
        adjusted_hours,
        combined_multiplier,
        internal_cost,
        client_cost,
        complexity,
        detail,
        automation,
        coefficients,
    }))
}

/// Sums section estimates and applies the minimum price.
pub fn aggregate(
    results: &[SectionResult],
    constants: &FinancialConstants,
) -> Result<QuoteTotals, ValidationError> {
    if results.is_empty() {
        return Err(ValidationError::NoSectionSelected);
    }

    let total_hours = results.iter().map(|result| result.adjusted_hours).sum();
    let total_internal_cost = results.iter().map(|result| result.internal_cost).sum();
    let total_client_before_floor: Decimal = results.iter().map(|result| result.client_cost).sum();
    let total_client_final = total_client_before_floor.max(constants.minimum_price);
    let floor_applied = total_client_before_floor < constants.minimum_price
        && total_client_final == constants.minimum_price;

    Ok(QuoteTotals {
        total_hours,
        total_internal_cost,
        total_client_before_floor,
        total_client_final,
        floor_applied,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
