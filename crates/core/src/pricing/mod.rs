pub mod catalog;
pub mod constraints;
pub mod estimate;
pub mod rates;

use std::collections::HashMap;

use crate::domain::coefficient::{Coefficient, ObjectType, Stage, Urgency};
use crate::domain::quote::{Quote, QuoteRequest, SectionSelection};
use crate::errors::{DomainError, LookupError, ValidationError};

use self::{
    catalog::Catalog,
    estimate::{aggregate, compute_section_cost},
    rates::FinancialConstants,
};

pub trait PricingEngine: Send + Sync {
    fn price(&self, request: &QuoteRequest) -> Result<Quote, DomainError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine {
    catalog: Catalog,
    constants: FinancialConstants,
}

impl DeterministicPricingEngine {
    pub fn new(constants: FinancialConstants) -> Self {
        Self { catalog: Catalog::default(), constants }
    }

    pub fn with_catalog(catalog: Catalog, constants: FinancialConstants) -> Self {
        Self { catalog, constants }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn constants(&self) -> &FinancialConstants {
        &self.constants
    }
}

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, request: &QuoteRequest) -> Result<Quote, DomainError> {
        price_quote(&self.catalog, &self.constants, request)
    }
}

/// Prices every enabled section of `request` in catalog order and totals them.
pub fn price_quote(
    catalog: &Catalog,
    constants: &FinancialConstants,
    request: &QuoteRequest,
) -> Result<Quote, DomainError> {
    let object_type = ObjectType::resolve(&request.object_type)?;
    let stage = Stage::resolve(&request.stage)?;
    let urgency = Urgency::resolve(&request.urgency)?;

    let selections = index_selections(catalog, &request.sections)?;

    let mut sections = Vec::new();
    for section in catalog.sections() {
        let Some(selection) = selections.get(section.key) else {
            continue;
        };

        let estimate = compute_section_cost(
            section,
            request.area,
            &request.object_type,
            &request.stage,
            &request.urgency,
            selection,
            constants,
        )?;
        sections.extend(estimate);
    }

    let totals = aggregate(&sections, constants)?;

    Ok(Quote {
        area: request.area,
        object_type,
        stage,
        urgency,
        full_hourly_rate: constants.full_hourly_rate(),
        margin: constants.margin,
        minimum_price: constants.minimum_price,
        sections,
        totals,
    })
}

fn index_selections<'a>(
    catalog: &Catalog,
    selections: &'a [SectionSelection],
) -> Result<HashMap<&'a str, &'a SectionSelection>, DomainError> {
    let mut indexed = HashMap::with_capacity(selections.len());
    for selection in selections {
        if catalog.find(&selection.key).is_none() {
            return Err(LookupError::UnknownSection { key: selection.key.clone() }.into());
        }
        if indexed.insert(selection.key.as_str(), selection).is_some() {
            return Err(ValidationError::DuplicateSection { key: selection.key.clone() }.into());
        }
    }
    Ok(indexed)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            coefficient::{ObjectType, Stage, Urgency},
            quote::{QuoteRequest, SectionSelection},
        },
        errors::{DomainError, LookupError, ValidationError},
        pricing::{rates::FinancialConstants, DeterministicPricingEngine, PricingEngine},
    };

    fn request(sections: Vec<SectionSelection>) -> QuoteRequest {
        QuoteRequest {
            area: Decimal::new(100, 0),
            object_type: "Частный дом".to_string(),
            stage: "РД".to_string(),
            urgency: "Стандартные сроки".to_string(),
            sections,
        }
    }

    #[test]
    fn single_small_section_hits_the_minimum_price() {
        let engine = DeterministicPricingEngine::default();
        let quote = engine.price(&request(vec![SectionSelection::enabled("pz")])).expect("quote");

        assert_eq!(quote.object_type, ObjectType::PrivateHouse);
        assert_eq!(quote.stage, Stage::WorkingDrawings);
        assert_eq!(quote.urgency, Urgency::Standard);
        assert_eq!(quote.sections.len(), 1);
        assert_eq!(quote.totals.total_hours, Decimal::ONE);
        assert_eq!(quote.totals.total_internal_cost, Decimal::new(13_832, 1));
        assert_eq!(quote.totals.total_client_before_floor, Decimal::new(179_816, 2));
        assert_eq!(quote.totals.total_client_final, Decimal::new(35_000, 0));
        assert!(quote.totals.floor_applied);
        assert_eq!(quote.full_hourly_rate, Decimal::new(13_832, 1));
    }

    #[test]
    fn results_follow_catalog_order_not_request_order() {
        let engine = DeterministicPricingEngine::default();
        let quote = engine
            .price(&request(vec![
                SectionSelection::enabled("smeta"),
                SectionSelection::disabled("kr"),
                SectionSelection::enabled("ar").with_detail("Основные чертежи и схемы"),
                SectionSelection::enabled("pz"),
            ]))
            .expect("quote");

        let keys: Vec<&str> = quote.sections.iter().map(|section| section.key.as_str()).collect();
        assert_eq!(keys, vec!["pz", "ar", "smeta"]);
    }

    #[test]
    fn no_enabled_sections_is_a_validation_error() {
        let engine = DeterministicPricingEngine::default();

        let error = engine.price(&request(Vec::new())).expect_err("nothing to price");
        assert_eq!(error, DomainError::Validation(ValidationError::NoSectionSelected));

        let error = engine
            .price(&request(vec![SectionSelection::disabled("pz")]))
            .expect_err("only disabled sections");
        assert_eq!(error, DomainError::Validation(ValidationError::NoSectionSelected));
    }

    #[test]
    fn unknown_and_duplicate_sections_are_rejected() {
        let engine = DeterministicPricingEngine::default();

        let error = engine
            .price(&request(vec![SectionSelection::enabled("bim")]))
            .expect_err("unknown key");
        assert_eq!(
            error,
            DomainError::Lookup(LookupError::UnknownSection { key: "bim".to_string() })
        );

        let error = engine
            .price(&request(vec![
                SectionSelection::enabled("pz"),
                SectionSelection::disabled("pz"),
            ]))
            .expect_err("duplicate key");
        assert_eq!(
            error,
            DomainError::Validation(ValidationError::DuplicateSection { key: "pz".to_string() })
        );
    }

    #[test]
    fn unknown_project_label_fails_before_any_section() {
        let engine = DeterministicPricingEngine::default();
        let mut input = request(vec![SectionSelection::disabled("pz")]);
        input.urgency = "Вчера".to_string();

        let error = engine.price(&input).expect_err("unknown urgency");
        assert!(matches!(error, DomainError::Lookup(LookupError::UnknownLabel { .. })));
    }

    #[test]
    fn custom_constants_change_rate_and_floor() {
        let engine = DeterministicPricingEngine::new(FinancialConstants {
            hourly_wage_net: Decimal::new(1_000, 0),
            tax_multiplier: Decimal::ONE,
            overhead_multiplier: Decimal::ONE,
            margin: Decimal::ZERO,
            minimum_price: Decimal::new(500, 0),
        });

        let quote = engine.price(&request(vec![SectionSelection::enabled("pz")])).expect("quote");
        assert_eq!(quote.totals.total_client_before_floor, Decimal::new(1_000, 0));
        assert_eq!(quote.totals.total_client_final, Decimal::new(1_000, 0));
        assert!(!quote.totals.floor_applied);
    }

    #[test]
    fn large_package_is_above_the_floor() {
        let engine = DeterministicPricingEngine::default();
        let mut input = request(vec![
            SectionSelection::enabled("ar").with_detail("Основные чертежи и схемы"),
            SectionSelection::enabled("kr").with_detail("Основные чертежи и схемы"),
            SectionSelection::enabled("aps").with_automation("Нет / минимальная автоматика"),
        ]);
        input.area = Decimal::new(5_000, 0);

        let quote = engine.price(&input).expect("quote");
        assert_eq!(quote.sections.len(), 3);
        assert!(!quote.totals.floor_applied);
        assert_eq!(quote.totals.total_client_final, quote.totals.total_client_before_floor);
        let hours: Decimal = quote.sections.iter().map(|section| section.adjusted_hours).sum();
        assert_eq!(quote.totals.total_hours, hours);
    }
}
