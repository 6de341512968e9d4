pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::coefficient::{
    resolve, vocabularies, AutomationLevel, Coefficient, CoefficientAxis, Complexity, DetailLevel,
    ObjectType, Stage, Urgency, VocabularyEntry,
};
pub use domain::quote::{
    AppliedCoefficients, Quote, QuoteRequest, QuoteTotals, SectionResult, SectionSelection,
};
pub use domain::section::SectionDefinition;
pub use errors::{ApplicationError, DomainError, InterfaceError, LookupError, ValidationError};
pub use pricing::catalog::{Catalog, SectionGroup};
pub use pricing::constraints::{validate_form, QuoteForm};
pub use pricing::rates::FinancialConstants;
pub use pricing::{price_quote, DeterministicPricingEngine, PricingEngine};
