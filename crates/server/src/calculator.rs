//! Calculator routes: the HTML form and its JSON counterparts.
//!
//! HTML Endpoints:
//! - `GET  /`                    empty calculator form
//! - `POST /`                    `action=calculate` prices the form, `action=suggest` pre-fills it
//!
//! JSON API Endpoints:
//! - `POST /api/v1/quotes`       price a quote form
//! - `POST /api/v1/suggestions`  assisted fill from an object description
//! - `GET  /api/v1/catalog`      sections, vocabularies and money constants

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use docquote_agent::{AdvisoryError, AssistedFill, Suggestion};
use docquote_core::{
    domain::{
        coefficient::{
            vocabularies, AutomationLevel, Coefficient, Complexity, DetailLevel, ObjectType, Stage,
            Urgency, VocabularyEntry,
        },
        quote::{Quote, SectionSelection},
    },
    errors::{ApplicationError, DomainError, InterfaceError},
    pricing::{
        catalog::{Catalog, SectionGroup},
        constraints::{validate_form, QuoteForm},
        rates::FinancialConstants,
        DeterministicPricingEngine, PricingEngine,
    },
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tracing::{error, info, warn};
use uuid::Uuid;

const CALCULATOR_TEMPLATE: &str = "calculator.html";

#[derive(Clone)]
pub struct CalculatorState {
    engine: Arc<DeterministicPricingEngine>,
    assisted_fill: AssistedFill,
    templates: Arc<Tera>,
}

impl CalculatorState {
    pub fn new(
        engine: Arc<DeterministicPricingEngine>,
        assisted_fill: AssistedFill,
        templates: Arc<Tera>,
    ) -> Self {
        Self { engine, assisted_fill, templates }
    }
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: String,
    pub user_message: &'static str,
    pub correlation_id: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub groups: Vec<SectionGroup>,
    pub vocabularies: BTreeMap<&'static str, Vec<VocabularyEntry>>,
    pub constants: FinancialConstants,
    pub full_hourly_rate: Decimal,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Loads the embedded calculator template and registers its filters.
pub fn init_templates() -> Result<Arc<Tera>, tera::Error> {
    let mut tera = Tera::default();
    register_template_filters(&mut tera);
    tera.add_raw_template(
        CALCULATOR_TEMPLATE,
        include_str!("../../../templates/calculator.html"),
    )?;
    Ok(Arc::new(tera))
}

pub fn router(state: CalculatorState) -> Router {
    Router::new()
        // HTML routes
        .route("/", get(calculator_page).post(submit_calculator))
        // JSON API routes
        .route("/api/v1/quotes", post(create_quote))
        .route("/api/v1/suggestions", post(create_suggestion))
        .route("/api/v1/catalog", get(catalog))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// HTML Handlers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Calculate,
    Suggest,
}

impl Action {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("calculate") => Some(Self::Calculate),
            Some("suggest") => Some(Self::Suggest),
            Some(_) => None,
        }
    }
}

/// Everything the page needs besides the static vocabularies.
#[derive(Debug, Default)]
struct PageOutcome {
    form: QuoteForm,
    description: String,
    quote: Option<Quote>,
    error_message: Option<String>,
    ai_error_message: Option<String>,
    ai_notice: Option<String>,
}

#[derive(Debug, Serialize)]
struct FormView<'a> {
    area: &'a str,
    object_type: Option<&'a str>,
    stage: Option<&'a str>,
    urgency: Option<&'a str>,
    project_description: &'a str,
}

#[derive(Debug, Serialize)]
struct SectionRow<'a> {
    key: &'static str,
    title: &'static str,
    uses_detail: bool,
    uses_automation: bool,
    enabled: bool,
    complexity: Option<&'a str>,
    detail: Option<&'a str>,
    automation: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct GroupView<'a> {
    label: &'static str,
    sections: Vec<SectionRow<'a>>,
}

pub async fn calculator_page(
    State(state): State<CalculatorState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    render_page(&state, &PageOutcome::default())
}

pub async fn submit_calculator(
    State(state): State<CalculatorState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let correlation_id = Uuid::new_v4().to_string();
    let fields: HashMap<String, String> = fields.into_iter().collect();
    let mut outcome = PageOutcome {
        form: read_quote_form(state.engine.catalog(), &fields),
        description: fields
            .get("project_description")
            .map(|value| value.trim().to_string())
            .unwrap_or_default(),
        ..PageOutcome::default()
    };

    match Action::parse(fields.get("action").map(String::as_str)) {
        Some(Action::Calculate) => match price_form(&state.engine, &outcome.form) {
            Ok(quote) => {
                info!(
                    event_name = "calculator.quote.priced",
                    correlation_id = %correlation_id,
                    sections = quote.sections.len(),
                    floor_applied = quote.totals.floor_applied,
                    "quote priced from form"
                );
                outcome.quote = Some(quote);
            }
            Err(failure) => {
                log_pricing_failure(&failure, &correlation_id);
                outcome.error_message = Some(failure.to_string());
            }
        },
        Some(Action::Suggest) => match state.assisted_fill.suggest(&outcome.description).await {
            Ok(suggestion) => {
                apply_suggestion(&mut outcome.form, &suggestion);
                outcome.ai_notice = Some(format!(
                    "Форма заполнена по описанию, предложено разделов: {}. Проверьте значения.",
                    suggestion.sections.len()
                ));
            }
            Err(AdvisoryError::EmptyDescription) => {
                outcome.ai_error_message =
                    Some("Опишите объект, чтобы получить рекомендации.".to_string());
            }
            Err(failure) => {
                outcome.ai_error_message =
                    Some(format!("Не удалось получить рекомендации: {failure}"));
            }
        },
        None => {
            warn!(correlation_id = %correlation_id, "unknown calculator action ignored");
        }
    }

    render_page(&state, &outcome)
}

fn render_page(
    state: &CalculatorState,
    outcome: &PageOutcome,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let catalog = state.engine.catalog();
    let constants = state.engine.constants();

    let mut context = Context::new();
    context.insert("object_types", &ObjectType::labels());
    context.insert("stages", &Stage::labels());
    context.insert("urgencies", &Urgency::labels());
    context.insert("complexities", &Complexity::labels());
    context.insert("detail_levels", &DetailLevel::labels());
    context.insert("automation_levels", &AutomationLevel::labels());
    context.insert("groups", &group_views(catalog, &outcome.form));
    context.insert("full_hourly_rate", &constants.full_hourly_rate());
    context.insert("margin_percent", &(constants.margin * Decimal::ONE_HUNDRED).normalize());
    context.insert("minimum_price", &constants.minimum_price);
    context.insert(
        "form",
        &FormView {
            area: outcome.form.area.as_deref().unwrap_or_default(),
            object_type: outcome.form.object_type.as_deref(),
            stage: outcome.form.stage.as_deref(),
            urgency: outcome.form.urgency.as_deref(),
            project_description: &outcome.description,
        },
    );
    context.insert("quote", &outcome.quote);
    context.insert("error_message", &outcome.error_message);
    context.insert("ai_error_message", &outcome.ai_error_message);
    context.insert("ai_notice", &outcome.ai_notice);

    state.templates.render(CALCULATOR_TEMPLATE, &context).map(Html).map_err(|error| {
        error!(error = %error, "calculator template rendering failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Template Error</h1>".to_string()))
    })
}

/// Reads the flat form fields (`area`, `{key}_enabled`, `{key}_detail`, ...)
/// into a quote form. Every catalog section is listed; unchecked ones are
/// disabled and skipped by the engine.
fn read_quote_form(catalog: &Catalog, fields: &HashMap<String, String>) -> QuoteForm {
    let field = |name: &str| {
        fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    QuoteForm {
        area: fields.get("area").map(|value| value.trim().to_string()),
        object_type: field("object_type"),
        stage: field("stage"),
        urgency: field("urgency"),
        sections: catalog
            .sections()
            .iter()
            .map(|section| SectionSelection {
                key: section.key.to_string(),
                enabled: fields.get(&format!("{}_enabled", section.key)).map(String::as_str)
                    == Some("on"),
                complexity: field(&format!("{}_complexity", section.key)),
                detail: field(&format!("{}_detail", section.key)),
                automation: field(&format!("{}_automation", section.key)),
            })
            .collect(),
    }
}

/// Pre-fills the form from a suggestion. Values the model left out keep
/// whatever the user already entered.
fn apply_suggestion(form: &mut QuoteForm, suggestion: &Suggestion) {
    if let Some(object_type) = suggestion.object_type {
        form.object_type = Some(object_type.label().to_string());
    }
    if let Some(stage) = suggestion.stage {
        form.stage = Some(stage.label().to_string());
    }
    if let Some(urgency) = suggestion.urgency {
        form.urgency = Some(urgency.label().to_string());
    }

    for suggested in suggestion.selections() {
        match form.sections.iter_mut().find(|selection| selection.key == suggested.key) {
            Some(selection) => *selection = suggested,
            None => form.sections.push(suggested),
        }
    }
}

fn group_views<'a>(catalog: &Catalog, form: &'a QuoteForm) -> Vec<GroupView<'a>> {
    catalog
        .groups()
        .into_iter()
        .map(|group| GroupView {
            label: group.label,
            sections: group
                .sections
                .into_iter()
                .map(|section| {
                    let selection = form.sections.iter().find(|row| row.key == section.key);
                    SectionRow {
                        key: section.key,
                        title: section.title,
                        uses_detail: section.uses_detail,
                        uses_automation: section.uses_automation,
                        enabled: selection.is_some_and(|row| row.enabled),
                        complexity: selection.and_then(|row| row.complexity.as_deref()),
                        detail: selection.and_then(|row| row.detail.as_deref()),
                        automation: selection.and_then(|row| row.automation.as_deref()),
                    }
                })
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON Handlers
// ---------------------------------------------------------------------------

pub async fn create_quote(
    State(state): State<CalculatorState>,
    Json(form): Json<QuoteForm>,
) -> Result<Json<Quote>, (StatusCode, Json<ApiError>)> {
    let correlation_id = Uuid::new_v4().to_string();

    match price_form(&state.engine, &form) {
        Ok(quote) => {
            info!(
                event_name = "api.quote.priced",
                correlation_id = %correlation_id,
                sections = quote.sections.len(),
                total_client_final = %quote.totals.total_client_final,
                "quote priced"
            );
            Ok(Json(quote))
        }
        Err(failure) => {
            log_pricing_failure(&failure, &correlation_id);
            let code = match &failure {
                DomainError::Validation(_) => "validation",
                DomainError::Lookup(_) => "lookup",
            };
            let interface = ApplicationError::from(failure).into_interface(correlation_id);
            Err(interface_error(code, interface))
        }
    }
}

pub async fn create_suggestion(
    State(state): State<CalculatorState>,
    Json(request): Json<SuggestionRequest>,
) -> Result<Json<Suggestion>, (StatusCode, Json<ApiError>)> {
    let correlation_id = Uuid::new_v4().to_string();

    state
        .assisted_fill
        .suggest(&request.description)
        .await
        .map(Json)
        .map_err(|failure| advisory_error(failure, correlation_id))
}

pub async fn catalog(State(state): State<CalculatorState>) -> Json<CatalogResponse> {
    let constants = *state.engine.constants();

    Json(CatalogResponse {
        groups: state.engine.catalog().groups(),
        vocabularies: vocabularies(),
        full_hourly_rate: constants.full_hourly_rate(),
        constants,
    })
}

fn price_form(
    engine: &DeterministicPricingEngine,
    form: &QuoteForm,
) -> Result<Quote, DomainError> {
    let request = validate_form(form)?;
    engine.price(&request)
}

fn log_pricing_failure(failure: &DomainError, correlation_id: &str) {
    match failure {
        DomainError::Validation(error) => warn!(
            event_name = "calculator.quote.rejected",
            correlation_id = %correlation_id,
            error = %error,
            "quote input rejected"
        ),
        DomainError::Lookup(error) => error!(
            event_name = "calculator.quote.lookup_failed",
            correlation_id = %correlation_id,
            error = %error,
            "quote references a label missing from the tables"
        ),
    }
}

fn interface_error(code: &'static str, error: InterfaceError) -> (StatusCode, Json<ApiError>) {
    let status = match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ApiErrorBody {
        code,
        message: error.message().to_string(),
        user_message: error.user_message(),
        correlation_id: error.correlation_id().to_string(),
    };
    (status, Json(ApiError { error: body }))
}

/// Advisory failures go through the application error mapping for their
/// message and correlation id; the status stays advisory-specific.
fn advisory_error(failure: AdvisoryError, correlation_id: String) -> (StatusCode, Json<ApiError>) {
    let status = advisory_status(&failure);
    let code = failure.code();
    let user_message = match status {
        StatusCode::BAD_REQUEST => "Describe the object to get suggestions.",
        StatusCode::SERVICE_UNAVAILABLE => "Assisted fill is not configured on this server.",
        _ => "The suggestion service failed. The calculator still works without it.",
    };

    let message = failure.to_string();
    let application = if matches!(failure, AdvisoryError::MissingCredential) {
        ApplicationError::Configuration(message)
    } else {
        ApplicationError::Integration(message)
    };
    let interface = application.into_interface(correlation_id);

    let body = ApiErrorBody {
        code,
        message: interface.message().to_string(),
        user_message,
        correlation_id: interface.correlation_id().to_string(),
    };
    (status, Json(ApiError { error: body }))
}

fn advisory_status(error: &AdvisoryError) -> StatusCode {
    match error {
        AdvisoryError::EmptyDescription => StatusCode::BAD_REQUEST,
        AdvisoryError::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
        AdvisoryError::Transport(_)
        | AdvisoryError::Status { .. }
        | AdvisoryError::Envelope(_)
        | AdvisoryError::EmbeddedJson(_)
        | AdvisoryError::Schema(_) => StatusCode::BAD_GATEWAY,
    }
}

// ---------------------------------------------------------------------------
// Template filters
// ---------------------------------------------------------------------------

pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("rub", tera_rub_filter);
    tera.register_filter("decimal", tera_decimal_filter);
}

/// Whole rubles with space-separated thousands: `35000` → `35 000 руб.`.
/// Non-numeric input is passed through untouched.
fn tera_rub_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    Ok(match decimal_from_value(value) {
        Some(amount) => tera::Value::String(format_rub(amount)),
        None => value.clone(),
    })
}

/// Trims trailing zeros; `places` rounds first.
/// Usage: `section.combined_multiplier | decimal(places=4)`
fn tera_decimal_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let Some(number) = decimal_from_value(value) else {
        return Ok(value.clone());
    };
    let number = match args.get("places").and_then(tera::Value::as_u64) {
        Some(places) => number.round_dp(u32::try_from(places).unwrap_or(u32::MAX)),
        None => number,
    };
    Ok(tera::Value::String(number.normalize().to_string()))
}

fn decimal_from_value(value: &tera::Value) -> Option<Decimal> {
    match value {
        tera::Value::String(text) => Decimal::from_str(text.trim()).ok(),
        tera::Value::Number(number) => match number.as_i64() {
            Some(integer) => Some(Decimal::from(integer)),
            None => number.as_f64().and_then(|float| Decimal::try_from(float).ok()),
        },
        _ => None,
    }
}

pub fn format_rub(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 8);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    grouped.push_str(" руб.");
    grouped
}
