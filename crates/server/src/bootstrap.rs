use std::sync::Arc;

use axum::Router;
use docquote_agent::{AdvisoryError, AssistedFill};
use docquote_core::config::{AppConfig, ConfigError};
use docquote_core::pricing::{catalog::Catalog, DeterministicPricingEngine};
use tera::Tera;
use thiserror::Error;
use tracing::{info, warn};

use crate::calculator::{self, CalculatorState};
use crate::health::{self, HealthState};

pub struct Application {
    pub config: AppConfig,
    pub engine: Arc<DeterministicPricingEngine>,
    pub assisted_fill: AssistedFill,
    pub templates: Arc<Tera>,
    pub catalog_issues: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("calculator templates failed to load: {0}")]
    Templates(#[source] tera::Error),
    #[error("assisted fill client could not be created: {0}")]
    AssistedFill(#[source] AdvisoryError),
}

/// Builds the application from an already loaded config, so logging can be
/// initialized from the same config first.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let catalog = Catalog::default();
    let catalog_issues = catalog.integrity_issues();
    if catalog_issues.is_empty() {
        info!(
            event_name = "system.bootstrap.catalog_loaded",
            correlation_id = "bootstrap",
            sections = catalog.len(),
            "section catalog loaded"
        );
    } else {
        warn!(
            event_name = "system.bootstrap.catalog_inconsistent",
            correlation_id = "bootstrap",
            issues = %catalog_issues.join("; "),
            "section catalog failed its integrity check"
        );
    }

    let engine = Arc::new(DeterministicPricingEngine::with_catalog(catalog, config.pricing));
    info!(
        event_name = "system.bootstrap.engine_ready",
        correlation_id = "bootstrap",
        full_hourly_rate = %config.pricing.full_hourly_rate(),
        minimum_price = %config.pricing.minimum_price,
        "pricing engine ready"
    );

    let assisted_fill =
        AssistedFill::from_config(&config.llm, catalog).map_err(BootstrapError::AssistedFill)?;
    info!(
        event_name = "system.bootstrap.assisted_fill",
        correlation_id = "bootstrap",
        configured = assisted_fill.is_configured(),
        model = %config.llm.model,
        "assisted fill initialized"
    );

    let templates = calculator::init_templates().map_err(BootstrapError::Templates)?;

    Ok(Application { config, engine, assisted_fill, templates, catalog_issues })
}

impl Application {
    pub fn router(&self) -> Router {
        let calculator_state = CalculatorState::new(
            self.engine.clone(),
            self.assisted_fill.clone(),
            self.templates.clone(),
        );
        let health_state = HealthState::new(
            self.engine.catalog().len(),
            self.catalog_issues.clone(),
            self.assisted_fill.is_configured(),
        );

        calculator::router(calculator_state).merge(health::router(health_state))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use docquote_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    fn load_and_bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        let config = AppConfig::load(options)?;
        bootstrap_with_config(config)
    }

    #[test]
    fn bootstrap_fails_fast_on_invalid_configuration() {
        let result = load_and_bootstrap(LoadOptions {
            overrides: ConfigOverrides { port: Some(0), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        });

        let message = result.err().expect("error").to_string();
        assert!(message.contains("server.port"));
    }

    #[test]
    fn missing_api_key_leaves_assisted_fill_disabled() {
        let app = bootstrap_with_config(AppConfig::default()).expect("bootstrap");

        assert!(!app.assisted_fill.is_configured());
        assert!(app.catalog_issues.is_empty());
        assert_eq!(app.engine.constants().minimum_price, Decimal::new(35_000, 0));
    }

    #[test]
    fn configured_key_enables_assisted_fill() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("test-key".to_string().into());

        let app = bootstrap_with_config(config).expect("bootstrap");
        assert!(app.assisted_fill.is_configured());
    }

    #[tokio::test]
    async fn router_exposes_health_and_calculator() {
        let app = bootstrap_with_config(AppConfig::default()).expect("bootstrap");
        let router = app.router();

        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(health.status(), StatusCode::OK);

        let page = router
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(page.status(), StatusCode::OK);
    }
}
