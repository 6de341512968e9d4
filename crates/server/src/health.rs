use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct HealthState {
    catalog_sections: usize,
    catalog_issues: Vec<String>,
    assisted_fill_configured: bool,
}

impl HealthState {
    pub fn new(
        catalog_sections: usize,
        catalog_issues: Vec<String>,
        assisted_fill_configured: bool,
    ) -> Self {
        Self { catalog_sections, catalog_issues, assisted_fill_configured }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub assisted_fill: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Readiness depends on the catalog only. Assisted fill is optional, so an
/// unconfigured key is reported but never degrades the service.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(&state);
    let ready = catalog.status == "ready";

    let assisted_fill = if state.assisted_fill_configured {
        HealthCheck { status: "ready", detail: "gemini api key configured".to_string() }
    } else {
        HealthCheck {
            status: "disabled",
            detail: "no api key; suggestions are unavailable, pricing is unaffected".to_string(),
        }
    };

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "docquote-server runtime initialized".to_string(),
        },
        catalog,
        assisted_fill,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check(state: &HealthState) -> HealthCheck {
    if state.catalog_sections == 0 {
        return HealthCheck { status: "degraded", detail: "catalog is empty".to_string() };
    }
    if !state.catalog_issues.is_empty() {
        return HealthCheck { status: "degraded", detail: state.catalog_issues.join("; ") };
    }
    HealthCheck {
        status: "ready",
        detail: format!("{} sections loaded", state.catalog_sections),
    }
}
