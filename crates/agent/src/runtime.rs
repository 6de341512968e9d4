use std::sync::Arc;

use tracing::{info, warn};

use docquote_core::config::LlmConfig;
use docquote_core::pricing::catalog::Catalog;

use crate::gemini::GeminiClient;
use crate::llm::{AdvisoryError, LlmClient};
use crate::prompt::build_prompt;
use crate::suggestions::{normalize, parse_embedded_json, Suggestion};

/// Turns an object description into a normalized [`Suggestion`].
///
/// Built without a client when no API key is configured; every call then
/// fails with [`AdvisoryError::MissingCredential`] and pricing is unaffected.
#[derive(Clone)]
pub struct AssistedFill {
    client: Option<Arc<dyn LlmClient>>,
    catalog: Catalog,
}

impl AssistedFill {
    pub fn new(client: Arc<dyn LlmClient>, catalog: Catalog) -> Self {
        Self { client: Some(client), catalog }
    }

    pub fn disabled(catalog: Catalog) -> Self {
        Self { client: None, catalog }
    }

    pub fn from_config(config: &LlmConfig, catalog: Catalog) -> Result<Self, AdvisoryError> {
        if !config.has_credentials() {
            return Ok(Self::disabled(catalog));
        }
        let client = GeminiClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), catalog))
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn suggest(&self, description: &str) -> Result<Suggestion, AdvisoryError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(AdvisoryError::EmptyDescription);
        }
        let client = self.client.as_ref().ok_or(AdvisoryError::MissingCredential)?;

        let prompt = build_prompt(&self.catalog, description);
        let outcome = client
            .complete(&prompt)
            .await
            .and_then(|text| parse_embedded_json(&text))
            .and_then(|raw| normalize(&self.catalog, &raw));

        match &outcome {
            Ok(suggestion) => info!(
                event_name = "assist.suggestion.ready",
                sections = suggestion.sections.len(),
                "assisted fill produced a suggestion"
            ),
            Err(error) => warn!(
                event_name = "assist.suggestion.failed",
                error_code = error.code(),
                error = %error,
                "assisted fill failed"
            ),
        }

        outcome
    }
}

impl std::fmt::Debug for AssistedFill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistedFill")
            .field("configured", &self.is_configured())
            .field("sections", &self.catalog.len())
            .finish()
    }
}
