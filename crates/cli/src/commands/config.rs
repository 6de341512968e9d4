use std::fs;
use std::path::Path;

use docquote_core::config::{read_env, resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

/// One line per effective setting: `- key = value (source: ...)`.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let file = FileSource { doc: config_file_doc.as_ref(), path: config_file_path.as_deref() };

    let pricing = &config.pricing;
    let llm_api_key = if config.llm.has_credentials() { "<redacted>" } else { "<unset>" };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.push(file.line(
        "pricing.hourly_wage_net",
        &pricing.hourly_wage_net.to_string(),
        &["DOCQUOTE_PRICING_HOURLY_WAGE_NET"],
    ));
    lines.push(file.line(
        "pricing.tax_multiplier",
        &pricing.tax_multiplier.to_string(),
        &["DOCQUOTE_PRICING_TAX_MULTIPLIER"],
    ));
    lines.push(file.line(
        "pricing.overhead_multiplier",
        &pricing.overhead_multiplier.to_string(),
        &["DOCQUOTE_PRICING_OVERHEAD_MULTIPLIER"],
    ));
    lines.push(file.line(
        "pricing.margin",
        &pricing.margin.to_string(),
        &["DOCQUOTE_PRICING_MARGIN"],
    ));
    lines.push(file.line(
        "pricing.minimum_price",
        &pricing.minimum_price.to_string(),
        &["DOCQUOTE_PRICING_MINIMUM_PRICE"],
    ));

    lines.push(file.line("llm.api_key", llm_api_key, &["DOCQUOTE_LLM_API_KEY", "GEMINI_API_KEY"]));
    lines.push(file.line("llm.base_url", &config.llm.base_url, &["DOCQUOTE_LLM_BASE_URL"]));
    lines.push(file.line("llm.model", &config.llm.model, &["DOCQUOTE_LLM_MODEL"]));
    lines.push(file.line(
        "llm.timeout_secs",
        &config.llm.timeout_secs.to_string(),
        &["DOCQUOTE_LLM_TIMEOUT_SECS"],
    ));

    lines.push(file.line(
        "server.bind_address",
        &config.server.bind_address,
        &["DOCQUOTE_SERVER_BIND_ADDRESS"],
    ));
    lines.push(file.line(
        "server.port",
        &config.server.port.to_string(),
        &["DOCQUOTE_SERVER_PORT"],
    ));

    lines.push(file.line(
        "logging.level",
        &config.logging.level,
        &["DOCQUOTE_LOGGING_LEVEL", "DOCQUOTE_LOG_LEVEL"],
    ));
    lines.push(file.line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        &["DOCQUOTE_LOGGING_FORMAT", "DOCQUOTE_LOG_FORMAT"],
    ));

    lines.push(format!(
        "- derived full_hourly_rate = {} (wage × tax × overhead)",
        pricing.full_hourly_rate()
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

struct FileSource<'a> {
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

impl FileSource<'_> {
    fn line(&self, key_path: &str, value: &str, env_keys: &[&str]) -> String {
        render_line(key_path, value, self.field_source(key_path, env_keys))
    }

    fn field_source(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|env_key| read_env(env_key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
