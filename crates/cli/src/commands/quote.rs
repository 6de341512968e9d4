use std::fs;
use std::path::{Path, PathBuf};

use docquote_core::config::{AppConfig, LoadOptions};
use docquote_core::domain::quote::SectionSelection;
use docquote_core::errors::DomainError;
use docquote_core::pricing::constraints::{validate_form, QuoteForm};
use docquote_core::pricing::{DeterministicPricingEngine, PricingEngine};

use super::{exit, CommandResult};

const COMMAND: &str = "quote";

#[derive(Debug, Default)]
pub struct QuoteArgs {
    pub file: Option<PathBuf>,
    pub area: Option<String>,
    pub object_type: Option<String>,
    pub stage: Option<String>,
    pub urgency: Option<String>,
    /// `key[:complexity[:detail[:automation]]]`, empty parts left unset.
    pub sections: Vec<String>,
}

pub fn run(args: QuoteArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                error.to_string(),
                exit::CONFIG,
            );
        }
    };

    let form = match build_form(args) {
        Ok(form) => form,
        Err(message) => return CommandResult::failure(COMMAND, "input", message, exit::INPUT),
    };

    let engine = DeterministicPricingEngine::new(config.pricing);
    let priced = validate_form(&form)
        .map_err(DomainError::from)
        .and_then(|request| engine.price(&request));

    match priced {
        Ok(quote) => {
            let message = format!(
                "priced {} section(s), total {}",
                quote.sections.len(),
                quote.totals.total_client_final
            );
            CommandResult::success_with_data(COMMAND, message, &quote)
        }
        Err(DomainError::Validation(error)) => {
            CommandResult::failure(COMMAND, "validation", error.to_string(), exit::INPUT)
        }
        Err(DomainError::Lookup(error)) => {
            CommandResult::failure(COMMAND, "lookup", error.to_string(), exit::LOOKUP)
        }
    }
}

/// File contents first, then any flag given on the command line replaces the
/// matching field. Flag sections replace the file's section list wholesale.
fn build_form(args: QuoteArgs) -> Result<QuoteForm, String> {
    let mut form = match args.file.as_deref() {
        Some(path) => read_form(path)?,
        None => QuoteForm::default(),
    };

    if args.area.is_some() {
        form.area = args.area;
    }
    if args.object_type.is_some() {
        form.object_type = args.object_type;
    }
    if args.stage.is_some() {
        form.stage = args.stage;
    }
    if args.urgency.is_some() {
        form.urgency = args.urgency;
    }
    if !args.sections.is_empty() {
        form.sections = args.sections.iter().map(|raw| parse_section(raw)).collect();
    }

    Ok(form)
}

fn read_form(path: &Path) -> Result<QuoteForm, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read `{}`: {error}", path.display()))?;

    let is_json = path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&raw)
            .map_err(|error| format!("could not parse `{}` as JSON: {error}", path.display()))
    } else {
        toml::from_str(&raw)
            .map_err(|error| format!("could not parse `{}` as TOML: {error}", path.display()))
    }
}

pub fn parse_section(raw: &str) -> SectionSelection {
    let mut parts = raw.splitn(4, ':').map(str::trim);
    let key = parts.next().unwrap_or_default();
    let mut selection = SectionSelection::enabled(key);

    let mut next_label = || parts.next().filter(|part| !part.is_empty()).map(str::to_string);
    selection.complexity = next_label();
    selection.detail = next_label();
    selection.automation = next_label();
    selection
}
