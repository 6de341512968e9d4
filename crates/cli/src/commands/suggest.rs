use docquote_agent::{AdvisoryError, AssistedFill};
use docquote_core::config::{AppConfig, LoadOptions};
use docquote_core::pricing::catalog::Catalog;

use super::{exit, CommandResult};

const COMMAND: &str = "suggest";

pub fn run(description: &str) -> CommandResult {
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

    let assisted_fill = match AssistedFill::from_config(&config.llm, Catalog::default()) {
        Ok(assisted_fill) => assisted_fill,
        Err(error) => return advisory_failure(&error),
    };

    run_with(&assisted_fill, description)
}

/// Blocks on a single suggestion round trip.
pub fn run_with(assisted_fill: &AssistedFill, description: &str) -> CommandResult {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    match runtime.block_on(assisted_fill.suggest(description)) {
        Ok(suggestion) => CommandResult::success_with_data(
            COMMAND,
            format!("suggested {} section(s); review before pricing", suggestion.sections.len()),
            &suggestion,
        ),
        Err(error) => advisory_failure(&error),
    }
}

fn advisory_failure(error: &AdvisoryError) -> CommandResult {
    CommandResult::failure(COMMAND, error.code(), error.to_string(), exit::ADVISORY)
}
