use docquote_core::config::{AppConfig, LoadOptions};
use docquote_core::domain::coefficient::vocabularies;
use docquote_core::pricing::catalog::Catalog;
use serde_json::json;

use super::{exit, CommandResult};

const COMMAND: &str = "catalog";

pub fn run() -> CommandResult {
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

    let catalog = Catalog::default();
    let data = json!({
        "groups": catalog.groups(),
        "vocabularies": vocabularies(),
        "constants": config.pricing,
        "full_hourly_rate": config.pricing.full_hourly_rate(),
    });

    CommandResult::success_with_data(
        COMMAND,
        format!("{} sections in {} groups", catalog.len(), catalog.groups().len()),
        &data,
    )
}
