pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "docquote",
    about = "Docquote operator CLI",
    long_about = "Price design documentation packages, inspect the section catalog and configuration, and request assisted-fill suggestions.",
    after_help = "Examples:\n  docquote quote --area 120 --object-type 'Частный дом' --stage РД --urgency 'Стандартные сроки' --section pz --section 'ar::Основные чертежи и схемы'\n  docquote quote --file quote.toml\n  docquote suggest 'Склад 1200 м², отопление и вентиляция'\n  docquote doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a quote from a TOML/JSON file or from flags")]
    Quote {
        #[arg(long, help = "Quote form as .toml or .json")]
        file: Option<PathBuf>,
        #[arg(long, help = "Floor area in m² (`,` or `.` as decimal separator)")]
        area: Option<String>,
        #[arg(long)]
        object_type: Option<String>,
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        urgency: Option<String>,
        #[arg(
            long = "section",
            value_name = "KEY[:COMPLEXITY[:DETAIL[:AUTOMATION]]]",
            help = "Enable a section; repeatable"
        )]
        sections: Vec<String>,
    },
    #[command(about = "Print the section catalog, vocabularies and money constants")]
    Catalog,
    #[command(about = "Ask the model to pre-fill a quote from an object description")]
    Suggest {
        #[arg(help = "Free-text object description")]
        description: String,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog integrity, rates and assisted-fill readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Quote { file, area, object_type, stage, urgency, sections } => {
            commands::quote::run(commands::quote::QuoteArgs {
                file,
                area,
                object_type,
                stage,
                urgency,
                sections,
            })
        }
        Command::Catalog => commands::catalog::run(),
        Command::Suggest { description } => commands::suggest::run(&description),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
