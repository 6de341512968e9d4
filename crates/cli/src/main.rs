use std::process::ExitCode;

fn main() -> ExitCode {
    docquote_cli::run()
}
