use std::process::ExitCode;

fn main() -> ExitCode {
    aria_cli::run()
}
