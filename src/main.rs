use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = ensure_deck_user::cli::Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Diagnostics go to stdout; callers only look at the exit status.
            println!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
