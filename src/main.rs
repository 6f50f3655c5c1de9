use std::process::ExitCode;
use togglsync::commands::Cli;
use togglsync::libs::error::{describe, exit_code};
use togglsync::msg_print;

#[tokio::main]
async fn main() -> ExitCode {
    match Cli::menu().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            msg_print!(describe(&err));
            ExitCode::from(exit_code(&err))
        }
    }
}
