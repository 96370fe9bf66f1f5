use std::process::ExitCode;

fn main() -> ExitCode {
    match slotwise::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            slotwise::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
