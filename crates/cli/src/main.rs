use std::process::ExitCode;

fn main() -> ExitCode {
    timeclock_cli::run()
}
