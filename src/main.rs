use std::process::ExitCode;

fn main() -> ExitCode {
    pretty_env_logger::init();

    match looselabel::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
