mod cli;

use printdl_core::logging;

fn main() {
    // Log to the state-dir file when possible; otherwise stderr.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    std::process::exit(cli::run_from_args());
}
