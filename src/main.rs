use clap::Parser;
use covert_check::cli;

fn main() {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args) {
        // Dispatch can fail before logging is initialized (config load,
        // input validation), so report on stderr rather than tracing.
        eprintln!("covert-check: {err:#}");
        std::process::exit(1);
    }
}
