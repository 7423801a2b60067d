use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ANCHORLEG_LOG";

fn main() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    std::process::exit(anchorleg::cli::run_with_args(&args));
}
