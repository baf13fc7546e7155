//! Stepwise command-line front end
//!
//! Reads one JSON request per line on stdin and writes one JSON response per
//! line on stdout. Logs go to stderr.

mod config;
mod handler;

use config::Config;
use handler::Handler;
use std::io::{self, BufRead, Write};
use stepwise_plugin::CalculatorRegistry;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_tracing(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing(&config::log_directives_from_env());
    let config = Config::from_env();

    let registry = stepwise_stats::load_stats_library(CalculatorRegistry::new());
    info!(
        version = SERVER_VERSION,
        calculators = registry.len(),
        alpha = config.alpha,
        format = ?config.format,
        "stepwise started"
    );
    let handler = Handler::new(registry, &config);

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("end of input");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let response = handler.handle_line(line);
                let mut stdout = io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{}", response).and_then(|_| stdout.flush()) {
                    error!(error = %e, "failed to write response");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        }
    }
}
