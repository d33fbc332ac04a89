mod error;

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use hibp_range::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HIBP_API_URL_ENV, HIBP_USER_AGENT_ENV,
    HttpTransport, RangeClient, Verdict,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::Error;

#[derive(Parser, Debug)]
#[command(name = "hibp-check")]
#[command(about = "Check passwords against the Have I Been Pwned range API")]
struct Args {
    /// Values to check. If none are given, one value per line is read from stdin.
    values: Vec<String>,

    /// Base URL of the range API
    #[arg(long, env = HIBP_API_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// User-Agent sent with every request
    #[arg(long, env = HIBP_USER_AGENT_ENV, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Print nothing; report through the exit status only
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

/// Checks every value and returns whether any of them was compromised.
fn run(args: &Args) -> Result<bool, Error> {
    let config = ClientConfig::default()
        .with_base_url(&args.base_url)
        .with_user_agent(&args.user_agent);

    let http = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .map_err(Error::HttpClient)?;
    let client = RangeClient::with_transport(
        HttpTransport::with_client(http, &config),
        config.cache_ttl,
    );

    let values = if args.values.is_empty() {
        read_stdin_values()?
    } else {
        args.values.clone()
    };
    debug!(count = values.len(), "checking values");

    let mut any_compromised = false;
    for (i, value) in values.iter().enumerate() {
        let verdict = client.check_compromised(value)?;
        any_compromised |= verdict.compromised;
        if !args.quiet {
            println!("{}", render(i + 1, &verdict));
        }
    }

    Ok(any_compromised)
}

fn read_stdin_values() -> Result<Vec<String>, Error> {
    let mut values = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let value = line.trim_end_matches('\r');
        if !value.is_empty() {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

/// Values are never echoed back; results are labelled by position.
fn render(position: usize, verdict: &Verdict) -> String {
    let source = if verdict.cached { " (cached)" } else { "" };
    if verdict.compromised {
        format!("#{position}: PWNED ({} occurrences){source}", verdict.occurrences)
    } else {
        format!("#{position}: not found{source}")
    }
}
