//! Signs in to eduVULCAN and stores the JWT with its tenant for Home Assistant.

use clap::Parser;
use eduvulcan_token::builder::DEFAULT_RATE_LIMIT;
use eduvulcan_token::endpoints::{BASE_URL, DEFAULT_TOKEN_PATH};
use eduvulcan_token::fetcher::{FetcherSettings, TokenFetcher};
use eduvulcan_token::prompt::TerminalPrompt;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "eduvulcan-token-fetcher", version, about)]
struct Cli {
    #[arg(long, env = "LOGIN", default_value = "", hide_env_values = true)]
    login: String,

    #[arg(long, env = "PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Where the token file is written
    #[arg(long, env = "TOKEN_PATH", default_value = DEFAULT_TOKEN_PATH)]
    output: PathBuf,

    #[arg(long, env = "EDUVULCAN_URL", default_value = BASE_URL)]
    base_url: Url,

    /// Delay before each portal request, in milliseconds
    #[arg(long, env = "EDUVULCAN_RATE_LIMIT_MS")]
    rate_limit_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    eduvulcan_token::init_logging();
    let cli = Cli::parse();

    let settings = FetcherSettings {
        login: cli.login,
        password: cli.password,
        output: cli.output,
        base_url: cli.base_url,
        rate_limit: cli
            .rate_limit_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RATE_LIMIT),
    };

    if let Err(err) = TokenFetcher::new(settings, TerminalPrompt::new()).run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
