//! Add-on entry point: exports the configured credentials and hands the
//! process over to the token fetcher.

use clap::Parser;
use eduvulcan_token::config::{AddonOptions, Credentials};
use eduvulcan_token::endpoints::DEFAULT_OPTIONS_PATH;
use eduvulcan_token::launcher::{self, Launcher};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "eduvulcan-launcher", version, about)]
struct Cli {
    /// Add-on options written by the Supervisor
    #[arg(long, env = "EDUVULCAN_OPTIONS", default_value = DEFAULT_OPTIONS_PATH)]
    options: PathBuf,

    /// Token fetcher to execute; defaults to the one installed next to this binary
    #[arg(long, env = "EDUVULCAN_FETCHER")]
    program: Option<PathBuf>,
}

fn main() {
    eduvulcan_token::init_logging();
    let cli = Cli::parse();

    let credentials = Credentials::from(AddonOptions::load(&cli.options));
    let program = cli.program.unwrap_or_else(launcher::default_program);
    let launcher = Launcher::new(credentials, program);

    std::process::exit(hand_over(launcher));
}

#[cfg(unix)]
fn hand_over(launcher: Launcher) -> i32 {
    let err = launcher.exec();
    eprintln!("Error: {:#}", anyhow::Error::new(err));
    1
}

#[cfg(not(unix))]
fn hand_over(launcher: Launcher) -> i32 {
    match launcher.run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", anyhow::Error::new(err));
            1
        }
    }
}
