pub mod auth;
pub mod base;
pub mod builder;
pub mod config;
pub mod endpoints;
pub mod fetcher;
pub mod launcher;
pub mod login_form;
pub mod prompt;
pub mod token;
pub mod token_file;

pub use auth::{AuthState, Authed, NotAuthed};
pub use base::EduVulcanClient;
pub use builder::{EduVulcanClientBuilder, FixedDelay};
pub use config::{AddonOptions, Credentials};
pub use fetcher::{FetcherSettings, TokenFetcher};
pub use launcher::{LaunchError, Launcher};
pub use token::{FetchedToken, TokenError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the stderr log subscriber shared by both binaries.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
