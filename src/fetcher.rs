//! Token fetch workflow: reuse a stored token or sign in for a new one.

use crate::auth::NotAuthed;
use crate::base::EduVulcanClient;
use crate::prompt::{self, Prompt};
use crate::token::{self, FetchedToken};
use crate::token_file;
use anyhow::{bail, Context};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

const FETCH_ATTEMPTS: usize = 2;

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub login: String,
    pub password: String,
    pub output: PathBuf,
    pub base_url: Url,
    pub rate_limit: Duration,
}

pub struct TokenFetcher<P: Prompt> {
    settings: FetcherSettings,
    prompt: P,
}

impl<P: Prompt> TokenFetcher<P> {
    pub fn new(settings: FetcherSettings, prompt: P) -> Self {
        TokenFetcher { settings, prompt }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        tracing::info!("Starting add-on");
        let output = self.settings.output.clone();

        let existing = match token_file::read_existing(&output, chrono::Utc::now().timestamp()) {
            Ok(existing) => existing,
            Err(err) => {
                tracing::info!("Existing token invalid: {err}");
                token_file::remove(&output);
                None
            }
        };

        if let Some(stored) = existing {
            if stored.needs_write {
                token_file::write(&output, &stored.token)?;
            }
            tracing::info!(tenant = %stored.token.tenant, "Using existing token");
            return Ok(());
        }

        let (login, password) = prompt::resolve_credentials(
            &self.settings.login,
            &self.settings.password,
            &mut self.prompt,
        );
        if login.is_empty() || password.is_empty() {
            bail!("Login and password are required");
        }

        let token = self.fetch_with_retry(&login, &password).await?;
        token_file::write(&output, &token)?;
        tracing::info!("File written to {}", output.display());
        Ok(())
    }

    async fn fetch_with_retry(&self, login: &str, password: &str) -> anyhow::Result<FetchedToken> {
        let mut last_error = None;
        for attempt in 1..=FETCH_ATTEMPTS {
            match self.fetch_token(login, password).await {
                Ok(token) => return Ok(token),
                Err(err) => {
                    token_file::remove(&self.settings.output);
                    if attempt < FETCH_ATTEMPTS {
                        tracing::warn!("Token fetch failed, retrying once: {err:#}");
                    }
                    last_error = Some(err);
                }
            }
        }

        let err = last_error.unwrap_or_else(|| anyhow::anyhow!("No fetch attempted"));
        Err(err.context("Failed to fetch token"))
    }

    async fn fetch_token(&self, login: &str, password: &str) -> anyhow::Result<FetchedToken> {
        tracing::info!("Logging in");
        let client = self.client()?.authenticate(login, password).await?;
        let ap_data = client.get_ap_payload().await?;
        let jwt = token::extract_jwt(&ap_data)?;
        tracing::info!("Token extracted");
        FetchedToken::from_jwt(jwt).context("Fetched token is unusable")
    }

    /// A fresh client per attempt so a failed session leaves no cookies behind.
    fn client(&self) -> anyhow::Result<EduVulcanClient<NotAuthed>> {
        EduVulcanClient::builder()
            .base_url(self.settings.base_url.clone())
            .rate_limit_from_duration(self.settings.rate_limit)
            .build()
    }
}
