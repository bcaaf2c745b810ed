use crate::auth::NotAuthed;
use crate::base::{EduVulcanClient, BASE_URL};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{ClientBuilder, Url};
use reqwest_ratelimit::RateLimiter;
use std::marker::PhantomData;
use std::time::Duration;

pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(250);
const MAX_REDIRECTS: usize = 10;

/// Waits a fixed delay before every request.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn acquire_permit(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

pub struct EduVulcanClientBuilder<R: RateLimiter> {
    reqwest_client_builder: ClientBuilder,
    rate_limiter: R,
    base_url: Url,
}

impl EduVulcanClientBuilder<FixedDelay> {
    pub fn new() -> Self {
        EduVulcanClientBuilder {
            reqwest_client_builder: ClientBuilder::new(),
            rate_limiter: FixedDelay::new(DEFAULT_RATE_LIMIT),
            base_url: BASE_URL.clone(),
        }
    }
}

impl Default for EduVulcanClientBuilder<FixedDelay> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RateLimiter> EduVulcanClientBuilder<R> {
    pub fn client_builder(self, client_builder: ClientBuilder) -> EduVulcanClientBuilder<R> {
        EduVulcanClientBuilder {
            reqwest_client_builder: client_builder,
            ..self
        }
    }

    /// Points the client at another portal host, e.g. a test server.
    pub fn base_url(self, base_url: Url) -> EduVulcanClientBuilder<R> {
        EduVulcanClientBuilder { base_url, ..self }
    }

    pub fn rate_limit_from_duration(self, rate_limit: Duration) -> EduVulcanClientBuilder<FixedDelay> {
        EduVulcanClientBuilder {
            reqwest_client_builder: self.reqwest_client_builder,
            rate_limiter: FixedDelay::new(rate_limit),
            base_url: self.base_url,
        }
    }

    pub fn rate_limit_from_rate_limiter<L: RateLimiter>(
        self,
        rate_limiter: L,
    ) -> EduVulcanClientBuilder<L> {
        EduVulcanClientBuilder {
            reqwest_client_builder: self.reqwest_client_builder,
            rate_limiter,
            base_url: self.base_url,
        }
    }

    pub fn build(self) -> anyhow::Result<EduVulcanClient<NotAuthed>> {
        let client = self
            .reqwest_client_builder
            .cookie_store(true)
            .redirect(Policy::limited(MAX_REDIRECTS))
            // Workaround for https://github.com/hyperium/hyper/issues/2312
            .pool_max_idle_per_host(0)
            .build()
            .context("Failed to create HTTP client")?;

        let client = reqwest_middleware::ClientBuilder::new(client)
            .with(reqwest_ratelimit::all(self.rate_limiter))
            .build();

        Ok(EduVulcanClient {
            _phantom_state: PhantomData,
            client,
            base_url: self.base_url,
        })
    }
}

impl EduVulcanClient<NotAuthed> {
    pub fn builder() -> EduVulcanClientBuilder<FixedDelay> {
        EduVulcanClientBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_default_base_url() {
        let client = EduVulcanClient::builder().build().unwrap();
        assert_eq!(client.base_url().as_str(), "https://eduvulcan.pl/");
    }

    #[test]
    fn test_custom_base_url() {
        let url = Url::parse("http://127.0.0.1:8080").unwrap();
        let client = EduVulcanClient::builder()
            .rate_limit_from_duration(Duration::ZERO)
            .base_url(url.clone())
            .build()
            .unwrap();
        assert_eq!(client.base_url(), &url);
        assert_eq!(
            client.endpoint("/api/ap").unwrap().as_str(),
            "http://127.0.0.1:8080/api/ap"
        );
    }

    #[derive(Clone, Default)]
    struct CountingLimiter {
        permits: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RateLimiter for CountingLimiter {
        async fn acquire_permit(&self) {
            self.permits.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_custom_client_and_rate_limiter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ap"))
            .and(header("user-agent", "eduvulcan-test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(3)
            .mount(&server)
            .await;

        let limiter = CountingLimiter::default();
        let client = EduVulcanClient::builder()
            .client_builder(ClientBuilder::new().user_agent("eduvulcan-test"))
            .base_url(server.uri().parse().unwrap())
            .rate_limit_from_rate_limiter(limiter.clone())
            .build()
            .unwrap();

        for _ in 0..3 {
            let url = client.endpoint("/api/ap").unwrap();
            let response = client.client.get(url).send().await.unwrap();
            assert!(response.status().is_success());
        }
        assert_eq!(limiter.permits.load(Ordering::SeqCst), 3);
    }
}

