use crate::auth::AuthState;
use crate::endpoints;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::marker::PhantomData;

pub(crate) static BASE_URL: once_cell::sync::Lazy<Url> =
    once_cell::sync::Lazy::new(|| Url::parse(endpoints::BASE_URL).expect("Failed to parse URL"));

#[derive(Debug, Clone)]
pub struct EduVulcanClient<A: AuthState> {
    pub(crate) _phantom_state: PhantomData<A>,
    pub(crate) client: ClientWithMiddleware,
    pub(crate) base_url: Url,
}

impl<A: AuthState> EduVulcanClient<A> {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) fn into_state<B: AuthState>(self) -> EduVulcanClient<B> {
        EduVulcanClient {
            _phantom_state: PhantomData,
            client: self.client,
            base_url: self.base_url,
        }
    }
}
