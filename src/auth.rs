use crate::base::EduVulcanClient;
use crate::endpoints::{AP_PATH, QUERY_USER_INFO_PATH};
use crate::login_form::{self, LoginForm};
use anyhow::{bail, Context};
use sealed::sealed;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Authed;
#[derive(Debug, Clone)]
pub struct NotAuthed;

#[sealed]
pub trait AuthState {}
#[sealed]
impl AuthState for Authed {}
#[sealed]
impl AuthState for NotAuthed {}

impl EduVulcanClient<NotAuthed> {
    pub async fn authenticate(
        self,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> anyhow::Result<EduVulcanClient<Authed>> {
        let login = login.into();
        let password = password.into();

        let url = self.endpoint(AP_PATH)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let page_url = response.url().clone();
        let body = response.text().await?;

        if login_form::ap_value(&body).is_some() {
            tracing::debug!("Session is already signed in");
            return Ok(self.into_state());
        }

        let Some(form) = LoginForm::parse(&body, &page_url)? else {
            bail!("Login form not found");
        };

        if let Err(err) = self.query_user_info(&form, &login).await {
            tracing::warn!("User info verification failed: {err:#}");
        }

        let response = self
            .client
            .post(form.action.clone())
            .form(&form.fields(&login, &password))
            .send()
            .await?;
        let status = response.status();
        let page_url = response.url().clone();
        let body = response.text().await?;

        if login_form::ap_value(&body).is_some() {
            return Ok(self.into_state());
        }
        if login_form::has_captcha(&body) {
            bail!("CAPTCHA required; sign in once through a browser and try again");
        }
        if LoginForm::parse(&body, &page_url)?.is_some() || !status.is_success() {
            match login_form::validation_message(&body) {
                Some(message) => bail!("Login failed: {message}"),
                None => bail!("Login failed (HTTP {status})"),
            }
        }

        Ok(self.into_state())
    }

    /// First step of the portal's two-step login: announces the alias.
    async fn query_user_info(&self, form: &LoginForm, login: &str) -> anyhow::Result<()> {
        let url = self.endpoint(QUERY_USER_INFO_PATH)?;
        self.client
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form.alias_fields(login))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl EduVulcanClient<Authed> {
    /// The JSON document stored in the `#ap` element of the token page.
    pub async fn get_ap_payload(&self) -> anyhow::Result<Value> {
        let url = self.endpoint(AP_PATH)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;

        let Some(ap_value) = login_form::ap_value(&body) else {
            bail!("Token payload not found; the session is not signed in");
        };
        if ap_value.trim().is_empty() {
            bail!("Token payload is empty");
        }
        serde_json::from_str(&ap_value).context("Token payload is not valid JSON")
    }
}
