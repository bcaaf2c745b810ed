//! Scraping helpers for the portal's login page.

use anyhow::Context;
use reqwest::Url;
use scraper::{Html, Selector};

pub(crate) const LOGIN_FIELD: &str = "Alias";
pub(crate) const PASSWORD_FIELD: &str = "Password";

const CAPTCHA_SELECTORS: [&str; 5] = [
    "#captcha",
    "#captcha-response",
    "[name*='captcha']",
    "[id*='captcha']",
    "iframe[src*='captcha']",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub action: Url,
    pub hidden_fields: Vec<(String, String)>,
}

impl LoginForm {
    /// Finds the form holding the `Alias` input. Returns `None` on pages
    /// without one, e.g. when the session is already signed in.
    pub fn parse(html: &str, page_url: &Url) -> anyhow::Result<Option<Self>> {
        let document = Html::parse_document(html);
        let form_selector = Selector::parse("form").expect("Invalid selector");
        let alias_selector =
            Selector::parse("input#Alias, input[name='Alias']").expect("Invalid selector");
        let hidden_selector =
            Selector::parse("input[type='hidden'][name]").expect("Invalid selector");

        let Some(form) = document
            .select(&form_selector)
            .find(|form| form.select(&alias_selector).next().is_some())
        else {
            return Ok(None);
        };

        let action = match form.value().attr("action").map(str::trim) {
            Some(action) if !action.is_empty() => page_url
                .join(action)
                .with_context(|| format!("Invalid login form action: {action}"))?,
            _ => page_url.clone(),
        };

        let hidden_fields = form
            .select(&hidden_selector)
            .filter_map(|input| {
                let name = input.value().attr("name")?;
                let value = input.value().attr("value").unwrap_or_default();
                Some((name.to_owned(), value.to_owned()))
            })
            .collect();

        Ok(Some(LoginForm {
            action,
            hidden_fields,
        }))
    }

    /// Fields sent for the first, alias-only step.
    pub fn alias_fields(&self, login: &str) -> Vec<(String, String)> {
        let mut fields = self.hidden_fields.clone();
        fields.push((LOGIN_FIELD.to_owned(), login.to_owned()));
        fields
    }

    pub fn fields(&self, login: &str, password: &str) -> Vec<(String, String)> {
        let mut fields = self.alias_fields(login);
        fields.push((PASSWORD_FIELD.to_owned(), password.to_owned()));
        fields
    }
}

pub fn has_captcha(html: &str) -> bool {
    let document = Html::parse_document(html);
    CAPTCHA_SELECTORS.iter().any(|selector| {
        let selector = Selector::parse(selector).expect("Invalid selector");
        document.select(&selector).next().is_some()
    })
}

/// Error text the portal renders next to a rejected login.
pub fn validation_message(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(".validation-summary-errors, .field-validation-error")
        .expect("Invalid selector");
    document
        .select(&selector)
        .map(|element| {
            element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .find(|message| !message.is_empty())
}

/// Value of the hidden `#ap` input carrying the token payload.
pub fn ap_value(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("#ap").expect("Invalid selector");
    document
        .select(&selector)
        .next()
        .map(|element| element.value().attr("value").unwrap_or_default().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
        <html><body>
          <form id="loginForm" method="post" action="/logowanie?ReturnUrl=%2Fapi%2Fap">
            <input type="hidden" name="__RequestVerificationToken" value="csrf-123" />
            <input type="hidden" name="ReturnUrl" value="/api/ap" />
            <input type="text" id="Alias" name="Alias" />
            <input type="password" id="Password" name="Password" />
            <button id="btLogOn" type="submit">Zaloguj</button>
          </form>
        </body></html>
    "#;

    fn page_url() -> Url {
        Url::parse("https://eduvulcan.pl/logowanie").unwrap()
    }

    #[test]
    fn test_parse_login_form() {
        let form = LoginForm::parse(LOGIN_PAGE, &page_url()).unwrap().unwrap();
        assert_eq!(
            form.action.as_str(),
            "https://eduvulcan.pl/logowanie?ReturnUrl=%2Fapi%2Fap"
        );
        assert_eq!(
            form.hidden_fields,
            vec![
                ("__RequestVerificationToken".to_owned(), "csrf-123".to_owned()),
                ("ReturnUrl".to_owned(), "/api/ap".to_owned()),
            ]
        );
    }

    #[test]
    fn test_form_without_action_posts_to_page() {
        let html = r#"<form><input name="Alias"/></form>"#;
        let form = LoginForm::parse(html, &page_url()).unwrap().unwrap();
        assert_eq!(form.action, page_url());
        assert!(form.hidden_fields.is_empty());
    }

    #[test]
    fn test_no_login_form() {
        let html = r#"<form action="/search"><input name="q"/></form>"#;
        assert!(LoginForm::parse(html, &page_url()).unwrap().is_none());
    }

    #[test]
    fn test_login_fields() {
        let form = LoginForm::parse(LOGIN_PAGE, &page_url()).unwrap().unwrap();
        let fields = form.fields("jan@example.com", "secret");
        assert_eq!(fields.len(), 4);
        assert_eq!(
            fields[2],
            ("Alias".to_owned(), "jan@example.com".to_owned())
        );
        assert_eq!(fields[3], ("Password".to_owned(), "secret".to_owned()));
    }

    #[test]
    fn test_captcha_detection() {
        assert!(!has_captcha(LOGIN_PAGE));
        assert!(has_captcha(r#"<div id="captcha-box"></div>"#));
        assert!(has_captcha(r#"<iframe src="https://x/recaptcha/api"></iframe>"#));
    }

    #[test]
    fn test_validation_message() {
        let html = r#"
            <div class="validation-summary-errors">
              <ul><li>Nieprawidłowy   login
                lub hasło</li></ul>
            </div>"#;
        assert_eq!(
            validation_message(html).as_deref(),
            Some("Nieprawidłowy login lub hasło")
        );
        assert_eq!(validation_message(LOGIN_PAGE), None);
    }

    #[test]
    fn test_ap_value() {
        let html = r#"<input id="ap" type="hidden" value='{"Tokens":["a.b.c"]}' />"#;
        assert_eq!(ap_value(html).as_deref(), Some(r#"{"Tokens":["a.b.c"]}"#));
        assert_eq!(ap_value(r#"<input id="ap" />"#).as_deref(), Some(""));
        assert_eq!(ap_value(LOGIN_PAGE), None);
    }
}
