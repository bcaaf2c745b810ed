//! JWT extraction from the `#ap` payload and tenant decoding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};
use thiserror::Error;

pub type JwtPayload = Map<String, Value>;

/// Keys checked, in order, when a `Tokens` entry is an object.
const TOKEN_KEYS: [&str; 8] = [
    "Token",
    "token",
    "Value",
    "value",
    "AccessToken",
    "access_token",
    "Jwt",
    "jwt",
];

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Tokens not found in login response")]
    TokensMissing,

    #[error("JWT token not found in Tokens")]
    JwtNotFound,

    #[error("Invalid JWT format")]
    InvalidFormat,

    #[error("Failed to decode JWT payload")]
    Base64(#[from] base64::DecodeError),

    #[error("JWT payload is not valid JSON")]
    PayloadJson(#[from] serde_json::Error),

    #[error("JWT payload is not a JSON object")]
    PayloadNotObject,

    #[error("Tenant field not found in JWT payload")]
    TenantMissing,

    #[error("Stored token is expired")]
    Expired,
}

pub fn is_jwt(value: &str) -> bool {
    value.matches('.').count() == 2
}

fn jwt_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|value| is_jwt(value))
}

pub fn extract_jwt(ap_data: &Value) -> Result<String, TokenError> {
    // An empty `Tokens` defers to `tokens`, whatever that holds.
    let tokens = match ap_data.get("Tokens").filter(|tokens| is_truthy(tokens)) {
        Some(tokens) => tokens,
        None => ap_data
            .get("tokens")
            .filter(|tokens| !tokens.is_null())
            .ok_or(TokenError::TokensMissing)?,
    };

    let items = match tokens {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => std::slice::from_ref(tokens),
        _ => &[],
    };

    items
        .iter()
        .find_map(|item| {
            jwt_str(item).or_else(|| {
                let object = item.as_object()?;
                TOKEN_KEYS
                    .iter()
                    .find_map(|key| object.get(*key).and_then(jwt_str))
            })
        })
        .map(str::to_owned)
        .ok_or(TokenError::JwtNotFound)
}

pub fn decode_jwt_payload(jwt: &str) -> Result<JwtPayload, TokenError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        return Err(TokenError::InvalidFormat);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    match serde_json::from_slice(&bytes)? {
        Value::Object(payload) => Ok(payload),
        _ => Err(TokenError::PayloadNotObject),
    }
}

pub fn tenant(payload: &JwtPayload) -> Result<String, TokenError> {
    ["tenant", "Tenant"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .find(|value| is_truthy(value))
        .map(value_to_string)
        .ok_or(TokenError::TenantMissing)
}

/// `exp` in seconds since the epoch; tokens without a usable `exp` never expire.
pub fn is_expired(payload: &JwtPayload, now: i64) -> bool {
    let exp = match payload.get("exp") {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(Value::Bool(flag)) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };
    exp.is_some_and(|exp| now as f64 >= exp)
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// A freshly fetched token with its decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedToken {
    pub jwt: String,
    pub tenant: String,
    pub payload: JwtPayload,
}

impl FetchedToken {
    pub fn from_jwt(jwt: String) -> Result<Self, TokenError> {
        let payload = decode_jwt_payload(&jwt)?;
        let tenant = tenant(&payload)?;
        Ok(FetchedToken {
            jwt,
            tenant,
            payload,
        })
    }
}
