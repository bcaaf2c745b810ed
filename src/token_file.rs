//! The JSON token file shared with the Home Assistant integration.

use crate::token::{self, FetchedToken, JwtPayload, TokenError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct TokenFileContents {
    jwt: String,
    tenant: String,
    jwt_payload: JwtPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredToken {
    pub token: FetchedToken,
    /// Set when the file lacked a decoded payload and should be rewritten.
    pub needs_write: bool,
}

/// Loads a previously written token.
///
/// Missing or unusable files yield `Ok(None)`. A readable token that can no
/// longer be used (expired, no tenant) is an error so the caller can discard it.
pub fn read_existing(path: &Path, now: i64) -> Result<Option<StoredToken>, TokenError> {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return Ok(None);
    };
    let Ok(Value::Object(data)) = serde_json::from_str::<Value>(&raw) else {
        return Ok(None);
    };
    let Some(jwt) = data
        .get("jwt")
        .and_then(Value::as_str)
        .filter(|jwt| token::is_jwt(jwt))
    else {
        return Ok(None);
    };

    let (payload, needs_write) = match data.get("jwt_payload") {
        Some(Value::Object(payload)) => (payload.clone(), false),
        _ => (token::decode_jwt_payload(jwt)?, true),
    };

    if token::is_expired(&payload, now) {
        return Err(TokenError::Expired);
    }

    let tenant = match data.get("tenant").filter(|value| token::is_truthy(value)) {
        Some(value) => token::value_to_string(value),
        None => token::tenant(&payload)?,
    };

    Ok(Some(StoredToken {
        token: FetchedToken {
            jwt: jwt.to_owned(),
            tenant,
            payload,
        },
        needs_write,
    }))
}

pub fn write(path: &Path, token: &FetchedToken) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let contents = TokenFileContents {
        jwt: token.jwt.clone(),
        tenant: token.tenant.clone(),
        jwt_payload: token.payload.clone(),
    };
    let json = serde_json::to_string_pretty(&contents)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn remove(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed token file"),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => tracing::warn!("Failed to delete token file: {err}"),
    }
}
