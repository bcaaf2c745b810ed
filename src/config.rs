//! Add-on options as supplied by the Supervisor in `/data/options.json`.

use figment::providers::{Format, Json};
use figment::Figment;
use std::path::Path;

/// Marker the add-on configuration layer emits for an unset option.
pub const NULL_SENTINEL: &str = "null";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonOptions {
    pub login: Option<String>,
    pub password: Option<String>,
}

/// Credentials as exported to the token fetcher. Unset values are empty.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AddonOptions {
    /// Reads each option on its own. A field that cannot be read is left
    /// unset rather than failing the whole load.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let figment = Figment::new().merge(Json::file_exact(path));
        AddonOptions {
            login: read_field(&figment, "login", path),
            password: read_field(&figment, "password", path),
        }
    }
}

fn read_field(figment: &Figment, key: &str, path: &Path) -> Option<String> {
    match figment.extract_inner::<Option<String>>(key) {
        Ok(value) => value,
        Err(err) if err.missing() => None,
        Err(err) => {
            tracing::warn!(
                "Failed to read option '{key}' from {}: {err}",
                path.display()
            );
            None
        }
    }
}

pub fn normalize(value: Option<String>) -> String {
    match value {
        Some(value) if value != NULL_SENTINEL => value,
        _ => String::new(),
    }
}

impl From<AddonOptions> for Credentials {
    fn from(options: AddonOptions) -> Self {
        Credentials {
            login: normalize(options.login),
            password: normalize(options.password),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options_file(contents: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Some("null".into())), "");
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("".into())), "");
        assert_eq!(normalize(Some("alice".into())), "alice");
        assert_eq!(normalize(Some(" Null ".into())), " Null ");
    }

    #[test]
    fn test_load_both_fields() {
        let (_dir, path) = options_file(r#"{"login": "alice", "password": "hunter2"}"#);
        let credentials = Credentials::from(AddonOptions::load(&path));
        assert_eq!(credentials.login, "alice");
        assert_eq!(credentials.password, "hunter2");
    }

    #[test]
    fn test_sentinel_password() {
        let (_dir, path) = options_file(r#"{"login": "alice", "password": "null"}"#);
        let credentials = Credentials::from(AddonOptions::load(&path));
        assert_eq!(credentials.login, "alice");
        assert_eq!(credentials.password, "");
    }

    #[test]
    fn test_json_null_and_missing_fields() {
        let (_dir, path) = options_file(r#"{"login": null}"#);
        let options = AddonOptions::load(&path);
        assert_eq!(options, AddonOptions::default());
    }

    #[test]
    fn test_wrong_type_only_affects_that_field() {
        let (_dir, path) = options_file(r#"{"login": ["a"], "password": "pw"}"#);
        let options = AddonOptions::load(&path);
        assert_eq!(options.login, None);
        assert_eq!(options.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_unavailable_source_yields_empty_credentials() {
        let dir = TempDir::new().unwrap();
        let credentials = Credentials::from(AddonOptions::load(dir.path().join("missing.json")));
        assert_eq!(credentials, Credentials::default());

        let (_dir, path) = options_file("{ not json");
        let credentials = Credentials::from(AddonOptions::load(&path));
        assert_eq!(credentials, Credentials::default());
    }

    #[test]
    fn test_debug_hides_password() {
        let credentials = Credentials {
            login: "alice".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }
}
