//! Credentials and client settings.
//!
//! Environment lookup happens only in [`Credentials::resolve`]; everything
//! downstream receives explicit values.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{RequesterError, RequesterResult};
use crate::retry::RetryPolicy;

pub const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";

/// Requester access key pair. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Use explicit values where given, falling back to `AWS_ACCESS_KEY_ID`
    /// and `AWS_SECRET_ACCESS_KEY`.
    pub fn resolve(
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    ) -> RequesterResult<Self> {
        Self::resolve_with(access_key_id, secret_access_key, |name| {
            std::env::var(name).ok()
        })
    }

    /// Like [`Credentials::resolve`] with an injectable variable lookup.
    pub fn resolve_with<F>(
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        lookup: F,
    ) -> RequesterResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<String>, env: &str, what: &str| {
            explicit
                .or_else(|| lookup(env))
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    RequesterError::Configuration(format!(
                        "You must specify {what} or set the environment variable {env}"
                    ))
                })
        };

        Ok(Self {
            access_key_id: pick(access_key_id, ACCESS_KEY_ENV, "an access key id")?,
            secret_access_key: pick(secret_access_key, SECRET_KEY_ENV, "a secret access key")?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Which marketplace the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Sandbox,
    Production,
}

impl Endpoint {
    pub fn from_sandbox_flag(sandbox: bool) -> Self {
        if sandbox {
            Self::Sandbox
        } else {
            Self::Production
        }
    }

    /// Requester API base URL.
    pub fn service_url(&self) -> &'static str {
        match self {
            Self::Sandbox => {
                "https://mechanicalturk.sandbox.amazonaws.com/?Service=AWSMechanicalTurkRequester"
            }
            Self::Production => {
                "https://mechanicalturk.amazonaws.com/?Service=AWSMechanicalTurkRequester"
            }
        }
    }

    /// Submit action for hosted (External/HTML question) task forms.
    pub fn external_submit_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://workersandbox.mturk.com/mturk/externalSubmit",
            Self::Production => "https://www.mturk.com/mturk/externalSubmit",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sandbox => write!(f, "sandbox"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Client behaviour settings, optionally loaded from TOML.
///
/// ```toml
/// sandbox = true
/// verify_ssl = true
/// request_retry_timeout_secs = 10
/// max_request_retries = 5
/// http_timeout_secs = 60
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSettings {
    /// Use the sandbox marketplace.
    pub sandbox: bool,
    /// Verify the API's TLS certificate.
    pub verify_ssl: bool,
    /// Delay before the first retry; doubles on each further retry.
    pub request_retry_timeout_secs: u64,
    /// Total connection attempts per request.
    pub max_request_retries: u32,
    /// Overall HTTP timeout per attempt (None = no timeout).
    pub http_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            sandbox: false,
            verify_ssl: true,
            request_retry_timeout_secs: 10,
            max_request_retries: 5,
            http_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn from_toml_str(raw: &str) -> RequesterResult<Self> {
        let settings: Self = toml::from_str(raw)
            .map_err(|e| RequesterError::Configuration(format!("Invalid settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file(path: &Path) -> RequesterResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RequesterError::Configuration(format!(
                "Failed to read settings file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> RequesterResult<()> {
        if self.max_request_retries == 0 {
            return Err(RequesterError::Configuration(
                "max_request_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::from_sandbox_flag(self.sandbox)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_request_retries,
            base_delay: Duration::from_secs(self.request_retry_timeout_secs),
            multiplier: 2,
        }
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_explicit_credentials_win() {
        let creds = Credentials::resolve_with(
            Some("AKIDEXPLICIT".into()),
            Some("explicit-secret".into()),
            env(&[(ACCESS_KEY_ENV, "AKIDENV"), (SECRET_KEY_ENV, "env-secret")]),
        )
        .unwrap();
        assert_eq!(creds, Credentials::new("AKIDEXPLICIT", "explicit-secret"));
    }

    #[test]
    fn test_credentials_fall_back_to_env() {
        let creds = Credentials::resolve_with(
            None,
            Some("explicit-secret".into()),
            env(&[(ACCESS_KEY_ENV, "AKIDENV")]),
        )
        .unwrap();
        assert_eq!(creds.access_key_id, "AKIDENV");
        assert_eq!(creds.secret_access_key, "explicit-secret");
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let err =
            Credentials::resolve_with(None, None, env(&[(ACCESS_KEY_ENV, "AKIDENV")])).unwrap_err();
        assert!(matches!(err, RequesterError::Configuration(ref m) if m.contains(SECRET_KEY_ENV)));
    }

    #[test]
    fn test_blank_credential_rejected() {
        let err = Credentials::resolve_with(Some("  ".into()), Some("s".into()), env(&[]))
            .unwrap_err();
        assert!(matches!(err, RequesterError::Configuration(ref m) if m.contains(ACCESS_KEY_ENV)));
    }

    #[test]
    fn test_credentials_kept_verbatim() {
        let creds = Credentials::resolve_with(
            Some("AKID".into()),
            Some(" padded-secret\t".into()),
            env(&[]),
        )
        .unwrap();
        assert_eq!(creds.secret_access_key, " padded-secret\t");

        let creds = Credentials::resolve_with(
            None,
            None,
            env(&[(ACCESS_KEY_ENV, "AKID"), (SECRET_KEY_ENV, "env-secret ")]),
        )
        .unwrap();
        assert_eq!(creds.secret_access_key, "env-secret ");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("AKID", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(
            Endpoint::Sandbox.service_url(),
            "https://mechanicalturk.sandbox.amazonaws.com/?Service=AWSMechanicalTurkRequester"
        );
        assert_eq!(
            Endpoint::Production.service_url(),
            "https://mechanicalturk.amazonaws.com/?Service=AWSMechanicalTurkRequester"
        );
        assert_eq!(
            Endpoint::Sandbox.external_submit_url(),
            "https://workersandbox.mturk.com/mturk/externalSubmit"
        );
        assert_eq!(
            Endpoint::Production.external_submit_url(),
            "https://www.mturk.com/mturk/externalSubmit"
        );
    }

    #[test]
    fn test_settings_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.endpoint(), Endpoint::Production);
        let policy = settings.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_settings_from_toml_partial() {
        let settings = ClientSettings::from_toml_str("sandbox = true\nmax_request_retries = 3\n")
            .unwrap();
        assert!(settings.sandbox);
        assert!(settings.verify_ssl);
        assert_eq!(settings.max_request_retries, 3);
        assert_eq!(settings.request_retry_timeout_secs, 10);
    }

    #[test]
    fn test_settings_reject_unknown_and_zero_retries() {
        assert!(ClientSettings::from_toml_str("sandbx = true").is_err());
        assert!(ClientSettings::from_toml_str("max_request_retries = 0").is_err());
    }

    #[test]
    fn test_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mturk.toml");
        std::fs::write(&path, "verify_ssl = false\nhttp_timeout_secs = 30\n").unwrap();

        let settings = ClientSettings::from_toml_file(&path).unwrap();
        assert!(!settings.verify_ssl);
        assert_eq!(settings.http_timeout(), Some(Duration::from_secs(30)));

        assert!(ClientSettings::from_toml_file(&dir.path().join("missing.toml")).is_err());
    }
}
