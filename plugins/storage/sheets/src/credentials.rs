//! Where the service credentials come from.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use gcp_auth::{CustomServiceAccount, TokenProvider};

use sheetsync_api::PluginError;

/// OAuth scope for reading and writing spreadsheet values.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Source of the service-account key.
///
/// Parsed from `adc`, `file:<path>` or `env:<VAR>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CredentialSource {
    /// Application default credentials (metadata server, gcloud, `GOOGLE_APPLICATION_CREDENTIALS`).
    #[default]
    ApplicationDefault,
    /// Service-account key file on disk.
    File(PathBuf),
    /// Service-account key JSON held in an environment variable.
    Env(String),
}

impl FromStr for CredentialSource {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("adc") || s.eq_ignore_ascii_case("default") {
            return Ok(Self::ApplicationDefault);
        }
        if let Some(path) = s.strip_prefix("file:") {
            if path.is_empty() {
                return Err(PluginError::config("credentials: empty file path"));
            }
            return Ok(Self::File(PathBuf::from(path)));
        }
        if let Some(var) = s.strip_prefix("env:") {
            if var.is_empty() {
                return Err(PluginError::config("credentials: empty variable name"));
            }
            return Ok(Self::Env(var.to_string()));
        }
        Err(PluginError::config(format!(
            "credentials: expected 'adc', 'file:<path>' or 'env:<VAR>', got '{s}'"
        )))
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApplicationDefault => f.write_str("adc"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Env(var) => write!(f, "env:{var}"),
        }
    }
}

/// Check that a key document has the fields a service account needs.
///
/// Runs before handing the key to the token provider so a broken key is
/// reported as such rather than as a signing or HTTP failure later.
pub fn validate_key_json(json: &str) -> Result<(), PluginError> {
    let doc: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| PluginError::credential(format!("key is not valid JSON: {e}")))?;

    for field in ["client_email", "private_key"] {
        match doc.get(field).and_then(serde_json::Value::as_str) {
            Some(v) if !v.trim().is_empty() => {}
            _ => {
                return Err(PluginError::credential(format!("key is missing '{field}'")));
            }
        }
    }
    Ok(())
}

/// Build a token provider for `source`.
pub async fn token_provider(
    source: &CredentialSource,
) -> Result<Arc<dyn TokenProvider>, PluginError> {
    match source {
        CredentialSource::ApplicationDefault => gcp_auth::provider()
            .await
            .map_err(|e| PluginError::credential(format!("application default credentials: {e}"))),
        CredentialSource::File(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| {
                PluginError::credential(format!("cannot read key file {}: {e}", path.display()))
            })?;
            from_key_json(&json)
        }
        CredentialSource::Env(var) => {
            let json = std::env::var(var).map_err(|_| {
                PluginError::credential(format!("environment variable {var} is not set"))
            })?;
            from_key_json(&json)
        }
    }
}

fn from_key_json(json: &str) -> Result<Arc<dyn TokenProvider>, PluginError> {
    validate_key_json(json)?;
    let account = CustomServiceAccount::from_json(json)
        .map_err(|e| PluginError::credential(format!("invalid service account key: {e}")))?;
    tracing::debug!("loaded service account key");
    Ok(Arc::new(account))
}

#[cfg(test)]
mod tests {
    use sheetsync_api::ErrorKind;

    use super::*;

    #[test]
    fn parses_sources() {
        assert_eq!("adc".parse::<CredentialSource>().unwrap(), CredentialSource::ApplicationDefault);
        assert_eq!(
            "file:/etc/sa.json".parse::<CredentialSource>().unwrap(),
            CredentialSource::File(PathBuf::from("/etc/sa.json"))
        );
        assert_eq!(
            "env:SA_KEY".parse::<CredentialSource>().unwrap(),
            CredentialSource::Env("SA_KEY".into())
        );
        assert_eq!(CredentialSource::Env("SA_KEY".into()).to_string(), "env:SA_KEY");
    }

    #[test]
    fn rejects_unknown_source() {
        let err = "vault:secret".parse::<CredentialSource>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!("file:".parse::<CredentialSource>().is_err());
    }

    #[test]
    fn key_needs_email_and_private_key() {
        let err = validate_key_json(r#"{"client_email": "a@b.iam"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Credential);
        assert!(err.message().contains("private_key"));

        assert!(validate_key_json("not json").is_err());
        assert!(
            validate_key_json(r#"{"client_email": "a@b.iam", "private_key": "-----BEGIN"}"#).is_ok()
        );
    }

    #[tokio::test]
    async fn missing_key_file_is_credential_error() {
        let source = CredentialSource::File(PathBuf::from("/nonexistent/sheetsync-key.json"));
        let err = token_provider(&source).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Credential);
    }
}
