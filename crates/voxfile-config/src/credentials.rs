use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Environment variable consulted when `credentials.client_id` is unset
pub const CLIENT_ID_ENV: &str = "VOXFILE_CLIENT_ID";

/// Environment variable consulted when `credentials.client_secret` is unset
pub const CLIENT_SECRET_ENV: &str = "VOXFILE_CLIENT_SECRET";

/// Client credentials as written in the config file
///
/// Either field may be left out, in which case the matching environment
/// variable is used instead.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// API key / access key id
    #[serde(default)]
    pub client_id: Option<String>,
    /// Secret key / access key secret
    #[serde(default)]
    pub client_secret: Option<SecretString>,
}

impl CredentialsConfig {
    /// Resolve the client id and secret from the file, then the environment
    ///
    /// # Errors
    ///
    /// Returns an error naming both sources when a value is found in neither
    pub fn resolve(&self) -> anyhow::Result<(String, SecretString)> {
        let client_id = self
            .client_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| non_empty_env(CLIENT_ID_ENV))
            .ok_or_else(|| {
                anyhow::anyhow!("client id not configured: set credentials.client_id or {CLIENT_ID_ENV}")
            })?;

        let client_secret = self
            .client_secret
            .clone()
            .filter(|secret| !secret.expose_secret().is_empty())
            .or_else(|| non_empty_env(CLIENT_SECRET_ENV).map(SecretString::from))
            .ok_or_else(|| {
                anyhow::anyhow!("client secret not configured: set credentials.client_secret or {CLIENT_SECRET_ENV}")
            })?;

        Ok((client_id, client_secret))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
