use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Baidu OAuth2 token endpoint
pub const DEFAULT_BAIDU_TOKEN_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";

/// Baidu short-text synthesis endpoint
pub const DEFAULT_BAIDU_SYNTHESIS_URL: &str = "https://tsn.baidu.com/text2audio";

/// Aliyun signed synthesis endpoint
pub const DEFAULT_ALIYUN_ENDPOINT: &str = "https://nls-gateway-cn-shanghai.aliyuncs.com/";

/// Client identifier sent as `cuid` on every synthesis request
pub const DEFAULT_CUID: &str = "voxfile-rs";

/// Aliyun voice used when none is configured
pub const DEFAULT_ALIYUN_VOICE: &str = "xiaoyun";

/// Upper bound for any configured network timeout
pub const MAX_TIMEOUT: Duration = Duration::from_secs(600);

/// Speech backend configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Backend type
    #[serde(rename = "type", default)]
    pub backend_type: BackendType,
    /// Token endpoint override (token backends only)
    #[serde(default)]
    pub token_url: Option<Url>,
    /// Synthesis endpoint override
    #[serde(default)]
    pub synthesis_url: Option<Url>,
    /// Client identifier override
    #[serde(default)]
    pub cuid: Option<String>,
    /// Timeout for the token exchange
    #[serde(default = "default_token_timeout", deserialize_with = "duration_str::deserialize_duration")]
    pub token_timeout: Duration,
    /// Timeout for the synthesis request
    #[serde(
        default = "default_synthesis_timeout",
        deserialize_with = "duration_str::deserialize_duration"
    )]
    pub synthesis_timeout: Duration,
    /// Application key (Aliyun only, required there)
    #[serde(default)]
    pub app_key: Option<String>,
    /// Named voice (Aliyun only)
    #[serde(default)]
    pub voice: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_type: BackendType::default(),
            token_url: None,
            synthesis_url: None,
            cuid: None,
            token_timeout: default_token_timeout(),
            synthesis_timeout: default_synthesis_timeout(),
            app_key: None,
            voice: None,
        }
    }
}

impl BackendConfig {
    /// Token endpoint, falling back to the Baidu default
    pub fn token_url(&self) -> &str {
        self.token_url.as_ref().map_or(DEFAULT_BAIDU_TOKEN_URL, Url::as_str)
    }

    /// Synthesis endpoint, falling back to the default for the backend type
    pub fn synthesis_url(&self) -> &str {
        self.synthesis_url.as_ref().map_or_else(
            || match self.backend_type {
                BackendType::Baidu => DEFAULT_BAIDU_SYNTHESIS_URL,
                BackendType::Aliyun => DEFAULT_ALIYUN_ENDPOINT,
            },
            Url::as_str,
        )
    }

    pub fn cuid(&self) -> &str {
        self.cuid.as_deref().unwrap_or(DEFAULT_CUID)
    }

    pub fn voice(&self) -> &str {
        self.voice.as_deref().unwrap_or(DEFAULT_ALIYUN_VOICE)
    }

    /// Validate timeouts and backend-specific requirements
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout is zero or above [`MAX_TIMEOUT`], or
    /// the Aliyun backend is selected without an application key
    pub fn validate(&self) -> Result<(), String> {
        for (name, timeout) in [
            ("token_timeout", self.token_timeout),
            ("synthesis_timeout", self.synthesis_timeout),
        ] {
            if timeout.is_zero() {
                return Err(format!("backend.{name} must be greater than zero"));
            }
            if timeout > MAX_TIMEOUT {
                return Err(format!(
                    "backend.{name} of {}s exceeds the maximum of {}s",
                    timeout.as_secs(),
                    MAX_TIMEOUT.as_secs()
                ));
            }
        }

        if self.backend_type == BackendType::Aliyun && self.app_key.as_deref().is_none_or(str::is_empty) {
            return Err("backend.app_key is required for the aliyun backend".to_owned());
        }

        Ok(())
    }
}

/// Supported speech backends
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// Baidu: OAuth2 client-credentials token, then form POST
    #[default]
    Baidu,
    /// Aliyun: HMAC-signed form POST, no token stage
    Aliyun,
}

const fn default_token_timeout() -> Duration {
    Duration::from_secs(5)
}

const fn default_synthesis_timeout() -> Duration {
    Duration::from_secs(60)
}
