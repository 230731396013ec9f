use std::collections::BTreeSet;
use std::path::PathBuf;

use secrecy::SecretString;
use voxfile_config::{CredentialsConfig, SynthesisDefaults};

pub use voxfile_config::AudioFormat;

/// Client id and secret, borrowed for each call and never persisted
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Resolve credentials from the config file, falling back to the environment
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either value is missing from both sources
    pub fn from_config(config: &CredentialsConfig) -> crate::error::Result<Self> {
        let (client_id, client_secret) = config
            .resolve()
            .map_err(|e| crate::error::TtsError::Config(e.to_string()))?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

/// Short-lived bearer token obtained for a single synthesis call
#[derive(Debug)]
pub struct AccessToken {
    pub value: SecretString,
    pub scope: BTreeSet<String>,
    /// Lifetime in seconds as reported by the token endpoint
    pub expires_in: u64,
}

impl AccessToken {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.contains(scope)
    }
}

/// Parameters of one synthesis request
///
/// Documented ranges: `speech_rate` and `pitch` 0-15, `volume` 0-9. Values
/// are not clamped; the remote API rejects what it does not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisParams {
    pub text: String,
    pub voice_id: u32,
    /// Named voice for backends that select voices by name; `None` uses the configured one
    pub voice_name: Option<String>,
    pub speech_rate: u8,
    pub pitch: u8,
    pub volume: u8,
    pub audio_format: AudioFormat,
}

impl SynthesisParams {
    /// Parameters for `text` with mid-range settings and mp3 output
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_defaults(text, &SynthesisDefaults::default())
    }

    /// Parameters for `text` using configured defaults
    pub fn with_defaults(text: impl Into<String>, defaults: &SynthesisDefaults) -> Self {
        Self {
            text: text.into(),
            voice_id: defaults.voice,
            voice_name: None,
            speech_rate: defaults.speed,
            pitch: defaults.pitch,
            volume: defaults.volume,
            audio_format: defaults.format,
        }
    }
}

impl Default for SynthesisParams {
    /// Empty text, voice 0, mid-range levels, mp3
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Result of classifying a synthesis response; exactly one per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// Audio bytes in the requested format
    Audio { bytes: Vec<u8>, format: AudioFormat },
    /// Non-audio payload, usually a JSON error body
    ApiError { raw_body: Vec<u8>, http_status: u16 },
}

impl SynthesisOutcome {
    pub const fn is_audio(&self) -> bool {
        matches!(self, Self::Audio { .. })
    }

    pub fn body(&self) -> &[u8] {
        match self {
            Self::Audio { bytes, .. } => bytes,
            Self::ApiError { raw_body, .. } => raw_body,
        }
    }
}

/// What a persisted file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Audio,
    /// API error body saved as `<path>_error.txt`
    ErrorReport,
}

/// File written for a synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl OutputArtifact {
    pub fn is_success(&self) -> bool {
        self.kind == ArtifactKind::Audio
    }
}
