//! Aliyun speech synthesis with HMAC-signed requests
//!
//! There is no token stage. Every request carries the access key id and a
//! signature over its own parameters:
//!
//! 1. Parameters are sorted by key and each key and value is RFC 3986
//!    encoded, giving the canonical query string.
//! 2. The string to sign is `POST&%2F&` followed by the encoded canonical
//!    query string.
//! 3. The signature is HMAC-SHA256 of that string keyed by `secret + "&"`,
//!    base64 encoded, and sent as the `Signature` parameter.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;
use url::form_urlencoded;
use uuid::Uuid;
use voxfile_config::BackendConfig;

use crate::{
    classify::classify,
    error::{Result, TtsError},
    request::EncodedRequest,
    transport::Transport,
    types::{Credentials, SynthesisOutcome, SynthesisParams},
};

use super::SynthesisBackend;

const ACTION: &str = "SynthesizeSpeech";
const API_VERSION: &str = "2019-02-28";
const SIGNATURE_METHOD: &str = "HMAC-SHA256";
const SIGNATURE_VERSION: &str = "1.0";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A named Aliyun voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedVoice {
    pub name: &'static str,
    pub description: &'static str,
}

/// Common Aliyun voices; any other name the service accepts works too
pub const VOICES: &[NamedVoice] = &[
    NamedVoice { name: "xiaoyun", description: "standard female" },
    NamedVoice { name: "xiaogang", description: "standard male" },
    NamedVoice { name: "ruoxi", description: "gentle female" },
    NamedVoice { name: "siqi", description: "warm female" },
    NamedVoice { name: "sijia", description: "standard female" },
    NamedVoice { name: "sicheng", description: "standard male" },
    NamedVoice { name: "aiqi", description: "warm female" },
    NamedVoice { name: "aijia", description: "standard female" },
    NamedVoice { name: "aicheng", description: "standard male" },
    NamedVoice { name: "aida", description: "standard male" },
];

/// Aliyun TTS: signed form POST, same classification as every backend
pub struct AliyunBackend {
    transport: Arc<dyn Transport>,
    endpoint: String,
    app_key: String,
    voice: String,
    timeout: Duration,
}

impl AliyunBackend {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        app_key: impl Into<String>,
        voice: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            app_key: app_key.into(),
            voice: voice.into(),
            timeout,
        }
    }

    /// # Errors
    ///
    /// Returns a configuration error if no application key is configured
    pub fn from_config(config: &BackendConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let app_key = config
            .app_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TtsError::Config("app_key is required for the aliyun backend".to_owned()))?;

        Ok(Self::new(
            transport,
            config.synthesis_url(),
            app_key,
            config.voice(),
            config.synthesis_timeout,
        ))
    }

    /// The per-call voice name if given, else the configured one
    pub fn voice_for<'a>(&'a self, params: &'a SynthesisParams) -> &'a str {
        params.voice_name.as_deref().filter(|name| !name.is_empty()).unwrap_or(self.voice.as_str())
    }

    /// Build the signed request for a given timestamp and nonce
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::Signing`] if the HMAC key is rejected
    pub fn signed_request(
        &self,
        credentials: &Credentials,
        params: &SynthesisParams,
        timestamp: &str,
        nonce: &str,
    ) -> Result<EncodedRequest> {
        let format = params.audio_format;
        let voice = self.voice_for(params);

        let query: BTreeMap<&str, String> = BTreeMap::from([
            ("AccessKeyId", credentials.client_id.clone()),
            ("Action", ACTION.to_owned()),
            ("AppKey", self.app_key.clone()),
            ("Format", format.extension().to_owned()),
            ("PitchRate", scale_centered(params.pitch).to_string()),
            ("SampleRate", format.sample_rate().to_string()),
            ("SignatureMethod", SIGNATURE_METHOD.to_owned()),
            ("SignatureNonce", nonce.to_owned()),
            ("SignatureVersion", SIGNATURE_VERSION.to_owned()),
            ("SpeechRate", scale_centered(params.speech_rate).to_string()),
            ("Text", params.text.clone()),
            ("Timestamp", timestamp.to_owned()),
            ("Version", API_VERSION.to_owned()),
            ("Voice", voice.to_owned()),
            ("Volume", scale_volume(params.volume).to_string()),
        ]);

        let canonical = canonical_query(&query);
        let signature = sign(&string_to_sign(&canonical), credentials.client_secret.expose_secret())?;
        let body = format!("{canonical}&Signature={}", percent_encode(&signature));

        Ok(EncodedRequest::form(self.endpoint.clone(), body).with_timeout(Some(self.timeout)))
    }
}

#[async_trait]
impl SynthesisBackend for AliyunBackend {
    async fn synthesize(&self, credentials: &Credentials, params: &SynthesisParams) -> Result<SynthesisOutcome> {
        let timestamp = jiff::Timestamp::now().strftime(TIMESTAMP_FORMAT).to_string();
        let nonce = Uuid::new_v4().to_string();

        let request = self.signed_request(credentials, params, &timestamp, &nonce)?;

        tracing::debug!(voice = self.voice_for(params), format = %params.audio_format, "sending signed synthesis request");

        let response = self.transport.send(&request).await?;

        Ok(classify(response, params.audio_format))
    }

    fn name(&self) -> &str {
        "aliyun"
    }
}

/// RFC 3986 encoding: only `A-Z a-z 0-9 - _ . ~` stay literal
pub fn percent_encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// Sorted, encoded `key=value` pairs joined by `&`
pub fn canonical_query(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn string_to_sign(canonical_query: &str) -> String {
    format!("POST&{}&{}", percent_encode("/"), percent_encode(canonical_query))
}

/// Base64 HMAC-SHA256 of `string_to_sign` keyed by `secret&`
///
/// # Errors
///
/// Returns [`TtsError::Signing`] if the key is rejected by the MAC
pub fn sign(string_to_sign: &str, secret: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(format!("{secret}&").as_bytes())
        .map_err(|e| TtsError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());

    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// Map a 0-15 level centred on 5 onto the -500..=500 rate scale
fn scale_centered(level: u8) -> i32 {
    (i32::from(level) - 5) * 100
}

/// Map a 0-9 volume onto 0-100
fn scale_volume(level: u8) -> u32 {
    u32::from(level) * 100 / 9
}
