use std::fmt;
use std::time::Duration;

use secrecy::ExposeSecret;
use url::form_urlencoded;

use crate::types::{AccessToken, SynthesisParams};

/// Content type of every request body this crate sends
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Language of the synthesized text (`lan`)
const LANGUAGE: &str = "zh";

/// Client type (`ctp`), fixed to web
const CLIENT_TYPE: &str = "1";

/// A single POST ready to hand to a [`crate::transport::Transport`]
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedRequest {
    pub url: String,
    pub content_type: &'static str,
    pub body: String,
    pub headers: Vec<(&'static str, String)>,
    /// Per-request timeout; `None` falls back to the transport's ceiling
    pub timeout: Option<Duration>,
}

impl EncodedRequest {
    /// A form-encoded POST to `url`
    pub const fn form(url: String, body: String) -> Self {
        Self {
            url,
            content_type: FORM_CONTENT_TYPE,
            body,
            headers: Vec::new(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

// The body carries tokens and secrets
impl fmt::Debug for EncodedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedRequest")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .field("body_len", &self.body.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Builds the form body of a token-authenticated synthesis request
#[derive(Debug, Clone)]
pub struct SynthesisRequestBuilder {
    url: String,
    cuid: String,
    timeout: Option<Duration>,
}

impl SynthesisRequestBuilder {
    pub fn new(url: impl Into<String>, cuid: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            url: url.into(),
            cuid: cuid.into(),
            timeout,
        }
    }

    /// Encode `params` and `token` into one POST body
    ///
    /// `tex` is form-encoded here and then again with the rest of the body,
    /// so the text reaches the API percent-encoded twice.
    pub fn build(&self, token: &AccessToken, params: &SynthesisParams) -> EncodedRequest {
        let tex = encode_text(&params.text);

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("tok", token.value.expose_secret())
            .append_pair("tex", &tex)
            .append_pair("per", &params.voice_id.to_string())
            .append_pair("spd", &params.speech_rate.to_string())
            .append_pair("pit", &params.pitch.to_string())
            .append_pair("vol", &params.volume.to_string())
            .append_pair("aue", &params.audio_format.code().to_string())
            .append_pair("cuid", &self.cuid)
            .append_pair("lan", LANGUAGE)
            .append_pair("ctp", CLIENT_TYPE)
            .finish();

        tracing::debug!(
            format = %params.audio_format,
            voice = params.voice_id,
            text_chars = params.text.chars().count(),
            "built synthesis request"
        );

        EncodedRequest::form(self.url.clone(), body).with_timeout(self.timeout)
    }
}

/// First encoding pass of the synthesis text (space becomes `+`)
pub fn encode_text(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}
