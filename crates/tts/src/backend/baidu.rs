use std::sync::Arc;

use async_trait::async_trait;
use voxfile_config::BackendConfig;

use crate::{
    classify::classify,
    request::SynthesisRequestBuilder,
    token::TokenProvider,
    transport::Transport,
    types::{Credentials, SynthesisOutcome, SynthesisParams},
};

use super::SynthesisBackend;

/// A voice offered by the Baidu short-text API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    pub id: u32,
    pub name: &'static str,
    pub premium: bool,
}

/// Known Baidu voice ids
pub const VOICES: &[Voice] = &[
    Voice { id: 0, name: "Du Xiaomei (female)", premium: false },
    Voice { id: 1, name: "Du Xiaoyu (male)", premium: false },
    Voice { id: 3, name: "Du Xiaoyao (male, emotional)", premium: false },
    Voice { id: 4, name: "Du Yaya (child)", premium: false },
    Voice { id: 5, name: "Du Xiaojiao (female)", premium: true },
    Voice { id: 103, name: "Du Miduo (child)", premium: true },
    Voice { id: 106, name: "Du Bowen (male)", premium: true },
    Voice { id: 110, name: "Du Xiaotong (child)", premium: true },
    Voice { id: 111, name: "Du Xiaomeng (female)", premium: true },
];

/// Baidu TTS: fresh OAuth2 token per call, then a form POST
pub struct BaiduBackend {
    transport: Arc<dyn Transport>,
    tokens: TokenProvider,
    requests: SynthesisRequestBuilder,
}

impl BaiduBackend {
    pub fn new(transport: Arc<dyn Transport>, tokens: TokenProvider, requests: SynthesisRequestBuilder) -> Self {
        Self {
            transport,
            tokens,
            requests,
        }
    }

    pub fn from_config(config: &BackendConfig, transport: Arc<dyn Transport>) -> Self {
        let tokens = TokenProvider::new(config.token_url(), config.token_timeout);
        let requests = SynthesisRequestBuilder::new(
            config.synthesis_url(),
            config.cuid(),
            Some(config.synthesis_timeout),
        );

        Self::new(transport, tokens, requests)
    }
}

#[async_trait]
impl SynthesisBackend for BaiduBackend {
    async fn synthesize(
        &self,
        credentials: &Credentials,
        params: &SynthesisParams,
    ) -> crate::error::Result<SynthesisOutcome> {
        let token = self.tokens.fetch_token(self.transport.as_ref(), credentials).await?;

        let request = self.requests.build(&token, params);

        let response = self.transport.send(&request).await?;

        Ok(classify(response, params.audio_format))
    }

    fn name(&self) -> &str {
        "baidu"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::{error::TtsError, transport::HttpTransport, types::AudioFormat};

    const GRANTED: &str = r#"{"access_token":"24.tok","scope":"audio_tts_post","expires_in":2592000}"#;

    fn backend(server: &MockServer) -> BaiduBackend {
        BaiduBackend::new(
            Arc::new(HttpTransport::new().unwrap()),
            TokenProvider::new(format!("{}/oauth/2.0/token", server.uri()), Duration::from_secs(5)),
            SynthesisRequestBuilder::new(format!("{}/text2audio", server.uri()), "test", None),
        )
    }

    #[test]
    fn voice_ids_are_unique() {
        let mut ids: Vec<u32> = VOICES.iter().map(|v| v.id).collect();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), VOICES.len());
        assert!(VOICES.iter().any(|v| v.id == 0));
    }

    #[tokio::test]
    async fn sends_token_with_synthesis_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GRANTED))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/text2audio"))
            .and(body_string_contains("tok=24.tok"))
            .and(body_string_contains("aue=6"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"RIFF".to_vec(), "audio/wav"))
            .expect(1)
            .mount(&server)
            .await;

        let mut params = SynthesisParams::new("hello");
        params.audio_format = AudioFormat::Wav;

        let outcome = backend(&server)
            .synthesize(&Credentials::new("id", "secret"), &params)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SynthesisOutcome::Audio {
                bytes: b"RIFF".to_vec(),
                format: AudioFormat::Wav,
            }
        );
    }

    #[tokio::test]
    async fn missing_scope_skips_synthesis() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/2.0/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"access_token":"24.tok","scope":"public","expires_in":1}"#),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/text2audio"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = backend(&server)
            .synthesize(&Credentials::new("id", "secret"), &SynthesisParams::new("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, TtsError::Auth { .. }));
    }

    #[tokio::test]
    async fn json_error_body_becomes_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GRANTED))
            .mount(&server)
            .await;

        let error_body = r#"{"err_no":500,"err_msg":"notsupport.","sn":"abc","idx":1}"#;
        Mock::given(method("POST"))
            .and(path("/text2audio"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(error_body.as_bytes().to_vec(), "application/json"))
            .mount(&server)
            .await;

        let outcome = backend(&server)
            .synthesize(&Credentials::new("id", "secret"), &SynthesisParams::new("hello"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SynthesisOutcome::ApiError {
                raw_body: error_body.as_bytes().to_vec(),
                http_status: 200,
            }
        );
    }
}
