use std::collections::BTreeSet;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::form_urlencoded;

use crate::{
    error::{Result, TtsError},
    request::EncodedRequest,
    transport::Transport,
    types::{AccessToken, Credentials},
};

/// Scope a token must carry to be usable for synthesis
pub const REQUIRED_SCOPE: &str = "audio_tts_post";

/// Exchanges client credentials for a bearer token (OAuth2 client-credentials flow)
///
/// A fresh token is fetched for every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    token_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    scope: Option<String>,
    #[serde(default)]
    expires_in: u64,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenProvider {
    pub fn new(token_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            token_url: token_url.into(),
            timeout,
        }
    }

    /// Form-encoded token request for `credentials`
    pub fn request(&self, credentials: &Credentials) -> EncodedRequest {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &credentials.client_id)
            .append_pair("client_secret", credentials.client_secret.expose_secret())
            .finish();

        EncodedRequest::form(self.token_url.clone(), body).with_timeout(Some(self.timeout))
    }

    /// Fetch a token and check it carries [`REQUIRED_SCOPE`]
    ///
    /// Error statuses from the token endpoint are not failures by themselves;
    /// the body is inspected either way.
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::Auth`] if the endpoint cannot be reached (carrying
    /// any partial body), the response has no token, or it lacks the scope
    pub async fn fetch_token(&self, transport: &dyn Transport, credentials: &Credentials) -> Result<AccessToken> {
        tracing::debug!("fetching token from {}", self.token_url);

        let response = transport.send(&self.request(credentials)).await.map_err(|e| {
            tracing::error!("token endpoint unreachable: {}", e.message);
            TtsError::auth(format!("token endpoint unreachable: {}", e.message), e.body)
        })?;

        if !response.status.is_success() {
            tracing::warn!("token endpoint returned HTTP {}", response.status.as_u16());
        }

        let token = parse_token_response(&response.body_text())?;

        tracing::debug!(
            expires_in = token.expires_in,
            scopes = token.scope.len(),
            "token obtained"
        );

        Ok(token)
    }
}

/// Parse a token endpoint body and validate the granted scope
///
/// # Errors
///
/// Returns [`TtsError::Auth`] carrying the raw body if it is not JSON, lacks
/// `access_token` or `scope`, or the scope set does not contain [`REQUIRED_SCOPE`]
pub fn parse_token_response(body: &str) -> Result<AccessToken> {
    let response: TokenResponse = serde_json::from_str(body).map_err(|e| {
        tracing::error!("token response is not valid JSON: {e}");
        TtsError::auth(format!("invalid token response: {e}"), Some(body.to_owned()))
    })?;

    let (Some(access_token), Some(scope)) = (response.access_token, response.scope) else {
        let detail = response
            .error_description
            .or(response.error)
            .unwrap_or_else(|| "check client id and secret".to_owned());

        tracing::error!("access_token or scope missing from token response: {detail}");

        return Err(TtsError::auth(
            format!("access_token or scope not found in token response ({detail})"),
            Some(body.to_owned()),
        ));
    };

    let scope: BTreeSet<String> = scope.split_whitespace().map(str::to_owned).collect();

    if !scope.contains(REQUIRED_SCOPE) {
        tracing::error!("granted scope does not include {REQUIRED_SCOPE}");

        return Err(TtsError::auth(
            format!("granted scope does not include {REQUIRED_SCOPE}"),
            Some(body.to_owned()),
        ));
    }

    Ok(AccessToken {
        value: SecretString::from(access_token),
        scope,
        expires_in: response.expires_in,
    })
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::transport::HttpTransport;

    const GRANTED: &str = r#"{"access_token":"24.abc","scope":"public audio_voice_assistant_get audio_tts_post","expires_in":2592000}"#;

    #[test]
    fn accepts_token_with_required_scope() {
        let token = parse_token_response(GRANTED).unwrap();

        assert_eq!(token.value.expose_secret(), "24.abc");
        assert!(token.has_scope(REQUIRED_SCOPE));
        assert_eq!(token.scope.len(), 3);
        assert_eq!(token.expires_in, 2_592_000);
    }

    #[test]
    fn rejects_token_without_required_scope() {
        let body = r#"{"access_token":"24.abc","scope":"public brain_all_scope","expires_in":100}"#;

        let err = parse_token_response(body).unwrap_err();

        let TtsError::Auth { message, body: raw } = err else {
            panic!("expected auth error");
        };
        assert!(message.contains(REQUIRED_SCOPE));
        assert_eq!(raw.as_deref(), Some(body));
    }

    #[test]
    fn scope_match_is_exact() {
        let body = r#"{"access_token":"t","scope":"audio_tts_post_extra audio_tts","expires_in":1}"#;

        assert!(matches!(parse_token_response(body), Err(TtsError::Auth { .. })));
    }

    #[test]
    fn missing_fields_report_remote_error() {
        let body = r#"{"error":"invalid_client","error_description":"unknown client id"}"#;

        let err = parse_token_response(body).unwrap_err();

        assert!(err.to_string().contains("unknown client id"));
    }

    #[test]
    fn non_json_body_is_an_auth_error() {
        let err = parse_token_response("<html>bad gateway</html>").unwrap_err();

        let TtsError::Auth { body, .. } = err else {
            panic!("expected auth error");
        };
        assert_eq!(body.as_deref(), Some("<html>bad gateway</html>"));
    }

    #[test]
    fn request_is_client_credentials_form() {
        let provider = TokenProvider::new("http://localhost/oauth/2.0/token", Duration::from_secs(5));
        let request = provider.request(&Credentials::new("my id", "s&cret"));

        assert_eq!(request.url, "http://localhost/oauth/2.0/token");
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            request.body,
            "grant_type=client_credentials&client_id=my+id&client_secret=s%26cret"
        );
    }

    #[tokio::test]
    async fn fetches_token_from_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=id"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GRANTED))
            .expect(1)
            .mount(&server)
            .await;

        let provider = TokenProvider::new(format!("{}/oauth/2.0/token", server.uri()), Duration::from_secs(5));
        let transport = HttpTransport::new().unwrap();

        let token = provider
            .fetch_token(&transport, &Credentials::new("id", "secret"))
            .await
            .unwrap();

        assert!(token.has_scope(REQUIRED_SCOPE));
    }

    #[tokio::test]
    async fn error_status_body_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"error":"invalid_client","error_description":"Client authentication failed"}"#),
            )
            .mount(&server)
            .await;

        let provider = TokenProvider::new(server.uri(), Duration::from_secs(5));
        let transport = HttpTransport::new().unwrap();

        let err = provider
            .fetch_token(&transport, &Credentials::new("id", "wrong"))
            .await
            .unwrap_err();

        let TtsError::Auth { message, body } = err else {
            panic!("expected auth error");
        };
        assert!(message.contains("Client authentication failed"));
        assert!(body.unwrap().contains("invalid_client"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_auth_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = TokenProvider::new(format!("http://{addr}/oauth/2.0/token"), Duration::from_secs(1));
        let transport = HttpTransport::new().unwrap();

        let err = provider
            .fetch_token(&transport, &Credentials::new("id", "secret"))
            .await
            .unwrap_err();

        let TtsError::Auth { message, .. } = err else {
            panic!("expected auth error");
        };
        assert!(message.contains("unreachable"));
    }

    #[tokio::test]
    async fn dropped_connection_keeps_partial_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0_u8; 4096];
            let _ = socket.read(&mut request).await.unwrap();

            socket
                .write_all(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 200\r\n\r\n{\"error\":\"invalid_client\"")
                .await
                .unwrap();
            socket.flush().await.unwrap();
        });

        let provider = TokenProvider::new(format!("http://{addr}/oauth/2.0/token"), Duration::from_secs(5));
        let transport = HttpTransport::new().unwrap();

        let err = provider
            .fetch_token(&transport, &Credentials::new("id", "secret"))
            .await
            .unwrap_err();

        let TtsError::Auth { body, .. } = err else {
            panic!("expected auth error");
        };
        assert_eq!(body.as_deref(), Some("{\"error\":\"invalid_client\""));
    }
}
