use crate::{
    transport::RawResponse,
    types::{AudioFormat, SynthesisOutcome},
};

/// Media type fragment that marks a response body as audio
const AUDIO_MEDIA_PREFIX: &str = "audio/";

/// True if a `Content-Type` is present and contains `audio/`
pub fn is_audio_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.contains(AUDIO_MEDIA_PREFIX))
}

/// Decide whether `response` carries audio or an API error
///
/// Only the content type decides. The API reports errors as JSON, often with
/// a 200 status, so the status code is kept for diagnostics and nothing else.
pub fn classify(response: RawResponse, format: AudioFormat) -> SynthesisOutcome {
    if is_audio_content_type(response.content_type()) {
        tracing::debug!(bytes = response.body.len(), %format, "response classified as audio");

        SynthesisOutcome::Audio {
            bytes: response.body,
            format,
        }
    } else {
        tracing::warn!(
            status = response.status.as_u16(),
            content_type = response.content_type().unwrap_or("<none>"),
            "response classified as API error"
        );

        SynthesisOutcome::ApiError {
            http_status: response.status.as_u16(),
            raw_body: response.body,
        }
    }
}
