#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod backend;
mod classify;
mod error;
pub mod output;
mod request;
mod synthesizer;
pub mod token;
pub mod transport;
mod types;

pub use backend::{
    SynthesisBackend,
    aliyun::{AliyunBackend, NamedVoice},
    baidu::{BaiduBackend, VOICES, Voice},
};
pub use classify::{classify, is_audio_content_type};
pub use error::{Result, TtsError};
pub use request::{EncodedRequest, SynthesisRequestBuilder, encode_text};
pub use synthesizer::{Synthesizer, SynthesizerBuilder};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
pub use types::{
    AccessToken, ArtifactKind, AudioFormat, Credentials, OutputArtifact, SynthesisOutcome, SynthesisParams,
};
