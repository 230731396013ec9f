use std::path::Path;
use std::sync::Arc;

use voxfile_config::BackendType;

use crate::{
    backend::{SynthesisBackend, aliyun::AliyunBackend, baidu::BaiduBackend},
    error::{Result, TtsError},
    output::OutputWriter,
    transport::{HttpTransport, Transport},
    types::{Credentials, OutputArtifact, SynthesisOutcome, SynthesisParams},
};

/// Runs one backend call end to end and persists the result
pub struct Synthesizer {
    backend: Box<dyn SynthesisBackend>,
    writer: OutputWriter,
}

impl Synthesizer {
    pub fn new(backend: Box<dyn SynthesisBackend>, writer: OutputWriter) -> Self {
        Self { backend, writer }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Synthesize `params.text` into a file at `output_path`
    ///
    /// On success the audio lands at `output_path`, with the extension of the
    /// requested format appended if the file name has none. If the API
    /// answers with anything other than audio, its body is written to
    /// `<output_path>_error.txt` and [`TtsError::Api`] is returned.
    ///
    /// Authentication and connection failures write no file.
    pub async fn synthesize_to_file(
        &self,
        credentials: &Credentials,
        params: &SynthesisParams,
        output_path: &Path,
    ) -> Result<OutputArtifact> {
        tracing::debug!(
            backend = self.backend.name(),
            output = %output_path.display(),
            "synthesizing"
        );

        let outcome = self.backend.synthesize(credentials, params).await.inspect_err(|e| {
            tracing::error!(kind = e.kind(), "synthesis failed: {e}");
        })?;

        let artifact = self.writer.persist(&outcome, output_path, params.audio_format).await?;

        match outcome {
            SynthesisOutcome::Audio { .. } => Ok(artifact),
            SynthesisOutcome::ApiError { raw_body, http_status } => Err(TtsError::Api {
                status: http_status,
                body: String::from_utf8_lossy(&raw_body).into_owned(),
                artifact: artifact.path,
            }),
        }
    }
}

/// Builder for constructing a [`Synthesizer`] from configuration
pub struct SynthesizerBuilder<'a> {
    config: &'a voxfile_config::Config,
    transport: Option<Arc<dyn Transport>>,
}

impl<'a> SynthesizerBuilder<'a> {
    pub const fn new(config: &'a voxfile_config::Config) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Use `transport` instead of a fresh [`HttpTransport`]
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Synthesizer> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        let backend_config = &self.config.backend;

        let backend: Box<dyn SynthesisBackend> = match backend_config.backend_type {
            BackendType::Baidu => Box::new(BaiduBackend::from_config(backend_config, transport)),
            BackendType::Aliyun => Box::new(AliyunBackend::from_config(backend_config, transport)?),
        };

        let writer = self
            .config
            .output
            .directory
            .clone()
            .map_or_else(OutputWriter::new, OutputWriter::with_base_dir);

        tracing::debug!("synthesizer initialized with {} backend", backend.name());

        Ok(Synthesizer::new(backend, writer))
    }
}
