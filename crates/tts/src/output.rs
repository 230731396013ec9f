use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::{
    error::{Result, TtsError},
    types::{ArtifactKind, AudioFormat, OutputArtifact, SynthesisOutcome},
};

/// Suffix appended to the requested path when saving an API error body
pub const ERROR_REPORT_SUFFIX: &str = "_error.txt";

/// True if the requested path contains a `.` anywhere
///
/// The whole path counts, so `take.2/out` and `./out` are kept as given.
pub fn has_explicit_extension(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().contains('.')
}

/// `path` with `_error.txt` appended, whatever extension it already has
pub fn error_report_path(path: &Path) -> PathBuf {
    append(path, ERROR_REPORT_SUFFIX)
}

/// Where audio for `path` lands: unchanged if it has an extension,
/// otherwise with the canonical extension of `format` appended
pub fn audio_path(path: &Path, format: AudioFormat) -> PathBuf {
    if has_explicit_extension(path) {
        path.to_path_buf()
    } else {
        append(path, &format!(".{}", format.extension()))
    }
}

fn append(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Persists synthesis outcomes to disk
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    base_dir: Option<PathBuf>,
}

impl OutputWriter {
    pub const fn new() -> Self {
        Self { base_dir: None }
    }

    /// Resolve relative output paths against `dir`
    pub const fn with_base_dir(dir: PathBuf) -> Self {
        Self { base_dir: Some(dir) }
    }

    fn resolve(&self, requested: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if requested.is_relative() => dir.join(requested),
            _ => requested.to_path_buf(),
        }
    }

    /// Write the body of `outcome` next to `requested`
    ///
    /// Audio goes to [`audio_path`]; an API error body goes to
    /// [`error_report_path`] and the returned artifact reports failure.
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::Output`] if a directory or the file cannot be written
    pub async fn persist(
        &self,
        outcome: &SynthesisOutcome,
        requested: &Path,
        format: AudioFormat,
    ) -> Result<OutputArtifact> {
        // Naming looks at the path as requested, before the base directory is joined
        let (path, kind) = match outcome {
            SynthesisOutcome::Audio { .. } => (audio_path(requested, format), ArtifactKind::Audio),
            SynthesisOutcome::ApiError { .. } => (error_report_path(requested), ArtifactKind::ErrorReport),
        };
        let path = self.resolve(&path);

        write_file(&path, outcome.body()).await?;

        match kind {
            ArtifactKind::Audio => tracing::info!("audio saved to {}", path.display()),
            ArtifactKind::ErrorReport => tracing::warn!("API error saved to {}", path.display()),
        }

        Ok(OutputArtifact { path, kind })
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let output_error = |source| TtsError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(output_error)?;
    }

    let mut file = tokio::fs::File::create(path).await.map_err(output_error)?;
    file.write_all(bytes).await.map_err(output_error)?;
    file.flush().await.map_err(output_error)?;

    tracing::debug!(bytes = bytes.len(), "wrote {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(bytes: &[u8], format: AudioFormat) -> SynthesisOutcome {
        SynthesisOutcome::Audio {
            bytes: bytes.to_vec(),
            format,
        }
    }

    #[test]
    fn extension_predicate_looks_at_whole_path() {
        assert!(has_explicit_extension(Path::new("out.wav")));
        assert!(has_explicit_extension(Path::new("cnresult/result.mp3")));
        assert!(has_explicit_extension(Path::new("take.2/out")));
        assert!(has_explicit_extension(Path::new("./out")));
        assert!(!has_explicit_extension(Path::new("out")));
        assert!(!has_explicit_extension(Path::new("cnresult/out")));
    }

    #[test]
    fn dotted_directory_keeps_path_unchanged() {
        assert_eq!(audio_path(Path::new("take.2/out"), AudioFormat::Mp3), PathBuf::from("take.2/out"));
        assert_eq!(audio_path(Path::new("./out"), AudioFormat::Mp3), PathBuf::from("./out"));
    }

    #[test]
    fn pcm_formats_get_pcm_extension() {
        assert_eq!(audio_path(Path::new("out"), AudioFormat::Pcm16k), PathBuf::from("out.pcm"));
        assert_eq!(audio_path(Path::new("out"), AudioFormat::Pcm8k), PathBuf::from("out.pcm"));
        assert_eq!(audio_path(Path::new("out"), AudioFormat::Mp3), PathBuf::from("out.mp3"));
        assert_eq!(audio_path(Path::new("out"), AudioFormat::Wav), PathBuf::from("out.wav"));
    }

    #[test]
    fn explicit_extension_wins() {
        assert_eq!(audio_path(Path::new("out.wav"), AudioFormat::Mp3), PathBuf::from("out.wav"));
    }

    #[test]
    fn error_report_appends_suffix() {
        assert_eq!(error_report_path(Path::new("out.mp3")), PathBuf::from("out.mp3_error.txt"));
        assert_eq!(error_report_path(Path::new("out")), PathBuf::from("out_error.txt"));
    }

    #[tokio::test]
    async fn audio_bytes_are_written_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = b"ID3\x04\x00\xff\xfb\x90\x00".to_vec();

        let artifact = OutputWriter::with_base_dir(dir.path().to_path_buf())
            .persist(&audio(&bytes, AudioFormat::Mp3), Path::new("result"), AudioFormat::Mp3)
            .await
            .unwrap();

        assert!(artifact.is_success());
        assert_eq!(artifact.path, dir.path().join("result.mp3"));
        assert_eq!(std::fs::read(&artifact.path).unwrap(), bytes);
    }

    #[tokio::test]
    async fn pcm16k_without_extension_lands_in_pcm_file() {
        let dir = tempfile::tempdir().unwrap();

        let artifact = OutputWriter::with_base_dir(dir.path().to_path_buf())
            .persist(&audio(b"\x00\x01", AudioFormat::Pcm16k), Path::new("out"), AudioFormat::Pcm16k)
            .await
            .unwrap();

        assert_eq!(artifact.path, dir.path().join("out.pcm"));
    }

    #[tokio::test]
    async fn explicit_extension_is_kept_on_disk() {
        let dir = tempfile::tempdir().unwrap();

        let artifact = OutputWriter::new()
            .persist(&audio(b"RIFF", AudioFormat::Mp3), &dir.path().join("out.wav"), AudioFormat::Mp3)
            .await
            .unwrap();

        assert_eq!(artifact.path, dir.path().join("out.wav"));
        assert!(artifact.path.exists());
    }

    #[tokio::test]
    async fn api_error_is_saved_as_text_report() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = SynthesisOutcome::ApiError {
            raw_body: b"bad request".to_vec(),
            http_status: 200,
        };

        let artifact = OutputWriter::new()
            .persist(&outcome, &dir.path().join("out.mp3"), AudioFormat::Mp3)
            .await
            .unwrap();

        assert!(!artifact.is_success());
        assert_eq!(artifact.kind, ArtifactKind::ErrorReport);
        assert_eq!(artifact.path, dir.path().join("out.mp3_error.txt"));
        assert_eq!(std::fs::read_to_string(&artifact.path).unwrap(), "bad request");
        assert!(!dir.path().join("out.mp3").exists());
    }

    #[tokio::test]
    async fn parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cnresult").join("nested").join("result.mp3");

        let artifact = OutputWriter::new()
            .persist(&audio(b"x", AudioFormat::Mp3), &target, AudioFormat::Mp3)
            .await
            .unwrap();

        assert_eq!(artifact.path, target);
        assert!(target.exists());
    }

    #[tokio::test]
    async fn relative_paths_resolve_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();

        let artifact = OutputWriter::with_base_dir(dir.path().to_path_buf())
            .persist(&audio(b"x", AudioFormat::Wav), Path::new("clip"), AudioFormat::Wav)
            .await
            .unwrap();

        assert_eq!(artifact.path, dir.path().join("clip.wav"));
    }

    #[tokio::test]
    async fn dot_in_base_dir_does_not_count_as_extension() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("out.d");

        let artifact = OutputWriter::with_base_dir(base.clone())
            .persist(&audio(b"x", AudioFormat::Mp3), Path::new("clip"), AudioFormat::Mp3)
            .await
            .unwrap();

        assert_eq!(artifact.path, base.join("clip.mp3"));
        assert!(artifact.path.exists());
    }

    #[tokio::test]
    async fn unwritable_target_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a directory is needed
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let err = OutputWriter::new()
            .persist(&audio(b"x", AudioFormat::Mp3), &blocker.join("out"), AudioFormat::Mp3)
            .await
            .unwrap_err();

        assert!(matches!(err, TtsError::Output { .. }));
        assert_eq!(err.kind(), "output_error");
    }
}
