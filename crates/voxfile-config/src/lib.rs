#![allow(clippy::must_use_candidate)]

pub mod backend;
pub mod credentials;
mod loader;
pub mod output;
pub mod synthesis;
pub mod telemetry;

use serde::Deserialize;

pub use backend::*;
pub use credentials::*;
pub use output::*;
pub use synthesis::*;
pub use telemetry::*;

/// Top-level voxfile configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Client credentials for the speech API
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Which backend to call and where
    #[serde(default)]
    pub backend: BackendConfig,
    /// Default synthesis parameters
    #[serde(default)]
    pub synthesis: SynthesisDefaults,
    /// Output placement
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
