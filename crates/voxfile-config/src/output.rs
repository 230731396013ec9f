use std::path::PathBuf;

use serde::Deserialize;

/// Where synthesized files are written
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Base directory for relative output paths
    #[serde(default)]
    pub directory: Option<PathBuf>,
}
