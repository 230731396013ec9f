use serde::Deserialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Audio encodings the synthesis API can return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum AudioFormat {
    #[default]
    #[serde(rename = "mp3")]
    #[strum(serialize = "mp3")]
    Mp3,
    /// 16 kHz 16-bit mono PCM
    #[serde(rename = "pcm16k")]
    #[strum(serialize = "pcm16k")]
    Pcm16k,
    /// 8 kHz 16-bit mono PCM
    #[serde(rename = "pcm8k")]
    #[strum(serialize = "pcm8k")]
    Pcm8k,
    #[serde(rename = "wav")]
    #[strum(serialize = "wav")]
    Wav,
}

impl AudioFormat {
    /// Wire code sent as `aue`
    pub const fn code(self) -> u8 {
        match self {
            Self::Mp3 => 3,
            Self::Pcm16k => 4,
            Self::Pcm8k => 5,
            Self::Wav => 6,
        }
    }

    /// File extension for audio written in this format
    ///
    /// Both PCM rates share `pcm`.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Pcm16k | Self::Pcm8k => "pcm",
            Self::Wav => "wav",
        }
    }

    pub const fn sample_rate(self) -> u32 {
        match self {
            Self::Pcm8k => 8000,
            Self::Mp3 | Self::Pcm16k | Self::Wav => 16000,
        }
    }
}

/// Default synthesis parameters applied when the caller does not override them
///
/// Ranges are documented, not enforced: out-of-range values are sent to the
/// remote API as-is.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisDefaults {
    /// Voice id (0 for the default female voice)
    #[serde(default)]
    pub voice: u32,
    /// Speech rate, 0-15
    #[serde(default = "default_level")]
    pub speed: u8,
    /// Pitch, 0-15
    #[serde(default = "default_level")]
    pub pitch: u8,
    /// Volume, 0-9
    #[serde(default = "default_level")]
    pub volume: u8,
    /// Output audio format
    #[serde(default)]
    pub format: AudioFormat,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            voice: 0,
            speed: default_level(),
            pitch: default_level(),
            volume: default_level(),
            format: AudioFormat::default(),
        }
    }
}

const fn default_level() -> u8 {
    5
}
