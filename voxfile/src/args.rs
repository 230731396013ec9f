use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tts::AudioFormat;

/// Text-to-speech to files
#[derive(Debug, Parser)]
#[command(name = "voxfile", about = "Synthesize Chinese text to audio files")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "voxfile.toml", env = "VOXFILE_CONFIG")]
    pub config: PathBuf,

    /// Log filter, overrides `RUST_LOG` and the configured filter
    #[arg(long, env = "VOXFILE_LOG")]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synthesize one text into one file
    Speak {
        /// Text to synthesize
        text: String,

        /// Output path; the format's extension is appended if it has none
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        overrides: SynthesisOverrides,
    },

    /// Synthesize every non-empty line of a text file
    Batch {
        /// File with one text per line
        file: PathBuf,

        /// Directory for the generated files
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// File name prefix, followed by the line number
        #[arg(long, default_value = "text")]
        prefix: String,

        #[command(flatten)]
        overrides: SynthesisOverrides,
    },

    /// List known voices of the configured backend
    Voices,
}

/// Per-invocation overrides of the configured synthesis defaults
#[derive(Debug, Default, clap::Args)]
pub struct SynthesisOverrides {
    /// Voice id
    #[arg(long)]
    pub voice: Option<u32>,

    /// Named voice for backends that select voices by name (aliyun)
    #[arg(long)]
    pub voice_name: Option<String>,

    /// Speech rate, 0-15
    #[arg(long)]
    pub speed: Option<u8>,

    /// Pitch, 0-15
    #[arg(long)]
    pub pitch: Option<u8>,

    /// Volume, 0-9
    #[arg(long)]
    pub volume: Option<u8>,

    /// Audio format: mp3, pcm16k, pcm8k, or wav
    #[arg(long)]
    pub format: Option<AudioFormat>,
}

impl SynthesisOverrides {
    /// Parameters for `text`: configured defaults with overrides applied
    pub fn params(&self, text: &str, defaults: &voxfile_config::SynthesisDefaults) -> tts::SynthesisParams {
        let mut params = tts::SynthesisParams::with_defaults(text, defaults);

        if let Some(voice) = self.voice {
            params.voice_id = voice;
        }
        if let Some(name) = &self.voice_name {
            params.voice_name = Some(name.clone());
        }
        if let Some(speed) = self.speed {
            params.speech_rate = speed;
        }
        if let Some(pitch) = self.pitch {
            params.pitch = pitch;
        }
        if let Some(volume) = self.volume {
            params.volume = volume;
        }
        if let Some(format) = self.format {
            params.audio_format = format;
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn speak_parses_overrides() {
        let args = Args::try_parse_from([
            "voxfile", "speak", "你好", "-o", "out", "--voice", "103", "--format", "pcm16k",
        ])
        .unwrap();

        let Command::Speak { text, output, overrides } = args.command else {
            panic!("expected speak");
        };
        assert_eq!(text, "你好");
        assert_eq!(output, PathBuf::from("out"));

        let params = overrides.params(&text, &voxfile_config::SynthesisDefaults::default());
        assert_eq!(params.voice_id, 103);
        assert_eq!(params.audio_format, AudioFormat::Pcm16k);
        assert_eq!(params.speech_rate, 5);
    }

    #[test]
    fn voice_name_override_is_carried() {
        let args = Args::try_parse_from(["voxfile", "speak", "hi", "-o", "out", "--voice-name", "xiaogang"]).unwrap();

        let Command::Speak { text, overrides, .. } = args.command else {
            panic!("expected speak");
        };
        let params = overrides.params(&text, &voxfile_config::SynthesisDefaults::default());

        assert_eq!(params.voice_name.as_deref(), Some("xiaogang"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = Args::try_parse_from(["voxfile", "speak", "hi", "-o", "out", "--format", "ogg"]);

        assert!(result.is_err());
    }
}
