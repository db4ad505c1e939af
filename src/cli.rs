use clap::{Parser, Subcommand};

use crate::request::{Granularity, ResponseFormat};

#[derive(Parser)]
#[command(
    name = "speech-client",
    about = "Speech Client - Audio Transcription & Translation",
    long_about = "A command-line client for a locally running speech transcription server speaking the OpenAI-compatible audio API: upload audio files for transcription or translation, stream incremental results, and inspect timings and confidence scores.",
    after_help = "EXAMPLES:\n    # Transcribe an audio file\n    speech-client transcribe audio.wav\n\n    # Stream incremental results as they are recognized\n    speech-client transcribe audio.wav --stream\n\n    # Request word and segment timestamps\n    speech-client transcribe audio.wav --timestamp-granularities word,segment\n\n    # Translate an audio file to English\n    speech-client translate es_audio.wav\n\n    # Run the sample-file sweep\n    speech-client test --resources-dir resources\n\n    # Use a different server\n    speech-client --server http://192.168.1.100:50060 transcribe audio.wav"
)]
pub struct Cli {
    /// Server URL
    #[arg(
        long,
        short = 's',
        global = true,
        default_value = "http://localhost:50060"
    )]
    pub server: String,

    /// Model to use
    #[arg(long, short = 'm', global = true, default_value = "tiny")]
    pub model: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe an audio file
    #[command(name = "transcribe")]
    Transcribe {
        audio_file: String,

        /// Source language (default: auto-detect)
        #[arg(long, short = 'l', default_value = "")]
        language: String,

        /// Enable streaming output
        #[arg(long)]
        stream: bool,

        /// Response format: json or verbose_json
        #[arg(long, short = 'f', default_value = "verbose_json", value_parser = parse_response_format)]
        response_format: ResponseFormat,

        /// Timestamp granularities as comma-separated values (e.g. 'word,segment')
        #[arg(long, short = 't', value_delimiter = ',', value_parser = parse_granularity)]
        timestamp_granularities: Vec<Granularity>,

        /// Show raw JSON response for debugging
        #[arg(long)]
        debug: bool,
    },
    /// Translate an audio file to English
    #[command(name = "translate")]
    Translate {
        audio_file: String,

        /// Optional prompt to guide the translation
        #[arg(long)]
        prompt: Option<String>,

        /// Response format: json or verbose_json
        #[arg(long, short = 'f', default_value = "verbose_json", value_parser = parse_response_format)]
        response_format: ResponseFormat,

        /// Accepted for symmetry with transcribe; the translation endpoint
        /// does not support timestamp granularities and they are never sent
        #[arg(long, short = 't', value_delimiter = ',', value_parser = parse_granularity)]
        timestamp_granularities: Vec<Granularity>,
    },
    /// Test transcription and translation on sample files
    #[command(name = "test")]
    Test {
        /// Directory holding the sample audio files
        #[arg(long, default_value = "resources")]
        resources_dir: String,

        /// Only test this file (by bare name, e.g. 'jfk.wav')
        #[arg(long)]
        file: Option<String>,

        /// Response format: json or verbose_json
        #[arg(long, short = 'f', default_value = "verbose_json", value_parser = parse_response_format)]
        response_format: ResponseFormat,

        /// Timestamp granularities as comma-separated values
        #[arg(long, short = 't', value_delimiter = ',', value_parser = parse_granularity)]
        timestamp_granularities: Vec<Granularity>,

        /// Enable streaming output for tests
        #[arg(long)]
        stream: bool,
    },
    /// Compare json vs verbose_json response formats
    #[command(name = "compare")]
    Compare {
        audio_file: String,

        /// Source language (default: auto-detect)
        #[arg(long, short = 'l', default_value = "")]
        language: String,
    },
}

pub fn parse_response_format(s: &str) -> Result<ResponseFormat, String> {
    match s {
        "json" => Ok(ResponseFormat::Json),
        "verbose_json" => Ok(ResponseFormat::VerboseJson),
        _ => Err("Response format must be json or verbose_json".to_string()),
    }
}

pub fn parse_granularity(s: &str) -> Result<Granularity, String> {
    match s.trim() {
        "word" => Ok(Granularity::Word),
        "segment" => Ok(Granularity::Segment),
        other => Err(format!(
            "Unknown timestamp granularity: {other} (expected word or segment)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transcribe_with_granularities() {
        let cli = Cli::try_parse_from([
            "speech-client",
            "transcribe",
            "audio.wav",
            "--timestamp-granularities",
            "word,segment",
            "--stream",
        ])
        .unwrap();

        assert_eq!(cli.server, "http://localhost:50060");
        assert_eq!(cli.model, "tiny");
        match cli.command {
            Commands::Transcribe {
                audio_file,
                stream,
                response_format,
                timestamp_granularities,
                ..
            } => {
                assert_eq!(audio_file, "audio.wav");
                assert!(stream);
                assert_eq!(response_format, ResponseFormat::VerboseJson);
                assert_eq!(
                    timestamp_granularities,
                    vec![Granularity::Word, Granularity::Segment]
                );
            }
            _ => panic!("expected transcribe"),
        }
    }

    #[test]
    fn rejects_unknown_granularity() {
        let result = Cli::try_parse_from([
            "speech-client",
            "transcribe",
            "audio.wav",
            "-t",
            "sentence",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_response_format() {
        let result = Cli::try_parse_from([
            "speech-client",
            "transcribe",
            "audio.wav",
            "-f",
            "text",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_server_flag_applies_after_subcommand() {
        let cli = Cli::try_parse_from([
            "speech-client",
            "translate",
            "audio.wav",
            "--server",
            "http://my-server:8080",
        ])
        .unwrap();
        assert_eq!(cli.server, "http://my-server:8080");
    }

    #[test]
    fn test_subcommand_defaults() {
        let cli = Cli::try_parse_from(["speech-client", "test"]).unwrap();
        match cli.command {
            Commands::Test {
                resources_dir,
                file,
                stream,
                ..
            } => {
                assert_eq!(resources_dir, "resources");
                assert!(file.is_none());
                assert!(!stream);
            }
            _ => panic!("expected test"),
        }
    }
}
