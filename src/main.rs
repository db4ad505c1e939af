mod cli;
mod client;
mod config;
mod dto;
mod report;
mod request;
mod resources;
mod stream;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ClientConfig::new(cli.server, cli.model);

    match cli.command {
        Commands::Transcribe {
            audio_file,
            language,
            stream,
            response_format,
            timestamp_granularities,
            debug,
        } => {
            client::run_transcribe(
                &config,
                &audio_file,
                &language,
                stream,
                response_format,
                &timestamp_granularities,
                debug,
            )
            .await
        }
        Commands::Translate {
            audio_file,
            prompt,
            response_format,
            timestamp_granularities,
        } => {
            client::run_translate(
                &config,
                &audio_file,
                prompt.as_deref(),
                response_format,
                &timestamp_granularities,
            )
            .await
        }
        Commands::Test {
            resources_dir,
            file,
            response_format,
            timestamp_granularities,
            stream,
        } => {
            client::run_test(
                &config,
                &resources_dir,
                file.as_deref(),
                response_format,
                &timestamp_granularities,
                stream,
            )
            .await
        }
        Commands::Compare {
            audio_file,
            language,
        } => client::run_compare(&config, &audio_file, &language).await,
    }
}
