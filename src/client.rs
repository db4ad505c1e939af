use std::path::Path;

use anyhow::{Result, anyhow};
use futures_util::StreamExt;
use log::{debug, error, warn};
use reqwest::header::ACCEPT;

use crate::config::ClientConfig;
use crate::dto::TranscriptionResult;
use crate::report;
use crate::request::{
    AudioPayload, Granularity, Include, ResponseFormat, TranscriptionRequest, TranslationRequest,
};
use crate::resources;
use crate::stream::{LineBuffer, StreamConsumer, StreamOutcome};

async fn post_and_parse(
    url: &str,
    form: reqwest::multipart::Form,
) -> Result<(TranscriptionResult, String)> {
    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| anyhow!("Failed to send request: {}", e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| anyhow!("Failed to read response: {}", e))?;

    if !status.is_success() {
        return Err(anyhow!("Server returned error {}: {}", status, body));
    }

    let result: TranscriptionResult = serde_json::from_str(&body)
        .map_err(|e| anyhow!("Failed to parse JSON response: {}", e))?;

    Ok((result, body))
}

pub async fn send_transcription(
    config: &ClientConfig,
    request: TranscriptionRequest,
) -> Result<(TranscriptionResult, String)> {
    let url = config.transcriptions_url();
    debug!(
        "POST {url} model={} format={}",
        request.model,
        request.response_format.as_str()
    );
    post_and_parse(&url, request.into_form()?).await
}

pub async fn send_translation(
    config: &ClientConfig,
    request: TranslationRequest,
) -> Result<(TranscriptionResult, String)> {
    let url = config.translations_url();
    debug!("POST {url} model={}", request.model);
    post_and_parse(&url, request.into_form()?).await
}

/// Open the SSE response and feed it through the stream consumer, printing
/// incremental updates as they arrive. Stops at the done event or when the
/// peer closes the connection.
pub async fn stream_transcription(
    config: &ClientConfig,
    mut request: TranscriptionRequest,
) -> Result<StreamOutcome> {
    request.stream = true;
    let client = reqwest::Client::new();
    let url = config.transcriptions_url();

    println!("🔄 Starting streaming transcription...");

    let form = request.into_form()?;
    let response = client
        .post(&url)
        .header(ACCEPT, "text/event-stream")
        .multipart(form)
        .send()
        .await
        .map_err(|e| anyhow!("Failed to send streaming request: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("Streaming failed: {} {}", status, body));
    }

    println!("📡 Receiving stream data...");

    let mut bytes = response.bytes_stream();
    let mut lines = LineBuffer::default();
    let mut consumer = StreamConsumer::default();

    'receive: while let Some(chunk) = bytes.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                // Peer closed mid-stream; whatever was accumulated decides
                // the outcome.
                warn!("Stream read ended early: {e}");
                break;
            }
        };
        for line in lines.push(&chunk) {
            if let Some(update) = consumer.handle_line(&line) {
                report::print_stream_update(&update);
            }
            if consumer.is_done() {
                break 'receive;
            }
        }
    }

    if !consumer.is_done() {
        if let Some(line) = lines.finish() {
            if let Some(update) = consumer.handle_line(&line) {
                report::print_stream_update(&update);
            }
        }
    }

    Ok(consumer.finish())
}

/// Probe the server by uploading a minimal in-memory payload. The server has
/// no dedicated health route; a round-trip through the transcription endpoint
/// is the reachability check.
pub async fn check_connection(config: &ClientConfig) -> Result<()> {
    debug!("Probing server at {}", config.server_url);

    let audio = AudioPayload::from_bytes(b"test".to_vec(), "test.wav");
    let mut request = TranscriptionRequest::new(audio, &config.model);
    request.language = Some("en".to_string());
    request.response_format = ResponseFormat::Json;

    match send_transcription(config, request).await {
        Ok(_) => {
            println!("✅ Connection successful to {}", config.server_url);
            Ok(())
        }
        Err(e) => Err(anyhow!("Connection failed: {e}")),
    }
}

async fn transcribe_once(
    config: &ClientConfig,
    request: TranscriptionRequest,
    granularities: &[Granularity],
    debug_dump: bool,
) -> Result<()> {
    let format = request.response_format;
    let (result, body) = send_transcription(config, request).await?;
    if debug_dump {
        report::print_debug_dump(&body);
    }
    report::print_transcription(&result, format, granularities);
    Ok(())
}

/// Two-step strategy: attempt the streaming path; if the stream closes with
/// no data, issue exactly one non-streaming request for the same audio.
async fn transcribe_streaming(
    config: &ClientConfig,
    request: TranscriptionRequest,
    granularities: &[Granularity],
    debug_dump: bool,
) -> Result<()> {
    match stream_transcription(config, request.clone()).await? {
        StreamOutcome::Completed(_) => {
            report::print_granularity_summary(granularities);
            Ok(())
        }
        StreamOutcome::NoData => {
            println!("⚠️  No text received from stream, falling back to non-streaming");
            let mut retry = request;
            retry.stream = false;
            transcribe_once(config, retry, granularities, debug_dump).await
        }
    }
}

pub async fn run_transcribe(
    config: &ClientConfig,
    audio_file: &str,
    language: &str,
    stream: bool,
    response_format: ResponseFormat,
    granularities: &[Granularity],
    debug_dump: bool,
) -> Result<()> {
    let path = Path::new(audio_file);
    if !path.exists() {
        return Err(anyhow!("Audio file not found: {}", audio_file));
    }

    let audio = AudioPayload::read(path)?;
    println!("📁 Audio source: {} ({} bytes)", audio_file, audio.data.len());

    let mut request = TranscriptionRequest::new(audio, &config.model);
    if !language.is_empty() {
        request.language = Some(language.to_string());
    }
    request.response_format = response_format;
    request.timestamp_granularities = granularities.to_vec();

    let outcome = if stream {
        transcribe_streaming(config, request, granularities, debug_dump).await
    } else {
        transcribe_once(config, request, granularities, debug_dump).await
    };

    if let Err(e) = outcome {
        error!("Transcription failed: {e}");
        eprintln!("❌ Transcription failed: {e}");
    }
    Ok(())
}

pub async fn run_translate(
    config: &ClientConfig,
    audio_file: &str,
    prompt: Option<&str>,
    response_format: ResponseFormat,
    granularities: &[Granularity],
) -> Result<()> {
    let path = Path::new(audio_file);
    if !path.exists() {
        return Err(anyhow!("Audio file not found: {}", audio_file));
    }

    let audio = AudioPayload::read(path)?;
    println!("📁 Audio source: {} ({} bytes)", audio_file, audio.data.len());

    let mut request = TranslationRequest::new(audio, &config.model);
    request.prompt = prompt.map(str::to_string);
    request.response_format = response_format;
    request.timestamp_granularities = granularities.to_vec();

    match send_translation(config, request).await {
        Ok((result, _)) => report::print_translation(&result, response_format),
        Err(e) => {
            error!("Translation failed: {e}");
            eprintln!("❌ Translation failed: {e}");
        }
    }
    Ok(())
}

pub async fn run_compare(config: &ClientConfig, audio_file: &str, language: &str) -> Result<()> {
    let path = Path::new(audio_file);
    if !path.exists() {
        return Err(anyhow!("Audio file not found: {}", audio_file));
    }

    println!("\n🔍 Format Comparison for: {audio_file}");
    println!("{}", "=".repeat(60));

    for (heading, format) in [
        ("\n📋 JSON Format (minimal):", ResponseFormat::Json),
        ("\n📊 Verbose JSON Format (detailed):", ResponseFormat::VerboseJson),
    ] {
        println!("{heading}");
        println!("{}", "-".repeat(30));

        let audio = AudioPayload::read(path)?;
        let mut request = TranscriptionRequest::new(audio, &config.model);
        if !language.is_empty() {
            request.language = Some(language.to_string());
        }
        request.response_format = format;

        if let Err(e) = transcribe_once(config, request, &[], false).await {
            error!("Transcription failed: {e}");
            eprintln!("❌ Transcription failed: {e}");
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("💡 Key Differences:");
    println!("   • JSON: Only contains the transcribed text");
    println!("   • Verbose JSON: Contains text + language + duration + segments + confidence scores");
    Ok(())
}

pub async fn run_test(
    config: &ClientConfig,
    resources_dir: &str,
    file: Option<&str>,
    response_format: ResponseFormat,
    granularities: &[Granularity],
    stream: bool,
) -> Result<()> {
    let dir = Path::new(resources_dir);
    let audio_files = resources::discover_audio_files(dir)?;
    if audio_files.is_empty() {
        return Err(anyhow!("No audio files found in {}", dir.display()));
    }

    println!("🔍 Found {} audio files", audio_files.len());
    for (i, path) in audio_files.iter().enumerate() {
        println!("  {}. {}", i + 1, path.display());
    }

    // Named-file selection happens before any network call.
    let files_to_process = match file {
        Some(name) => match resources::select_named(&audio_files, name) {
            Some(path) => vec![path],
            None => {
                let available: Vec<_> = audio_files
                    .iter()
                    .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
                    .collect();
                return Err(anyhow!(
                    "Test file '{}' not found. Available files: {}",
                    name,
                    available.join(", ")
                ));
            }
        },
        None => audio_files.clone(),
    };

    if let Err(e) = check_connection(config).await {
        eprintln!("❌ {e}");
        eprintln!("💡 Make sure the server is running at {}", config.server_url);
        return Ok(());
    }

    if stream {
        println!("🔄 Testing with streaming enabled");
    }

    for path in &files_to_process {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        println!("\n--- Testing: {name} ---");

        match AudioPayload::read(path) {
            Ok(audio) => {
                let mut request = TranscriptionRequest::new(audio, &config.model);
                request.response_format = response_format;
                request.timestamp_granularities = granularities.to_vec();

                let outcome = if stream {
                    transcribe_streaming(config, request, granularities, false).await
                } else {
                    transcribe_once(config, request, granularities, false).await
                };
                if let Err(e) = outcome {
                    error!("Transcription failed for {name}: {e}");
                    eprintln!("❌ Transcription failed: {e}");
                }
            }
            Err(e) => {
                error!("Skipping {name}: {e}");
                eprintln!("❌ {e}");
                continue;
            }
        }

        if resources::wants_translation(name) {
            if let Ok(audio) = AudioPayload::read(path) {
                let mut request = TranslationRequest::new(audio, &config.model);
                request.response_format = response_format;
                request.timestamp_granularities = granularities.to_vec();
                match send_translation(config, request).await {
                    Ok((result, _)) => report::print_translation(&result, response_format),
                    Err(e) => {
                        error!("Translation failed for {name}: {e}");
                        eprintln!("❌ Translation failed: {e}");
                    }
                }
            }
        }
    }

    run_logprobs_probe(config, &files_to_process).await;
    Ok(())
}

/// Logprobs round-trip against the first wav file in the batch.
async fn run_logprobs_probe(config: &ClientConfig, files: &[std::path::PathBuf]) {
    println!("\n--- Testing Logprobs ---");
    println!("🧪 Testing transcription with logprobs...");

    let Some(path) = files.iter().find(|p| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
    }) else {
        println!("❌ No wav test file available for the logprobs check");
        return;
    };

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");
    println!("📁 Using test file: {name}");

    let audio = match AudioPayload::read(path) {
        Ok(audio) => audio,
        Err(e) => {
            eprintln!("❌ {e}");
            return;
        }
    };

    let mut request = TranscriptionRequest::new(audio, &config.model);
    request.response_format = ResponseFormat::Json;
    request.include = vec![Include::Logprobs];

    match send_transcription(config, request).await {
        Ok((result, _)) => report::print_logprobs(&result),
        Err(e) => {
            error!("Logprobs test failed: {e}");
            eprintln!("❌ Logprobs test failed: {e}");
        }
    }
}
