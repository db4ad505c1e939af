use serde_json::Value;

use crate::dto::TranscriptionResult;
use crate::request::{Granularity, ResponseFormat};
use crate::stream::StreamUpdate;

/// How many segments the detail block prints before eliding the rest.
const SEGMENT_PREVIEW: usize = 3;

pub fn print_stream_update(update: &StreamUpdate) {
    match update {
        StreamUpdate::Partial(text) => println!("🔄 {text}"),
        StreamUpdate::Final {
            text,
            language,
            duration,
        } => {
            println!("\n✅ Final transcription: {text}");
            if let Some(language) = language {
                println!("🌍 Language: {language}");
            }
            if let Some(duration) = duration {
                println!("⏱️  Duration: {duration} seconds");
            }
        }
        StreamUpdate::Unclassified(value) => println!("📝 Event: {value}"),
        StreamUpdate::RawText(text) => println!("📝 Extracted text: {text}"),
    }
}

pub fn print_granularity_summary(granularities: &[Granularity]) {
    if granularities.is_empty() {
        return;
    }
    let joined = granularities
        .iter()
        .map(|g| g.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    println!("📊 Timestamp Granularities: {joined}");
    if granularities.contains(&Granularity::Word) {
        println!("   Word-level timestamps enabled");
    }
    if granularities.contains(&Granularity::Segment) {
        println!("   Segment-level timestamps enabled");
    }
}

pub fn print_debug_dump(body: &str) {
    println!("\n🔍 DEBUG: Raw JSON Response:");
    println!("{}", "=".repeat(60));
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{body}"),
        },
        Err(_) => println!("{body}"),
    }
    println!("{}", "=".repeat(60));
}

pub fn print_transcription(
    result: &TranscriptionResult,
    format: ResponseFormat,
    granularities: &[Granularity],
) {
    println!("📝 Transcription: {}", result.text);

    if format != ResponseFormat::VerboseJson {
        return;
    }

    println!("\n📊 Detailed Information:");
    println!(
        "   Language: {}",
        result.language.as_deref().unwrap_or("Unknown")
    );
    match result.duration {
        Some(duration) => println!("   Duration: {duration} seconds"),
        None => println!("   Duration: Unknown"),
    }

    if let Some(segments) = result.segments.as_deref().filter(|s| !s.is_empty()) {
        println!("   Segments: {}", segments.len());
        for (i, segment) in segments.iter().take(SEGMENT_PREVIEW).enumerate() {
            println!(
                "     Segment {}: {:.2}s - {:.2}s",
                i + 1,
                segment.start,
                segment.end
            );
            println!("       Text: {}", segment.text);
            if let Some(avg_logprob) = segment.avg_logprob {
                println!("       Confidence: {avg_logprob:.3}");
            }
        }
    }

    if granularities.contains(&Granularity::Word) {
        match result.words.as_deref().filter(|w| !w.is_empty()) {
            Some(words) => {
                println!("   Words: {}", words.len());
                println!("     All words with timestamps:");
                for word in words {
                    println!(
                        "       {:.2}s - {:.2}s: '{}'",
                        word.start, word.end, word.word
                    );
                }
            }
            None => {
                println!("   Words: No word-level timestamps available");
                println!("     Note: Server may not support word-level timestamps yet");
            }
        }
    }
}

pub fn print_translation(result: &TranscriptionResult, format: ResponseFormat) {
    println!("🌐 Translation: {}", result.text);

    match format {
        ResponseFormat::Json => {
            println!("\n📋 Response Format: json");
            println!("   Contains only the translated text");
        }
        ResponseFormat::VerboseJson => {
            println!("\n📊 Translation Details:");
            println!(
                "   Output Language: {}",
                result.language.as_deref().unwrap_or("Unknown")
            );
            match result.duration {
                Some(duration) => println!("   Duration: {duration} seconds"),
                None => println!("   Duration: Unknown"),
            }
            if let Some(segments) = result.segments.as_deref().filter(|s| !s.is_empty()) {
                println!("   Segments: {}", segments.len());
                for (i, segment) in segments.iter().take(SEGMENT_PREVIEW).enumerate() {
                    println!(
                        "     Segment {}: {:.2}s - {:.2}s",
                        i + 1,
                        segment.start,
                        segment.end
                    );
                    println!("       Text: {}", segment.text);
                }
            }
        }
    }
}

pub fn print_logprobs(result: &TranscriptionResult) {
    match result.logprobs.as_deref().filter(|l| !l.is_empty()) {
        Some(logprobs) => {
            println!("✅ Logprobs received: {} tokens", logprobs.len());
            for (i, token) in logprobs.iter().take(5).enumerate() {
                println!(
                    "  Token {}: '{}' - logprob: {}",
                    i + 1,
                    token.token,
                    token.logprob
                );
            }
            if logprobs.len() > 5 {
                println!("  ... and {} more tokens", logprobs.len() - 5);
            }
        }
        None => println!("❌ No logprobs in response"),
    }
}
