use std::path::Path;

use anyhow::{Context, Result, anyhow};
use reqwest::multipart::{Form, Part};

/// Audio bytes plus the metadata the multipart `file` part needs.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub data: Vec<u8>,
    pub filename: String,
    pub mime_type: &'static str,
}

impl AudioPayload {
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| anyhow!("Failed to read audio file {}: {}", path.display(), e))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let mime_type = mime_for_filename(&filename);
        Ok(Self {
            data,
            filename,
            mime_type,
        })
    }

    pub fn from_bytes(data: Vec<u8>, filename: &str) -> Self {
        Self {
            data,
            filename: filename.to_string(),
            mime_type: mime_for_filename(filename),
        }
    }
}

fn mime_for_filename(filename: &str) -> &'static str {
    match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => match ext.to_ascii_lowercase().as_str() {
            "wav" => "audio/wav",
            "mp3" => "audio/mpeg",
            "m4a" => "audio/mp4",
            "flac" => "audio/flac",
            "aac" => "audio/aac",
            _ => "application/octet-stream",
        },
        None => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    VerboseJson,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::VerboseJson => "verbose_json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Word,
    Segment,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Word => "word",
            Granularity::Segment => "segment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Include {
    Logprobs,
}

impl Include {
    pub fn as_str(&self) -> &'static str {
        match self {
            Include::Logprobs => "logprobs",
        }
    }
}

/// Multipart upload for `/v1/audio/transcriptions`.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: AudioPayload,
    pub model: String,
    pub language: Option<String>,
    pub response_format: ResponseFormat,
    pub timestamp_granularities: Vec<Granularity>,
    pub include: Vec<Include>,
    pub stream: bool,
}

impl TranscriptionRequest {
    pub fn new(audio: AudioPayload, model: &str) -> Self {
        Self {
            audio,
            model: model.to_string(),
            language: None,
            response_format: ResponseFormat::VerboseJson,
            timestamp_granularities: Vec::new(),
            include: Vec::new(),
            stream: false,
        }
    }

    /// Text fields of the outgoing form, in emission order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("model", self.model.clone()),
            ("response_format", self.response_format.as_str().to_string()),
        ];
        // Empty language means server-side auto-detect; the field is omitted.
        if let Some(language) = self.language.as_deref().filter(|l| !l.is_empty()) {
            fields.push(("language", language.to_string()));
        }
        if self.stream {
            fields.push(("stream", "true".to_string()));
        }
        if !self.timestamp_granularities.is_empty() {
            let joined = self
                .timestamp_granularities
                .iter()
                .map(|g| g.as_str())
                .collect::<Vec<_>>()
                .join(",");
            fields.push(("timestamp_granularities[]", joined));
        }
        for include in &self.include {
            fields.push(("include[]", include.as_str().to_string()));
        }
        fields
    }

    pub fn into_form(self) -> Result<Form> {
        let fields = self.form_fields();
        build_form(self.audio, fields)
    }
}

/// Multipart upload for `/v1/audio/translations`.
///
/// Carries any requested timestamp granularities but never sends them: the
/// translations endpoint does not accept `timestamp_granularities[]`.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub audio: AudioPayload,
    pub model: String,
    pub prompt: Option<String>,
    pub response_format: ResponseFormat,
    pub timestamp_granularities: Vec<Granularity>,
}

impl TranslationRequest {
    pub fn new(audio: AudioPayload, model: &str) -> Self {
        Self {
            audio,
            model: model.to_string(),
            prompt: None,
            response_format: ResponseFormat::VerboseJson,
            timestamp_granularities: Vec::new(),
        }
    }

    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("model", self.model.clone()),
            ("response_format", self.response_format.as_str().to_string()),
        ];
        if let Some(prompt) = self.prompt.as_deref().filter(|p| !p.is_empty()) {
            fields.push(("prompt", prompt.to_string()));
        }
        fields
    }

    pub fn into_form(self) -> Result<Form> {
        let fields = self.form_fields();
        build_form(self.audio, fields)
    }
}

fn build_form(audio: AudioPayload, fields: Vec<(&'static str, String)>) -> Result<Form> {
    let part = Part::bytes(audio.data)
        .file_name(audio.filename)
        .mime_str(audio.mime_type)
        .context("Invalid audio MIME type")?;

    let mut form = Form::new().part("file", part);
    for (name, value) in fields {
        form = form.text(name, value);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> AudioPayload {
        AudioPayload::from_bytes(vec![0u8; 4], "jfk.wav")
    }

    fn field<'a>(fields: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn transcription_fields_minimal() {
        let request = TranscriptionRequest::new(payload(), "tiny");
        let fields = request.form_fields();

        assert_eq!(field(&fields, "model"), Some("tiny"));
        assert_eq!(field(&fields, "response_format"), Some("verbose_json"));
        assert_eq!(field(&fields, "language"), None);
        assert_eq!(field(&fields, "stream"), None);
        assert_eq!(field(&fields, "timestamp_granularities[]"), None);
        assert_eq!(field(&fields, "include[]"), None);
    }

    #[test]
    fn transcription_fields_full() {
        let mut request = TranscriptionRequest::new(payload(), "base");
        request.language = Some("en".to_string());
        request.response_format = ResponseFormat::Json;
        request.timestamp_granularities = vec![Granularity::Word, Granularity::Segment];
        request.include = vec![Include::Logprobs];
        request.stream = true;
        let fields = request.form_fields();

        assert_eq!(field(&fields, "model"), Some("base"));
        assert_eq!(field(&fields, "response_format"), Some("json"));
        assert_eq!(field(&fields, "language"), Some("en"));
        assert_eq!(field(&fields, "stream"), Some("true"));
        assert_eq!(
            field(&fields, "timestamp_granularities[]"),
            Some("word,segment")
        );
        assert_eq!(field(&fields, "include[]"), Some("logprobs"));
    }

    #[test]
    fn empty_language_is_omitted() {
        let mut request = TranscriptionRequest::new(payload(), "tiny");
        request.language = Some(String::new());
        assert_eq!(field(&request.form_fields(), "language"), None);
    }

    #[test]
    fn include_fields_repeat() {
        let mut request = TranscriptionRequest::new(payload(), "tiny");
        request.include = vec![Include::Logprobs, Include::Logprobs];
        let count = request
            .form_fields()
            .iter()
            .filter(|(n, _)| *n == "include[]")
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn translation_never_sends_granularities() {
        let mut request = TranslationRequest::new(payload(), "tiny");
        request.timestamp_granularities = vec![Granularity::Word, Granularity::Segment];
        let fields = request.form_fields();

        assert_eq!(field(&fields, "timestamp_granularities[]"), None);
        assert_eq!(field(&fields, "model"), Some("tiny"));
        assert_eq!(field(&fields, "response_format"), Some("verbose_json"));
    }

    #[test]
    fn translation_prompt_is_sent() {
        let mut request = TranslationRequest::new(payload(), "tiny");
        request.prompt = Some("proper nouns: WhisperKit".to_string());
        assert_eq!(
            field(&request.form_fields(), "prompt"),
            Some("proper nouns: WhisperKit")
        );
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(payload().mime_type, "audio/wav");
        assert_eq!(
            AudioPayload::from_bytes(vec![], "clip.M4A").mime_type,
            "audio/mp4"
        );
        assert_eq!(
            AudioPayload::from_bytes(vec![], "noext").mime_type,
            "application/octet-stream"
        );
    }
}
