use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// SSE payload lines are prefixed with `data: `.
pub const DATA_PREFIX: &str = "data: ";

static MARKER_TOKENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\|[^>]*\|>").expect("marker token pattern"));
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Strip recognizer-internal marker tokens like `<|0.00|>` or
/// `<|startoftranscript|>` and collapse whitespace runs to single spaces.
pub fn clean_recognizer_text(text: &str) -> String {
    let stripped = MARKER_TOKENS.replace_all(text, "");
    let collapsed = WHITESPACE_RUNS.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Delta {
        text: String,
    },
    Done {
        text: Option<String>,
        language: Option<String>,
        duration: Option<f64>,
    },
    /// JSON that carries no known type tag. Shown for diagnostics only.
    Other(Value),
    /// Payload that is not JSON at all. Used verbatim.
    Raw(String),
}

pub fn decode_event(payload: &str) -> StreamEvent {
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(_) => return StreamEvent::Raw(payload.trim().to_string()),
    };

    match value.get("type").and_then(Value::as_str) {
        Some("transcript.text.delta") => StreamEvent::Delta {
            text: value
                .get("delta")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        Some("transcript.text.done") => StreamEvent::Done {
            text: value
                .get("text")
                .and_then(Value::as_str)
                .map(str::to_string),
            language: value
                .get("language")
                .and_then(Value::as_str)
                .map(str::to_string),
            duration: value.get("duration").and_then(Value::as_f64),
        },
        _ => StreamEvent::Other(value),
    }
}

/// Reassembles lines from the response byte stream. Partial lines are held
/// across chunk boundaries; `\r\n` endings are tolerated.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Whatever remains after the peer closed the connection without a
    /// trailing newline.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let mut line = self.pending;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Incremental update emitted while the stream is being consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Partial(String),
    Final {
        text: String,
        language: Option<String>,
        duration: Option<f64>,
    },
    Unclassified(Value),
    RawText(String),
}

/// Final transcription assembled from a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamResult {
    pub text: String,
    pub language: Option<String>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    Completed(StreamResult),
    /// The stream closed with no text accumulated. The caller is expected to
    /// fall back to a single non-streaming request.
    NoData,
}

/// Consumes SSE lines in arrival order and accumulates the transcription.
///
/// Delta text is appended until a done event supplies the authoritative final
/// text. Once done has been observed no further event changes the state.
#[derive(Debug, Default)]
pub struct StreamConsumer {
    text: String,
    language: Option<String>,
    duration: Option<f64>,
    done: bool,
}

impl StreamConsumer {
    pub fn handle_line(&mut self, line: &str) -> Option<StreamUpdate> {
        if self.done {
            return None;
        }
        let payload = line.strip_prefix(DATA_PREFIX)?;

        match decode_event(payload) {
            StreamEvent::Delta { text } => {
                let cleaned = clean_recognizer_text(&text);
                if cleaned.is_empty() {
                    return None;
                }
                self.text.push_str(&cleaned);
                Some(StreamUpdate::Partial(cleaned))
            }
            StreamEvent::Done {
                text,
                language,
                duration,
            } => {
                self.done = true;
                if let Some(text) = text {
                    self.text = text;
                }
                if language.is_some() {
                    self.language = language;
                }
                if duration.is_some() {
                    self.duration = duration;
                }
                Some(StreamUpdate::Final {
                    text: self.text.clone(),
                    language: self.language.clone(),
                    duration: self.duration,
                })
            }
            StreamEvent::Other(value) => Some(StreamUpdate::Unclassified(value)),
            StreamEvent::Raw(text) => {
                if text.is_empty() {
                    return None;
                }
                self.text = text.clone();
                Some(StreamUpdate::RawText(text))
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn finish(self) -> StreamOutcome {
        if self.text.is_empty() {
            StreamOutcome::NoData
        } else {
            StreamOutcome::Completed(StreamResult {
                text: self.text,
                language: self.language,
                duration: self.duration,
            })
        }
    }
}
