#[derive(Debug, Clone, serde::Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: Option<String>,
    pub duration: Option<f64>,
    pub segments: Option<Vec<TranscriptionSegment>>,
    pub words: Option<Vec<TranscriptionWord>>,
    pub logprobs: Option<Vec<TokenLogprob>>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TranscriptionSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub avg_logprob: Option<f64>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TranscriptionWord {
    pub start: f64,
    pub end: f64,
    pub word: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TokenLogprob {
    pub token: String,
    pub logprob: f64,
}
