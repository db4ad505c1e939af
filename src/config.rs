#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub model: String,
}

impl ClientConfig {
    pub fn new(server_url: String, model: String) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn transcriptions_url(&self) -> String {
        format!("{}/v1/audio/transcriptions", self.server_url)
    }

    pub fn translations_url(&self) -> String {
        format!("{}/v1/audio/translations", self.server_url)
    }
}
