use serde_json::{Value, json};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const FALLBACK_ADVICE: &str = "Keep pushing the limits of science and performance.";
const SYSTEM_INSTRUCTION: &str = "You are a world-class high performance coach and sport scientist.";

/// Determine the API key for advice requests.
///
/// `GEMINI_API_KEY` wins over `API_KEY`, which wins over the settings value.
/// Empty values are skipped.
pub fn resolve_api_key(settings_key: Option<&str>) -> Option<String> {
    let from_env = |name: &str| std::env::var(name).ok().filter(|k| !k.is_empty());
    from_env("GEMINI_API_KEY")
        .or_else(|| from_env("API_KEY"))
        .or_else(|| settings_key.filter(|k| !k.is_empty()).map(|s| s.to_string()))
}

#[derive(Debug)]
pub enum AdviceError {
    MissingKey,
    Status(u16, String),
    Malformed(String),
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for AdviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdviceError::MissingKey => write!(f, "no API key configured"),
            AdviceError::Status(code, body) => write!(f, "HTTP {code}: {body}"),
            AdviceError::Malformed(msg) => write!(f, "unexpected response: {msg}"),
            AdviceError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AdviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdviceError::Other(e) => Some(&**e),
            _ => None,
        }
    }
}

/// Client for the generative-language `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct AdviceClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl AdviceClient {
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    /// Send one prompt and return the text of the first candidate, if any.
    fn generate(&self, body: Value) -> Result<Option<String>, AdviceError> {
        let key = self.api_key.as_deref().ok_or(AdviceError::MissingKey)?;
        let response = ureq::post(&self.url())
            .query("key", key)
            .set("Accept", "application/json")
            .send_json(body);
        let text = match response {
            Ok(r) => r.into_string().map_err(|e| AdviceError::Other(Box::new(e)))?,
            Err(ureq::Error::Status(code, r)) => {
                return Err(AdviceError::Status(code, r.into_string().unwrap_or_default()));
            }
            Err(e) => return Err(AdviceError::Other(Box::new(e))),
        };
        let json: Value =
            serde_json::from_str(&text).map_err(|e| AdviceError::Malformed(e.to_string()))?;
        let parts = json
            .pointer("/candidates/0/content/parts")
            .and_then(|v| v.as_array());
        Ok(parts.map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        }))
    }

    fn try_training_advice(
        &self,
        team_name: &str,
        drill_summary: &str,
    ) -> Result<Option<String>, AdviceError> {
        let prompt = format!(
            "As an elite sport scientist, provide a brief (2-3 sentences) analysis and advice for a training plan named \"{team_name}\" with the following drills: {drill_summary}."
        );
        self.generate(json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        }))
    }

    /// Short coaching advice for the plan.
    ///
    /// Any failure yields [`FALLBACK_ADVICE`]; a reply without text yields an
    /// empty string.
    pub fn training_advice(&self, team_name: &str, drill_summary: &str) -> String {
        log::info!("Requesting training advice for {team_name}");
        match self.try_training_advice(team_name, drill_summary) {
            Ok(text) => text.unwrap_or_default(),
            Err(e) => {
                log::warn!("Advice request failed: {e}");
                FALLBACK_ADVICE.to_string()
            }
        }
    }

    fn try_drill_suggestions(&self, category: &str) -> Result<Vec<String>, AdviceError> {
        let prompt = format!(
            "Suggest 5 advanced drills for high performance athletes in the category: {category}. Return the result as a JSON array of strings."
        );
        let text = self
            .generate(json!({
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } },
                },
            }))?
            .unwrap_or_else(|| "[]".to_string());
        serde_json::from_str(&text).map_err(|e| AdviceError::Malformed(e.to_string()))
    }

    /// Drill name ideas for `category`; empty on any failure.
    pub fn drill_suggestions(&self, category: &str) -> Vec<String> {
        match self.try_drill_suggestions(category) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Drill suggestion request failed: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

    fn reply(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[test]
    fn returns_generated_advice() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path(PATH)
                .query_param("key", "k1")
                .body_contains("Warriors")
                .body_contains("Plank, Air Squat");
            then.status(200).json_body(reply("Balance the load."));
        });
        let client = AdviceClient::new(&server.base_url(), DEFAULT_MODEL, Some("k1".into()));
        assert_eq!(
            client.training_advice("Warriors", "Plank, Air Squat"),
            "Balance the load."
        );
        m.assert();
    }

    #[test]
    fn failures_use_fallback_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PATH);
            then.status(500).body("boom");
        });
        let client = AdviceClient::new(&server.base_url(), DEFAULT_MODEL, Some("k".into()));
        assert_eq!(client.training_advice("T", "A"), FALLBACK_ADVICE);

        let keyless = AdviceClient::new(&server.base_url(), DEFAULT_MODEL, None);
        assert_eq!(keyless.training_advice("T", "A"), FALLBACK_ADVICE);
    }

    #[test]
    fn empty_reply_is_empty_advice() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(json!({ "candidates": [] }));
        });
        let client = AdviceClient::new(&server.base_url(), DEFAULT_MODEL, Some("k".into()));
        assert_eq!(client.training_advice("T", "A"), "");
    }

    #[test]
    fn parses_drill_suggestions() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PATH).body_contains("Agility");
            then.status(200)
                .json_body(reply(r#"["Cone Weave","T-Drill"]"#));
        });
        let client = AdviceClient::new(&server.base_url(), DEFAULT_MODEL, Some("k".into()));
        assert_eq!(
            client.drill_suggestions("Agility"),
            vec!["Cone Weave".to_string(), "T-Drill".to_string()]
        );
    }

    #[test]
    fn malformed_suggestions_are_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(reply("not a list"));
        });
        let client = AdviceClient::new(&server.base_url(), DEFAULT_MODEL, Some("k".into()));
        assert!(client.drill_suggestions("Core").is_empty());
    }

    #[test]
    fn env_key_overrides_settings() {
        let _guard = ENV_MUTEX.lock().unwrap();
        unsafe {
            std::env::remove_var("API_KEY");
            std::env::set_var("GEMINI_API_KEY", "forced");
        }
        assert_eq!(resolve_api_key(Some("settings")).as_deref(), Some("forced"));
        unsafe {
            std::env::remove_var("GEMINI_API_KEY");
        }
        assert_eq!(resolve_api_key(Some("settings")).as_deref(), Some("settings"));
        assert_eq!(resolve_api_key(Some("")), None);
    }

    #[test]
    fn empty_env_key_falls_through() {
        let _guard = ENV_MUTEX.lock().unwrap();
        unsafe {
            std::env::set_var("GEMINI_API_KEY", "");
            std::env::set_var("API_KEY", "shared");
        }
        assert_eq!(resolve_api_key(Some("settings")).as_deref(), Some("shared"));
        unsafe {
            std::env::set_var("API_KEY", "");
        }
        assert_eq!(resolve_api_key(Some("settings")).as_deref(), Some("settings"));
        unsafe {
            std::env::remove_var("GEMINI_API_KEY");
            std::env::remove_var("API_KEY");
        }
    }
}
