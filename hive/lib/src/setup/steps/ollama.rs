use serde::Deserialize;

use crate::error::StepError;
use crate::probe::{http_body, join_url};
use crate::process::{require_program, run_inherited};
use crate::setup::step::Step;

/// Ollama endpoint listing locally available models.
pub const TAGS_PATH: &str = "/api/tags";

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

/// Returns true if an `/api/tags` response lists `model`.
///
/// Untagged names match any tag, so `nomic-embed-text` matches
/// `nomic-embed-text:latest`.
pub fn tags_list_model(body: &str, model: &str) -> bool {
    let Ok(tags) = serde_json::from_str::<TagsResponse>(body) else {
        return false;
    };
    tags.models.iter().any(|entry| {
        entry.name == model
            || entry
                .name
                .strip_prefix(model)
                .is_some_and(|rest| rest.starts_with(':'))
    })
}

/// Pulls the embedding model into a running Ollama.
#[derive(Debug, Clone)]
pub struct OllamaStep {
    name: String,
    tags_url: String,
    model: String,
}

impl OllamaStep {
    pub fn new(ollama_url: &str, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            name: format!("Setup Ollama with {model} model"),
            tags_url: join_url(ollama_url, TAGS_PATH),
            model,
        }
    }
}

impl Step for OllamaStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<bool, StepError> {
        match http_body(&self.tags_url) {
            Ok(Some(body)) => Ok(tags_list_model(&body, &self.model)),
            Ok(None) => Ok(false),
            Err(err) => {
                tracing::debug!(url = %self.tags_url, error = %err, "Ollama not reachable");
                Ok(false)
            }
        }
    }

    fn run(&self) -> Result<(), StepError> {
        require_program("ollama", "install from https://ollama.ai")?;
        run_inherited("ollama", &["pull", &self.model], None)
    }

    /// Pulled models are kept.
    fn rollback(&self) -> Result<(), StepError> {
        Ok(())
    }
}
