//! Chat-completions refiner.
//!
//! Sends the reconstructed page text and the heuristic entries to an
//! OpenAI-compatible `/chat/completions` endpoint and parses the reply with
//! [`parse_entries`](super::parse_entries).

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{response, Refiner};
use crate::config::RefineConfig;
use crate::error::RefineError;
use crate::model::ScheduleEntry;

const SYSTEM_PROMPT: &str = r#"You correct class timetable entries extracted from a PDF.

You receive the page text as lines of x-tagged tokens ("[x:120] Physics | [x:220] HF09")
and a JSON array of entries produced by a layout heuristic.

Fix fields that were put in the wrong place (subject, teacher, room, block, class_name),
merge subject names that were split, and add entries the heuristic missed.
Never change day, start_time or end_time of an existing entry, and only use
times that already appear in the heuristic entries for new ones.

Return ONLY a JSON array of objects with the keys
day, start_time, end_time, subject, teacher, room, block, class_name."#;

/// Refiner backed by a remote completion service.
pub struct CompletionRefiner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl CompletionRefiner {
    /// Build a client for `config`. `api_key` is sent as a bearer token when
    /// present.
    pub fn new(config: &RefineConfig, api_key: Option<String>) -> Result<Self, RefineError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("timegrid/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn request_body(&self, entries: &[ScheduleEntry], raw_text: &str) -> Result<Value, RefineError> {
        let user = format!(
            "Page text:\n{raw_text}\n\nHeuristic entries ({}):\n{}",
            entries.len(),
            serde_json::to_string_pretty(entries)?
        );
        Ok(json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user }
            ]
        }))
    }
}

#[async_trait]
impl Refiner for CompletionRefiner {
    fn name(&self) -> &'static str {
        "completion"
    }

    async fn refine(
        &self,
        entries: &[ScheduleEntry],
        raw_text: &str,
    ) -> Result<Vec<ScheduleEntry>, RefineError> {
        let body = self.request_body(entries, raw_text)?;
        debug!("Requesting refinement of {} entries from {}", entries.len(), self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefineError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: Value = response.json().await?;
        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .filter(|text| !text.trim().is_empty())
            .ok_or(RefineError::EmptyResponse)?;

        response::parse_entries(content)
    }
}
