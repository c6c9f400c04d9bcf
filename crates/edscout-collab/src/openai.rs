//! OpenAI chat-completions client
//!
//! One client backs four collaborator seams: category scoring (strict JSON
//! mode with a pattern-matching fallback), gate review (yes/no), report
//! rendering, and verdict narration.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use edscout_core::{
    Category, CategoryScorer, CollabError, EvidenceRecord, GateReviewer, ReportRenderer,
    ScoredCategory, Verdict, VerdictNarrator,
};

/// OpenAI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Chat completions endpoint URL
    pub api_url: String,
    /// API key (bearer token)
    pub api_key: String,
    /// Model identifier
    pub model: String,
}

impl OpenAiConfig {
    /// Create a config from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, CollabError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| CollabError::Unavailable("OPENAI_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Structured scoring payload the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ScorePayload {
    score: f64,
    #[serde(default)]
    evidence: String,
}

/// OpenAI-backed collaborator client.
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        let http_client = reqwest::Client::new();
        OpenAiClient {
            config,
            http_client,
        }
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, CollabError> {
        Ok(Self::new(OpenAiConfig::from_env()?))
    }

    /// One chat completion at temperature 0. `json_mode` switches on the
    /// structured-output response format.
    async fn complete(&self, prompt: &str, json_mode: bool) -> Result<String, CollabError> {
        let mut body = json!({
            "model": self.config.model,
            "temperature": 0.0,
            "messages": [{"role": "user", "content": prompt}],
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CollabError::Unavailable(format!("openai request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CollabError::Unavailable(format!(
                "openai returned {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollabError::Malformed(format!("openai response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CollabError::Malformed("openai response had no choices".to_string()))
    }
}

/// Pull a 0–100 score out of free text when JSON parsing fails.
///
/// Tries labelled forms ("score: 87", "**score** 87") first, then a bare
/// "87/100". Out-of-range matches are clamped.
fn extract_score(text: &str) -> Option<u8> {
    let patterns = [
        r"(?i)\bscore\b\W{0,3}(\d{1,3})",
        r"(?i)\btotal\b\W{0,3}(\d{1,3})",
        r"(\d{1,3})\s*/\s*100",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).ok()?;
        if let Some(caps) = re.captures(text) {
            if let Ok(value) = caps[1].parse::<u16>() {
                return Some(value.min(100) as u8);
            }
        }
    }
    None
}

fn scoring_prompt(
    candidate_id: &str,
    category: Category,
    checklist: &[String],
    context: &str,
) -> String {
    let numbered: String = checklist
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {q}\n", i + 1))
        .collect();

    format!(
        "You are a meticulous EdTech venture analyst. Evaluate the startup \
         '{candidate_id}' on the '{category}' dimension.\n\n\
         Checklist (grade each item 0-10, then sum to a 0-100 total):\n{numbered}\n\
         Context:\n{context}\n\n\
         Respond with only a JSON object: \
         {{\"score\": <integer 0-100>, \"evidence\": \"<2-4 sentence justification citing the context>\"}}"
    )
}

/// Plain-text digest of a record used in review/report/narration prompts.
fn record_digest(record: &EvidenceRecord) -> String {
    let mut out = format!("Startup: {}\n", record.candidate_id());
    for (category, finding) in record.findings() {
        out.push_str(&format!(
            "\n## {category}: {}/100\n{}\n",
            finding.score, finding.evidence
        ));
    }
    if let Some(verdict) = record.verdict() {
        out.push_str(&format!(
            "\nWeighted total: {}/100, decision: {}\n",
            verdict.total, verdict.decision
        ));
    }
    out
}

#[async_trait]
impl CategoryScorer for OpenAiClient {
    async fn score_category(
        &self,
        candidate_id: &str,
        category: Category,
        checklist: &[String],
        context: &str,
    ) -> Result<ScoredCategory, CollabError> {
        let prompt = scoring_prompt(candidate_id, category, checklist, context);
        let content = self.complete(&prompt, true).await?;

        match serde_json::from_str::<ScorePayload>(&content) {
            Ok(payload) if payload.score.is_finite() => Ok(ScoredCategory {
                score: payload.score.clamp(0.0, 100.0).round() as u8,
                evidence: payload.evidence,
            }),
            _ => {
                // JSON mode is not airtight; fall back to pattern matching
                // before giving up.
                warn!(
                    candidate = %candidate_id,
                    category = %category,
                    "score payload was not valid JSON, trying pattern fallback"
                );
                match extract_score(&content) {
                    Some(score) => Ok(ScoredCategory {
                        score,
                        evidence: content,
                    }),
                    None => Err(CollabError::Malformed(format!(
                        "no score found in model output for {category}"
                    ))),
                }
            }
        }
    }
}

#[async_trait]
impl GateReviewer for OpenAiClient {
    async fn review(
        &self,
        candidate_id: &str,
        summary: &str,
        gate_description: &str,
    ) -> Result<bool, CollabError> {
        let prompt = format!(
            "You are a venture investment committee member reviewing \
             '{candidate_id}'.\n\nEvaluation summary:\n{summary}\n\
             Statement to verify:\n{gate_description}\n\n\
             Does the evidence support this statement? Answer with exactly \
             one word: yes or no."
        );
        let content = self.complete(&prompt, false).await?;

        let answer = content.trim().trim_end_matches('.').to_ascii_lowercase();
        let passed = answer.starts_with("yes");
        if !passed && !answer.starts_with("no") {
            debug!(candidate = %candidate_id, answer = %content, "ambiguous gate answer, treating as no");
        }
        Ok(passed)
    }
}

#[async_trait]
impl ReportRenderer for OpenAiClient {
    async fn render_report(&self, record: &EvidenceRecord) -> Result<String, CollabError> {
        let prompt = format!(
            "Write a markdown investment analysis report for the EdTech \
             startup below. Structure: an executive summary, one section per \
             scored dimension restating the score and its evidence, and a \
             closing recommendation consistent with the recorded decision. \
             Do not invent facts beyond the evidence given.\n\n{}",
            record_digest(record)
        );
        self.complete(&prompt, false).await
    }
}

#[async_trait]
impl VerdictNarrator for OpenAiClient {
    async fn narrate(
        &self,
        record: &EvidenceRecord,
        verdict: &Verdict,
    ) -> Result<String, CollabError> {
        let prompt = format!(
            "In two or three sentences, explain why '{}' received a {} \
             decision at a weighted total of {}/100. Base the explanation \
             only on the scores below.\n\n{}",
            record.candidate_id(),
            verdict.decision,
            verdict.total,
            record_digest(record)
        );
        self.complete(&prompt, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edscout_core::{CategoryFinding, StageUpdate};

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::new("key");
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.api_url.ends_with("/chat/completions"));
    }

    #[test]
    fn test_extract_score_labelled_forms() {
        assert_eq!(extract_score("**Score**: 87"), Some(87));
        assert_eq!(extract_score("total: 42 points"), Some(42));
        assert_eq!(extract_score("I grade this 73/100 overall"), Some(73));
    }

    #[test]
    fn test_extract_score_clamps_out_of_range() {
        assert_eq!(extract_score("score: 250"), Some(100));
    }

    #[test]
    fn test_extract_score_rejects_scoreless_text() {
        assert_eq!(extract_score("a promising startup, hard to grade"), None);
    }

    #[test]
    fn test_score_payload_parses_model_json() {
        let payload: ScorePayload =
            serde_json::from_str(r#"{"score": 88, "evidence": "strong pedagogy"}"#).unwrap();
        assert_eq!(payload.score, 88.0);
        assert_eq!(payload.evidence, "strong pedagogy");
    }

    #[test]
    fn test_scoring_prompt_numbers_checklist() {
        let prompt = scoring_prompt(
            "AlphaEd",
            Category::Technology,
            &["first".to_string(), "second".to_string()],
            "ctx",
        );
        assert!(prompt.contains("1. first"));
        assert!(prompt.contains("2. second"));
        assert!(prompt.contains("AlphaEd"));
        assert!(prompt.contains("technology"));
    }

    #[test]
    fn test_record_digest_includes_scores_and_evidence() {
        let mut record = EvidenceRecord::new("AlphaEd");
        record
            .apply_update(StageUpdate {
                category: Category::Market,
                finding: CategoryFinding {
                    score: 85,
                    evidence: "large addressable market".to_string(),
                },
            })
            .unwrap();

        let digest = record_digest(&record);
        assert!(digest.contains("market: 85/100"));
        assert!(digest.contains("large addressable market"));
    }
}
