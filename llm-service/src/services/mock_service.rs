//! Deterministic provider for tests and local development.
//!
//! Returns a fixed review payload (or caller-supplied canned content) with
//! stable token and latency figures, so pipeline behavior is reproducible
//! without network access.

use crate::LlmReply;
use crate::error_handler::Result;

/// Network-free model client with a canned reply.
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    canned: Option<String>,
}

impl MockLlmService {
    /// Mock that replies with a small, valid review payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that replies with exactly `content`. Used to exercise the
    /// invalid-output recovery path without a real model.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            canned: Some(content.into()),
        }
    }

    pub async fn generate(&self, _system: &str, _user: &str) -> Result<LlmReply> {
        let content = self
            .canned
            .clone()
            .unwrap_or_else(|| default_review_payload().to_string());
        Ok(LlmReply {
            content,
            tokens_prompt: 100,
            tokens_completion: 50,
            latency_ms: 5.0,
        })
    }
}

fn default_review_payload() -> &'static str {
    r#"{
  "summary": "Mock summary for testing.",
  "comments": [
    {
      "agent": "llm-mock-agent",
      "file_path": "app/example.py",
      "line_start": 10,
      "line_end": 15,
      "category": "logic",
      "severity": "info",
      "title": "Mock comment",
      "body": "This is a deterministic mock comment for tests.",
      "suggested_fix": "Replace with real model output."
    }
  ],
  "agents": ["llm-mock-agent"]
}"#
}
