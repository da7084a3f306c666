//! Remote-model-backed review strategy.
//!
//! One prompt pair per job: a fixed reviewer instruction (system role) and a
//! diff-embedding prompt (user role). The model is asked for a single JSON
//! object; replies are sanitized (markdown fences stripped, first `{...}`
//! block extracted) before parsing, and an unparsable reply degrades to a
//! fallback summary with no findings instead of failing the job. Transport
//! or API failures from the client do propagate: the model is this
//! strategy's only source of content.

use serde::Deserialize;
use tracing::{debug, warn};

use llm_service::LlmService;

use super::{PipelineOutcome, count_diff_files, non_empty, run_metadata};
use crate::errors::PrResult;
use crate::model::{Finding, PipelineRun};

const ORCHESTRATOR_AGENT: &str = "llm-orchestrator";

/// Summary substituted when the model reply is not a structured payload.
pub const INVALID_OUTPUT_SUMMARY: &str =
    "Model returned invalid output; review completed without findings.";

const SYSTEM_INSTRUCTION: &str = "You are a meticulous senior code reviewer. \
Inspect the supplied unified diff and respond with exactly one JSON object, \
no prose around it, of the shape: {\"summary\": string, \"comments\": \
[{\"agent\": string, \"file_path\": string, \"line_start\": int, \
\"line_end\": int, \"category\": string, \"severity\": string, \"title\": \
string, \"body\": string, \"suggested_fix\": string}], \"agents\": [string]}. \
Line numbers refer to the post-change file.";

/// Strategy wrapper around the remote-model client.
#[derive(Debug)]
pub struct LlmOrchestrator {
    client: LlmService,
}

impl LlmOrchestrator {
    pub fn new(client: LlmService) -> Self {
        Self { client }
    }

    pub async fn run(&self, diff: Option<&str>) -> PrResult<PipelineOutcome> {
        let Some(diff) = non_empty(diff) else {
            let run = run_metadata(vec![ORCHESTRATOR_AGENT.to_string()], &[], 0);
            return Ok(PipelineOutcome {
                summary: "No diff provided; model-backed review skipped.".to_string(),
                findings: Vec::new(),
                run,
            });
        };

        let user_prompt = build_user_prompt(diff);
        let reply = self.client.generate(SYSTEM_INSTRUCTION, &user_prompt).await?;
        debug!(
            content_len = reply.content.len(),
            tokens_prompt = reply.tokens_prompt,
            tokens_completion = reply.tokens_completion,
            "model reply received"
        );

        let (summary, findings, agents) = match parse_review_payload(&reply.content) {
            Some(parsed) => parsed,
            None => {
                warn!(
                    content_len = reply.content.len(),
                    "model reply was not a structured review payload"
                );
                (INVALID_OUTPUT_SUMMARY.to_string(), Vec::new(), Vec::new())
            }
        };

        let agents_run = if agents.is_empty() {
            vec![ORCHESTRATOR_AGENT.to_string()]
        } else {
            agents
        };
        let mut run: PipelineRun = run_metadata(agents_run, &findings, count_diff_files(diff));
        run.tokens_prompt = Some(reply.tokens_prompt);
        run.tokens_completion = Some(reply.tokens_completion);
        run.latency_ms = Some(reply.latency_ms);

        Ok(PipelineOutcome {
            summary,
            findings,
            run,
        })
    }
}

fn build_user_prompt(diff: &str) -> String {
    format!(
        "Review the following unified diff and report concrete, actionable findings.\n\n```diff\n{diff}\n```"
    )
}

/// Remove markdown fences and surrounding prose; extract the first JSON
/// object. Deliberately tolerant: the `{...}` block may appear anywhere in
/// the reply.
fn sanitize_json_block(s: &str) -> String {
    let no_fence = s
        .replace("```json", "")
        .replace("```", "")
        .replace('\u{feff}', "")
        .trim()
        .to_string();

    if let (Some(start), Some(end)) = (no_fence.find('{'), no_fence.rfind('}')) {
        if start < end {
            let candidate = &no_fence[start..=end];
            if candidate.contains(':') {
                return candidate.to_string();
            }
        }
    }
    no_fence
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    comments: Vec<Finding>,
    #[serde(default)]
    agents: Vec<String>,
}

fn parse_review_payload(content: &str) -> Option<(String, Vec<Finding>, Vec<String>)> {
    let candidate = sanitize_json_block(content);
    let raw: RawPayload = serde_json::from_str(&candidate).ok()?;
    Some((raw.summary.unwrap_or_default(), raw.comments, raw.agents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_service::MockLlmService;

    const DIFF: &str = "\
diff --git a/a.py b/a.py
+++ b/a.py
@@ -1 +1,2 @@
 x = 1
+y = 2
";

    #[tokio::test]
    async fn mock_reply_parses_into_findings() {
        let orchestrator = LlmOrchestrator::new(LlmService::Mock(MockLlmService::new()));
        let outcome = orchestrator.run(Some(DIFF)).await.unwrap();
        assert_eq!(outcome.summary, "Mock summary for testing.");
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].file_path, "app/example.py");
        assert_eq!(outcome.run.agents_run, vec!["llm-mock-agent".to_string()]);
        assert_eq!(outcome.run.tokens_prompt, Some(100));
        assert_eq!(outcome.run.tokens_completion, Some(50));
        assert!(outcome.run.latency_ms.is_some());
        assert_eq!(outcome.run.files_reviewed, 1);
    }

    #[tokio::test]
    async fn invalid_reply_falls_back_to_empty_review() {
        let orchestrator = LlmOrchestrator::new(LlmService::Mock(MockLlmService::with_content(
            "sorry, I cannot produce JSON today",
        )));
        let outcome = orchestrator.run(Some(DIFF)).await.unwrap();
        assert_eq!(outcome.summary, INVALID_OUTPUT_SUMMARY);
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.run.agents_run, vec!["llm-orchestrator".to_string()]);
    }

    #[tokio::test]
    async fn absent_diff_skips_model_call() {
        let orchestrator = LlmOrchestrator::new(LlmService::Mock(MockLlmService::new()));
        let outcome = orchestrator.run(None).await.unwrap();
        assert!(outcome.summary.contains("skipped"));
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.run.files_reviewed, 0);
        assert_eq!(outcome.run.agents_run, vec!["llm-orchestrator".to_string()]);
    }

    #[test]
    fn sanitizer_strips_fences_and_prose() {
        let raw = "Here you go:\n```json\n{\"summary\": \"ok\", \"comments\": [], \"agents\": []}\n```\nHope that helps!";
        let cleaned = sanitize_json_block(raw);
        assert!(cleaned.starts_with('{'));
        assert!(cleaned.ends_with('}'));
        let parsed = parse_review_payload(raw).unwrap();
        assert_eq!(parsed.0, "ok");
    }

    #[test]
    fn payload_with_bad_comment_shape_is_rejected_whole() {
        let raw = "{\"summary\": \"ok\", \"comments\": [{\"file_path\": 42}]}";
        assert!(parse_review_payload(raw).is_none());
    }
}
