use tracing::{debug, info};

use super::ResearchError;
use crate::openai::CompletionClient;

pub fn build_prompt(topic: &str) -> String {
    format!(
        "Generate 5-6 in-depth research questions about the topic: \"{topic}\".\n\
         Cover causes, effects, data, solutions, and controversies."
    )
}

/// Splits a completion reply into questions, one per non-blank line, with list hyphens
/// and surrounding whitespace removed.
pub fn parse_questions(reply: &str) -> Vec<String> {
    reply
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_matches(|c: char| c == '-' || c.is_whitespace()))
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn generate_questions(
    client: &impl CompletionClient,
    topic: &str,
) -> Result<Vec<String>, ResearchError> {
    let reply = client.complete(&build_prompt(topic)).await?;
    debug!(reply_chars = reply.len(), "question reply received");

    let questions = parse_questions(&reply);
    info!(count = questions.len(), "questions generated");
    Ok(questions)
}
