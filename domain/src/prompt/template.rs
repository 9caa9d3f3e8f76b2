//! Prompt templates for the council flow

use crate::core::string::truncate;
use crate::council::label::LabelMap;
use crate::council::record::{JudgmentRecord, ResponseRecord};

/// Title used when the title side task fails or returns nothing usable.
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 50;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Stage-2 prompt: anonymized responses plus strict ranking instructions.
    ///
    /// Only the records that own a label are shown, in label order.
    pub fn ranking_prompt(
        question: &str,
        responses: &[ResponseRecord],
        label_map: &LabelMap,
    ) -> String {
        let responses_text = responses
            .iter()
            .filter_map(|r| {
                label_map
                    .label_of(&r.worker)
                    .filter(|_| !r.is_placeholder())
                    .map(|label| format!("{}:\n{}", label, r.content))
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are evaluating different responses to the following question:

Question: {question}

Here are the responses from different models (anonymized):

{responses_text}

Your task:
1. First, evaluate each response individually. For each response, explain what it does well and what it does poorly.
2. Then, at the very end of your response, provide a final ranking.

IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows:
- Start with the line "FINAL RANKING:" (all caps, with colon)
- Then list the responses from best to worst as a numbered list
- Each line should be: number, period, space, then ONLY the response label (e.g., "1. Response A")
- Do not add any other text or explanations in the ranking section

Example of the correct format for your ENTIRE response:

Response A provides good detail on X but misses Y...
Response B is accurate but lacks depth on Z...
Response C offers the most comprehensive answer...

FINAL RANKING:
1. Response C
2. Response A
3. Response B

Now provide your evaluation and ranking:"#
        )
    }

    /// Stage-1 context block handed to the chairman.
    pub fn stage1_text(responses: &[ResponseRecord]) -> String {
        responses
            .iter()
            .map(|r| format!("Model: {}\nResponse: {}", r.worker, r.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Stage-2 context block handed to the chairman.
    pub fn stage2_text(judgments: &[JudgmentRecord]) -> String {
        judgments
            .iter()
            .map(|j| format!("Model: {}\nRanking: {}", j.judge, j.raw_text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Stage-3 prompt.
    ///
    /// `override_template` may reference `{user_query}`, `{stage1_text}` and
    /// `{stage2_text}`; any other braces are left untouched.
    pub fn chairman_prompt(
        question: &str,
        responses: &[ResponseRecord],
        judgments: &[JudgmentRecord],
        override_template: Option<&str>,
    ) -> String {
        let stage1_text = Self::stage1_text(responses);
        let stage2_text = Self::stage2_text(judgments);

        if let Some(template) = override_template {
            return render(
                template,
                &[
                    ("user_query", question),
                    ("stage1_text", &stage1_text),
                    ("stage2_text", &stage2_text),
                ],
            );
        }

        format!(
            r#"You are the Chairman of an LLM Council. Multiple AI models have provided responses to a user's question, and then ranked each other's responses.

Original Question: {question}

STAGE 1 - Individual Responses:
{stage1_text}

STAGE 2 - Peer Rankings:
{stage2_text}

Your task as Chairman is to synthesize all of this information into a single, comprehensive, accurate answer to the user's original question. Consider:
- The individual responses and their insights
- The peer rankings and what they reveal about response quality
- Any patterns of agreement or disagreement

Provide a clear, well-reasoned final answer that represents the council's collective wisdom:"#
        )
    }

    /// Prompt for the title side task.
    pub fn title_prompt(question: &str) -> String {
        format!(
            r#"Generate a very short title (3-5 words maximum) that summarizes the following question.
The title should be concise and descriptive. Do not use quotes or punctuation in the title.

Question: {question}

Title:"#
        )
    }

    /// Normalize a raw title reply: trim, strip surrounding quotes, cap length.
    pub fn clean_title(raw: &str) -> String {
        let title = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        if title.is_empty() {
            return DEFAULT_TITLE.to_string();
        }
        truncate(title, MAX_TITLE_CHARS)
    }
}

/// Single-pass `{name}` substitution, so substituted text is never rescanned.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let matched = vars.iter().find_map(|(name, value)| {
            after
                .strip_prefix(name)
                .and_then(|tail| tail.strip_prefix('}'))
                .map(|tail| (*value, tail))
        });
        match matched {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
