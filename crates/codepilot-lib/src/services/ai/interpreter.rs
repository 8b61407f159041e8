// Response Interpreter
//
// Maps raw completion text to the typed result of the action that requested
// it. Only code-edit responses are ever parsed as structured data.

use regex::Regex;
use std::sync::LazyLock;

use super::protocol::parse_code_edit;
use super::AIResult;
use crate::models::ai::{Action, InterpretedResult};

/// Explanation used when an optimize response carries nothing but code
pub const DEFAULT_OPTIMIZE_EXPLANATION: &str = "See optimized code above.";

/// First fenced block; the language tag after the opening fence is skipped
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[^\s`]*\n?(.*?)```").expect("Invalid fenced block regex")
});

/// Any fenced block including its fences
static ANY_FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("Invalid fence strip regex"));

/// Interior of the first fenced block, trimmed
pub fn first_code_block(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// First fenced block, or the whole trimmed text when there is none
pub fn extract_code_block(text: &str) -> String {
    first_code_block(text).unwrap_or_else(|| text.trim()).to_string()
}

/// Text with every fenced block removed, trimmed
pub fn strip_code_blocks(text: &str) -> String {
    ANY_FENCED_BLOCK.replace_all(text, "").trim().to_string()
}

/// Optimized code and the prose around it
///
/// Falls back to the raw text as code when no code could be extracted, and to
/// [`DEFAULT_OPTIMIZE_EXPLANATION`] when there is no prose.
pub fn split_optimized(raw: &str) -> (String, String) {
    let code = extract_code_block(raw);
    let code = if code.is_empty() { raw.to_string() } else { code };
    let explanation = strip_code_blocks(raw);
    let explanation = if explanation.is_empty() {
        DEFAULT_OPTIMIZE_EXPLANATION.to_string()
    } else {
        explanation
    };
    (code, explanation)
}

/// Interpret raw completion text for `action`
pub fn interpret(action: Action, raw: String) -> AIResult<InterpretedResult> {
    let result = match action {
        Action::Explain => InterpretedResult::Explanation { text: raw },
        Action::FindBugs => InterpretedResult::BugReport { text: raw },
        Action::Chat => InterpretedResult::ChatReply { text: raw },
        Action::Refactor | Action::Convert => InterpretedResult::CodeDiff {
            code: extract_code_block(&raw),
            raw_text: raw,
        },
        Action::Optimize => {
            let (code, explanation_text) = split_optimized(&raw);
            InterpretedResult::Optimize {
                code,
                explanation_text,
            }
        }
        Action::CodeEdit => InterpretedResult::CodeEdit(parse_code_edit(&raw)?),
    };
    Ok(result)
}
