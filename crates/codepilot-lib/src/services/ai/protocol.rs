// Code-Edit Action Protocol
//
// The model must answer code-edit requests with a single JSON object whose
// `action` field selects apply, clarify or noop. The object is untrusted:
// every gate below rejects with a typed error instead of guessing.

use serde_json::{Map, Value};

use super::{AIError, AIResult};
use crate::models::ai::CodeEditDecision;

/// Optional string field; anything that is not a string reads as empty
fn optional_string(object: &Map<String, Value>, field: &str) -> String {
    object
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Validate a raw code-edit completion
///
/// Gates, in order:
/// 1. the text parses as JSON, else [`AIError::InvalidJson`]
/// 2. `action` is one of `apply`, `clarify`, `noop`
/// 3. `clarify` carries a non-blank `question` (returned trimmed)
/// 4. `apply` carries a non-blank `code` (returned untrimmed)
///
/// Gates 2 to 4 fail with [`AIError::InvalidSchema`].
pub fn parse_code_edit(raw: &str) -> AIResult<CodeEditDecision> {
    let parsed: Value = serde_json::from_str(raw).map_err(|e| {
        log::error!("[ai] code-edit invalid JSON ({} bytes): {}", raw.len(), e);
        AIError::InvalidJson(e.to_string())
    })?;

    let empty = Map::new();
    let object = parsed.as_object().unwrap_or(&empty);
    let rationale = optional_string(object, "rationale");

    match object.get("action").and_then(Value::as_str) {
        Some("clarify") => {
            let question = object
                .get("question")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .ok_or_else(|| AIError::InvalidSchema("AI clarification missing question.".to_string()))?;
            Ok(CodeEditDecision::Clarify {
                question: question.to_string(),
                rationale,
            })
        }
        Some("apply") => {
            // Validated trimmed, applied exactly as sent
            let code = object
                .get("code")
                .and_then(Value::as_str)
                .filter(|c| !c.trim().is_empty())
                .ok_or_else(|| AIError::InvalidSchema("AI apply missing code.".to_string()))?;
            Ok(CodeEditDecision::Apply {
                code: code.to_string(),
                rationale,
            })
        }
        Some("noop") => Ok(CodeEditDecision::Noop { rationale }),
        _ => Err(AIError::InvalidSchema(
            "AI response missing valid action (apply|clarify|noop).".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ai::DecisionKind;
    use crate::services::ai::ErrorKind;

    #[test]
    fn test_apply_decision() {
        let decision = parse_code_edit(r#"{"action":"apply","rationale":"r","code":"x"}"#).unwrap();
        assert_eq!(
            decision,
            CodeEditDecision::Apply {
                code: "x".to_string(),
                rationale: "r".to_string()
            }
        );
    }

    #[test]
    fn test_apply_keeps_untrimmed_code() {
        let decision =
            parse_code_edit(r#"{"action":"apply","code":"\n  fn main() {}\n"}"#).unwrap();
        match decision {
            CodeEditDecision::Apply { code, rationale } => {
                assert_eq!(code, "\n  fn main() {}\n");
                assert_eq!(rationale, "");
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_apply_rejects_blank_or_missing_code() {
        for raw in [
            r#"{"action":"apply","code":"  \n "}"#,
            r#"{"action":"apply"}"#,
            r#"{"action":"apply","code":42}"#,
        ] {
            assert!(
                matches!(parse_code_edit(raw), Err(AIError::InvalidSchema(_))),
                "accepted {}",
                raw
            );
        }
    }

    #[test]
    fn test_clarify_decision_defaults_rationale() {
        let decision = parse_code_edit(r#"{"action":"clarify","question":"q?"}"#).unwrap();
        assert_eq!(
            decision,
            CodeEditDecision::Clarify {
                question: "q?".to_string(),
                rationale: String::new()
            }
        );
    }

    #[test]
    fn test_clarify_question_is_trimmed() {
        let decision = parse_code_edit(r#"{"action":"clarify","question":"  which file?  "}"#).unwrap();
        assert_eq!(decision.kind(), DecisionKind::Clarify);
        match decision {
            CodeEditDecision::Clarify { question, .. } => assert_eq!(question, "which file?"),
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_clarify_without_question_is_rejected() {
        assert!(matches!(
            parse_code_edit(r#"{"action":"clarify"}"#),
            Err(AIError::InvalidSchema(_))
        ));
        assert!(matches!(
            parse_code_edit(r#"{"action":"clarify","question":"   "}"#),
            Err(AIError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_noop_decision() {
        let decision = parse_code_edit(r#"{"action":"noop","rationale":"already done"}"#).unwrap();
        assert_eq!(decision.kind(), DecisionKind::Noop);
        assert_eq!(decision.rationale(), "already done");
    }

    #[test]
    fn test_non_string_rationale_reads_as_empty() {
        let decision = parse_code_edit(r#"{"action":"noop","rationale":7}"#).unwrap();
        assert_eq!(decision.rationale(), "");
    }

    #[test]
    fn test_unknown_or_missing_action_is_rejected() {
        for raw in [
            r#"{"action":"bogus"}"#,
            r#"{"action":"APPLY","code":"x"}"#,
            r#"{"code":"x"}"#,
            r#"{"action":1}"#,
            r#"["apply"]"#,
            r#""apply""#,
            "null",
        ] {
            assert!(
                matches!(parse_code_edit(raw), Err(AIError::InvalidSchema(_))),
                "accepted {}",
                raw
            );
        }
    }

    #[test]
    fn test_non_json_is_distinguishable_from_schema_failure() {
        let not_json = parse_code_edit("Sure! Here is the change:\n```js\nx\n```").unwrap_err();
        let bad_schema = parse_code_edit(r#"{"action":"bogus"}"#).unwrap_err();

        assert!(matches!(not_json, AIError::InvalidJson(_)));
        assert!(matches!(bad_schema, AIError::InvalidSchema(_)));
        assert_ne!(not_json.code(), bad_schema.code());
        assert_eq!(not_json.kind(), ErrorKind::MalformedResponse);
        assert_eq!(bad_schema.kind(), ErrorKind::MalformedResponse);
    }
}
