// Prompt Builder
//
// One fixed prompt spec per action. Building a prompt is pure: identical
// inputs always produce byte-identical system and user content.

use crate::models::ai::Action;

/// Shared preamble of every system prompt
const SYSTEM_PREFIX: &str = "You are an expert software engineer assistant. Be concise, accurate, and professional. \
Output only what is requested, with no preamble or meta-commentary unless asked. \
Preserve all code and content unrelated to the request.";

/// Opening delimiter around the document embedded in code-edit prompts
pub const DOCUMENT_START: &str = "<<<CODE START>>>";
/// Closing delimiter around the document embedded in code-edit prompts
pub const DOCUMENT_END: &str = "<<<CODE END>>>";

/// Context placeholder when the chat panel has no document
const NO_CONTEXT: &str = "(no code provided)";

/// Inputs a prompt may draw from
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInput<'a> {
    /// Code under analysis, or the current document for chat and code-edit
    pub code: &'a str,
    pub language: &'a str,
    /// Convert target
    pub target_language: Option<&'a str>,
    /// User instruction for chat and code-edit
    pub message: Option<&'a str>,
}

/// Rendered prompt content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Template pair bound to an action
pub struct PromptSpec {
    pub action: Action,
    /// Action-specific instructions appended to the shared preamble
    pub instructions: &'static str,
    user: fn(&PromptInput<'_>) -> String,
}

impl PromptSpec {
    pub fn system(&self, input: &PromptInput<'_>) -> String {
        match self.action {
            Action::Chat => {
                let context = if input.code.is_empty() { NO_CONTEXT } else { input.code };
                format!("{} {}\n\n```\n{}\n```", SYSTEM_PREFIX, self.instructions, context)
            }
            Action::CodeEdit => format!(
                "{}\n{}\nYou are updating a {} file. Current file:\n{}\n{}\n{}\n{}",
                SYSTEM_PREFIX,
                "STRICT JSON ONLY. NO MARKDOWN. NO EXPLANATIONS.",
                input.language,
                DOCUMENT_START,
                input.code,
                DOCUMENT_END,
                self.instructions
            ),
            _ => format!("{} {}", SYSTEM_PREFIX, self.instructions),
        }
    }

    pub fn user(&self, input: &PromptInput<'_>) -> String {
        (self.user)(input)
    }

    pub fn render(&self, input: &PromptInput<'_>) -> Prompt {
        Prompt {
            system: self.system(input),
            user: self.user(input),
        }
    }
}

fn fenced(code: &str, language: &str) -> String {
    format!("```{}\n{}\n```", language, code)
}

fn explain_user(input: &PromptInput<'_>) -> String {
    format!(
        "Explain this {} code:\n\n{}",
        input.language,
        fenced(input.code, input.language)
    )
}

fn bugs_user(input: &PromptInput<'_>) -> String {
    format!(
        "Find bugs and suggest fixes in this {} code:\n\n{}",
        input.language,
        fenced(input.code, input.language)
    )
}

fn refactor_user(input: &PromptInput<'_>) -> String {
    format!(
        "Refactor this {} code for readability and best practices. Output only the refactored code:\n\n{}",
        input.language,
        fenced(input.code, input.language)
    )
}

fn optimize_user(input: &PromptInput<'_>) -> String {
    format!(
        "Optimize this {} code for performance. Output optimized code in a code block, then a short list of changes:\n\n{}",
        input.language,
        fenced(input.code, input.language)
    )
}

fn convert_user(input: &PromptInput<'_>) -> String {
    let target = input.target_language.unwrap_or("text");
    format!(
        "Convert this {} code to {}. Output only the {} code in a code block:\n\n{}",
        input.language,
        target,
        target,
        fenced(input.code, input.language)
    )
}

fn message_user(input: &PromptInput<'_>) -> String {
    input.message.unwrap_or_default().to_string()
}

static PROMPT_SPECS: [PromptSpec; 7] = [
    PromptSpec {
        action: Action::Explain,
        instructions: "Explain code clearly: high-level purpose, then line-by-line where helpful, and note time/space complexity if relevant.",
        user: explain_user,
    },
    PromptSpec {
        action: Action::FindBugs,
        instructions: "Identify potential bugs and logical errors. For each: describe the issue, where it occurs, and provide a concrete fix (code snippet).",
        user: bugs_user,
    },
    PromptSpec {
        action: Action::Refactor,
        instructions: "Refactor for readability and best practices. Preserve behavior. Prefer clear names, small functions, and standard idioms. Return only the refactored code in a single code block.",
        user: refactor_user,
    },
    PromptSpec {
        action: Action::Optimize,
        instructions: "Optimize for performance (time and space). Preserve behavior. Return the optimized code in a single code block, then briefly list optimizations made.",
        user: optimize_user,
    },
    PromptSpec {
        action: Action::Convert,
        instructions: "Convert code to the target language. Preserve logic and behavior. Use idiomatic constructs. Return only the converted code in a single code block.",
        user: convert_user,
    },
    PromptSpec {
        action: Action::Chat,
        instructions: "The user may reference \"the code\" or \"current file\"; use this context when relevant:",
        user: message_user,
    },
    PromptSpec {
        action: Action::CodeEdit,
        instructions: "Rules:\n\
- Keep unrelated code intact.\n\
- Make minimal changes required by the user.\n\
- If instructions are unclear or risky, return {\"action\":\"clarify\",\"question\":\"...\"}.\n\
- Only use {\"action\":\"apply\"} when you can return the full updated file in \"code\".\n\
- Never add TODOs or placeholders.\n\
- Never delete unrelated code.\n\
- Output JSON only matching the schema: {\"action\":\"apply\"|\"clarify\"|\"noop\",\"rationale\":\"...\",\"code\":\"...optional...\",\"question\":\"...optional...\"}.",
        user: message_user,
    },
];

/// Prompt spec bound to `action`
pub fn prompt_spec(action: Action) -> &'static PromptSpec {
    match action {
        Action::Explain => &PROMPT_SPECS[0],
        Action::FindBugs => &PROMPT_SPECS[1],
        Action::Refactor => &PROMPT_SPECS[2],
        Action::Optimize => &PROMPT_SPECS[3],
        Action::Convert => &PROMPT_SPECS[4],
        Action::Chat => &PROMPT_SPECS[5],
        Action::CodeEdit => &PROMPT_SPECS[6],
    }
}

/// Render the prompt for `action`
pub fn build_prompt(action: Action, input: &PromptInput<'_>) -> Prompt {
    prompt_spec(action).render(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PromptInput<'static> {
        PromptInput {
            code: "fn add(a: i32, b: i32) -> i32 { a + b }",
            language: "rust",
            target_language: Some("python"),
            message: Some("rename add to sum"),
        }
    }

    #[test]
    fn test_specs_are_bound_to_their_action() {
        for action in Action::ALL {
            assert_eq!(prompt_spec(action).action, action);
        }
    }

    #[test]
    fn test_prompts_are_deterministic() {
        for action in Action::ALL {
            let first = build_prompt(action, &sample());
            let second = build_prompt(action, &sample());
            assert_eq!(first, second, "prompt for {} changed between calls", action);
        }
    }

    #[test]
    fn test_every_template_preserves_unrelated_content() {
        for action in Action::ALL {
            let prompt = build_prompt(action, &sample());
            assert!(
                prompt.system.contains("Preserve all code and content unrelated to the request."),
                "{} prompt is missing the preservation rule",
                action
            );
        }
    }

    #[test]
    fn test_code_actions_fence_code_in_user_content() {
        let prompt = build_prompt(Action::Explain, &sample());
        assert!(prompt.user.starts_with("Explain this rust code:"));
        assert!(prompt.user.contains("```rust\nfn add(a: i32, b: i32) -> i32 { a + b }\n```"));
    }

    #[test]
    fn test_convert_names_both_languages() {
        let prompt = build_prompt(Action::Convert, &sample());
        assert!(prompt.user.starts_with("Convert this rust code to python."));
        assert!(prompt.user.contains("Output only the python code"));
    }

    #[test]
    fn test_code_edit_embeds_document_between_delimiters() {
        let prompt = build_prompt(Action::CodeEdit, &sample());
        let start = prompt.system.find(DOCUMENT_START).unwrap();
        let end = prompt.system.find(DOCUMENT_END).unwrap();
        assert!(start < end);
        let embedded = &prompt.system[start + DOCUMENT_START.len()..end];
        assert_eq!(embedded, "\nfn add(a: i32, b: i32) -> i32 { a + b }\n");
        assert!(prompt.system.contains("You are updating a rust file."));
        assert_eq!(prompt.user, "rename add to sum");
    }

    #[test]
    fn test_code_edit_keeps_markdown_inside_document() {
        let input = PromptInput {
            code: "# Title\n```js\nlet a = 1;\n```",
            language: "markdown",
            target_language: None,
            message: Some("fix the heading"),
        };
        let prompt = build_prompt(Action::CodeEdit, &input);
        assert!(prompt
            .system
            .contains("<<<CODE START>>>\n# Title\n```js\nlet a = 1;\n```\n<<<CODE END>>>"));
    }

    #[test]
    fn test_chat_injects_document_or_placeholder() {
        let prompt = build_prompt(Action::Chat, &sample());
        assert!(prompt.system.contains("```\nfn add(a: i32, b: i32) -> i32 { a + b }\n```"));
        assert_eq!(prompt.user, "rename add to sum");

        let empty = PromptInput {
            message: Some("hello"),
            ..PromptInput::default()
        };
        let prompt = build_prompt(Action::Chat, &empty);
        assert!(prompt.system.contains("(no code provided)"));
    }
}
