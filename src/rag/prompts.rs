//! Prompt construction for answer generation.

use super::ContextPassage;

/// Fixed generation instruction. Answers come only from the supplied
/// context, in bullet form, with an explicit fallback when the context does
/// not contain the answer.
pub const SYSTEM_INSTRUCTION: &str = "You are a precise and structured assistant.\n\
Answer the question using ONLY the provided context.\n\
If the answer is not present in the context, clearly say: 'I do not know.'\n\
\n\
Guidelines for the answer:\n\
- Use clear bullet points only (no paragraphs).\n\
- Group related points under short, meaningful headings when appropriate.\n\
- Keep bullets concise and factual.\n\
- Do not add assumptions, examples, or external knowledge.";

/// Build the system prompt: the fixed instruction plus the context block.
pub fn build_system_prompt(passages: &[ContextPassage]) -> String {
    format!(
        "{}\n\nContext:\n{}",
        SYSTEM_INSTRUCTION,
        format_context(passages)
    )
}

/// Format passages as a numbered context block.
pub fn format_context(passages: &[ContextPassage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| {
            format!("---\n[{}] {}\n{}\n---", i + 1, passage.title, passage.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(title: &str, text: &str) -> ContextPassage {
        ContextPassage {
            video_id: "video1".to_string(),
            title: title.to_string(),
            text: text.to_string(),
            relevance: 0.5,
        }
    }

    #[test]
    fn test_context_is_numbered_in_order() {
        let formatted = format_context(&[
            passage("Talk", "first passage"),
            passage("Talk", "second passage"),
        ]);

        assert!(formatted.contains("[1] Talk\nfirst passage"));
        assert!(formatted.contains("[2] Talk\nsecond passage"));
        assert!(formatted.find("[1]").unwrap() < formatted.find("[2]").unwrap());
    }

    #[test]
    fn test_system_prompt_carries_instruction_and_context() {
        let prompt = build_system_prompt(&[passage("Talk", "the only passage")]);
        assert!(prompt.starts_with("You are a precise and structured assistant."));
        assert!(prompt.contains("I do not know."));
        assert!(prompt.contains("the only passage"));
    }
}
