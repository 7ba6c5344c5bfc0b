//! Heuristic prompt decomposition.
//!
//! Ordered regular-expression pattern lists that pull context, task, format,
//! constraints and examples out of a free-text prompt. This is the offline
//! fallback for the Gemini structuring call: it never fails, it only
//! degrades to empty captures and per-type defaults.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{PromptExample, PromptType, StructuredPrompt};

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid pattern"))
        .collect()
}

/// Role-declaration phrasings, most specific first. A concrete "you are" or
/// "act as" declaration wins over the generic expert/professional
/// sentence-prefix matches at the end of the list.
static CONTEXT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)you(?:'re| are)\s+(?:an?\s+)?([^.!?]+)",
        r"(?i)act as\s+(?:an?\s+)?([^.!?]+)",
        r"(?i)assume the role of\s+([^.!?]+)",
        r"(?i)as\s+(?:an?\s+)?([^.!?]+),",
        r"(?i)^([^.!?]*expert[^.!?]*)",
        r"(?i)^([^.!?]*professional[^.!?]*)",
    ])
});

static FORMAT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)in\s+(?:the\s+form\s+of\s+)?(?:a\s+)?([^.!?]+format[^.!?]*)",
        r"(?i)as\s+(?:a\s+)?([^.!?]*list[^.!?]*)",
        r"(?i)in\s+([^.!?]*json[^.!?]*)",
        r"(?i)as\s+([^.!?]*table[^.!?]*)",
        r"(?i)in\s+([^.!?]*bullet\s+points?[^.!?]*)",
        r"(?i)(\d+\s+(?:bullet\s+)?points?)",
        r"(?i)(\d+\s+ideas?)",
        r"(?i)(\d+\s+examples?)",
        r"(?i)(step-by-step)",
    ])
});

static CONSTRAINT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(?:keep\s+(?:them?\s+)?|make\s+(?:them?\s+)?)?under\s+\d+\s+words?",
        r"(?i)(?:max|maximum)\s+\d+\s+words?",
        r"(?i)no\s+more\s+than\s+\d+\s+words?",
        r"(?i)limit(?:ed)?\s+to\s+\d+\s+words?",
        r"(?i)within\s+\d+\s+words?",
        r"(?i)no\s+repetition",
        r"(?i)avoid\s+[^.!?]+",
        r"(?i)don't\s+[^.!?]+",
        r"(?i)must\s+(?:be\s+)?[^.!?]+",
        r"(?i)should\s+(?:be\s+)?[^.!?]+",
        r"(?i)ensure\s+[^.!?]+",
    ])
});

// The regex crate has no lookahead, so the "stop at a blank line or a
// capitalized line start" terminator is consumed by a non-capturing
// alternation instead; only the captured block is kept.
static EXAMPLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?is)examples?[:\s]+(.+?)(?:\n\n|\n[A-Z]|\z)",
        r"(?is)for instance[:\s]+(.+?)(?:\n\n|\n[A-Z]|\z)",
        r"(?is)such as[:\s]+(.+?)(?:\n\n|\n[A-Z]|\z)",
    ])
});

static ROLE_BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:you(?:'re| are)|act as|assume the role of)[^.!?]*[.!?]?\s*")
        .expect("invalid pattern")
});

/// Drops a single trailing comma or period, after trimming.
fn trim_trailing_punct(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_suffix(['.', ','])
        .unwrap_or(trimmed)
}

/// Returns the role/context declared in the prompt, or an empty string.
pub fn extract_context(text: &str) -> String {
    for pattern in CONTEXT_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            if let Some(group) = captures.get(1) {
                let cleaned = trim_trailing_punct(group.as_str());
                if !cleaned.is_empty() {
                    return cleaned.to_string();
                }
            }
        }
    }
    String::new()
}

/// Returns the prompt with the detected context and any leading
/// role-declaration boilerplate removed. Falls back to the full text when
/// stripping leaves nothing.
pub fn extract_task(text: &str, context: &str) -> String {
    let mut task = text.to_string();

    if !context.is_empty() {
        let literal = Regex::new(&format!("(?i){}", regex::escape(context)))
            .expect("invalid pattern");
        task = literal.replace(&task, "").into_owned();
    }

    let mut cleaned = task
        .trim_matches(|c: char| c == '.' || c == ',' || c.is_whitespace())
        .to_string();
    cleaned = ROLE_BOILERPLATE.replace(&cleaned, "").into_owned();
    cleaned = cleaned
        .trim_matches(|c: char| c == '.' || c == ',' || c.is_whitespace())
        .to_string();

    if cleaned.is_empty() {
        text.to_string()
    } else {
        cleaned
    }
}

/// Returns the first explicit format cue in the prompt, or an empty string.
pub fn extract_format(text: &str) -> String {
    for pattern in FORMAT_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            if let Some(group) = captures.get(1) {
                let cleaned = group.as_str().trim();
                if !cleaned.is_empty() {
                    return cleaned.to_string();
                }
            }
        }
    }
    String::new()
}

/// Collects every constraint cue in the prompt, insertion-ordered and
/// de-duplicated. Each pattern contributes all of its non-overlapping
/// matches, not just the first.
pub fn extract_constraints(text: &str) -> Vec<String> {
    let mut constraints: Vec<String> = Vec::new();
    for pattern in CONSTRAINT_PATTERNS.iter() {
        for found in pattern.find_iter(text) {
            let cleaned = trim_trailing_punct(found.as_str()).to_string();
            if !constraints.contains(&cleaned) {
                constraints.push(cleaned);
            }
        }
    }
    constraints
}

/// Finds example blocks introduced by "example", "for instance" or
/// "such as". The extractor cannot split a block into a real input/output
/// pair, so every entry carries the fixed placeholder input; the whole block
/// lands in `output`. Known limitation.
pub fn extract_examples(text: &str) -> Vec<PromptExample> {
    let mut examples = Vec::new();
    for pattern in EXAMPLE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            if let Some(group) = captures.get(1) {
                examples.push(PromptExample {
                    input: "Example input".to_string(),
                    output: group.as_str().trim().to_string(),
                });
            }
        }
    }
    examples
}

/// Decomposes a prompt without any network dependency. Empty extractions
/// fall back to the per-type defaults; `task` falls back to the whole
/// prompt, so it is never empty.
pub fn structure(text: &str, prompt_type: PromptType) -> StructuredPrompt {
    let context = extract_context(text);
    let task = extract_task(text, &context);
    let format = extract_format(text);
    let constraints = extract_constraints(text);
    let examples = extract_examples(text);

    StructuredPrompt {
        context: if context.is_empty() {
            prompt_type.default_context().to_string()
        } else {
            context
        },
        task: if task.trim().is_empty() {
            text.trim().to_string()
        } else {
            task
        },
        format: if format.is_empty() {
            prompt_type.default_format().to_string()
        } else {
            format
        },
        constraints,
        examples,
    }
}
