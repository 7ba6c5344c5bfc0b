//! Heuristic prompt enhancement.
//!
//! A fixed, ordered sequence of gated rewrites applied when the Gemini
//! enhancement call is unavailable: role injection, task clarity, format
//! specification. Each gate checks whether the prompt already carries the
//! feature, so re-running the enhancer on its own output changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{EnhancedPrompt, PromptType};

const BASE_SCORE: u32 = 50;
const ROLE_DELTA: u32 = 15;
const CLARITY_DELTA: u32 = 10;
const FORMAT_DELTA: u32 = 10;
const MAX_SCORE: u32 = 100;

static ROLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)you(?:'re| are)\s+(?:an?\s+)?",
        r"(?i)act as\s+",
        r"(?i)assume the role of\s+",
        r"(?i)as\s+(?:an?\s+)?.*expert",
        r"(?i)as\s+(?:an?\s+)?.*professional",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid pattern"))
    .collect()
});

static CREATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(create)\s+").expect("invalid pattern"));
static SOME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)some\s+").expect("invalid pattern"));
static A_FEW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)a few\s+").expect("invalid pattern"));

const ACTION_VERBS: &[&str] = &[
    "create", "generate", "write", "develop", "design", "build", "analyze", "explain",
    "describe", "list", "provide", "suggest", "recommend",
];

const FORMAT_KEYWORDS: &[&str] = &[
    "format",
    "structure",
    "organize",
    "bullet points",
    "numbered list",
    "table",
    "json",
    "markdown",
    "steps",
    "sections",
];

fn has_role_definition(text: &str) -> bool {
    ROLE_PATTERNS.iter().any(|p| p.is_match(text))
}

fn has_action_verb(text: &str) -> bool {
    let lower = text.to_lowercase();
    ACTION_VERBS.iter().any(|verb| lower.contains(verb))
}

fn has_format_specification(text: &str) -> bool {
    let lower = text.to_lowercase();
    FORMAT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Two independent sub-edits plus unconditional vague-phrase substitutions.
/// Returns the rewritten text; the caller compares against the input to
/// decide whether the clarity improvement fired.
fn improve_task_clarity(text: &str, prompt_type: PromptType) -> String {
    let mut out = text.to_string();

    let lower = out.to_lowercase();
    if lower.contains("create") && !lower.contains("specific") {
        out = CREATE_RE.replace(&out, "${1} specific ").into_owned();
    }

    if !has_action_verb(&out) {
        let verb = prompt_type.default_action_verb();
        let (head, rest) = match out.split_once('.') {
            Some((head, rest)) => (head.to_string(), rest.to_string()),
            None => (out.clone(), String::new()),
        };
        out = format!("{}. {} {}", head, verb, rest).trim().to_string();
    }

    out = SOME_RE.replace_all(&out, "several detailed ").into_owned();
    out = A_FEW_RE.replace_all(&out, "multiple comprehensive ").into_owned();

    out
}

/// Rewrites a prompt through the gated transformation sequence and scores
/// the result: 50 baseline, +15 role, +10 clarity, +10 format, capped
/// at 100. Pure string work; there is no failure path.
pub fn enhance(text: &str, prompt_type: PromptType) -> EnhancedPrompt {
    let mut enhanced = text.trim().to_string();
    let mut improvements = Vec::new();
    let mut score = BASE_SCORE;

    if !has_role_definition(&enhanced) {
        enhanced = format!("{} {}", prompt_type.default_role(), enhanced);
        improvements.push("Added role/context definition".to_string());
        score += ROLE_DELTA;
    }

    let clarified = improve_task_clarity(&enhanced, prompt_type);
    if clarified != enhanced {
        enhanced = clarified;
        improvements.push("Enhanced task clarity and specificity".to_string());
        score += CLARITY_DELTA;
    }

    if !has_format_specification(&enhanced) {
        if !enhanced.ends_with(['.', '!', '?']) {
            enhanced.push('.');
        }
        enhanced = format!("{} {}", enhanced, prompt_type.format_suggestion());
        improvements.push("Added output format specification".to_string());
        score += FORMAT_DELTA;
    }

    EnhancedPrompt {
        original: text.to_string(),
        enhanced,
        improvements,
        score: score.min(MAX_SCORE) as u8,
    }
}
