//! Local text used when the objective service cannot be reached

use crate::types::LessonMeta;

/// Written into Objective when Context is blank
pub const PROMPT_FOR_INPUT: &str = "Add some context first, then request an objective summary.";

/// Shown alongside a locally generated summary
pub const FALLBACK_WARNING: &str = "Objective service unavailable; showing a locally generated summary.";

/// How much of the context the fallback echoes back
pub const FALLBACK_ECHO_CHARS: usize = 160;

/// Deterministic summary derived from lesson metadata and the context
pub fn fallback_summary(meta: &LessonMeta, context: &str) -> String {
    let context = context.trim();
    let echo = crate::truncate_safe(context, FALLBACK_ECHO_CHARS);
    let ellipsis = if echo.len() < context.len() { "…" } else { "" };

    format!(
        "Objective summary (generated locally)\n- Lesson: {}\n- Category: {}\n- Context noted: \"{}{}\"",
        or_unknown(&meta.lesson_title),
        or_unknown(&meta.category),
        echo,
        ellipsis,
    )
}

fn or_unknown(s: &str) -> &str {
    if s.trim().is_empty() { "Unknown" } else { s }
}
