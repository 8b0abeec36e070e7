//! Fenced code-block extraction from tutor replies
//!
//! Tutor replies interleave prose with triple-backtick code blocks. The
//! prose renders as the turn's message; the last block rides along as the
//! turn's code, destined either for a fresh notebook cell or an inline
//! editor depending on the reply's interaction tag.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a fenced block with an optional language tag, non-greedy so
/// multiple blocks in one reply each match separately.
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(\w+)?\s*(.*?)```").expect("valid fence regex"));

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Marker the learner replaces in a fill-in-blanks block.
pub const BLANK_MARKER: &str = "___";

/// Strip HTML-ish markup from learner input before it travels anywhere.
pub fn strip_markup(input: &str) -> String {
    TAG_RE.replace_all(input, "").into_owned()
}

/// Split a tutor reply into prose and the last fenced block's body.
///
/// The prose is the reply with every fenced block removed. The code body is
/// trimmed, has literal `\n` escapes converted to real newlines, and loses a
/// single leading newline if one survives; an empty body yields `None`.
pub fn split_reply(reply: &str) -> (String, Option<String>) {
    let prose = FENCE_RE.replace_all(reply, "").into_owned();

    let mut code = None;
    for captures in FENCE_RE.captures_iter(reply) {
        if let Some(body) = captures.get(2) {
            let cleaned = normalize_body(body.as_str());
            if !cleaned.is_empty() {
                code = Some(cleaned);
            }
        }
    }

    (prose, code)
}

fn normalize_body(body: &str) -> String {
    let cleaned = body.trim().replace("\\n", "\n");
    cleaned.strip_prefix('\n').unwrap_or(&cleaned).to_string()
}

/// Whether a code body still has unfilled blanks.
pub fn has_blanks(code: &str) -> bool {
    code.contains(BLANK_MARKER)
}
