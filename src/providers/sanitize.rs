//! Cleanup of raw model replies into a single commit subject line.

/// Longest subject line kept as-is.
pub const MAX_SUBJECT_CHARS: usize = 72;

/// Characters kept before `...` when no word boundary fits.
pub const HARD_TRUNCATE_CHARS: usize = 69;

/// Words that read badly at the end of a cut-off subject.
pub const TRAILING_CONNECTORS: &[&str] = &["and", "or", "but", "with", "for", "to"];

/// Returned when the reply has no usable text.
pub const EMPTY_REPLY_MESSAGE: &str = "chore: update files";

const FENCE: &str = "```";

/// Turn a raw model reply into a single-line commit message of at most
/// [`MAX_SUBJECT_CHARS`] characters.
pub fn sanitize_message(raw: &str) -> String {
    let text = strip_quotes(raw.trim()).trim();
    let text = strip_fence(text);

    let first_line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    if first_line.is_empty() {
        return EMPTY_REPLY_MESSAGE.to_string();
    }
    truncate_subject(first_line)
}

/// Remove one layer of matching surrounding quotes.
fn strip_quotes(text: &str) -> &str {
    if text.starts_with(FENCE) {
        return text;
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '"' | '\'' | '`') => {
            &text[open.len_utf8()..text.len() - close.len_utf8()]
        }
        _ => text,
    }
}

/// Drop an opening fence line (with its language tag) and a closing fence.
fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        // Single-line fence: "```feat: x```"
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

/// Cut an over-long line after the last whole word that fits. The kept
/// prefix is sliced from `line`, so its spacing is unchanged.
fn truncate_subject(line: &str) -> String {
    if line.chars().count() <= MAX_SUBJECT_CHARS {
        return line.to_string();
    }

    let mut kept: Vec<(usize, &str)> = Vec::new();
    for (end, word) in words(line) {
        if line[..end].chars().count() > MAX_SUBJECT_CHARS {
            break;
        }
        kept.push((end, word));
    }

    if kept.len() > 1 && kept.last().is_some_and(|(_, w)| is_connector(w)) {
        kept.pop();
    }

    match kept.as_slice() {
        [] => hard_truncate(line),
        [(_, only)] if is_connector(only) => hard_truncate(line),
        [.., (end, _)] => line[..*end].to_string(),
    }
}

/// Whitespace-separated words with the byte offset just past each one.
fn words(line: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                out.push((i, &line[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((line.len(), &line[s..]));
    }
    out
}

fn is_connector(word: &str) -> bool {
    TRAILING_CONNECTORS.contains(&word.to_lowercase().as_str())
}

fn hard_truncate(line: &str) -> String {
    let mut out: String = line.chars().take(HARD_TRUNCATE_CHARS).collect();
    out.push_str("...");
    out
}
