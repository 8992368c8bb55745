//! Removes transcript echoes from agent replies.
//!
//! Agents often repeat earlier turns or prefix content with speaker labels.
//! [`clean`] strips prior agent texts, then `Label: content` runs, then
//! squeezes whitespace. It is a text heuristic and makes no attempt to
//! understand the reply.

use regex::Regex;
use std::sync::OnceLock;

/// A speaker label and the labels that end its content.
struct SpeakerPattern {
    label: &'static str,
    terminators: &'static [&'static str],
}

const SPEAKER_PATTERNS: &[SpeakerPattern] = &[
    SpeakerPattern {
        label: "User:",
        terminators: &["Agent:", "Assistant:"],
    },
    SpeakerPattern {
        label: "Agent:",
        terminators: &["User:"],
    },
    SpeakerPattern {
        label: "Assistant:",
        terminators: &["User:"],
    },
    SpeakerPattern {
        label: "Human:",
        terminators: &["Assistant:"],
    },
    SpeakerPattern {
        label: "**User**:",
        terminators: &["**Agent**:", "**Assistant**:"],
    },
    SpeakerPattern {
        label: "**Agent**:",
        terminators: &["**User**:"],
    },
    SpeakerPattern {
        label: "**Assistant**:",
        terminators: &["**User**:"],
    },
    SpeakerPattern {
        label: "**Human**:",
        terminators: &["**Assistant**:"],
    },
];

static SPEAKER_RES: OnceLock<Vec<Regex>> = OnceLock::new();
static WHITESPACE_RES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

/// Strip prior agent texts and speaker-labelled runs from `candidate`.
///
/// Returns `candidate` untouched when there is nothing to compare against.
pub fn clean<S: AsRef<str>>(candidate: &str, prior_texts: &[S]) -> String {
    let priors: Vec<&str> = prior_texts
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.trim().is_empty())
        .collect();
    if priors.is_empty() || candidate.trim().is_empty() {
        return candidate.to_string();
    }

    let mut text = candidate.to_string();
    for prior in priors {
        text = remove_occurrences(&text, prior);
    }

    // The terminator is captured and put back so the next label's run can start there.
    for re in speaker_res() {
        text = re.replace_all(&text, "${1}").into_owned();
    }
    for (re, replacement) in whitespace_res() {
        text = re.replace_all(&text, *replacement).into_owned();
    }

    text.trim().to_string()
}

fn speaker_res() -> &'static [Regex] {
    SPEAKER_RES.get_or_init(|| {
        SPEAKER_PATTERNS
            .iter()
            .filter_map(|pattern| {
                let terminators: Vec<String> =
                    pattern.terminators.iter().map(|t| regex::escape(t)).collect();
                let source = format!(
                    r"(?im){}\s*.+?({}|$)",
                    regex::escape(pattern.label),
                    terminators.join("|")
                );
                compile(&source)
            })
            .collect()
    })
}

fn whitespace_res() -> &'static [(Regex, &'static str)] {
    WHITESPACE_RES.get_or_init(|| {
        [(r"\s{2,}", " "), (r"\n{2,}", "\n")]
            .into_iter()
            .filter_map(|(source, replacement)| compile(source).map(|re| (re, replacement)))
            .collect()
    })
}

fn compile(source: &str) -> Option<Regex> {
    match Regex::new(source) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(pattern = source, error = %e, "invalid cleanup pattern");
            None
        }
    }
}

/// Remove every case-insensitive occurrence of `needle`, scanning left to right.
fn remove_occurrences(text: &str, needle: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut cursor = 0;

    while cursor < text.len() {
        if let Some(len) = caseless_prefix_len(&text[cursor..], needle) {
            out.push_str(&text[copied..cursor]);
            cursor += len;
            copied = cursor;
            continue;
        }
        cursor += text[cursor..].chars().next().map_or(1, char::len_utf8);
    }

    out.push_str(&text[copied..]);
    out
}

/// Byte length of the prefix of `haystack` equal to `needle` ignoring case.
fn caseless_prefix_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut chars = haystack.char_indices();
    for expected in needle.chars() {
        let (_, actual) = chars.next()?;
        if actual != expected && !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.next().map_or(haystack.len(), |(index, _)| index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NONE: &[&str] = &[];

    #[test]
    fn no_priors_returns_candidate_unchanged() {
        let text = "  User: keeps   everything\n\n";
        assert_eq!(clean(text, NONE), text);
        assert_eq!(clean(text, &["   "]), text);
    }

    #[test]
    fn prior_text_removed_case_insensitively() {
        let cleaned = clean("Hello WORLD and more", &["hello world"]);
        assert_eq!(cleaned, "and more");
        assert!(!cleaned.to_lowercase().contains("hello world"));
    }

    #[test]
    fn identical_reply_cleans_to_empty() {
        assert_eq!(clean("ECHO MESSAGE: hi", &["echo message: HI"]), "");
    }

    #[test]
    fn prior_text_is_matched_literally() {
        assert_eq!(clean("cost (approx.) $5 total", &["(approx.) $5"]), "cost total");
    }

    #[test]
    fn speaker_runs_end_at_the_next_label() {
        let cleaned = clean(
            "Intro. User: what is up? Agent: not much",
            &["unrelated"],
        );
        // The user run ends at "Agent:", whose own run then reaches end of text.
        assert_eq!(cleaned, "Intro.");
    }

    #[test]
    fn speaker_runs_stop_at_line_end() {
        let cleaned = clean("user: first line\nNew content here", &["unrelated"]);
        assert_eq!(cleaned, "New content here");
    }

    #[test]
    fn emphasized_labels_are_stripped() {
        let cleaned = clean(
            "**User**: hi **Agent**: hello\nFresh answer",
            &["unrelated"],
        );
        assert_eq!(cleaned, "Fresh answer");
    }

    #[test]
    fn trailing_label_without_content_is_kept() {
        assert_eq!(clean("Summary\nUser:", &["unrelated"]), "Summary\nUser:");
    }

    #[test]
    fn label_content_may_start_on_the_next_line() {
        assert_eq!(clean("Summary\nUser:\nDone", &["unrelated"]), "Summary");
    }

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        assert_eq!(
            clean("  a   b \n\n\n c  ", &["unrelated"]),
            "a b c"
        );
    }

    #[test]
    fn assistant_label_is_stripped() {
        assert_eq!(clean("Assistant: echoed\nNew text", &["unrelated"]), "New text");
    }

    #[test]
    fn human_label_runs_to_line_end() {
        let cleaned = clean(
            "Human: earlier question Assistant: earlier answer\nLatest",
            &["unrelated"],
        );
        assert_eq!(cleaned, "Latest");
    }

    #[test]
    fn emphasized_human_label_is_stripped() {
        let cleaned = clean("**Human**: hi **Assistant**: hello\nReply", &["unrelated"]);
        assert_eq!(cleaned, "Reply");
    }

    #[test]
    fn chained_labels_are_all_removed() {
        let cleaned = clean(
            "User: one Assistant: two User: three Agent: four\nKept",
            &["unrelated"],
        );
        assert_eq!(cleaned, "Kept");
    }

    #[test]
    fn label_followed_by_blank_content_uses_the_next_line() {
        assert_eq!(clean("Top\nAgent:   \nnext line\nTail", &["x"]), "Top Tail");
    }

    #[test]
    fn large_non_ascii_prior_is_removed() {
        let prior = "Ünïcode café résumé ".repeat(30_000);
        let candidate = format!("Fresh start. {} the end", prior.to_uppercase());

        assert_eq!(clean(&candidate, &[prior.as_str()]), "Fresh start. the end");
    }

    #[test]
    fn caseless_match_follows_char_boundaries() {
        assert_eq!(caseless_prefix_len("ÉCOLE today", "école"), Some("ÉCOLE".len()));
        assert_eq!(caseless_prefix_len("ecole", "école"), None);
        assert_eq!(caseless_prefix_len("éc", "école"), None);
    }

    #[test]
    fn non_ascii_text_is_handled() {
        assert_eq!(clean("Ünïcode Agent: ré", &["x"]), "Ünïcode");
    }
}
