//! Post-processing of rendered snapshots.

use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{#.*?#\}").expect("comment pattern is valid"));

static TRAILING_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[ \t]+$").expect("trailing whitespace pattern is valid"));

static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank run pattern is valid"));

/// Cleans rendered output for a snapshot.
///
/// In order:
///
/// 1. `{# ... #}` comment spans are removed, including multi-line ones.
/// 2. Trailing spaces and tabs are stripped from every line.
/// 3. Runs of three or more newlines collapse to two, leaving one blank line.
///
/// Stripping whitespace before collapsing means lines that held only
/// indentation count as blank. The collapse-then-strip order would leave
/// runs split by indentation-only lines uncollapsed.
pub fn clean_output(rendered: &str) -> String {
    let without_comments = COMMENT.replace_all(rendered, "");
    let trimmed = TRAILING_WHITESPACE.replace_all(&without_comments, "");
    BLANK_RUN.replace_all(&trimmed, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_comments() {
        assert_eq!(clean_output("a{# note #}b"), "ab");
        assert_eq!(clean_output("a{# multi\nline\n#}b"), "ab");
    }

    #[test]
    fn test_comment_only_is_empty() {
        assert_eq!(clean_output("{# just a comment #}"), "");
    }

    #[test]
    fn test_collapses_blank_lines() {
        assert_eq!(clean_output("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean_output("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_whitespace_only_lines_count_as_blank() {
        assert_eq!(
            clean_output("<div>\n    \n  \t\n\n  <p></p>\n</div>"),
            "<div>\n\n  <p></p>\n</div>"
        );
    }

    #[test]
    fn test_strips_trailing_whitespace() {
        assert_eq!(clean_output("a  \nb\t\n c "), "a\nb\n c");
    }

    #[test]
    fn test_idempotent() {
        let once = clean_output("x {# c #} \n\n\n\ny  ");
        assert_eq!(clean_output(&once), once);
    }
}
