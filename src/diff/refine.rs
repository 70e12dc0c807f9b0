use similar::{ChangeTag, TextDiff};

use super::render::{RenderLine, Side, Span, SpanKind};

/// Refine a removed run and the added run that directly follows it into
/// rendered lines for one side.
///
/// Lines are paired positionally: the i-th removed line is character-diffed
/// against the i-th added line and rendered as `Modified`. Lines beyond the
/// shorter run are leftovers, rendered whole as `Removed` (left) or `Added`
/// (right); a leftover belonging to the other side produces nothing, since
/// it does not exist in this side's text.
///
/// Pairing is deliberately positional rather than content-aware: an
/// adjacent removed/added pair is assumed to be a line-by-line rewrite,
/// which keeps character diffing off unrelated lines that merely sit next
/// to each other in the edit script.
pub fn refine_pair(removed: &[String], added: &[String], side: Side) -> Vec<RenderLine> {
    let paired = removed.len().min(added.len());
    let mut lines = Vec::new();

    for i in 0..paired {
        lines.push(RenderLine::modified(char_spans(&removed[i], &added[i], side)));
    }

    match side {
        Side::Left => {
            for text in &removed[paired..] {
                lines.push(RenderLine::removed(text));
            }
        }
        Side::Right => {
            for text in &added[paired..] {
                lines.push(RenderLine::added(text));
            }
        }
    }

    lines
}

/// Character-diff one rewritten line, keeping only the spans visible on the
/// requested side and merging consecutive runs of the same kind.
fn char_spans(old: &str, new: &str, side: Side) -> Vec<Span> {
    let diff = TextDiff::from_chars(old, new);

    let mut spans: Vec<Span> = Vec::new();
    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => SpanKind::Normal,
            ChangeTag::Delete => SpanKind::Deleted,
            ChangeTag::Insert => SpanKind::Inserted,
        };
        if !side.keeps(kind) {
            continue;
        }
        match spans.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(change.value()),
            _ => spans.push(Span { text: change.value().to_string(), kind }),
        }
    }

    // A line must always render, even when nothing of it is visible on
    // this side (both lines empty, or the whole line was the other side's
    // text).
    if spans.iter().all(|span| span.text.is_empty()) {
        return vec![Span::normal("")];
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::render::RenderKind;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_char_spans_left_keeps_deletions() {
        let spans = char_spans("const foo = 4", "const bar = 5", Side::Left);
        let text: String = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, "const foo = 4");
        assert!(spans.iter().any(|s| s.kind == SpanKind::Deleted));
        assert!(spans.iter().all(|s| s.kind != SpanKind::Inserted));
    }

    #[test]
    fn test_char_spans_right_keeps_insertions() {
        let spans = char_spans("const foo = 4", "const bar = 5", Side::Right);
        let text: String = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, "const bar = 5");
        assert!(spans.iter().any(|s| s.kind == SpanKind::Inserted));
        assert!(spans.iter().all(|s| s.kind != SpanKind::Deleted));
    }

    #[test]
    fn test_char_spans_merge_consecutive_runs() {
        let spans = char_spans("abc", "xyz", Side::Left);
        assert_eq!(spans, vec![Span::deleted("abc")]);
    }

    #[test]
    fn test_empty_visible_text_collapses_to_normal_span() {
        // The left line is empty, so every span of the char diff belongs
        // to the right; the line still renders as one empty normal span.
        let spans = char_spans("", "added text", Side::Left);
        assert_eq!(spans, vec![Span::normal("")]);

        let spans = char_spans("", "", Side::Right);
        assert_eq!(spans, vec![Span::normal("")]);
    }

    #[test]
    fn test_leftover_removed_lines_on_left() {
        let rendered = refine_pair(&lines(&["b", "c", "d"]), &lines(&["x"]), Side::Left);
        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered[0].kind, RenderKind::Modified);
        assert_eq!(rendered[1].kind, RenderKind::Removed);
        assert_eq!(rendered[2].kind, RenderKind::Removed);
        assert_eq!(rendered[1].spans, vec![Span::deleted("c")]);
    }

    #[test]
    fn test_leftover_removed_lines_invisible_on_right() {
        let rendered = refine_pair(&lines(&["b", "c", "d"]), &lines(&["x"]), Side::Right);
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].kind, RenderKind::Modified);
        assert_eq!(rendered[0].text(), "x");
    }

    #[test]
    fn test_leftover_added_lines_on_right() {
        let rendered = refine_pair(&lines(&["b"]), &lines(&["x", "y"]), Side::Right);
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[1].kind, RenderKind::Added);
        assert_eq!(rendered[1].spans, vec![Span::inserted("y")]);
    }
}
