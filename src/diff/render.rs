use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::engine::{DiffGroup, EditScript};
use super::refine::refine_pair;
use crate::blocks::BlockMap;

/// Which input a rendering is produced for.
///
/// Left is the base text, right the comparison text; each side numbers its
/// own lines independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Span kinds that survive this side's filter: the left view never
    /// shows inserted text, the right never shows deleted text.
    pub fn keeps(self, kind: SpanKind) -> bool {
        match kind {
            SpanKind::Normal => true,
            SpanKind::Inserted => self == Side::Right,
            SpanKind::Deleted => self == Side::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// The change kind of one span within a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    Normal,
    Inserted,
    Deleted,
}

/// A contiguous run of characters within one rendered line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub kind: SpanKind,
}

impl Span {
    pub fn normal(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: SpanKind::Normal }
    }

    pub fn inserted(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: SpanKind::Inserted }
    }

    pub fn deleted(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: SpanKind::Deleted }
    }
}

/// The overall change kind of one rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderKind {
    Unchanged,
    Added,
    Removed,
    Modified,
}

/// One line of the per-side rendering model.
///
/// Corresponds to exactly one line of the requested side's raw text; the
/// span list is never empty (an empty line renders as one empty normal
/// span). `block` is the 0-based cell the line belongs to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderLine {
    pub kind: RenderKind,
    pub spans: Vec<Span>,
    pub block: Option<usize>,
    pub is_block_header: bool,
}

impl RenderLine {
    fn new(kind: RenderKind, spans: Vec<Span>) -> Self {
        Self { kind, spans, block: None, is_block_header: false }
    }

    pub fn unchanged(text: &str) -> Self {
        Self::new(RenderKind::Unchanged, vec![Span::normal(text)])
    }

    pub fn removed(text: &str) -> Self {
        Self::new(RenderKind::Removed, vec![Span::deleted(text)])
    }

    pub fn added(text: &str) -> Self {
        Self::new(RenderKind::Added, vec![Span::inserted(text)])
    }

    pub fn modified(spans: Vec<Span>) -> Self {
        Self::new(RenderKind::Modified, spans)
    }

    /// The line's text as seen from its own side.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// Build the ordered rendering model for one side.
///
/// Walks the edit script once, threading the requested side's own line
/// counter through every emitted line so cell membership can be attached
/// at the position the line occupies in that side's raw text. The output,
/// mapped back to span text, reproduces the side's raw lines exactly.
pub fn diff_for_side(left: &str, right: &str, side: Side) -> Vec<RenderLine> {
    let script = EditScript::compute(left, right);
    let raw = match side {
        Side::Left => left,
        Side::Right => right,
    };
    let blocks = BlockMap::segment(raw);

    let mut lines = Vec::new();
    let mut own_line = 0usize;

    let mut idx = 0;
    while idx < script.groups.len() {
        match &script.groups[idx] {
            DiffGroup::Equal(equal) => {
                for text in equal {
                    push_line(&mut lines, &mut own_line, &blocks, RenderLine::unchanged(text));
                }
                idx += 1;
            }
            DiffGroup::Removed(removed) => {
                if let Some(DiffGroup::Added(added)) = script.groups.get(idx + 1) {
                    // A removed run directly followed by an added run is
                    // treated as a line-by-line rewrite.
                    for line in refine_pair(removed, added, side) {
                        push_line(&mut lines, &mut own_line, &blocks, line);
                    }
                    idx += 2;
                } else {
                    if side == Side::Left {
                        for text in removed {
                            push_line(&mut lines, &mut own_line, &blocks, RenderLine::removed(text));
                        }
                    }
                    idx += 1;
                }
            }
            DiffGroup::Added(added) => {
                if side == Side::Right {
                    for text in added {
                        push_line(&mut lines, &mut own_line, &blocks, RenderLine::added(text));
                    }
                }
                idx += 1;
            }
        }
    }

    lines
}

/// Attach cell membership at the line's own position, then advance the
/// counter. Every line reaching here exists in the requested side's text,
/// so the counter advances exactly once per emitted line.
fn push_line(
    lines: &mut Vec<RenderLine>,
    own_line: &mut usize,
    blocks: &BlockMap,
    mut line: RenderLine,
) {
    if let Some(cell) = blocks.get(*own_line) {
        line.block = Some(cell.block);
        line.is_block_header = cell.is_header;
    }
    *own_line += 1;
    lines.push(line);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side_text(lines: &[RenderLine]) -> Vec<String> {
        lines.iter().map(|line| line.text()).collect()
    }

    #[test]
    fn test_identity_renders_unchanged() {
        let text = "a\nb\nc";
        for side in [Side::Left, Side::Right] {
            let lines = diff_for_side(text, text, side);
            assert_eq!(lines.len(), 3);
            assert!(lines.iter().all(|line| line.kind == RenderKind::Unchanged));
            assert_eq!(side_text(&lines), vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn test_modified_line_spans() {
        let lines = diff_for_side("a\nb\nc", "a\nx\nc", Side::Left);
        assert_eq!(lines[1].kind, RenderKind::Modified);
        assert_eq!(lines[1].spans, vec![Span::deleted("b")]);

        let lines = diff_for_side("a\nb\nc", "a\nx\nc", Side::Right);
        assert_eq!(lines[1].kind, RenderKind::Modified);
        assert_eq!(lines[1].spans, vec![Span::inserted("x")]);
    }

    #[test]
    fn test_leftover_lines_invisible_on_other_side() {
        let left_lines = diff_for_side("a\nb\nc\nd", "a\nx", Side::Left);
        assert_eq!(
            left_lines.iter().map(|l| l.kind).collect::<Vec<_>>(),
            vec![
                RenderKind::Unchanged,
                RenderKind::Modified,
                RenderKind::Removed,
                RenderKind::Removed,
            ]
        );
        assert_eq!(side_text(&left_lines), vec!["a", "b", "c", "d"]);

        let right_lines = diff_for_side("a\nb\nc\nd", "a\nx", Side::Right);
        assert_eq!(right_lines.len(), 2);
        assert_eq!(right_lines[1].kind, RenderKind::Modified);
        assert_eq!(side_text(&right_lines), vec!["a", "x"]);
    }

    #[test]
    fn test_removed_only_group() {
        let left_lines = diff_for_side("a\nb\nc", "a\nc", Side::Left);
        assert_eq!(left_lines[1].kind, RenderKind::Removed);
        assert_eq!(side_text(&left_lines), vec!["a", "b", "c"]);

        let right_lines = diff_for_side("a\nb\nc", "a\nc", Side::Right);
        assert_eq!(side_text(&right_lines), vec!["a", "c"]);
        assert!(right_lines.iter().all(|l| l.kind == RenderKind::Unchanged));
    }

    #[test]
    fn test_block_membership_attached() {
        let left = "(* Input 1 *)\nx = 1\n\n(* Input 2 *)\ny = 2";
        let right = "(* Input 1 *)\nx = 1\n\n(* Input 2 *)\ny = 3";
        let lines = diff_for_side(left, right, Side::Right);

        assert_eq!(lines.len(), 5);
        assert!(lines[0].is_block_header);
        assert_eq!(lines[0].block, Some(0));
        assert_eq!(lines[1].block, Some(0));
        assert_eq!(lines[2].block, Some(0));
        assert!(lines[3].is_block_header);
        assert_eq!(lines[3].block, Some(1));
        assert_eq!(lines[4].block, Some(1));
        assert_eq!(lines[4].kind, RenderKind::Modified);
    }

    #[test]
    fn test_counter_skips_other_sides_lines() {
        // The right side gains a line inside cell 2; the left rendering
        // must keep its own cell numbering unaffected by it.
        let left = "(* Input 1 *)\na\n\n(* Input 2 *)\nb";
        let right = "(* Input 1 *)\na\n\n(* Input 2 *)\nb\nc";
        let lines = diff_for_side(left, right, Side::Left);

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4].block, Some(1));
        assert_eq!(lines[4].kind, RenderKind::Unchanged);
    }
}
