use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use celldiff_tui::blocks::{block_count, delete_block, group_by_block};
use celldiff_tui::diff::{diff_for_side, RenderKind, RenderLine, Side, Span, SpanKind};
use celldiff_tui::events::AppEvent;
use celldiff_tui::watcher::InputWatcher;

fn side_text(lines: &[RenderLine]) -> Vec<String> {
    lines.iter().map(|line| line.text()).collect()
}

fn own_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

const CELLS_LEFT: &str = "(* Input 1 *)\nf[x_] := x^2\nPlot[f[x], {x, 0, 1}]\n\n(* Input 2 *)\ng[x_] := Sin[x]\n\n(* Input 3 *)\nIntegrate[g[x], x]";
const CELLS_RIGHT: &str = "(* Input 1 *)\nf[x_] := x^3\nPlot[f[x], {x, 0, 1}]\n\n(* Input 2 *)\ng[x_] := Cos[x]\nh[x_] := Tan[x]\n\n(* Input 3 *)\nIntegrate[g[x], x]";

#[test]
fn test_identity_diff_is_all_unchanged() {
    for text in [CELLS_LEFT, "no headers\nat all", "", "(* Input 1 *)"] {
        for side in [Side::Left, Side::Right] {
            let lines = diff_for_side(text, text, side);
            assert!(lines.iter().all(|line| line.kind == RenderKind::Unchanged));
            assert_eq!(side_text(&lines), own_lines(text));
        }
    }
}

#[test]
fn test_reconstruction_property() {
    let pairs = [
        (CELLS_LEFT, CELLS_RIGHT),
        (CELLS_RIGHT, CELLS_LEFT),
        (CELLS_LEFT, ""),
        ("", CELLS_RIGHT),
        ("a\nb\nc\nd", "a\nx"),
        ("a\nx", "a\nb\nc\nd"),
        ("shared\nonly left", "shared\nonly right\nand more"),
    ];

    for (left, right) in pairs {
        let left_lines = diff_for_side(left, right, Side::Left);
        assert_eq!(
            side_text(&left_lines),
            own_lines(left),
            "left reconstruction failed for {:?} vs {:?}",
            left,
            right
        );

        let right_lines = diff_for_side(left, right, Side::Right);
        assert_eq!(
            side_text(&right_lines),
            own_lines(right),
            "right reconstruction failed for {:?} vs {:?}",
            left,
            right
        );
    }
}

#[test]
fn test_block_ids_contiguous_from_zero() {
    for text in [CELLS_LEFT, CELLS_RIGHT, "lead\n(* Input 1 *)\nx", "", "plain"] {
        let lines = diff_for_side(text, text, Side::Left);
        let blocks: Vec<usize> = lines.iter().filter_map(|line| line.block).collect();

        // Defined ids form contiguous runs, starting at 0, increasing by
        // at most one per step.
        let mut expected_next = 0;
        for window in blocks.windows(2) {
            assert!(window[1] == window[0] || window[1] == window[0] + 1);
        }
        if let Some(&first) = blocks.first() {
            assert_eq!(first, 0);
        }
        for &block in &blocks {
            if block == expected_next {
                expected_next += 1;
            }
        }
        assert_eq!(expected_next, block_count(text));

        // Exactly one header per block
        for id in 0..block_count(text) {
            let headers = lines
                .iter()
                .filter(|line| line.block == Some(id) && line.is_block_header)
                .count();
            assert_eq!(headers, 1);
        }
    }
}

#[test]
fn test_group_boundaries_coincide_with_blocks() {
    let lines = diff_for_side(CELLS_LEFT, CELLS_RIGHT, Side::Right);
    let groups = group_by_block(&lines);

    // Groups tile the line list in order without gaps
    let mut cursor = 0;
    for group in &groups {
        assert_eq!(group.start, cursor);
        cursor = group.end;
    }
    assert_eq!(cursor, lines.len());

    // Within a group every line shares the group's block id; adjacent
    // groups never share a defined id.
    for group in &groups {
        for line in &lines[group.start..group.end] {
            assert_eq!(line.block, group.block);
        }
    }
    for window in groups.windows(2) {
        if window[0].block.is_some() {
            assert_ne!(window[0].block, window[1].block);
        }
    }
}

#[test]
fn test_delete_out_of_range_is_noop() {
    assert_eq!(delete_block(CELLS_LEFT, block_count(CELLS_LEFT)), CELLS_LEFT);
    assert_eq!(delete_block(CELLS_LEFT, usize::MAX), CELLS_LEFT);
    assert_eq!(delete_block("", 0), "");
}

#[test]
fn test_delete_to_empty_always_terminates() {
    for text in [CELLS_LEFT, CELLS_RIGHT, "(* Input 1 *)\nonly"] {
        let mut raw = text.to_string();
        let mut steps = 0;
        while block_count(&raw) > 0 {
            raw = delete_block(&raw, 0);
            steps += 1;
            assert!(steps <= 16, "deletion did not converge for {:?}", text);
        }
        assert_eq!(raw, "");
    }
}

#[test]
fn test_delete_renumbering_example() {
    assert_eq!(
        delete_block("(* Input 1 *)\nx=1\n\n(* Input 2 *)\ny=2", 0),
        "(* Input 1 *)\ny=2"
    );
}

#[test]
fn test_modified_line_example() {
    let left_lines = diff_for_side("a\nb\nc", "a\nx\nc", Side::Left);
    assert_eq!(left_lines[1].kind, RenderKind::Modified);
    assert_eq!(left_lines[1].spans, vec![Span::deleted("b")]);

    let right_lines = diff_for_side("a\nb\nc", "a\nx\nc", Side::Right);
    assert_eq!(right_lines[1].kind, RenderKind::Modified);
    assert_eq!(right_lines[1].spans, vec![Span::inserted("x")]);
}

#[test]
fn test_leftover_line_example() {
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

    let right_lines = diff_for_side("a\nb\nc\nd", "a\nx", Side::Right);
    assert_eq!(right_lines.len(), 2);
    assert!(right_lines.iter().all(|l| l.kind != RenderKind::Added));
}

#[test]
fn test_modified_lines_filter_other_sides_spans() {
    for (left, right) in [(CELLS_LEFT, CELLS_RIGHT), (CELLS_RIGHT, CELLS_LEFT)] {
        let left_lines = diff_for_side(left, right, Side::Left);
        assert!(left_lines
            .iter()
            .flat_map(|line| &line.spans)
            .all(|span| span.kind != SpanKind::Inserted));

        let right_lines = diff_for_side(left, right, Side::Right);
        assert!(right_lines
            .iter()
            .flat_map(|line| &line.spans)
            .all(|span| span.kind != SpanKind::Deleted));
    }
}

#[test]
fn test_spans_never_empty() {
    let pairs = [("", "x"), ("a\n\nb", "a\n\nc"), (CELLS_LEFT, CELLS_RIGHT)];
    for (left, right) in pairs {
        for side in [Side::Left, Side::Right] {
            for line in diff_for_side(left, right, side) {
                assert!(!line.spans.is_empty());
            }
        }
    }
}

#[test]
fn test_deleted_cell_reenters_pipeline() {
    // Deleting cell 1 on the right realigns it against the untouched left
    let left = CELLS_LEFT;
    let right = delete_block(CELLS_RIGHT, 1);
    assert_eq!(block_count(&right), 2);

    let right_lines = diff_for_side(left, &right, Side::Right);
    assert_eq!(side_text(&right_lines), own_lines(&right));

    // The surviving cells carry contiguous ids again
    let blocks: Vec<usize> = right_lines.iter().filter_map(|line| line.block).collect();
    assert!(blocks.iter().all(|&b| b < 2));
}

#[test]
fn test_watcher_reports_rewritten_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let left = temp_dir.path().join("left.txt");
    let right = temp_dir.path().join("right.txt");
    fs::write(&left, "(* Input 1 *)\na").expect("Failed to write left input");
    fs::write(&right, "(* Input 1 *)\nb").expect("Failed to write right input");

    let watcher = InputWatcher::new(&left, &right, 0).expect("Failed to create watcher");

    // Let the file system settle before rewriting
    std::thread::sleep(Duration::from_millis(200));
    fs::write(&right, "(* Input 1 *)\nchanged").expect("Failed to rewrite right input");

    let mut found = false;
    for _ in 0..10 {
        match watcher.recv_timeout(Duration::from_millis(500)) {
            Ok(AppEvent::InputReloaded { side, text }) => {
                if side == Side::Right && text.contains("changed") {
                    found = true;
                    break;
                }
            }
            Ok(_) => continue,
            Err(_) => break,
        }
    }

    assert!(found, "Did not receive reload event for rewritten input");
}
