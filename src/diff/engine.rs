use similar::{Algorithm, ChangeTag, TextDiff};

/// A maximal run of consecutive lines sharing one edit-script classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffGroup {
    /// Lines present on both sides.
    Equal(Vec<String>),
    /// Lines present only on the left side.
    Removed(Vec<String>),
    /// Lines present only on the right side.
    Added(Vec<String>),
}

/// Ordered line-level edit script between two texts.
///
/// Replaying the `Equal` and `Removed` groups reproduces the left text's
/// lines in order; `Equal` and `Added` reproduce the right's.
#[derive(Debug, Clone, Default)]
pub struct EditScript {
    pub groups: Vec<DiffGroup>,
}

impl EditScript {
    /// Compute the edit script between two texts.
    ///
    /// Trailing newlines are insignificant: `"a\nb"` and `"a\nb\n"` yield
    /// identical scripts. Myers keeps the output deterministic for
    /// identical inputs.
    pub fn compute(left: &str, right: &str) -> Self {
        let left = ensure_trailing_newline(left);
        let right = ensure_trailing_newline(right);

        let diff = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .diff_lines(&left, &right);

        let mut groups: Vec<DiffGroup> = Vec::new();
        for change in diff.iter_all_changes() {
            let value = change.value();
            let line = value.strip_suffix('\n').unwrap_or(value).to_string();

            match (change.tag(), groups.last_mut()) {
                (ChangeTag::Equal, Some(DiffGroup::Equal(lines))) => lines.push(line),
                (ChangeTag::Equal, _) => groups.push(DiffGroup::Equal(vec![line])),
                (ChangeTag::Delete, Some(DiffGroup::Removed(lines))) => lines.push(line),
                (ChangeTag::Delete, _) => groups.push(DiffGroup::Removed(vec![line])),
                (ChangeTag::Insert, Some(DiffGroup::Added(lines))) => lines.push(line),
                (ChangeTag::Insert, _) => groups.push(DiffGroup::Added(vec![line])),
            }
        }

        Self { groups }
    }

    /// Summarize the script into line counts.
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();

        for (idx, group) in self.groups.iter().enumerate() {
            match group {
                DiffGroup::Equal(_) => {}
                DiffGroup::Removed(removed) => {
                    stats.lines_removed += removed.len();
                    // A removed run directly followed by an added run is a
                    // line-by-line rewrite for the length of the shorter run.
                    if let Some(DiffGroup::Added(added)) = self.groups.get(idx + 1) {
                        stats.lines_modified += removed.len().min(added.len());
                    }
                }
                DiffGroup::Added(added) => stats.lines_added += added.len(),
            }
        }

        stats
    }
}

/// Statistics about an edit script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiffStats {
    pub lines_added: usize,
    pub lines_removed: usize,
    pub lines_modified: usize,
}

impl DiffStats {
    pub fn total_changes(&self) -> usize {
        self.lines_added + self.lines_removed
    }

    pub fn net_change(&self) -> isize {
        self.lines_added as isize - self.lines_removed as isize
    }
}

/// Normalize a text so similar's line tokenizer treats the final line like
/// every other line. Empty input stays empty (zero lines, not one).
fn ensure_trailing_newline(content: &str) -> String {
    if content.is_empty() || content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{}\n", content)
    }
}
