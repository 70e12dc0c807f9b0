use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::diff::{get_diff_stats, DiffStats, Side};

/// One side's input document as last loaded from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDocument {
    pub path: PathBuf,
    pub text: String,
}

impl InputDocument {
    pub fn new(path: PathBuf, text: String) -> Self {
        Self { path, text }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Events flowing from the watcher and run loop into the app.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// An input file changed on disk and was re-read.
    InputReloaded { side: Side, text: String },
    Tick,
    Quit,
}

/// Application state for the viewer: the two raw texts plus the bits of UI
/// state that survive a rebuild.
#[derive(Debug, Clone)]
pub struct AppState {
    pub left: InputDocument,
    pub right: InputDocument,
    /// Side whose cells respond to selection and deletion.
    pub focused: Side,
    /// Selected cell on the focused side, if any.
    pub selected_block: Option<usize>,
    pub show_help: bool,
}

impl AppState {
    pub fn new(left: InputDocument, right: InputDocument) -> Self {
        Self {
            left,
            right,
            focused: Side::Left,
            selected_block: None,
            show_help: false,
        }
    }

    pub fn document(&self, side: Side) -> &InputDocument {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn text(&self, side: Side) -> &str {
        &self.document(side).text
    }

    /// Replace one side's raw text. Everything derived from it is rebuilt
    /// by the caller; cell selection is cleared since indices may no longer
    /// exist.
    pub fn set_text(&mut self, side: Side, text: String) {
        match side {
            Side::Left => self.left.text = text,
            Side::Right => self.right.text = text,
        }
        self.selected_block = None;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn focus_other_side(&mut self) {
        self.focused = self.focused.other();
        self.selected_block = None;
    }

    pub fn stats(&self) -> DiffStats {
        get_diff_stats(&self.left.text, &self.right.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(
            InputDocument::new(PathBuf::from("left.txt"), "a\nb".to_string()),
            InputDocument::new(PathBuf::from("right.txt"), "a\nc".to_string()),
        )
    }

    #[test]
    fn test_set_text_clears_selection() {
        let mut state = state();
        state.selected_block = Some(1);
        state.set_text(Side::Right, "a\nd".to_string());
        assert_eq!(state.text(Side::Right), "a\nd");
        assert_eq!(state.selected_block, None);
    }

    #[test]
    fn test_focus_switch() {
        let mut state = state();
        state.selected_block = Some(0);
        state.focus_other_side();
        assert_eq!(state.focused, Side::Right);
        assert_eq!(state.selected_block, None);
    }

    #[test]
    fn test_stats() {
        let stats = state().stats();
        assert_eq!(stats.lines_modified, 1);
    }
}
