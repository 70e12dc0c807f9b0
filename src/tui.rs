use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame, Terminal,
};

use crate::blocks::{block_count, delete_block, group_by_block, BlockGroup};
use crate::cache::DiffCache;
use crate::config::CellDiffConfig;
use crate::diff::{DiffStats, RenderKind, RenderLine, Side, SpanKind};
use crate::events::{AppEvent, AppState};
use crate::export::{format_stats, DiffReporter};
use crate::watcher::InputWatcher;

pub struct TuiApp {
    pub state: AppState,
    watcher: Option<InputWatcher>,
    cache: DiffCache,
    config: CellDiffConfig,
    left_lines: Vec<RenderLine>,
    right_lines: Vec<RenderLine>,
    /// Cell runs of the focused side, for selection handling.
    focused_groups: Vec<BlockGroup>,
    /// Shared scroll offset; both panes move together.
    scroll: usize,
    stats: DiffStats,
    should_quit: bool,
    status_message: Option<String>,
}

impl TuiApp {
    pub fn new(state: AppState, watcher: Option<InputWatcher>, config: CellDiffConfig) -> Self {
        let cache = DiffCache::new(config.cache.diff_cache_size);
        let mut app = Self {
            state,
            watcher,
            cache,
            config,
            left_lines: Vec::new(),
            right_lines: Vec::new(),
            focused_groups: Vec::new(),
            scroll: 0,
            stats: DiffStats::default(),
            should_quit: false,
            status_message: None,
        };
        app.rebuild();
        app
    }

    /// Recompute both renderings and the focused side's cell groups from
    /// the current raw texts.
    fn rebuild(&mut self) {
        let left = self.state.left.text.clone();
        let right = self.state.right.text.clone();
        self.left_lines = self.cache.get_or_build(&left, &right, Side::Left);
        self.right_lines = self.cache.get_or_build(&left, &right, Side::Right);
        self.focused_groups = group_by_block(self.lines(self.state.focused));
        self.stats = self.state.stats();
    }

    fn lines(&self, side: Side) -> &[RenderLine] {
        match side {
            Side::Left => &self.left_lines,
            Side::Right => &self.right_lines,
        }
    }

    fn max_scroll(&self) -> usize {
        self.left_lines.len().max(self.right_lines.len()).saturating_sub(1)
    }

    pub fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let tick = Duration::from_millis(self.config.ui.tick_rate_ms);

        loop {
            terminal.draw(|f| self.ui(f))?;

            // Handle input reloads from the watcher
            if let Some(watcher) = &self.watcher {
                match watcher.recv_timeout(tick) {
                    Ok(AppEvent::InputReloaded { side, text }) => {
                        self.state.set_text(side, text);
                        self.rebuild();
                        self.status_message = Some(format!("Reloaded {} input", side));
                    }
                    Ok(AppEvent::Quit) => self.should_quit = true,
                    Ok(_) => {}
                    Err(_) => {} // Timeout, continue
                }
            }

            // Handle keyboard input
            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        let page = self.config.ui.scroll_page;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') | KeyCode::F(1) => self.state.toggle_help(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(page);
            }
            KeyCode::PageDown => {
                self.scroll = (self.scroll + page).min(self.max_scroll());
            }
            KeyCode::Home => self.scroll = 0,
            KeyCode::End => self.scroll = self.max_scroll(),
            KeyCode::Tab => {
                self.state.focus_other_side();
                self.focused_groups = group_by_block(self.lines(self.state.focused));
            }
            KeyCode::Char('n') => self.select_next_cell(),
            KeyCode::Char('p') => self.select_prev_cell(),
            KeyCode::Char('d') => self.delete_selected_cell(),
            KeyCode::Char('e') => self.export_report(),
            _ => {}
        }
    }

    fn cell_count(&self) -> usize {
        block_count(self.state.text(self.state.focused))
    }

    fn select_next_cell(&mut self) {
        let count = self.cell_count();
        if count == 0 {
            return;
        }
        let next = match self.state.selected_block {
            Some(cell) => (cell + 1).min(count - 1),
            None => 0,
        };
        self.state.selected_block = Some(next);
        self.scroll_to_cell(next);
    }

    fn select_prev_cell(&mut self) {
        let count = self.cell_count();
        if count == 0 {
            return;
        }
        let prev = match self.state.selected_block {
            Some(cell) => cell.saturating_sub(1),
            None => 0,
        };
        self.state.selected_block = Some(prev);
        self.scroll_to_cell(prev);
    }

    fn scroll_to_cell(&mut self, cell: usize) {
        if let Some(group) = self
            .focused_groups
            .iter()
            .find(|group| group.block == Some(cell))
        {
            self.scroll = group.start.min(self.max_scroll());
        }
    }

    fn delete_selected_cell(&mut self) {
        let Some(cell) = self.state.selected_block else {
            self.status_message = Some("No cell selected (use n/p)".to_string());
            return;
        };

        let side = self.state.focused;
        let new_text = delete_block(self.state.text(side), cell);
        tracing::info!("Deleted cell {} from {} input", cell + 1, side);
        self.state.set_text(side, new_text);
        self.rebuild();
        self.scroll = self.scroll.min(self.max_scroll());
        self.status_message = Some(format!("Deleted cell {} ({} side)", cell + 1, side));
    }

    fn export_report(&mut self) {
        let left_lines = self.left_lines.clone();
        let right_lines = self.right_lines.clone();
        let output = std::path::PathBuf::from("celldiff-report.txt");

        let result = DiffReporter::default().export_report(
            &self.state.left,
            &self.state.right,
            &left_lines,
            &right_lines,
            self.stats,
            &output,
        );

        self.status_message = Some(match result {
            Ok(()) => format!("Report written to {}", output.display()),
            Err(err) => format!("Export failed: {}", err),
        });
    }

    fn ui(&mut self, f: &mut Frame) {
        if self.state.show_help {
            self.render_help(f);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(5),    // Panes
                Constraint::Length(4), // Status bar
            ])
            .split(f.area());

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);

        // Keep the shared scroll in bounds before rendering
        self.scroll = self.scroll.min(self.max_scroll());

        self.render_pane(f, panes[0], Side::Left);
        self.render_pane(f, panes[1], Side::Right);
        self.render_status(f, chunks[1]);
    }

    fn render_pane(&self, f: &mut Frame, area: Rect, side: Side) {
        let lines = self.lines(side);
        let focused = self.state.focused == side;
        let visible_height = (area.height as usize).saturating_sub(2);

        let mut rendered: Vec<Line> = Vec::new();
        if lines.is_empty() {
            rendered.push(Line::from(Span::styled(
                "(no content)",
                Style::default().fg(Color::Gray),
            )));
        } else {
            let start = self.scroll.min(lines.len().saturating_sub(1));
            let end = (start + visible_height).min(lines.len());
            for line in &lines[start..end] {
                rendered.push(self.render_line(line, focused));
            }
        }

        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Rgb(80, 80, 80))
        };

        let title = format!(
            " {} {} ({} cells) ",
            if focused { "▶" } else { " " },
            self.state.document(side).file_name(),
            block_count(self.state.text(side)),
        );

        let paragraph = Paragraph::new(rendered).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title)
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );

        f.render_widget(paragraph, area);

        // Render scrollbar
        if lines.len() > visible_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));
            let mut scrollbar_state =
                ScrollbarState::new(lines.len()).position(self.scroll.min(lines.len() - 1));
            f.render_stateful_widget(
                scrollbar,
                area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 1,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn render_line<'a>(&self, line: &'a RenderLine, focused_pane: bool) -> Line<'a> {
        let selected = focused_pane
            && line.block.is_some()
            && line.block == self.state.selected_block;

        let mut spans: Vec<Span> = Vec::new();

        // Selection gutter
        if selected {
            spans.push(Span::styled("▌", Style::default().fg(Color::Yellow)));
        } else {
            spans.push(Span::raw(" "));
        }

        let (marker, marker_style) = match line.kind {
            RenderKind::Unchanged => (" ", Style::default().fg(Color::Rgb(100, 100, 100))),
            RenderKind::Removed => (
                "-",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            RenderKind::Added => (
                "+",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            RenderKind::Modified => (
                "~",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        };
        spans.push(Span::styled(marker, marker_style));
        spans.push(Span::raw(" "));

        if line.is_block_header {
            spans.push(Span::styled(
                line.text(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
            return Line::from(spans);
        }

        let base_style = match line.kind {
            RenderKind::Unchanged => Style::default().fg(Color::Rgb(200, 200, 200)),
            RenderKind::Removed => Style::default()
                .fg(Color::Rgb(255, 150, 150))
                .bg(Color::Rgb(25, 0, 0)),
            RenderKind::Added => Style::default()
                .fg(Color::Rgb(150, 255, 150))
                .bg(Color::Rgb(0, 25, 0)),
            RenderKind::Modified => Style::default().fg(Color::Rgb(200, 200, 200)),
        };

        for span in &line.spans {
            let style = match span.kind {
                SpanKind::Normal => base_style,
                SpanKind::Deleted => Style::default()
                    .fg(Color::Rgb(255, 150, 150))
                    .bg(Color::Rgb(60, 0, 0))
                    .add_modifier(Modifier::BOLD),
                SpanKind::Inserted => Style::default()
                    .fg(Color::Rgb(150, 255, 150))
                    .bg(Color::Rgb(0, 60, 0))
                    .add_modifier(Modifier::BOLD),
            };
            spans.push(Span::styled(span.text.as_str(), style));
        }

        Line::from(spans)
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let selected = match self.state.selected_block {
            Some(cell) => format!("cell {}", cell + 1),
            None => "none".to_string(),
        };

        let status_text = vec![
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Rgb(150, 150, 150))),
                Span::styled(" q ", Style::default().fg(Color::White).bg(Color::Red)),
                Span::styled(" quit ", Style::default().fg(Color::Rgb(150, 150, 150))),
                Span::styled(" h ", Style::default().fg(Color::White).bg(Color::Green)),
                Span::styled(" help ", Style::default().fg(Color::Rgb(150, 150, 150))),
                Span::styled(" Tab ", Style::default().fg(Color::White).bg(Color::Blue)),
                Span::styled(" side ", Style::default().fg(Color::Rgb(150, 150, 150))),
                Span::styled(" n/p ", Style::default().fg(Color::White).bg(Color::Blue)),
                Span::styled(" cell ", Style::default().fg(Color::Rgb(150, 150, 150))),
                Span::styled(" d ", Style::default().fg(Color::White).bg(Color::Magenta)),
                Span::styled(" delete ", Style::default().fg(Color::Rgb(150, 150, 150))),
                Span::styled(" e ", Style::default().fg(Color::White).bg(Color::Magenta)),
                Span::styled(" export", Style::default().fg(Color::Rgb(150, 150, 150))),
            ]),
            Line::from(vec![
                Span::styled(
                    format!("Changes: {}", format_stats(&self.stats)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!(" | focused: {} | selected: {}", self.state.focused, selected),
                    Style::default().fg(Color::Rgb(150, 150, 150)),
                ),
                Span::styled(
                    self.status_message
                        .as_ref()
                        .map(|msg| format!(" | {}", msg))
                        .unwrap_or_default(),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
        ];

        let status = Paragraph::new(status_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Rgb(80, 80, 80)))
                    .title(" Status ")
                    .title_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
            )
            .alignment(Alignment::Left);

        f.render_widget(status, area);
    }

    fn render_help(&self, f: &mut Frame) {
        let popup_area = self.centered_rect(70, 60, f.area());

        let help_text = vec![
            Line::from(vec![Span::styled(
                "celldiff - Notebook Cell Diff Viewer",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from("Keyboard Shortcuts:"),
            Line::from(""),
            Line::from(vec![
                Span::styled("  q, Esc     ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::raw("- Quit the application"),
            ]),
            Line::from(vec![
                Span::styled("  h, F1      ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::raw("- Show/hide this help"),
            ]),
            Line::from(vec![
                Span::styled("  ↑/↓, k/j   ", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
                Span::raw("- Scroll both panes"),
            ]),
            Line::from(vec![
                Span::styled("  PgUp/PgDn  ", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
                Span::raw("- Scroll both panes (fast)"),
            ]),
            Line::from(vec![
                Span::styled("  Home/End   ", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
                Span::raw("- Jump to top/bottom"),
            ]),
            Line::from(vec![
                Span::styled("  Tab        ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::raw("- Switch focused side"),
            ]),
            Line::from(vec![
                Span::styled("  n, p       ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::raw("- Select next/previous cell"),
            ]),
            Line::from(vec![
                Span::styled("  d          ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
                Span::raw("- Delete selected cell (renumbers the rest)"),
            ]),
            Line::from(vec![
                Span::styled("  e          ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
                Span::raw("- Export a plain-text report"),
            ]),
            Line::from(""),
            Line::from("Features:"),
            Line::from(""),
            Line::from("• Character-level highlights on rewritten lines"),
            Line::from("• Cells tracked across the diff for selection"),
            Line::from("• Deletion renumbers remaining cells automatically"),
            Line::from("• Inputs reload when the extractor rewrites them"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .title_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, popup_area);
        f.render_widget(paragraph, popup_area);
    }

    fn centered_rect(&self, percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<(), io::Error> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}
