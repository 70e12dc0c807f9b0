use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use celldiff_tui::{
    cli::{Cli, OutputFormat},
    config::CellDiffConfig,
    diff::{diff_for_side, get_diff_stats, RenderKind, Side},
    events::{AppEvent, AppState, InputDocument},
    export::{format_line, format_stats, DiffPayload, DiffReporter},
    tui::{restore_terminal, setup_terminal, TuiApp},
    watcher::InputWatcher,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    cli.setup_logging();

    tracing::info!(
        "Comparing {} and {}",
        cli.left.display(),
        cli.right.display()
    );

    let state = load_state(&cli)?;

    if let Some(export_path) = cli.export.clone() {
        export_report(&state, &export_path)?;
        return Ok(());
    }

    match cli.output {
        OutputFormat::Tui => run_tui_mode(&cli, state)?,
        OutputFormat::Json => run_json_mode(&cli, state)?,
        OutputFormat::Text => run_text_mode(&cli, state)?,
    }

    Ok(())
}

fn load_state(cli: &Cli) -> Result<AppState> {
    let left_text = std::fs::read_to_string(&cli.left)
        .with_context(|| format!("Failed to read {}", cli.left.display()))?;
    let right_text = std::fs::read_to_string(&cli.right)
        .with_context(|| format!("Failed to read {}", cli.right.display()))?;

    Ok(AppState::new(
        InputDocument::new(cli.left.clone(), left_text),
        InputDocument::new(cli.right.clone(), right_text),
    ))
}

fn export_report(state: &AppState, output_path: &Path) -> Result<()> {
    let left_lines = diff_for_side(&state.left.text, &state.right.text, Side::Left);
    let right_lines = diff_for_side(&state.left.text, &state.right.text, Side::Right);
    let stats = get_diff_stats(&state.left.text, &state.right.text);

    DiffReporter::default().export_report(
        &state.left,
        &state.right,
        &left_lines,
        &right_lines,
        stats,
        output_path,
    )?;

    println!("Report written to {}", output_path.display());
    Ok(())
}

fn run_tui_mode(cli: &Cli, state: AppState) -> Result<()> {
    let config = CellDiffConfig::default();

    // The TUI always watches so the extractor can rewrite inputs under it
    let watcher = InputWatcher::new(&cli.left, &cli.right, config.watcher.event_debounce_ms)?;

    let mut terminal = setup_terminal()?;
    let app = TuiApp::new(state, Some(watcher), config);
    let res = app.run(&mut terminal);

    if let Err(err) = restore_terminal(&mut terminal) {
        eprintln!("Failed to restore terminal: {}", err);
    }

    if let Err(err) = res {
        eprintln!("Application error: {}", err);
        std::process::exit(1);
    }

    Ok(())
}

fn run_json_mode(cli: &Cli, mut state: AppState) -> Result<()> {
    print_json(&state)?;

    if cli.watch {
        watch_loop(cli, &mut state, |state, _| print_json(state))?;
    }

    Ok(())
}

fn run_text_mode(cli: &Cli, mut state: AppState) -> Result<()> {
    print_text(&state, cli);

    if cli.watch {
        watch_loop(cli, &mut state, |state, cli| {
            print_text(state, cli);
            Ok(())
        })?;
    }

    Ok(())
}

/// Re-render whenever an input is rewritten on disk, until Ctrl+C.
fn watch_loop(
    cli: &Cli,
    state: &mut AppState,
    render: impl Fn(&AppState, &Cli) -> Result<()>,
) -> Result<()> {
    let config = CellDiffConfig::default();
    let watcher = InputWatcher::new(&cli.left, &cli.right, config.watcher.event_debounce_ms)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        match watcher.recv_timeout(Duration::from_millis(100)) {
            Ok(AppEvent::InputReloaded { side, text }) => {
                state.set_text(side, text);
                render(state, cli)?;
            }
            Ok(AppEvent::Quit) => break,
            Ok(_) => continue, // Ignore other events
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

fn print_json(state: &AppState) -> Result<()> {
    let payload = DiffPayload {
        left: diff_for_side(&state.left.text, &state.right.text, Side::Left),
        right: diff_for_side(&state.left.text, &state.right.text, Side::Right),
        stats: get_diff_stats(&state.left.text, &state.right.text),
    };

    println!("{}", serde_json::to_string(&payload)?);
    Ok(())
}

fn print_text(state: &AppState, cli: &Cli) {
    let lines = diff_for_side(&state.left.text, &state.right.text, cli.side);
    let stats = get_diff_stats(&state.left.text, &state.right.text);

    println!("--- {}", state.left.path.display());
    println!("+++ {}", state.right.path.display());
    println!("Changes: {}", format_stats(&stats));
    println!("---");

    for line in &lines {
        let formatted = format_line(line);
        if cli.no_color {
            println!("{}", formatted);
        } else {
            let color = match line.kind {
                RenderKind::Unchanged => {
                    if line.is_block_header {
                        "\x1b[36m" // Cyan for cell headers
                    } else {
                        ""
                    }
                }
                RenderKind::Removed => "\x1b[31m",  // Red
                RenderKind::Added => "\x1b[32m",    // Green
                RenderKind::Modified => "\x1b[33m", // Yellow
            };
            if color.is_empty() {
                println!("{}", formatted);
            } else {
                println!("{}{}\x1b[0m", color, formatted);
            }
        }
    }

    println!();
}
