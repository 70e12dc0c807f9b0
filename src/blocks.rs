//! Cell tracking for extracted notebook inputs.
//!
//! The extractor writes one header line per cell, `(* Input N *)`, with a
//! blank line between cells. This module classifies raw lines against that
//! contract, maps every line to the cell it belongs to, groups rendered
//! lines by cell, and deletes cells with automatic renumbering.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diff::RenderLine;

/// Classification of one raw input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// A cell header, carrying the number as printed. The printed number is
    /// display-only: segmentation and renumbering are purely positional.
    Header(u32),
    Text,
}

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\(\* Input (\d+) \*\)$").expect("invalid header pattern"))
}

/// Classify a raw line. This is the only place the header pattern lives;
/// everything else consumes the classification.
pub fn classify_line(line: &str) -> LineClass {
    match header_pattern().captures(line.trim()) {
        Some(caps) => LineClass::Header(caps[1].parse().unwrap_or(0)),
        None => LineClass::Text,
    }
}

/// Render a cell header for position `index` (0-based) the way the
/// extractor writes it.
pub fn format_header(index: usize) -> String {
    format!("(* Input {} *)", index + 1)
}

/// Cell membership of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBlock {
    /// 0-based cell index in document order.
    pub block: usize,
    pub is_header: bool,
}

/// Mapping from line index to cell membership for one side's raw text.
///
/// Lines before the first header belong to no cell and map to `None`.
#[derive(Debug, Clone, Default)]
pub struct BlockMap {
    entries: Vec<Option<LineBlock>>,
    blocks: usize,
}

impl BlockMap {
    /// Segment a raw text into cells. A single pass: each header starts the
    /// next cell, every following line belongs to it until the next header.
    pub fn segment(raw: &str) -> Self {
        let mut entries = Vec::new();
        let mut current = None;
        let mut blocks = 0;

        for line in raw.lines() {
            match classify_line(line) {
                LineClass::Header(_) => {
                    current = Some(blocks);
                    blocks += 1;
                    entries.push(Some(LineBlock { block: blocks - 1, is_header: true }));
                }
                LineClass::Text => {
                    entries.push(current.map(|block| LineBlock { block, is_header: false }));
                }
            }
        }

        Self { entries, blocks }
    }

    pub fn get(&self, line: usize) -> Option<LineBlock> {
        self.entries.get(line).copied().flatten()
    }

    pub fn block_count(&self) -> usize {
        self.blocks
    }
}

/// A maximal run of consecutive rendered lines belonging to one cell, or a
/// single line belonging to none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockGroup {
    pub block: Option<usize>,
    /// First line index of the run (into the rendered line list).
    pub start: usize,
    /// One past the last line index of the run.
    pub end: usize,
}

impl BlockGroup {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start..self.end).contains(&line)
    }
}

/// Group rendered lines into cell runs for selection and hover handling.
///
/// Two adjacent lines merge only when they share the same defined cell id;
/// lines outside every cell stay as singleton groups, and distinct cells
/// never merge even when adjacent.
pub fn group_by_block(lines: &[RenderLine]) -> Vec<BlockGroup> {
    let mut groups: Vec<BlockGroup> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        match (groups.last_mut(), line.block) {
            (Some(last), Some(block)) if last.block == Some(block) => last.end = idx + 1,
            _ => groups.push(BlockGroup { block: line.block, start: idx, end: idx + 1 }),
        }
    }

    groups
}

/// One parsed cell: its body lines, header excluded.
#[derive(Debug, Clone, Default)]
struct Block {
    body: Vec<String>,
}

fn parse_blocks(raw: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();

    for line in raw.lines() {
        match classify_line(line) {
            LineClass::Header(_) => blocks.push(Block::default()),
            LineClass::Text => {
                if let Some(block) = blocks.last_mut() {
                    block.body.push(line.to_string());
                }
            }
        }
    }

    blocks
}

/// Number of cells in a raw text.
pub fn block_count(raw: &str) -> usize {
    raw.lines()
        .filter(|line| matches!(classify_line(line), LineClass::Header(_)))
        .count()
}

/// Delete one cell from a raw text and renumber the rest.
///
/// The text is re-parsed from scratch; an out-of-range index is a defined
/// no-op. Surviving cells are renumbered from 1 in their new order, bodies
/// are trimmed of trailing whitespace so blank lines cannot accumulate
/// under repeated deletions, and cells are rejoined with one blank line
/// between them. Deleting the last remaining cell yields the empty string.
pub fn delete_block(raw: &str, index: usize) -> String {
    let mut blocks = parse_blocks(raw);
    if index >= blocks.len() {
        return raw.to_string();
    }

    blocks.remove(index);
    if blocks.is_empty() {
        return String::new();
    }

    blocks
        .iter()
        .enumerate()
        .map(|(idx, block)| {
            let body = block.body.join("\n");
            let body = body.trim_end();
            if body.is_empty() {
                format_header(idx)
            } else {
                format!("{}\n{}", format_header(idx), body)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
