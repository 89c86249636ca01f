#![forbid(unsafe_code)]

//! Binary background renderer.
//!
//! Maintains a fixed set of horizontal rows, each a continuous stream of
//! 8-bit [`Block`]s. Every tick appends one block per row at the tail and,
//! once the row is longer than the viewport needs, evicts one block from the
//! head. Executed command names can be projected into a few random rows,
//! where they are emitted one character per tick between random filler.
//!
//! # Invariants
//!
//! - Row content is a sequence of whole blocks; eviction pops exactly one
//!   block from the front of a `VecDeque`, so partial blocks never exist.
//! - Under a constant viewport the block count of every row equals
//!   `max_blocks` after every tick (one append, at most one eviction).
//! - A growth resize prepends random filler so no row under-fills; a shrink
//!   never truncates.
//! - At most one active emission per row; pending commands are FIFO.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No container at startup | Warn once, zero rows, ticks are no-ops |
//! | Row index out of range | `tick_row` returns `None` |
//! | Empty command name | Not queued |
//! | No resize deficit | Row unchanged |

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::block::{BLOCK_WIDTH, BitSource, Block};
use crate::config::{PRINTABLE_RANGE, PROJECTION_FAN_OUT};
use crate::rng::Rng;

/// Size of the surface the backdrop covers, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Cell measurements used to size the backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMetrics {
    /// Height of one row, in cells.
    pub row_height: u16,
    /// Rendered width of one block, in cells.
    pub block_width: u16,
}

impl Default for RowMetrics {
    fn default() -> Self {
        Self {
            row_height: 1,
            block_width: BLOCK_WIDTH as u16,
        }
    }
}

impl RowMetrics {
    /// Number of rows that fit in `height`.
    #[must_use]
    pub fn row_count(&self, height: u16) -> usize {
        usize::from(height / self.row_height.max(1))
    }

    /// Blocks needed to cover `width`, with one block of slack so the
    /// right edge never shows a gap.
    #[must_use]
    pub fn max_blocks(&self, width: u16) -> usize {
        usize::from(width / self.block_width.max(1)) + 1
    }
}

/// In-progress emission of a command name into a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    command: String,
    chars: Vec<char>,
    position: usize,
}

impl Emission {
    fn new(command: String) -> Self {
        let chars = command.chars().collect();
        Self {
            command,
            chars,
            position: 0,
        }
    }

    /// Command being emitted.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Index of the next character to emit.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Characters not yet emitted.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.chars.len() - self.position
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.chars.get(self.position).copied()?;
        self.position += 1;
        Some(ch)
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.chars.len()
    }
}

/// One horizontal strip of the backdrop.
#[derive(Debug, Clone)]
pub struct Row {
    index: usize,
    vertical_position: f32,
    blocks: VecDeque<Block>,
    pending: VecDeque<String>,
    emission: Option<Emission>,
}

impl Row {
    fn new(index: usize, vertical_position: f32, blocks: VecDeque<Block>) -> Self {
        Self {
            index,
            vertical_position,
            blocks,
            pending: VecDeque::new(),
            emission: None,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Offset from the top of the viewport, as a percentage.
    #[must_use]
    pub fn vertical_position(&self) -> f32 {
        self.vertical_position
    }

    /// Current content, oldest block first.
    #[must_use]
    pub fn blocks(&self) -> &VecDeque<Block> {
        &self.blocks
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Commands waiting to be emitted, next first.
    #[must_use]
    pub fn pending(&self) -> &VecDeque<String> {
        &self.pending
    }

    #[must_use]
    pub fn active_emission(&self) -> Option<&Emission> {
        self.emission.as_ref()
    }

    /// Literal text of the row: eight symbols and two spaces per block.
    #[must_use]
    pub fn render_symbols(&self) -> String {
        crate::block::render_row(&self.blocks)
    }

    fn enqueue(&mut self, command: &str) {
        self.pending.push_back(command.to_string());
    }

    /// Pick the next source character, advancing the emission state.
    fn next_source(&mut self, rng: &mut Rng) -> Block {
        if self.emission.is_none() {
            while let Some(command) = self.pending.pop_front() {
                if command.is_empty() {
                    continue;
                }
                debug!(row = self.index, command = %command, "emission started");
                self.emission = Some(Emission::new(command));
                break;
            }
        }

        if let Some(emission) = self.emission.as_mut()
            && let Some(ch) = emission.next_char()
        {
            if emission.is_exhausted() {
                debug!(row = self.index, command = %emission.command, "emission finished");
                self.emission = None;
            }
            return Block::encode(ch, BitSource::Command);
        }

        random_block(rng)
    }

    /// One tick: append a block, then evict one from the head if the row
    /// is over capacity.
    fn tick(&mut self, max_blocks: usize, rng: &mut Rng) -> Block {
        let block = self.next_source(rng);
        self.blocks.push_back(block);
        if self.blocks.len() > max_blocks {
            self.blocks.pop_front();
        }
        block
    }

    /// Prepend random filler until the row holds `max_blocks` blocks.
    fn fill_to(&mut self, max_blocks: usize, rng: &mut Rng) -> usize {
        let deficit = max_blocks.saturating_sub(self.blocks.len());
        for _ in 0..deficit {
            self.blocks.push_front(random_block(rng));
        }
        deficit
    }
}

/// A block built from a uniformly random printable character.
fn random_block(rng: &mut Rng) -> Block {
    let code = rng.in_range(PRINTABLE_RANGE);
    // Printable range is ASCII, so the narrowing is lossless.
    Block::from_byte(code as u8, BitSource::Random)
}

fn random_blocks(count: usize, rng: &mut Rng) -> VecDeque<Block> {
    (0..count).map(|_| random_block(rng)).collect()
}

/// The backdrop: rows, capacity, and its own random source.
#[derive(Debug, Clone)]
pub struct BinaryBackground {
    rows: Vec<Row>,
    max_blocks: usize,
    metrics: RowMetrics,
    rng: Rng,
    attached: bool,
    ticks: u64,
}

impl BinaryBackground {
    /// Build the backdrop for a container of the given size.
    ///
    /// `None` means the rendering surface is not attached yet: the backdrop
    /// starts with no rows and every later operation is a no-op.
    #[must_use]
    pub fn start(container: Option<Viewport>, metrics: RowMetrics, rng: Rng) -> Self {
        let Some(viewport) = container else {
            warn!("binary background container missing; backdrop disabled");
            return Self {
                rows: Vec::new(),
                max_blocks: 0,
                metrics,
                rng,
                attached: false,
                ticks: 0,
            };
        };

        let row_count = metrics.row_count(viewport.height);
        let max_blocks = metrics.max_blocks(viewport.width);
        let mut background = Self {
            rows: Vec::with_capacity(row_count),
            max_blocks,
            metrics,
            rng,
            attached: true,
            ticks: 0,
        };
        background.create_rows(row_count);
        debug!(
            rows = row_count,
            max_blocks,
            width = viewport.width,
            height = viewport.height,
            "binary background started"
        );
        background
    }

    /// Build a backdrop with explicit dimensions, bypassing viewport math.
    #[must_use]
    pub fn with_rows(row_count: usize, max_blocks: usize, rng: Rng) -> Self {
        let mut background = Self {
            rows: Vec::with_capacity(row_count),
            max_blocks,
            metrics: RowMetrics::default(),
            rng,
            attached: true,
            ticks: 0,
        };
        background.create_rows(row_count);
        background
    }

    fn create_rows(&mut self, row_count: usize) {
        for index in 0..row_count {
            let vertical_position = index as f32 / row_count as f32 * 100.0;
            let blocks = random_blocks(self.max_blocks, &mut self.rng);
            trace!(row = index, position = vertical_position, "row created");
            self.rows.push(Row::new(index, vertical_position, blocks));
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn max_blocks(&self) -> usize {
        self.max_blocks
    }

    #[must_use]
    pub fn metrics(&self) -> RowMetrics {
        self.metrics
    }

    /// Whether a container was present at startup.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Ticks applied so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Advance every row by one block, in row order.
    pub fn tick(&mut self) {
        if !self.attached {
            return;
        }
        self.ticks += 1;
        for row in &mut self.rows {
            row.tick(self.max_blocks, &mut self.rng);
        }
    }

    /// Advance a single row. Returns the appended block.
    pub fn tick_row(&mut self, index: usize) -> Option<Block> {
        let row = self.rows.get_mut(index)?;
        Some(row.tick(self.max_blocks, &mut self.rng))
    }

    /// Recompute capacity for a new viewport width.
    ///
    /// Rows shorter than the new capacity get random filler prepended as
    /// their oldest content. Longer rows are left alone.
    pub fn resize(&mut self, width: u16) {
        if !self.attached {
            return;
        }
        let max_blocks = self.metrics.max_blocks(width);
        self.set_max_blocks(max_blocks);
    }

    /// Set capacity directly. Same growth rule as [`resize`](Self::resize).
    pub fn set_max_blocks(&mut self, max_blocks: usize) {
        self.max_blocks = max_blocks;
        let mut filled = 0usize;
        for row in &mut self.rows {
            filled += row.fill_to(max_blocks, &mut self.rng);
        }
        debug!(max_blocks, filled, "binary rows resized");
    }

    /// Queue a command name on up to [`PROJECTION_FAN_OUT`] distinct rows.
    ///
    /// Returns the chosen row indices.
    pub fn project_command(&mut self, command: &str) -> Vec<usize> {
        if command.is_empty() || self.rows.is_empty() {
            return Vec::new();
        }
        let picks = self
            .rng
            .sample_distinct(self.rows.len(), PROJECTION_FAN_OUT);
        for &index in &picks {
            self.rows[index].enqueue(command);
        }
        debug!(command, rows = ?picks, "command projected into backdrop");
        picks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::decode_symbols;

    fn background(rows: usize, max_blocks: usize) -> BinaryBackground {
        BinaryBackground::with_rows(rows, max_blocks, Rng::new(42))
    }

    #[test]
    fn start_sizes_from_viewport() {
        let bg = BinaryBackground::start(
            Some(Viewport::new(80, 24)),
            RowMetrics::default(),
            Rng::new(1),
        );
        assert_eq!(bg.row_count(), 24);
        assert_eq!(bg.max_blocks(), 9);
        assert!(bg.rows().iter().all(|r| r.block_count() == 9));
    }

    #[test]
    fn row_height_divides_rows() {
        let metrics = RowMetrics {
            row_height: 2,
            ..RowMetrics::default()
        };
        let bg = BinaryBackground::start(Some(Viewport::new(40, 25)), metrics, Rng::new(1));
        assert_eq!(bg.row_count(), 12);
    }

    #[test]
    fn vertical_positions_are_fractions_of_height() {
        let bg = background(4, 3);
        let positions: Vec<f32> = bg.rows().iter().map(Row::vertical_position).collect();
        assert_eq!(positions, vec![0.0, 25.0, 50.0, 75.0]);
    }

    #[test]
    fn initial_content_is_random_filler() {
        let bg = background(3, 5);
        for row in bg.rows() {
            assert!(row.blocks().iter().all(|b| b.source() == BitSource::Random));
            assert!(
                row.blocks()
                    .iter()
                    .all(|b| PRINTABLE_RANGE.contains(&u32::from(b.byte())))
            );
        }
    }

    #[test]
    fn tick_appends_at_tail_and_evicts_head() {
        let mut bg = background(1, 4);
        let before: Vec<Block> = bg.rows()[0].blocks().iter().copied().collect();
        let appended = bg.tick_row(0).unwrap();
        let after: Vec<Block> = bg.rows()[0].blocks().iter().copied().collect();
        assert_eq!(after.len(), 4);
        assert_eq!(after[..3], before[1..]);
        assert_eq!(after[3], appended);
    }

    #[test]
    fn emission_spells_command_then_returns_to_noise() {
        let mut bg = background(1, 6);
        bg.rows[0].enqueue("ok");
        let first = bg.tick_row(0).unwrap();
        assert!(bg.rows()[0].active_emission().is_some());
        let second = bg.tick_row(0).unwrap();
        assert!(bg.rows()[0].active_emission().is_none());
        let third = bg.tick_row(0).unwrap();

        assert_eq!((first.decode(), first.source()), ('o', BitSource::Command));
        assert_eq!((second.decode(), second.source()), ('k', BitSource::Command));
        assert_eq!(third.source(), BitSource::Random);
    }

    #[test]
    fn empty_commands_are_skipped() {
        let mut bg = background(1, 3);
        assert!(bg.project_command("").is_empty());
        bg.rows[0].pending.push_back(String::new());
        bg.rows[0].enqueue("x");
        let block = bg.tick_row(0).unwrap();
        assert_eq!(block.decode(), 'x');
        assert!(bg.rows()[0].pending().is_empty());
    }

    #[test]
    fn rendered_row_decodes_block_by_block() {
        let mut bg = background(1, 2);
        bg.rows[0].enqueue("hi");
        bg.tick_row(0);
        bg.tick_row(0);
        let text = bg.rows()[0].render_symbols();
        let bytes: Vec<u8> = text.split_whitespace().filter_map(decode_symbols).collect();
        assert_eq!(bytes, b"hi");
    }

    #[test]
    fn resize_growth_prepends_random_filler() {
        let mut bg = background(2, 3);
        bg.rows[0].enqueue("ab");
        bg.tick_row(0);
        bg.tick_row(0);
        let tail: Vec<Block> = bg.rows()[0].blocks().iter().rev().take(2).copied().collect();

        bg.set_max_blocks(7);
        let row = &bg.rows()[0];
        assert_eq!(row.block_count(), 7);
        let new_tail: Vec<Block> = row.blocks().iter().rev().take(2).copied().collect();
        assert_eq!(tail, new_tail, "existing content keeps its position at the tail");
        assert!(
            row.blocks()
                .iter()
                .take(4)
                .all(|b| b.source() == BitSource::Random)
        );
    }

    #[test]
    fn resize_shrink_keeps_content() {
        let mut bg = background(2, 8);
        bg.set_max_blocks(3);
        assert!(bg.rows().iter().all(|r| r.block_count() == 8));
        bg.tick();
        assert!(bg.rows().iter().all(|r| r.block_count() == 8));
    }

    #[test]
    fn resize_uses_block_width() {
        let mut bg = BinaryBackground::start(
            Some(Viewport::new(50, 4)),
            RowMetrics::default(),
            Rng::new(3),
        );
        assert_eq!(bg.max_blocks(), 6);
        bg.resize(120);
        assert_eq!(bg.max_blocks(), 13);
        assert!(bg.rows().iter().all(|r| r.block_count() == 13));
    }

    #[test]
    fn projection_targets_distinct_rows() {
        let mut bg = background(10, 4);
        let mut picks = bg.project_command("ls");
        picks.sort_unstable();
        picks.dedup();
        assert_eq!(picks.len(), 3);
        let queued = bg
            .rows()
            .iter()
            .filter(|r| r.pending().iter().any(|c| c == "ls"))
            .count();
        assert_eq!(queued, 3);
    }

    #[test]
    fn projection_floors_at_row_count() {
        let mut bg = background(2, 4);
        let picks = bg.project_command("pwd");
        assert_eq!(picks.len(), 2);
        assert!(bg.rows().iter().all(|r| r.pending().len() == 1));
    }

    #[test]
    fn detached_background_is_inert() {
        let mut bg = BinaryBackground::start(None, RowMetrics::default(), Rng::new(9));
        assert!(!bg.is_attached());
        bg.tick();
        bg.resize(200);
        assert_eq!(bg.row_count(), 0);
        assert_eq!(bg.tick_count(), 0);
        assert!(bg.project_command("help").is_empty());
        assert!(bg.tick_row(0).is_none());
    }
}
