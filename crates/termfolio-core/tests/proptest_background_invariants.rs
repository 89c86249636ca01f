//! Property-based invariant tests for the binary backdrop.
//!
//! 1. Rendered rows are always a concatenation of whole blocks.
//! 2. Block count stabilizes at `max_blocks` under a constant viewport.
//! 3. Queued commands are emitted in FIFO order per row.
//! 4. Projection fan-out is `min(3, rows)` distinct rows.
//! 5. Shrinking never truncates; growing back never under-fills.
//! 6. Fixed scenarios: 5x20 idle run, and `"hi"` emission.

use std::collections::HashSet;

use proptest::prelude::*;
use termfolio_core::background::BinaryBackground;
use termfolio_core::block::{BLOCK_WIDTH, BITS_PER_BLOCK, BitSource, decode_symbols};
use termfolio_core::rng::Rng;

// ── Helpers ─────────────────────────────────────────────────────────────

fn command_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,10}"
}

fn command_chars(bg: &BinaryBackground, row: usize) -> String {
    bg.rows()[row]
        .blocks()
        .iter()
        .filter(|b| b.source() == BitSource::Command)
        .map(|b| b.decode())
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Block atomicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rendered_rows_are_whole_blocks(
        seed in any::<u64>(),
        max_blocks in 1usize..30,
        ticks in 0usize..60,
        commands in prop::collection::vec(command_strategy(), 0..4),
    ) {
        let mut bg = BinaryBackground::with_rows(3, max_blocks, Rng::new(seed));
        for cmd in &commands {
            bg.project_command(cmd);
        }
        for _ in 0..ticks {
            bg.tick();
        }
        for row in bg.rows() {
            let text = row.render_symbols();
            prop_assert_eq!(text.chars().count(), row.block_count() * BLOCK_WIDTH);
            let chars: Vec<char> = text.chars().collect();
            for (chunk, block) in chars.chunks(BLOCK_WIDTH).zip(row.blocks()) {
                let symbols: String = chunk[..BITS_PER_BLOCK].iter().collect();
                prop_assert_eq!(decode_symbols(&symbols), Some(block.byte()));
                prop_assert!(chunk[BITS_PER_BLOCK..].iter().all(|&c| c == ' '));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Bounded growth
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn block_count_stays_at_capacity(
        seed in any::<u64>(),
        rows in 1usize..12,
        max_blocks in 1usize..40,
        extra in 0usize..40,
    ) {
        let mut bg = BinaryBackground::with_rows(rows, max_blocks, Rng::new(seed));
        bg.project_command("experience");
        for _ in 0..(max_blocks + extra) {
            bg.tick();
            for row in bg.rows() {
                prop_assert_eq!(row.block_count(), max_blocks);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. FIFO emission
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn queued_commands_emit_in_order(
        seed in any::<u64>(),
        commands in prop::collection::vec(command_strategy(), 1..5),
    ) {
        let total: usize = commands.iter().map(String::len).sum();
        let mut bg = BinaryBackground::with_rows(1, total + 4, Rng::new(seed));
        for cmd in &commands {
            bg.project_command(cmd);
        }
        for _ in 0..total {
            bg.tick();
        }
        prop_assert_eq!(command_chars(&bg, 0), commands.concat());
        prop_assert!(bg.rows()[0].pending().is_empty());
        prop_assert!(bg.rows()[0].active_emission().is_none());
    }
}

#[test]
fn ls_finishes_before_pwd_starts() {
    let mut bg = BinaryBackground::with_rows(1, 10, Rng::new(1));
    bg.project_command("ls");
    bg.project_command("pwd");

    let emitted: Vec<(char, BitSource)> = (0..6)
        .filter_map(|_| bg.tick_row(0))
        .map(|b| (b.decode(), b.source()))
        .collect();

    let command: Vec<char> = emitted
        .iter()
        .filter(|(_, src)| *src == BitSource::Command)
        .map(|(c, _)| *c)
        .collect();
    assert_eq!(command, vec!['l', 's', 'p', 'w', 'd']);
    assert_eq!(emitted[5].1, BitSource::Random);
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Projection fan-out
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fan_out_is_min_of_three_and_rows(seed in any::<u64>(), rows in 0usize..20) {
        let mut bg = BinaryBackground::with_rows(rows, 4, Rng::new(seed));
        let picks = bg.project_command("help");
        let unique: HashSet<usize> = picks.iter().copied().collect();
        prop_assert_eq!(unique.len(), picks.len());
        prop_assert_eq!(picks.len(), rows.min(3));
        let queued = bg
            .rows()
            .iter()
            .filter(|r| r.pending().iter().any(|c| c == "help"))
            .count();
        prop_assert_eq!(queued, rows.min(3));
    }
}

#[test]
fn ten_rows_get_exactly_three() {
    let mut bg = BinaryBackground::with_rows(10, 5, Rng::new(2024));
    bg.project_command("projects");
    let queued = bg.rows().iter().filter(|r| !r.pending().is_empty()).count();
    assert_eq!(queued, 3);
}

#[test]
fn two_rows_get_both() {
    let mut bg = BinaryBackground::with_rows(2, 5, Rng::new(2024));
    bg.project_command("contact");
    assert!(bg.rows().iter().all(|r| r.pending().len() == 1));
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Resize non-shrink
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shrink_then_grow_never_loses_content(
        seed in any::<u64>(),
        start in 1usize..30,
        small in 1usize..30,
        large in 1usize..60,
    ) {
        let mut bg = BinaryBackground::with_rows(3, start, Rng::new(seed));
        let before: Vec<usize> = bg.rows().iter().map(|r| r.block_count()).collect();

        bg.set_max_blocks(small);
        let shrunk: Vec<usize> = bg.rows().iter().map(|r| r.block_count()).collect();
        for (b, s) in before.iter().zip(&shrunk) {
            prop_assert!(s >= b, "shrink truncated a row: {} -> {}", b, s);
        }

        bg.set_max_blocks(large);
        for (row, s) in bg.rows().iter().zip(&shrunk) {
            prop_assert!(row.block_count() >= *s);
            prop_assert!(row.block_count() >= large);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Scenarios
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn idle_run_keeps_rows_full_of_noise() {
    let mut bg = BinaryBackground::with_rows(5, 20, Rng::new(5));
    for _ in 0..20 {
        bg.tick();
    }
    assert_eq!(bg.row_count(), 5);
    for row in bg.rows() {
        assert_eq!(row.block_count(), 20);
        assert!(row.blocks().iter().all(|b| b.source() == BitSource::Random));
    }
}

#[test]
fn hi_is_emitted_as_two_command_blocks() {
    let mut bg = BinaryBackground::with_rows(1, 8, Rng::new(77));
    bg.project_command("hi");
    bg.tick();
    bg.tick();

    let blocks = bg.rows()[0].blocks();
    let tail: Vec<_> = blocks.iter().skip(blocks.len() - 2).collect();
    assert_eq!(tail[0].byte(), b'h');
    assert_eq!(tail[1].byte(), b'i');
    assert!(tail.iter().all(|b| b.source() == BitSource::Command));

    let symbols = bg.rows()[0].render_symbols();
    let decoded: Vec<u8> = symbols
        .split_whitespace()
        .rev()
        .take(2)
        .filter_map(decode_symbols)
        .collect();
    assert_eq!(decoded, vec![b'i', b'h']);
}
