//! Conway's Game of Life rule, applied two ways:
//!
//! - `next_strip`: the distributed worker's per-turn computation, which
//!   consumes a strip padded with one halo row above and below and wraps
//!   only the X axis (the Y axis wrap is already encoded by the halo rows
//!   the ring exchange supplied).
//! - `step`: a plain single-process reference simulator over a full
//!   toroidal board, wrapping both axes directly. Used to establish the
//!   single-worker-equivalence property and as a reference oracle in
//!   tests.

use crate::board::{Board, ALIVE, DEAD};

fn wrap(i: i64, len: u32) -> u32 {
    (((i % len as i64) + len as i64) % len as i64) as u32
}

/// Count alive neighbours of `(row, x)` in `padded`, a `(strip_h + 2) x
/// width` grid where `row` indexes directly into `padded` (no Y wrap: the
/// halo rows already provide the wrapped neighbours) and `x` wraps on the
/// X axis.
fn neighbour_count(padded: &[&[u8]], row: usize, x: u32, width: u32) -> u8 {
    let mut n = 0u8;
    for dy in [-1i64, 0, 1] {
        let r = (row as i64) + dy;
        if r < 0 || r as usize >= padded.len() {
            continue;
        }
        let data = padded[r as usize];
        for dx in [-1i64, 0, 1] {
            if dx == 0 && dy == 0 {
                continue;
            }
            let xw = wrap(x as i64 + dx, width);
            if data[xw as usize] == ALIVE {
                n += 1;
            }
        }
    }
    n
}

fn next_cell(alive: bool, n: u8) -> u8 {
    match (alive, n) {
        (true, 2) | (true, 3) => ALIVE,
        (false, 3) => ALIVE,
        _ => DEAD,
    }
}

/// Compute the next strip given the current strip, its width and height,
/// and the halo rows received from the above and below ring neighbours.
pub fn next_strip(strip: &[u8], width: u32, strip_h: u32, top_halo: &[u8], bot_halo: &[u8]) -> Vec<u8> {
    debug_assert_eq!(top_halo.len(), width as usize);
    debug_assert_eq!(bot_halo.len(), width as usize);
    debug_assert_eq!(strip.len(), (width as usize) * (strip_h as usize));

    let mut padded: Vec<&[u8]> = Vec::with_capacity(strip_h as usize + 2);
    padded.push(top_halo);
    for r in 0..strip_h {
        let start = (r as usize) * (width as usize);
        padded.push(&strip[start..start + width as usize]);
    }
    padded.push(bot_halo);

    let mut next = vec![DEAD; strip.len()];
    for r in 0..strip_h {
        let padded_row = (r + 1) as usize;
        let row_data = padded[padded_row];
        for x in 0..width {
            let n = neighbour_count(&padded, padded_row, x, width);
            let idx = (r as usize) * (width as usize) + x as usize;
            next[idx] = next_cell(row_data[x as usize] == ALIVE, n);
        }
    }
    next
}

/// Single-process reference simulator: one generation step over a full
/// toroidal board (both axes wrap).
pub fn step(board: &Board) -> Board {
    let w = board.width;
    let h = board.height;
    let mut next = Board::new_dead(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut n = 0u8;
            for dy in [-1i64, 0, 1] {
                for dx in [-1i64, 0, 1] {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let yw = wrap(y as i64 + dy, h);
                    let xw = wrap(x as i64 + dx, w);
                    if board.get(yw, xw) == ALIVE {
                        n += 1;
                    }
                }
            }
            next.set(y, x, next_cell(board.get(y, x) == ALIVE, n));
        }
    }
    next
}

/// Run `turns` generations of the reference simulator.
pub fn run(board: &Board, turns: u32) -> Board {
    let mut current = board.clone();
    for _ in 0..turns {
        current = step(&current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_alive(board: &mut Board, coords: &[(u32, u32)]) {
        for &(y, x) in coords {
            board.set(y, x, ALIVE);
        }
    }

    #[test]
    fn single_cell_dies() {
        let mut board = Board::new_dead(3, 3);
        set_alive(&mut board, &[(1, 1)]);
        let next = step(&board);
        assert_eq!(next.alive_count(), 0);
    }

    #[test]
    fn block_is_a_still_life() {
        let mut board = Board::new_dead(4, 4);
        set_alive(&mut board, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
        let next = run(&board, 10);
        assert_eq!(next, board);
    }

    #[test]
    fn blinker_oscillates() {
        let mut board = Board::new_dead(5, 5);
        set_alive(&mut board, &[(2, 1), (2, 2), (2, 3)]);
        let one = step(&board);
        let mut expected = Board::new_dead(5, 5);
        set_alive(&mut expected, &[(1, 2), (2, 2), (3, 2)]);
        assert_eq!(one, expected);
        let two = step(&one);
        assert_eq!(two, board);
    }

    #[test]
    fn toroidal_translation_invariance() {
        let mut a = Board::new_dead(10, 10);
        a.set(0, 0, ALIVE);
        a.set(0, 1, ALIVE);
        a.set(1, 0, ALIVE);

        let mut b = Board::new_dead(10, 10);
        // Same shape translated by (width, height): identical mod wrap.
        b.set(0, 0, ALIVE);
        b.set(0, 1, ALIVE);
        b.set(1, 0, ALIVE);

        let a2 = run(&a, 7);
        let b2 = run(&b, 7);
        assert_eq!(a2, b2);
    }

    #[test]
    fn next_strip_matches_whole_board_step() {
        let mut board = Board::new_dead(6, 6);
        set_alive(&mut board, &[(0, 0), (0, 1), (1, 0), (3, 3), (4, 4), (4, 3)]);
        let whole = step(&board);

        // Split into 2 strips of 3 rows, compute each with next_strip using
        // halos pulled from the (pre-step) board, and compare to `whole`.
        let width = board.width;
        for (strip_idx, (s, e)) in [(0u32, 3u32), (3, 6)].into_iter().enumerate() {
            let strip = board.slice_rows(s, e);
            let top_halo_row = (s + board.height - 1) % board.height;
            let bot_halo_row = e % board.height;
            let top_halo = board.row(top_halo_row).to_vec();
            let bot_halo = board.row(bot_halo_row).to_vec();
            let next = next_strip(&strip, width, e - s, &top_halo, &bot_halo);
            let expected = whole.slice_rows(s, e);
            assert_eq!(next, expected, "strip {strip_idx} mismatch");
        }
    }
}
