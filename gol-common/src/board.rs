//! The board data model: a toroidal rectangular grid of dead/alive bytes,
//! and the deterministic strip partition used to hand work to workers.

use crate::error::{GolError, Result};

pub const DEAD: u8 = 0;
pub const ALIVE: u8 = 255;

/// A complete `width x height` board, row-major, one byte per cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<u8>,
}

impl Board {
    pub fn new_dead(width: u32, height: u32) -> Self {
        Board {
            width,
            height,
            cells: vec![DEAD; (width as usize) * (height as usize)],
        }
    }

    pub fn get(&self, y: u32, x: u32) -> u8 {
        self.cells[self.index(y, x)]
    }

    pub fn set(&mut self, y: u32, x: u32, val: u8) {
        let idx = self.index(y, x);
        self.cells[idx] = val;
    }

    fn index(&self, y: u32, x: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn alive_count(&self) -> i64 {
        self.cells.iter().filter(|&&c| c == ALIVE).count() as i64
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = (y as usize) * (self.width as usize);
        &self.cells[start..start + self.width as usize]
    }

    /// Extract the `[s, e)` rows as a standalone strip (same width).
    pub fn slice_rows(&self, s: u32, e: u32) -> Vec<u8> {
        let start = (s as usize) * (self.width as usize);
        let end = (e as usize) * (self.width as usize);
        self.cells[start..end].to_vec()
    }

    pub fn from_proto(proto: gol_proto::Board) -> Result<Self> {
        let expected = (proto.width as usize) * (proto.height as usize);
        if proto.cells.len() != expected {
            return Err(GolError::Configuration(format!(
                "board payload has {} bytes, expected {}x{}={}",
                proto.cells.len(),
                proto.width,
                proto.height,
                expected
            )));
        }
        Ok(Board {
            width: proto.width,
            height: proto.height,
            cells: proto.cells,
        })
    }

    pub fn to_proto(&self) -> gol_proto::Board {
        gol_proto::Board {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
        }
    }
}

/// The deterministic, order-preserving partition of `[0, height)` into `n`
/// strips. Worker `i` (0-indexed) owns rows `[bounds[i], bounds[i+1])`.
/// The lowest-indexed `remainder` strips get one extra row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub bounds: Vec<u32>,
}

impl Partition {
    pub fn compute(height: u32, n: u32) -> Result<Self> {
        if n == 0 {
            return Err(GolError::configuration("worker count must be at least 1"));
        }
        if n > height {
            return Err(GolError::configuration(format!(
                "cannot partition a board of height {height} across {n} workers: N > H"
            )));
        }
        let base = height / n;
        let remainder = height % n;
        let mut bounds = Vec::with_capacity((n + 1) as usize);
        bounds.push(0);
        let mut s = 0u32;
        for i in 0..n {
            let extra = if i < remainder { 1 } else { 0 };
            s += base + extra;
            bounds.push(s);
        }
        debug_assert_eq!(*bounds.last().unwrap(), height);
        Ok(Partition { bounds })
    }

    pub fn worker_count(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn strip_height(&self, i: usize) -> u32 {
        self.bounds[i + 1] - self.bounds[i]
    }

    pub fn strip_start(&self, i: usize) -> u32 {
        self.bounds[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_covers_board_exactly() {
        for (h, n) in [(3u32, 3u32), (10, 3), (10, 4), (512, 8), (1, 1)] {
            let p = Partition::compute(h, n).unwrap();
            assert_eq!(p.bounds.first().copied(), Some(0));
            assert_eq!(p.bounds.last().copied(), Some(h));
            assert_eq!(p.worker_count(), n as usize);
            for i in 0..p.worker_count() {
                assert!(p.strip_height(i) >= 1);
            }
            let total: u32 = (0..p.worker_count()).map(|i| p.strip_height(i)).sum();
            assert_eq!(total, h);
        }
    }

    #[test]
    fn remainder_rows_go_to_lowest_indexed_workers() {
        let p = Partition::compute(10, 3).unwrap();
        // base = 3, remainder = 1: worker 0 gets 4, workers 1 and 2 get 3.
        assert_eq!(p.strip_height(0), 4);
        assert_eq!(p.strip_height(1), 3);
        assert_eq!(p.strip_height(2), 3);
    }

    #[test]
    fn n_greater_than_h_is_rejected() {
        assert!(Partition::compute(3, 4).is_err());
    }

    #[test]
    fn board_proto_roundtrip() {
        let mut b = Board::new_dead(4, 3);
        b.set(1, 1, ALIVE);
        let proto = b.to_proto();
        let back = Board::from_proto(proto).unwrap();
        assert_eq!(b, back);
    }
}
