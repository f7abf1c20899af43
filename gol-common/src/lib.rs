pub mod board;
pub mod error;
pub mod events;
pub mod health;
pub mod image;
pub mod life;
pub mod metrics;
pub mod sync;

pub use board::{Board, Partition};
pub use error::{GolError, Result};
