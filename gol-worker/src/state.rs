//! Per-worker state: the current strip + turn, the halo rendezvous slots,
//! and the one-shot "world-built" signal that lets `Halo` block until
//! `Init` has populated the strip (the ring-startup race the spec calls
//! out).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use gol_common::sync::{OnceSignal, Slot};
use tokio::sync::Mutex;
use tonic::transport::Channel;

use gol_proto::worker_service_client::WorkerServiceClient;

use crate::error::WorkerError;

/// The current strip and the turn it is at. Replaced wholesale at commit
/// time (see spec's "commit-in-place" design note): readers either hold
/// the lock for the duration of their read, or clone out before releasing
/// it, so no reader can observe a half-written strip.
pub struct StripState {
    pub cells: Vec<u8>,
    pub turn: u32,
}

pub struct WorkerCore {
    /// (width, strip_h), set once by `Init` before `world_built` is raised.
    pub dims: OnceLock<(u32, u32)>,
    pub strip: Mutex<Option<StripState>>,
    pub world_built: OnceSignal,
    pub bot_halo_slot: Slot<Vec<u8>>,
    /// The result of one halo-exchange-and-compute step: the computed next
    /// strip, or the error that prevented it (surfaced by the following
    /// `Progress` call).
    pub next_slot: Slot<Result<Vec<u8>, WorkerError>>,
    pub above_client: Mutex<Option<WorkerServiceClient<Channel>>>,
    pub quit: AtomicBool,
}

impl WorkerCore {
    pub fn uninitialized() -> Self {
        WorkerCore {
            dims: OnceLock::new(),
            strip: Mutex::new(None),
            world_built: OnceSignal::new(),
            bot_halo_slot: Slot::new(),
            next_slot: Slot::new(),
            above_client: Mutex::new(None),
            quit: AtomicBool::new(false),
        }
    }

    pub fn is_quit(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    pub fn width(&self) -> u32 {
        self.dims.get().map(|(w, _)| *w).unwrap_or(0)
    }

    pub fn strip_h(&self) -> u32 {
        self.dims.get().map(|(_, h)| *h).unwrap_or(0)
    }
}
