//! Broker-owned run state: board parameters, the computed partition, the
//! dialed worker clients, and the turn counter plus pause gate that guard
//! concurrent `ProgressAll`/`Count`/`Fetch`/`Pause` access.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use gol_common::board::{Board, Partition};
use gol_common::health::HealthHandle;
use gol_proto::worker_service_client::WorkerServiceClient;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tonic::transport::Channel;

pub struct RunParams {
    pub width: u32,
    pub height: u32,
    pub total_turns: u32,
}

pub struct Wiring {
    pub partition: Partition,
    pub worker_clients: Vec<WorkerServiceClient<Channel>>,
    /// One liveness component per worker, registered at `Start` once
    /// addresses are known, reported healthy on every successful `Progress`.
    pub worker_health: Vec<HealthHandle>,
}

pub struct BrokerCore {
    pub params: Mutex<Option<RunParams>>,
    /// The full initial board handed to `Init`, kept around so `Start` can
    /// slice it into strips once it knows the worker count.
    pub params_board: Mutex<Option<Board>>,
    pub wiring: Mutex<Option<Wiring>>,
    pub current_turn: AtomicU32,
    pub is_paused: AtomicBool,
    pub is_quit: AtomicBool,
    /// The pause-gate latch: held by `Pause` on transition-to-paused, by the
    /// progress loop briefly around each turn's fan-out issuance. A mutex
    /// used as a latch, not a data guard.
    pub progress_mu: Arc<Mutex<()>>,
    pub pause_guard: Mutex<Option<OwnedMutexGuard<()>>>,
}

impl BrokerCore {
    pub fn uninitialized() -> Self {
        BrokerCore {
            params: Mutex::new(None),
            params_board: Mutex::new(None),
            wiring: Mutex::new(None),
            current_turn: AtomicU32::new(0),
            is_paused: AtomicBool::new(false),
            is_quit: AtomicBool::new(false),
            progress_mu: Arc::new(Mutex::new(())),
            pause_guard: Mutex::new(None),
        }
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn.load(Ordering::Acquire)
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused.load(Ordering::Acquire)
    }

    pub fn is_quit(&self) -> bool {
        self.is_quit.load(Ordering::Acquire)
    }

    /// Toggle the pause gate; returns `true` if the run is now paused.
    pub async fn toggle_pause(&self) -> bool {
        let mut slot = self.pause_guard.lock().await;
        if slot.take().is_some() {
            self.is_paused.store(false, Ordering::Release);
            false
        } else {
            let owned = self.progress_mu.clone().lock_owned().await;
            *slot = Some(owned);
            self.is_paused.store(true, Ordering::Release);
            true
        }
    }
}
