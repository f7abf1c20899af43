use std::sync::Arc;

use gol_common::board::Board;
use gol_common::health::HealthHandle;
use gol_common::metrics::record_turn;
use tonic::{Request, Response, Status};

use gol_proto::worker_service_server::WorkerService;
use gol_proto::{
    CountResponse, Empty, HaloRequest, HaloResponse, TurnResponse, WorkerInitRequest,
    WorkerStartRequest, WorldResponse,
};

use crate::error::WorkerError;
use crate::pipeline::{dial_above, run_step};
use crate::state::{StripState, WorkerCore};

pub struct WorkerServiceImpl {
    core: Arc<WorkerCore>,
    liveness: HealthHandle,
}

impl WorkerServiceImpl {
    pub fn new(core: Arc<WorkerCore>, liveness: HealthHandle) -> Self {
        WorkerServiceImpl { core, liveness }
    }
}

#[tonic::async_trait]
impl WorkerService for WorkerServiceImpl {
    async fn init(
        &self,
        request: Request<WorkerInitRequest>,
    ) -> Result<Response<Empty>, Status> {
        if self.core.world_built.is_raised() {
            return Err(WorkerError::AlreadyInitialized.into());
        }
        let req = request.into_inner();
        self.core
            .dims
            .set((req.width, req.strip_height))
            .map_err(|_| WorkerError::AlreadyInitialized)?;

        let expected = (req.width as usize) * (req.strip_height as usize);
        if req.strip.len() != expected {
            return Err(Status::invalid_argument(format!(
                "strip has {} bytes, expected {expected}",
                req.strip.len()
            )));
        }

        {
            let mut guard = self.core.strip.lock().await;
            *guard = Some(StripState {
                cells: req.strip,
                turn: 0,
            });
        }
        self.core.world_built.raise();
        tracing::info!(width = req.width, strip_h = req.strip_height, "worker initialized");
        Ok(Response::new(Empty {}))
    }

    async fn start(
        &self,
        request: Request<WorkerStartRequest>,
    ) -> Result<Response<Empty>, Status> {
        if !self.core.world_built.is_raised() {
            return Err(WorkerError::NotInitialized.into());
        }
        let above_address = request.into_inner().above_address;
        let client = dial_above(&above_address).await.map_err(|source| {
            WorkerError::DialAboveFailed {
                address: above_address.clone(),
                source,
            }
        })?;
        {
            let mut guard = self.core.above_client.lock().await;
            *guard = Some(client);
        }
        tracing::info!(above = %above_address, "worker dialed above neighbour, starting pipeline");
        tokio::spawn(run_step(self.core.clone()));
        Ok(Response::new(Empty {}))
    }

    async fn progress(&self, _request: Request<Empty>) -> Result<Response<TurnResponse>, Status> {
        if !self.core.world_built.is_raised() {
            return Err(WorkerError::NotInitialized.into());
        }
        let next = self.core.next_slot.take().await;
        let next = next.map_err(Status::from)?;

        let turn = {
            let mut guard = self.core.strip.lock().await;
            let state = guard.as_mut().expect("world-built implies strip is Some");
            state.cells = next;
            state.turn += 1;
            state.turn
        };

        self.liveness.report_healthy(turn).await;
        record_turn("worker", turn);
        tokio::spawn(run_step(self.core.clone()));

        Ok(Response::new(TurnResponse { turn }))
    }

    async fn halo(&self, request: Request<HaloRequest>) -> Result<Response<HaloResponse>, Status> {
        self.core.world_built.wait().await;
        let incoming_row = request.into_inner().row;
        let my_bottom_row = {
            let guard = self.core.strip.lock().await;
            let state = guard.as_ref().expect("world-built implies strip is Some");
            let width = self.core.width() as usize;
            state.cells[state.cells.len() - width..].to_vec()
        };
        self.core.bot_halo_slot.put(incoming_row).await;
        Ok(Response::new(HaloResponse { row: my_bottom_row }))
    }

    async fn count(&self, _request: Request<Empty>) -> Result<Response<CountResponse>, Status> {
        self.core.world_built.wait().await;
        let guard = self.core.strip.lock().await;
        let state = guard.as_ref().expect("world-built implies strip is Some");
        let board = Board {
            width: self.core.width(),
            height: self.core.strip_h(),
            cells: state.cells.clone(),
        };
        Ok(Response::new(CountResponse {
            count: board.alive_count(),
            turn: state.turn,
        }))
    }

    async fn fetch(&self, _request: Request<Empty>) -> Result<Response<WorldResponse>, Status> {
        self.core.world_built.wait().await;
        let guard = self.core.strip.lock().await;
        let state = guard.as_ref().expect("world-built implies strip is Some");
        let board = Board {
            width: self.core.width(),
            height: self.core.strip_h(),
            cells: state.cells.clone(),
        };
        Ok(Response::new(WorldResponse {
            board: Some(board.to_proto()),
            turn: state.turn,
        }))
    }

    async fn quit(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        self.core
            .quit
            .store(true, std::sync::atomic::Ordering::Release);
        tracing::info!("worker retiring, remaining reachable for Fetch");
        Ok(Response::new(Empty {}))
    }

    async fn kill(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        tracing::warn!("worker killed");
        std::process::exit(0);
    }
}
