use std::sync::atomic::Ordering;
use std::sync::Arc;

use gol_common::board::Board;
use gol_common::health::{HealthHandle, HealthRegistry};
use gol_proto::broker_service_server::BrokerService;
use gol_proto::{
    BrokerInitRequest, BrokerStartRequest, CountResponse, Empty, PauseResponse, WorldResponse,
};
use tonic::{Request, Response, Status};

use gol_proto::worker_service_client::WorkerServiceClient;
use gol_proto::Empty as WorkerEmpty;

use crate::error::BrokerError;
use crate::progress::{fan_out_count, fan_out_fetch, run_progress_loop};
use crate::startup::wire_ring;
use crate::state::{BrokerCore, RunParams, Wiring};

pub struct BrokerServiceImpl {
    core: Arc<BrokerCore>,
    liveness: HealthHandle,
    health: HealthRegistry,
    health_deadline: time::Duration,
}

impl BrokerServiceImpl {
    pub fn new(
        core: Arc<BrokerCore>,
        liveness: HealthHandle,
        health: HealthRegistry,
        health_deadline: time::Duration,
    ) -> Self {
        BrokerServiceImpl {
            core,
            liveness,
            health,
            health_deadline,
        }
    }
}

#[tonic::async_trait]
impl BrokerService for BrokerServiceImpl {
    async fn init(&self, request: Request<BrokerInitRequest>) -> Result<Response<Empty>, Status> {
        let mut guard = self.core.params.lock().await;
        if guard.is_some() {
            return Err(BrokerError::AlreadyInitialized.into());
        }
        let req = request.into_inner();
        let world = req.world.ok_or_else(|| Status::invalid_argument("world is required"))?;
        let board = Board::from_proto(world).map_err(|err| Status::invalid_argument(err.to_string()))?;

        *guard = Some(RunParams {
            width: board.width,
            height: board.height,
            total_turns: req.turns,
        });
        drop(guard);

        self.core.params_board.lock().await.replace(board);

        tracing::info!(turns = req.turns, "broker initialized");
        Ok(Response::new(Empty {}))
    }

    async fn start(
        &self,
        request: Request<BrokerStartRequest>,
    ) -> Result<Response<Empty>, Status> {
        let board = self
            .core
            .params_board
            .lock()
            .await
            .clone()
            .ok_or(BrokerError::NotInitialized)?;

        let worker_addrs = request.into_inner().worker_addresses;
        let (partition, worker_clients, worker_health) =
            wire_ring(&board, &worker_addrs, &self.health, self.health_deadline).await?;

        let mut guard = self.core.wiring.lock().await;
        *guard = Some(Wiring {
            partition,
            worker_clients,
            worker_health,
        });
        tracing::info!(workers = worker_addrs.len(), "broker wired ring, run started");
        Ok(Response::new(Empty {}))
    }

    async fn progress_all(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        run_progress_loop(self.core.clone(), self.liveness.clone()).await?;
        Ok(Response::new(Empty {}))
    }

    async fn count(&self, _request: Request<Empty>) -> Result<Response<CountResponse>, Status> {
        let result = fan_out_count(&self.core).await?;
        Ok(Response::new(CountResponse {
            count: result.count,
            turn: result.turn,
        }))
    }

    async fn fetch(&self, _request: Request<Empty>) -> Result<Response<WorldResponse>, Status> {
        let (board, turn) = fan_out_fetch(&self.core).await?;
        Ok(Response::new(WorldResponse {
            board: Some(board.to_proto()),
            turn,
        }))
    }

    async fn pause(&self, _request: Request<Empty>) -> Result<Response<PauseResponse>, Status> {
        let now_paused = self.core.toggle_pause().await;
        let message = if now_paused {
            format!("paused at turn {}", self.core.current_turn())
        } else {
            format!("resumed at turn {}", self.core.current_turn())
        };
        Ok(Response::new(PauseResponse { message }))
    }

    async fn quit(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        self.core.is_quit.store(true, Ordering::Release);
        tracing::info!("broker quitting, retaining final state for Fetch");
        Ok(Response::new(Empty {}))
    }

    async fn kill(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        let mut wiring = self.core.wiring.lock().await;
        if let Some(wiring) = wiring.as_mut() {
            for client in wiring.worker_clients.iter_mut() {
                let mut client: WorkerServiceClient<_> = client.clone();
                tokio::spawn(async move {
                    let _ = client.kill(WorkerEmpty {}).await;
                });
            }
        }
        tracing::warn!("broker killed");
        std::process::exit(0);
    }
}
