//! The broker's turn loop and the `Count`/`Fetch` fan-outs that must
//! observe a coherent snapshot of all workers.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::future::join_all;
use gol_common::board::Board;
use gol_common::health::HealthHandle;
use gol_common::metrics::{record_alive_cells, record_turn};
use gol_proto::{CountResponse as WorkerCountResponse, Empty};

use crate::error::BrokerError;
use crate::state::BrokerCore;

/// Drive turns until `currentTurn == totalTurns` or `isQuit`. Returns the
/// first worker error encountered, per the no-retry, fatal propagation
/// policy for a turn failure.
pub async fn run_progress_loop(
    core: Arc<BrokerCore>,
    liveness: HealthHandle,
) -> Result<(), BrokerError> {
    let total_turns = {
        let guard = core.params.lock().await;
        guard
            .as_ref()
            .ok_or(BrokerError::NotInitialized)?
            .total_turns
    };

    loop {
        if core.is_quit() || core.current_turn() >= total_turns {
            return Ok(());
        }

        let (mut clients, worker_health) = {
            let mut wiring = core.wiring.lock().await;
            let wiring = wiring.as_mut().ok_or(BrokerError::NotStarted)?;
            (wiring.worker_clients.clone(), wiring.worker_health.clone())
        };

        // Acquire the pause-gate latch only for the duration of fan-out
        // issuance: if `Pause` is currently holding it, this blocks the
        // whole loop iteration until resumed, exactly at the turn boundary.
        let guard = core.progress_mu.lock().await;
        let futures: Vec<_> = clients
            .iter_mut()
            .map(|client| client.progress(Empty {}))
            .collect();
        drop(guard);

        let results = join_all(futures).await;
        let mut new_turn = None;
        for (index, result) in results.into_iter().enumerate() {
            let response = result.map_err(|status| BrokerError::WorkerRpcFailed { index, status })?;
            let turn = response.into_inner().turn;
            if index == 0 {
                new_turn = Some(turn);
            }
            if let Some(handle) = worker_health.get(index) {
                handle.report_healthy(turn).await;
            }
        }
        let new_turn = new_turn.expect("at least one worker in a started run");
        core.current_turn.store(new_turn, Ordering::Release);
        liveness.report_healthy(new_turn).await;
        record_turn("broker", new_turn);
    }
}

pub struct CountResult {
    pub count: i64,
    pub turn: u32,
}

pub async fn fan_out_count(core: &BrokerCore) -> Result<CountResult, BrokerError> {
    if core.is_paused() {
        record_alive_cells(-1);
        return Ok(CountResult {
            count: -1,
            turn: core.current_turn(),
        });
    }
    let mut clients = {
        let mut wiring = core.wiring.lock().await;
        let wiring = wiring.as_mut().ok_or(BrokerError::NotStarted)?;
        wiring.worker_clients.clone()
    };
    // Hold the pause-gate latch across issuance only, same as the turn
    // loop: guarantees no turn increment lands mid-sample.
    let guard = core.progress_mu.lock().await;
    let futures: Vec<_> = clients.iter_mut().map(|client| client.count(Empty {})).collect();
    drop(guard);
    let results = join_all(futures).await;
    let result = sum_counts(results)?;
    record_alive_cells(result.count);
    Ok(result)
}

fn sum_counts(
    results: Vec<Result<tonic::Response<WorkerCountResponse>, tonic::Status>>,
) -> Result<CountResult, BrokerError> {
    let mut total = 0i64;
    let mut turn = 0u32;
    for (index, result) in results.into_iter().enumerate() {
        let response = result
            .map_err(|status| BrokerError::WorkerRpcFailed { index, status })?
            .into_inner();
        total += response.count;
        if index == 0 {
            turn = response.turn;
        }
    }
    Ok(CountResult { count: total, turn })
}

pub async fn fan_out_fetch(core: &BrokerCore) -> Result<(Board, u32), BrokerError> {
    let (width, mut clients) = {
        let params = core.params.lock().await;
        let width = params.as_ref().ok_or(BrokerError::NotInitialized)?.width;
        let mut wiring = core.wiring.lock().await;
        let wiring = wiring.as_mut().ok_or(BrokerError::NotStarted)?;
        (width, wiring.worker_clients.clone())
    };

    // Hold the pause-gate latch across issuance only, same as the turn
    // loop: guarantees no turn increment lands mid-snapshot across workers.
    let guard = core.progress_mu.lock().await;
    let futures: Vec<_> = clients.iter_mut().map(|client| client.fetch(Empty {})).collect();
    drop(guard);
    let results = join_all(futures).await;
    let mut cells = Vec::new();
    let mut height = 0u32;
    let mut turn = 0u32;
    for (index, result) in results.into_iter().enumerate() {
        let response = result
            .map_err(|status| BrokerError::WorkerRpcFailed { index, status })?
            .into_inner();
        let strip = response.board.expect("worker always returns a board");
        height += strip.height;
        cells.extend(strip.cells);
        if index == 0 {
            turn = response.turn;
        }
    }
    Ok((
        Board {
            width,
            height,
            cells,
        },
        turn,
    ))
}
