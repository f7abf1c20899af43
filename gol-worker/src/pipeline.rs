//! The halo-exchange-and-compute step that runs as background activity
//! between `Start`/`Progress` calls from the broker.

use std::sync::Arc;

use gol_common::life::next_strip;
use gol_proto::worker_service_client::WorkerServiceClient;
use gol_proto::HaloRequest;
use tonic::transport::{Channel, Endpoint};

use crate::error::WorkerError;
use crate::state::WorkerCore;

pub async fn dial_above(address: &str) -> Result<WorkerServiceClient<Channel>, tonic::transport::Error> {
    let endpoint = Endpoint::from_shared(format!("http://{address}"))?;
    let channel = endpoint.connect().await?;
    Ok(WorkerServiceClient::new(channel))
}

/// One full step: call `Halo` on the above neighbour with our top row,
/// await the below neighbour's push into our `bot_halo_slot`, compute the
/// next strip, and publish it to `next_slot`.
pub async fn run_step(core: Arc<WorkerCore>) {
    let result = run_step_fallible(&core).await;
    core.next_slot.put(result).await;
}

async fn run_step_fallible(core: &WorkerCore) -> Result<Vec<u8>, WorkerError> {
    let width = core.width();
    let strip_h = core.strip_h();

    let (top_row, strip_snapshot) = {
        let guard = core.strip.lock().await;
        let strip = guard.as_ref().expect("world-built implies strip is Some");
        (strip.cells[..width as usize].to_vec(), strip.cells.clone())
    };

    let mut client = {
        let guard = core.above_client.lock().await;
        guard.as_ref().cloned().ok_or_else(|| {
            WorkerError::HaloExchangeFailed("above neighbour not yet dialed".to_string())
        })?
    };

    // Call the above neighbour (pull our topHalo) and wait for the below
    // neighbour's push (our botHalo) concurrently: neither depends on the
    // other completing first.
    let (halo_reply, bot_halo) = tokio::join!(
        client.halo(HaloRequest { row: top_row }),
        core.bot_halo_slot.take()
    );

    let top_halo = halo_reply
        .map_err(|status| WorkerError::HaloExchangeFailed(format!("above neighbour: {status}")))?
        .into_inner()
        .row;

    if top_halo.len() != width as usize || bot_halo.len() != width as usize {
        return Err(WorkerError::HaloExchangeFailed(format!(
            "halo row length mismatch: top={}, bot={}, width={}",
            top_halo.len(),
            bot_halo.len(),
            width
        )));
    }

    Ok(next_strip(&strip_snapshot, width, strip_h, &top_halo, &bot_halo))
}
