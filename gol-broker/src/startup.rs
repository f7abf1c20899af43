//! `Start`: partition the board, dial every worker, push its strip, then
//! wire the logical ring by telling each worker the address of its
//! "above" neighbour.

use gol_common::board::{Board, Partition};
use gol_common::health::{HealthHandle, HealthRegistry};
use gol_proto::worker_service_client::WorkerServiceClient;
use gol_proto::{WorkerInitRequest, WorkerStartRequest};
use tonic::transport::{Channel, Endpoint};

use crate::error::BrokerError;

async fn dial(address: &str) -> Result<WorkerServiceClient<Channel>, BrokerError> {
    let endpoint =
        Endpoint::from_shared(format!("http://{address}")).map_err(|source| {
            BrokerError::DialWorkerFailed {
                address: address.to_string(),
                source,
            }
        })?;
    let channel = endpoint
        .connect()
        .await
        .map_err(|source| BrokerError::DialWorkerFailed {
            address: address.to_string(),
            source,
        })?;
    Ok(WorkerServiceClient::new(channel))
}

pub async fn wire_ring(
    board: &Board,
    worker_addrs: &[String],
    health: &HealthRegistry,
    health_deadline: time::Duration,
) -> Result<(Partition, Vec<WorkerServiceClient<Channel>>, Vec<HealthHandle>), BrokerError> {
    let n = worker_addrs.len() as u32;
    let partition = Partition::compute(board.height, n).map_err(|_| BrokerError::TooManyWorkers {
        height: board.height,
        n,
    })?;

    let mut clients = Vec::with_capacity(worker_addrs.len());
    let mut worker_health = Vec::with_capacity(worker_addrs.len());
    for (i, address) in worker_addrs.iter().enumerate() {
        let mut client = dial(address).await?;
        let strip = board.slice_rows(partition.strip_start(i), partition.strip_start(i) + partition.strip_height(i));
        client
            .init(WorkerInitRequest {
                strip,
                width: board.width,
                strip_height: partition.strip_height(i),
            })
            .await
            .map_err(|status| BrokerError::WorkerRpcFailed { index: i, status })?;
        clients.push(client);
        worker_health.push(health.register(format!("worker-{address}"), health_deadline).await);
    }

    let n = worker_addrs.len();
    for (i, client) in clients.iter_mut().enumerate() {
        let above = (i + n - 1) % n;
        client
            .start(WorkerStartRequest {
                above_address: worker_addrs[above].clone(),
            })
            .await
            .map_err(|status| BrokerError::WorkerRpcFailed { index: i, status })?;
    }

    Ok((partition, clients, worker_health))
}
