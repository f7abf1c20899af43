//! Spins up two real worker gRPC servers wired into a two-node ring and
//! drives them through Init/Start/Progress/Fetch, checking that the
//! strip-plus-halo computation each worker does independently reproduces
//! a whole-board reference step.

use std::net::SocketAddr;
use std::sync::Arc;

use gol_common::board::Board;
use gol_common::health::HealthRegistry;
use gol_proto::worker_service_client::WorkerServiceClient;
use gol_proto::{Empty, WorkerInitRequest, WorkerStartRequest};
use gol_worker::service::WorkerServiceImpl;
use gol_worker::state::WorkerCore;
use tokio::net::TcpListener;
use tonic::transport::{Channel, Server};

async fn spawn_worker() -> (SocketAddr, WorkerServiceClient<Channel>) {
    let registry = HealthRegistry::new("liveness");
    let handle = registry
        .register("halo-exchange-loop".to_string(), time::Duration::seconds(60))
        .await;
    let core = Arc::new(WorkerCore::uninitialized());
    let service = WorkerServiceImpl::new(core, handle);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        Server::builder()
            .add_service(gol_proto::worker_service_server::WorkerServiceServer::new(service))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    let client = WorkerServiceClient::connect(format!("http://{addr}"))
        .await
        .expect("failed to connect to worker under test");
    (addr, client)
}

fn vertical_blinker(width: u32, height: u32) -> Board {
    let mut board = Board::new_dead(width, height);
    for y in 1..=3 {
        board.set(y, 1, gol_common::board::ALIVE);
    }
    board
}

#[tokio::test]
async fn two_worker_ring_matches_reference_step() {
    let width = 4u32;
    let height = 4u32;
    let board = vertical_blinker(width, height);
    let expected = gol_common::life::step(&board);

    let (addr_a, mut client_a) = spawn_worker().await;
    let (addr_b, mut client_b) = spawn_worker().await;

    let strip_a = board.slice_rows(0, 2);
    let strip_b = board.slice_rows(2, 4);

    client_a
        .init(WorkerInitRequest {
            strip: strip_a,
            width,
            strip_height: 2,
        })
        .await
        .expect("init a");
    client_b
        .init(WorkerInitRequest {
            strip: strip_b,
            width,
            strip_height: 2,
        })
        .await
        .expect("init b");

    // Ring of two: each worker's "above" is the other worker.
    client_a
        .start(WorkerStartRequest {
            above_address: addr_b.to_string(),
        })
        .await
        .expect("start a");
    client_b
        .start(WorkerStartRequest {
            above_address: addr_a.to_string(),
        })
        .await
        .expect("start b");

    let (turn_a, turn_b) = tokio::join!(
        client_a.progress(Empty {}),
        client_b.progress(Empty {})
    );
    assert_eq!(turn_a.expect("progress a").into_inner().turn, 1);
    assert_eq!(turn_b.expect("progress b").into_inner().turn, 1);

    let fetched_a = client_a.fetch(Empty {}).await.unwrap().into_inner();
    let fetched_b = client_b.fetch(Empty {}).await.unwrap().into_inner();

    let mut combined = fetched_a.board.unwrap().cells;
    combined.extend(fetched_b.board.unwrap().cells);

    assert_eq!(combined, expected.cells);
}
