//! Spins up a real broker plus real workers (in-process, over TCP loopback)
//! and drives a full run through the client-facing RPC surface.

use std::net::SocketAddr;
use std::sync::Arc;

use gol_broker::service::BrokerServiceImpl;
use gol_broker::state::BrokerCore;
use gol_common::board::Board;
use gol_common::health::HealthRegistry;
use gol_proto::broker_service_client::BrokerServiceClient;
use gol_proto::broker_service_server::BrokerServiceServer;
use gol_proto::worker_service_server::WorkerServiceServer;
use gol_proto::{BrokerInitRequest, BrokerStartRequest, Empty};
use gol_worker::service::WorkerServiceImpl;
use gol_worker::state::WorkerCore;
use tokio::net::TcpListener;
use tonic::transport::{Channel, Server};

async fn spawn_worker() -> SocketAddr {
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
            .add_service(WorkerServiceServer::new(service))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    addr
}

async fn spawn_broker() -> BrokerServiceClient<Channel> {
    let registry = HealthRegistry::new("liveness");
    let health_deadline = time::Duration::seconds(60);
    let handle = registry
        .register("progress-loop".to_string(), health_deadline)
        .await;
    let core = Arc::new(BrokerCore::uninitialized());
    let service = BrokerServiceImpl::new(core, handle, registry, health_deadline);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        Server::builder()
            .add_service(BrokerServiceServer::new(service))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    BrokerServiceClient::connect(format!("http://{addr}"))
        .await
        .expect("failed to connect to broker under test")
}

fn blinker(width: u32, height: u32) -> Board {
    let mut board = Board::new_dead(width, height);
    board.set(2, 1, gol_common::board::ALIVE);
    board.set(2, 2, gol_common::board::ALIVE);
    board.set(2, 3, gol_common::board::ALIVE);
    board
}

#[tokio::test]
async fn blinker_oscillates_across_two_workers() {
    let width = 5u32;
    let height = 5u32;
    let initial = blinker(width, height);
    let expected_final = gol_common::life::run(&initial, 2);

    let mut broker = spawn_broker().await;
    let worker_a = spawn_worker().await;
    let worker_b = spawn_worker().await;

    broker
        .init(BrokerInitRequest {
            world: Some(initial.to_proto()),
            turns: 2,
        })
        .await
        .expect("init");
    broker
        .start(BrokerStartRequest {
            worker_addresses: vec![worker_a.to_string(), worker_b.to_string()],
        })
        .await
        .expect("start");

    broker.progress_all(Empty {}).await.expect("progress_all");

    let fetched = broker.fetch(Empty {}).await.unwrap().into_inner();
    let board = fetched.board.unwrap();
    assert_eq!(fetched.turn, 2);
    assert_eq!(board.cells, expected_final.cells);
}

#[tokio::test]
async fn pause_freezes_count_and_fetch() {
    let width = 5u32;
    let height = 5u32;
    let initial = blinker(width, height);

    let mut broker = spawn_broker().await;
    let worker_a = spawn_worker().await;
    let worker_b = spawn_worker().await;

    broker
        .init(BrokerInitRequest {
            world: Some(initial.to_proto()),
            turns: 1,
        })
        .await
        .expect("init");
    broker
        .start(BrokerStartRequest {
            worker_addresses: vec![worker_a.to_string(), worker_b.to_string()],
        })
        .await
        .expect("start");

    let pause_response = broker.pause(Empty {}).await.expect("pause").into_inner();
    assert!(pause_response.message.contains("paused"));

    let count = broker.count(Empty {}).await.unwrap().into_inner();
    assert_eq!(count.count, -1);

    let resume_response = broker.pause(Empty {}).await.expect("resume").into_inner();
    assert!(resume_response.message.contains("resumed"));

    broker.progress_all(Empty {}).await.expect("progress_all");
    let count_after = broker.count(Empty {}).await.unwrap().into_inner();
    assert_eq!(count_after.count, 3);
}
