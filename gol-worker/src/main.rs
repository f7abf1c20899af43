//! A single worker process: owns one horizontal strip of the board and
//! exchanges halo rows with its ring neighbours each turn.
use std::future::ready;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use envconfig::Envconfig;

use gol_common::health::HealthRegistry;
use gol_common::metrics::{serve, setup_metrics_router};
use gol_proto::worker_service_server::WorkerServiceServer;
use tonic::transport::Server;

use gol_worker::config::Config;
use gol_worker::service::WorkerServiceImpl;
use gol_worker::state::WorkerCore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("invalid configuration");

    let liveness = HealthRegistry::new("liveness");
    let pipeline_liveness = liveness
        .register(
            "halo-exchange-loop".to_string(),
            time::Duration::seconds(config.health_deadline_secs),
        )
        .await;

    let core = Arc::new(WorkerCore::uninitialized());
    let grpc_service = WorkerServiceImpl::new(core, pipeline_liveness);

    let router = Router::new()
        .route("/", get(|| ready("gol-worker")))
        .route("/_readiness", get(|| ready("ok")))
        .route("/_liveness", get(move || ready(liveness.get_status())));
    let router = router.merge(setup_metrics_router());

    let metrics_bind = config.metrics_bind();
    tokio::spawn(async move {
        serve(router, &metrics_bind)
            .await
            .expect("failed to serve metrics router");
    });

    let grpc_addr = config.grpc_bind().parse()?;
    tracing::info!(address = %grpc_addr, "worker listening");
    Server::builder()
        .add_service(WorkerServiceServer::new(grpc_service))
        .serve(grpc_addr)
        .await?;

    Ok(())
}
