//! The run coordinator: partitions the board across workers, wires the
//! ring, and drives turn progression on the client's behalf.
use std::future::ready;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use envconfig::Envconfig;

use gol_common::health::HealthRegistry;
use gol_common::metrics::{serve, setup_metrics_router};
use gol_proto::broker_service_server::BrokerServiceServer;
use tonic::transport::Server;

use gol_broker::config::Config;
use gol_broker::service::BrokerServiceImpl;
use gol_broker::state::BrokerCore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("invalid configuration");

    let liveness = HealthRegistry::new("liveness");
    let health_deadline = time::Duration::seconds(config.health_deadline_secs);
    let progress_liveness = liveness
        .register("progress-loop".to_string(), health_deadline)
        .await;

    let core = Arc::new(BrokerCore::uninitialized());
    let grpc_service =
        BrokerServiceImpl::new(core, progress_liveness, liveness.clone(), health_deadline);

    let router = Router::new()
        .route("/", get(|| ready("gol-broker")))
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
    tracing::info!(address = %grpc_addr, "broker listening");
    Server::builder()
        .add_service(BrokerServiceServer::new(grpc_service))
        .serve(grpc_addr)
        .await?;

    Ok(())
}
