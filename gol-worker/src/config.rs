//! Ambient process configuration: where a worker binds its gRPC and
//! metrics/health endpoints. The ring topology itself (who is "above" this
//! worker, what strip it owns) arrives later over RPC from the broker, via
//! `Init`/`Start` — it is not environment configuration.

use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "BIND_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "GRPC_PORT", default = "4000")]
    pub grpc_port: u16,

    #[envconfig(from = "METRICS_PORT", default = "4001")]
    pub metrics_port: u16,

    #[envconfig(from = "HEALTH_DEADLINE_SECS", default = "60")]
    pub health_deadline_secs: i64,
}

impl Config {
    pub fn grpc_bind(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }

    pub fn metrics_bind(&self) -> String {
        format!("{}:{}", self.host, self.metrics_port)
    }
}
