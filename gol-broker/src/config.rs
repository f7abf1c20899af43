//! Ambient process configuration for the broker: where it binds its gRPC
//! and metrics/health endpoints.

use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "BIND_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "GRPC_PORT", default = "5000")]
    pub grpc_port: u16,

    #[envconfig(from = "METRICS_PORT", default = "5001")]
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
