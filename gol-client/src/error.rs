use thiserror::Error;

/// Errors surfaced by the client's run orchestration. All are fatal: the
/// client logs and exits non-zero, per the spec's client-side propagation
/// policy.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Configuration(String),

    #[error("failed to connect to broker at {address}: {source}")]
    Dial {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("RPC to broker failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("failed to load or write board image: {0}")]
    Image(#[from] gol_common::GolError),
}
