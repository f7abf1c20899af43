use thiserror::Error;

/// Errors internal to a single worker's halo-exchange-and-compute pipeline.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("worker has not been initialized yet")]
    NotInitialized,

    #[error("worker was already initialized")]
    AlreadyInitialized,

    #[error("failed to dial above neighbour {address}: {source}")]
    DialAboveFailed {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("halo exchange with above neighbour failed: {0}")]
    HaloExchangeFailed(String),
}

impl From<WorkerError> for tonic::Status {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::NotInitialized => tonic::Status::failed_precondition(err.to_string()),
            WorkerError::AlreadyInitialized => tonic::Status::failed_precondition(err.to_string()),
            WorkerError::DialAboveFailed { .. } => tonic::Status::unavailable(err.to_string()),
            WorkerError::HaloExchangeFailed(_) => tonic::Status::internal(err.to_string()),
        }
    }
}
