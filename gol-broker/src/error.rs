use thiserror::Error;

/// Errors internal to the broker's run lifecycle, independent of the
/// `tonic::Status` codes they get mapped to at the RPC boundary.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("broker has not been initialized yet")]
    NotInitialized,

    #[error("broker was already initialized")]
    AlreadyInitialized,

    #[error("run has not been started yet")]
    NotStarted,

    #[error("cannot partition a board of height {height} across {n} workers")]
    TooManyWorkers { height: u32, n: u32 },

    #[error("failed to dial worker {address}: {source}")]
    DialWorkerFailed {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("worker {index} failed: {status}")]
    WorkerRpcFailed { index: usize, status: tonic::Status },
}

impl From<BrokerError> for tonic::Status {
    fn from(err: BrokerError) -> Self {
        use BrokerError::*;
        match err {
            NotInitialized | NotStarted | AlreadyInitialized => {
                tonic::Status::failed_precondition(err.to_string())
            }
            TooManyWorkers { .. } => tonic::Status::invalid_argument(err.to_string()),
            DialWorkerFailed { .. } => tonic::Status::unavailable(err.to_string()),
            WorkerRpcFailed { .. } => tonic::Status::internal(err.to_string()),
        }
    }
}
