use thiserror::Error;

/// Errors surfaced by the simulation engine, grouped the way the spec's
/// error taxonomy groups them: configuration, connectivity, protocol, I/O.
#[derive(Error, Debug)]
pub enum GolError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to reach {address}: {source}")]
    Connectivity {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("{1} unreachable: {0}")]
    ConnectivityStatus(tonic::Status, &'static str),

    #[error("RPC to {1} failed: {0}")]
    Protocol(tonic::Status, &'static str),

    #[error("malformed PGM image: {0}")]
    ImageFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GolError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        GolError::Configuration(msg.into())
    }

    pub fn protocol(method: &'static str, status: tonic::Status) -> Self {
        GolError::Protocol(status, method)
    }
}

/// Classify an incoming `tonic::Status` per the spec's error taxonomy:
/// `InvalidArgument` is a configuration error, `Unavailable` and
/// `DeadlineExceeded` are connectivity errors, everything else is a
/// protocol error.
pub fn classify_status(method: &'static str, status: tonic::Status) -> GolError {
    use tonic::Code;
    match status.code() {
        Code::InvalidArgument => GolError::Configuration(status.message().to_string()),
        Code::Unavailable | Code::DeadlineExceeded => {
            GolError::ConnectivityStatus(status, method)
        }
        _ => GolError::protocol(method, status),
    }
}

pub type Result<T> = std::result::Result<T, GolError>;
